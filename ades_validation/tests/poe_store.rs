// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::context::ValidationContext;
use ades_validation::diagnostic::{DiagnosticData, TimestampKind};
use ades_validation::ids::PoeSubject;
use ades_validation::poe::{PoeOrigin, PoeStore};
use ades_validation::poe_extraction;
use ades_validation::policy::ValidationPolicy;
use ades_validation_test_utils::{
    now, reference, timestamp, utc, DiagnosticBuilder, SignatureBuilder, DOCUMENT, ROOT,
    SIGNATURE, SIGNER, SIGNER_REVOCATION, TSA,
};
use chrono::Duration;
use proptest::prelude::*;

fn origin(id: &str) -> PoeOrigin {
    PoeOrigin::Timestamp(id.to_string())
}

fn extract_all(data: &DiagnosticData, policy: &ValidationPolicy, store: &PoeStore) -> usize {
    let ctx = ValidationContext::new(data, policy, now());
    let signature = &data.signatures[0];
    signature
        .timestamps
        .iter()
        .map(|t| poe_extraction::extract(&ctx, store, signature, t))
        .sum()
}

#[test]
fn later_proof_does_not_replace_earlier_one() {
    let store = PoeStore::new();

    assert!(store.add_object(SIGNER, utc(2021, 1, 1), origin("ts-1")));
    assert!(!store.add_object(SIGNER, utc(2022, 1, 1), origin("ts-2")));
    assert!(!store.add_object(SIGNER, utc(2021, 1, 1), origin("ts-3")));
    assert!(store.add_object(SIGNER, utc(2020, 1, 1), origin("ts-4")));

    assert_eq!(1, store.len());
    assert_eq!(Some(utc(2020, 1, 1)), store.lowest_for_object(SIGNER));
    assert_eq!(origin("ts-4"), store.entries()[0].origin);
}

#[test]
fn digest_proof_is_not_an_object_proof() {
    let store = PoeStore::new();

    store.add_digest("SHA256", SIGNER_REVOCATION, utc(2021, 1, 1), origin("refs-1"));

    assert_eq!(None, store.lowest_for_object(SIGNER_REVOCATION));
    assert_eq!(
        Some(utc(2021, 1, 1)),
        store.lowest(&PoeSubject::digest("SHA256", SIGNER_REVOCATION))
    );
    assert_eq!("SHA256(signer-ocsp)", store.entries()[0].label);
}

#[test]
fn refs_only_timestamp_upgrades_digest_to_object_proof() {
    let mut refs = timestamp("refs-1", TimestampKind::RefsOnly, utc(2021, 1, 1));
    refs.references = vec![reference(SIGNER_REVOCATION, "SHA256")];
    let data = DiagnosticBuilder::standard()
        .signature(SignatureBuilder::new().timestamp(refs).build())
        .build();
    let store = PoeStore::new();
    store.add_object(SIGNER_REVOCATION, now(), PoeOrigin::ValidationTime);

    extract_all(&data, &ValidationPolicy::default(), &store);

    assert_eq!(Some(utc(2021, 1, 1)), store.lowest_for_object(SIGNER_REVOCATION));
    assert_eq!(None, store.lowest_for_object(SIGNATURE));
}

#[test]
fn expired_reference_digest_stays_a_digest_proof() {
    let mut refs = timestamp("refs-1", TimestampKind::RefsOnly, utc(2008, 1, 1));
    refs.references = vec![reference(SIGNER_REVOCATION, "SHA1")];
    let data = DiagnosticBuilder::standard()
        .signature(SignatureBuilder::new().timestamp(refs).build())
        .build();
    let store = PoeStore::new();
    store.add_object(SIGNER_REVOCATION, now(), PoeOrigin::ValidationTime);

    extract_all(&data, &ValidationPolicy::default(), &store);

    // SHA1 no longer protects the reference at the time the object is otherwise proven.
    assert_eq!(Some(now()), store.lowest_for_object(SIGNER_REVOCATION));
    assert_eq!(
        Some(utc(2008, 1, 1)),
        store.lowest(&PoeSubject::digest("SHA1", SIGNER_REVOCATION))
    );
}

#[test]
fn signature_timestamp_proves_only_the_signature() {
    let data = DiagnosticBuilder::standard()
        .signature(
            SignatureBuilder::new()
                .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
                .build(),
        )
        .build();
    let store = PoeStore::new();

    let changed = extract_all(&data, &ValidationPolicy::default(), &store);

    assert_eq!(1, changed);
    assert_eq!(Some(utc(2021, 1, 1)), store.lowest_for_object(SIGNATURE));
    assert_eq!(None, store.lowest_for_object(SIGNER));
}

#[test]
fn validation_data_timestamp_proves_signature_and_references() {
    let mut vd = timestamp("vd-1", TimestampKind::ValidationData, utc(2021, 3, 1));
    vd.references = vec![reference(SIGNER_REVOCATION, "SHA256")];
    let data = DiagnosticBuilder::standard()
        .signature(SignatureBuilder::new().timestamp(vd).build())
        .build();
    let store = PoeStore::new();

    extract_all(&data, &ValidationPolicy::default(), &store);

    assert_eq!(Some(utc(2021, 3, 1)), store.lowest_for_object(SIGNATURE));
    assert_eq!(
        Some(utc(2021, 3, 1)),
        store.lowest(&PoeSubject::digest("SHA256", SIGNER_REVOCATION))
    );
}

#[test]
fn content_timestamp_proves_nothing() {
    let data = DiagnosticBuilder::standard()
        .signature(
            SignatureBuilder::new()
                .timestamp(timestamp("content-1", TimestampKind::Content, utc(2020, 1, 1)))
                .build(),
        )
        .build();
    let store = PoeStore::new();

    assert_eq!(0, extract_all(&data, &ValidationPolicy::default(), &store));
    assert!(store.is_empty());
}

#[test]
fn archive_timestamp_covers_only_preceding_timestamps() {
    let data = DiagnosticBuilder::standard()
        .signature(
            SignatureBuilder::new()
                .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
                .timestamp(timestamp("archive-1", TimestampKind::Archive, utc(2022, 1, 1)))
                .timestamp(timestamp("ts-late", TimestampKind::Signature, utc(2023, 1, 1)))
                .build(),
        )
        .build();
    let policy = ValidationPolicy::default();
    let ctx = ValidationContext::new(&data, &policy, now());
    let signature = &data.signatures[0];
    let store = PoeStore::new();

    poe_extraction::extract(&ctx, &store, signature, &signature.timestamps[1]);

    for covered in [DOCUMENT, SIGNATURE, SIGNER, ROOT, TSA, "ts-1"] {
        assert_eq!(
            Some(utc(2022, 1, 1)),
            store.lowest_for_object(covered),
            "{covered}"
        );
    }
    assert_eq!(None, store.lowest_for_object("ts-late"));
    assert_eq!(None, store.lowest_for_object("archive-1"));
}

#[test]
fn weak_timestamp_digest_is_not_extractable() {
    let mut ts = timestamp("ts-1", TimestampKind::Signature, utc(2015, 1, 1));
    ts.token.crypto.digest_algorithm = "SHA1".to_string();
    let data = DiagnosticBuilder::standard()
        .signature(SignatureBuilder::new().timestamp(ts.clone()).build())
        .build();
    let policy = ValidationPolicy::default();
    let ctx = ValidationContext::new(&data, &policy, now());

    assert!(!poe_extraction::is_extractable(&ctx, &ts));
    ts.production_time = utc(2009, 1, 1);
    assert!(poe_extraction::is_extractable(&ctx, &ts));
}

#[test]
fn store_is_shared_across_threads() {
    let store = PoeStore::new();

    std::thread::scope(|scope| {
        for day in 0..8 {
            let store = &store;
            scope.spawn(move || {
                store.add_object(SIGNER, utc(2021, 1, 1) + Duration::days(day), origin("ts"));
            });
        }
    });

    assert_eq!(Some(utc(2021, 1, 1)), store.lowest_for_object(SIGNER));
}

proptest! {
    #[test]
    fn proofs_only_grow_and_move_earlier(
        additions in prop::collection::vec((0usize..4, 0i64..5000), 1..40)
    ) {
        let objects = [SIGNATURE, SIGNER, ROOT, TSA];
        let store = PoeStore::new();
        let mut previous_len = 0;

        for (index, days) in additions {
            let object = objects[index];
            let before = store.lowest_for_object(object);
            let time = utc(2010, 1, 1) + Duration::days(days);

            let changed = store.add_object(object, time, origin("ts"));

            let after = store.lowest_for_object(object);
            prop_assert!(store.len() >= previous_len);
            prop_assert_eq!(changed, before.map_or(true, |b| time < b));
            prop_assert_eq!(Some(before.map_or(time, |b| b.min(time))), after);
            previous_len = store.len();
        }
    }
}
