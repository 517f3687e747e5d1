// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::adest::{self, TimestampPresence};
use ades_validation::bbb::{self, BbbSubject};
use ades_validation::context::ValidationContext;
use ades_validation::diagnostic::{DiagnosticData, TimestampData, TimestampKind};
use ades_validation::policy::{ConstraintId, ValidationPolicy};
use ades_validation::report::SignatureReport;
use ades_validation::timestamp_validation;
use ades_validation_chain::{ConstraintStatus, Indication, Level, MessageTag, SubIndication};
use ades_validation_test_utils::{
    now, timestamp, utc, validate, DiagnosticBuilder, SignatureBuilder,
};
use chrono::Duration;
use proptest::prelude::*;

fn run_with(signature: SignatureBuilder, policy: ValidationPolicy) -> SignatureReport {
    let data = DiagnosticBuilder::standard().signature(signature.build()).build();
    validate(data, policy).signatures.into_iter().next().unwrap()
}

fn run(signature: SignatureBuilder) -> SignatureReport {
    run_with(signature, ValidationPolicy::default())
}

#[test]
fn unusable_timestamp_is_no_valid_timestamp() {
    let mut ts = timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1));
    ts.message_imprint_intact = false;

    let report = run(SignatureBuilder::new().timestamp(ts));

    assert_eq!(TimestampPresence::NoneAccepted, report.adest.presence);
    assert_eq!(
        Some(ConstraintStatus::NotOk),
        report.adest.timestamps[0].chain.status(MessageTag::AdestImivc)
    );
    assert_eq!(
        Indication::Indeterminate(SubIndication::NoValidTimestamp),
        report.adest.indication()
    );
}

#[test]
fn tolerated_unusable_timestamp_keeps_validation_time() {
    let mut ts = timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1));
    ts.message_imprint_found = false;
    let policy = ValidationPolicy::default().with_level(ConstraintId::TimestampRequired, Level::Warn);

    let report = run_with(SignatureBuilder::new().timestamp(ts), policy);

    assert!(report.adest.is_valid());
    assert_eq!(now(), report.adest.best_signature_time);
    assert_eq!(
        Some(ConstraintStatus::Warning),
        report.adest.chain.status(MessageTag::AdestIvtsp)
    );
}

#[test]
fn missing_timestamps_are_never_valid_whatever_the_policy() {
    let policy = ValidationPolicy::default().with_level(ConstraintId::TimestampRequired, Level::Ignore);

    let report = run_with(SignatureBuilder::new(), policy);

    assert_eq!(TimestampPresence::Absent, report.adest.presence);
    assert_eq!(
        Indication::Indeterminate(SubIndication::NoTimestamp),
        report.adest.indication()
    );
}

#[test]
fn content_timestamps_do_not_move_best_signature_time() {
    let report = run(
        SignatureBuilder::new()
            .timestamp(timestamp("content-1", TimestampKind::Content, utc(2020, 6, 1)))
            .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1))),
    );

    assert_eq!(utc(2021, 1, 1), report.adest.best_signature_time);
    assert_eq!(1, report.adest.timestamps.len());
    assert!(report.adest.is_valid());
}

#[test]
fn timestamp_after_validation_time_is_rejected() {
    let report = run(
        SignatureBuilder::new().timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2025, 1, 1))),
    );

    assert_eq!(
        Some(ConstraintStatus::NotOk),
        report.adest.timestamps[0]
            .chain
            .status(MessageTag::AdestIstptdabst)
    );
    assert_eq!(
        Indication::Indeterminate(SubIndication::NoValidTimestamp),
        report.adest.indication()
    );
}

#[test]
fn content_timestamp_after_signature_timestamp_breaks_order() {
    let report = run(
        SignatureBuilder::new()
            .timestamp(timestamp("content-1", TimestampKind::Content, utc(2022, 1, 1)))
            .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1))),
    );

    assert_eq!(
        Some(ConstraintStatus::NotOk),
        report.adest.chain.status(MessageTag::AdestIctsbst)
    );
    assert_eq!(
        Indication::Invalid(SubIndication::TimestampOrderFailure),
        report.indication()
    );
}

#[test]
fn archive_timestamp_before_validation_data_timestamp_breaks_order() {
    let report = run(
        SignatureBuilder::new()
            .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
            .timestamp(timestamp("refs-1", TimestampKind::RefsOnly, utc(2022, 1, 1)))
            .timestamp(timestamp("archive-1", TimestampKind::Archive, utc(2021, 6, 1))),
    );

    assert_eq!(Some(ConstraintStatus::Ok), report.adest.chain.status(MessageTag::AdestIstbvdt));
    assert_eq!(Some(ConstraintStatus::Ok), report.adest.chain.status(MessageTag::AdestIstbat));
    assert_eq!(
        Some(ConstraintStatus::NotOk),
        report.adest.chain.status(MessageTag::AdestIvdtbat)
    );
}

#[test]
fn ordered_timestamps_are_coherent() {
    let report = run(
        SignatureBuilder::new()
            .timestamp(timestamp("content-1", TimestampKind::Content, utc(2020, 12, 1)))
            .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
            .timestamp(timestamp("vd-1", TimestampKind::ValidationData, utc(2021, 3, 1)))
            .timestamp(timestamp("archive-1", TimestampKind::Archive, utc(2022, 1, 1))),
    );

    assert!(report.adest.is_valid());
    assert_eq!(utc(2021, 1, 1), report.adest.best_signature_time);
}

#[test]
fn late_timestamp_violates_signing_time_delay() {
    let policy = ValidationPolicy::default().with_timestamp_delay(Duration::days(1));

    let report = run_with(
        SignatureBuilder::new().timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 6, 1))),
        policy,
    );

    assert_eq!(
        Some(ConstraintStatus::NotOk),
        report.adest.chain.status(MessageTag::AdestIstwd)
    );
    assert_eq!(
        Indication::Invalid(SubIndication::SigConstraintsFailure),
        report.adest.indication()
    );
}

#[test]
fn timestamp_within_delay_is_valid() {
    let policy = ValidationPolicy::default().with_timestamp_delay(Duration::days(1));

    let report = run_with(
        SignatureBuilder::new().timestamp(timestamp(
            "ts-1",
            TimestampKind::Signature,
            utc(2021, 1, 1) + Duration::hours(6),
        )),
        policy,
    );

    assert!(report.adest.is_valid());
}

#[test]
fn delay_past_the_end_of_time_is_always_met() {
    let policy =
        ValidationPolicy::default().with_timestamp_delay(Duration::seconds(100_000_000_000_000));

    let report = run_with(
        SignatureBuilder::new().timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 6, 1))),
        policy,
    );

    assert_eq!(
        Some(ConstraintStatus::Ok),
        report.adest.chain.status(MessageTag::AdestIstwd)
    );
    assert!(report.adest.is_valid());
}

#[test]
fn delay_requires_claimed_signing_time() {
    let policy = ValidationPolicy::default().with_timestamp_delay(Duration::days(1));

    let report = run_with(
        SignatureBuilder::new()
            .claimed_signing_time(None)
            .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1))),
        policy,
    );

    assert_eq!(
        Indication::Indeterminate(SubIndication::ClaimedSigningTimeAbsent),
        report.adest.indication()
    );
}

#[test]
fn failed_basic_validation_is_carried_unchanged() {
    let data = DiagnosticBuilder::standard()
        .signature(
            SignatureBuilder::new()
                .edit(|s| s.token.signature_intact = false)
                .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
                .build(),
        )
        .build();

    let report = validate(data, ValidationPolicy::default());
    let adest = &report.signatures[0].adest;

    assert_eq!(
        Indication::Invalid(SubIndication::SigCryptoFailure),
        adest.indication()
    );
    assert!(adest.timestamps.is_empty());
    assert_eq!(Some(ConstraintStatus::NotOk), adest.chain.status(MessageTag::AdestRobvpiic));
    assert_eq!(None, adest.chain.status(MessageTag::AdestItsp));
}

fn signature_timestamps(offsets: &[i64]) -> DiagnosticData {
    let mut builder = SignatureBuilder::new();
    for (i, days) in offsets.iter().enumerate() {
        builder = builder.timestamp(timestamp(
            &format!("ts-{i}"),
            TimestampKind::Signature,
            utc(2018, 1, 1) + Duration::days(*days),
        ));
    }
    DiagnosticBuilder::standard().signature(builder.build()).build()
}

fn find_timestamp<'a>(timestamps: &'a [TimestampData], id: &str) -> &'a TimestampData {
    timestamps.iter().find(|t| t.id() == id).unwrap()
}

proptest! {
    #[test]
    fn best_signature_time_only_moves_earlier(offsets in prop::collection::vec(0i64..3000, 1..8)) {
        let data = signature_timestamps(&offsets);
        let policy = ValidationPolicy::default();
        let ctx = ValidationContext::new(&data, &policy, now());
        let signature = &data.signatures[0];
        let timestamps = timestamp_validation::validate(&ctx, signature);
        let signature_bbb = bbb::validate(&ctx, BbbSubject::Signature(signature));

        let result = adest::validate(&ctx, signature, &signature_bbb.conclusion, None, &timestamps);

        prop_assert!(result.best_signature_time <= now());
        let accepted: Vec<_> = result
            .accepted_timestamps
            .iter()
            .map(|id| find_timestamp(&signature.timestamps, id).production_time)
            .collect();
        prop_assert!(accepted.windows(2).all(|w| w[1] < w[0]));
        let earliest_before_now = signature
            .timestamps
            .iter()
            .map(|t| t.production_time)
            .filter(|t| *t < now())
            .min()
            .unwrap_or(now());
        prop_assert_eq!(earliest_before_now, result.best_signature_time);
    }
}
