// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::diagnostic::{DiagnosticData, TimestampKind};
use ades_validation::policy::{ConstraintId, ValidationPolicy};
use ades_validation::{ValidationError, ValidationProcess};
use ades_validation_chain::{Indication, Level, SubIndication};
use ades_validation_test_utils::{
    now, process, reference, revoked, timestamp, utc, DiagnosticBuilder, SignatureBuilder,
    SIGNATURE, SIGNER,
};

fn sample() -> DiagnosticData {
    DiagnosticBuilder::standard()
        .revocation(revoked("signer-crl", SIGNER, utc(2022, 7, 1), utc(2022, 6, 1)))
        .signature(
            SignatureBuilder::new()
                .timestamp(timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1)))
                .timestamp(timestamp("archive-1", TimestampKind::Archive, utc(2022, 1, 1)))
                .build(),
        )
        .signature(SignatureBuilder::with_id("signature-2").build())
        .build()
}

#[test]
fn missing_inputs_are_reported_in_order() {
    let no_data = ValidationProcess::builder()
        .policy(ValidationPolicy::default())
        .validation_time(now())
        .build()
        .unwrap_err();
    let no_policy = ValidationProcess::builder()
        .diagnostic_data(sample())
        .validation_time(now())
        .build()
        .unwrap_err();
    let no_time = ValidationProcess::builder()
        .diagnostic_data(sample())
        .policy(ValidationPolicy::default())
        .build()
        .unwrap_err();

    assert!(matches!(no_data, ValidationError::MissingInput("diagnostic data")));
    assert!(matches!(no_policy, ValidationError::MissingInput("validation policy")));
    assert!(matches!(no_time, ValidationError::MissingInput("validation time")));
    assert_eq!("missing mandatory input: validation time", no_time.to_string());
}

#[test]
fn dangling_chain_certificate_is_rejected() {
    let data = DiagnosticBuilder::standard()
        .signature(
            SignatureBuilder::new()
                .signer(SIGNER, &[SIGNER, "missing-ca"])
                .build(),
        )
        .build();

    let error = ValidationProcess::builder()
        .diagnostic_data(data)
        .policy(ValidationPolicy::default())
        .validation_time(now())
        .build()
        .unwrap_err();

    match error {
        ValidationError::UnknownCertificate {
            referrer,
            certificate_id,
        } => {
            assert_eq!(SIGNATURE, referrer);
            assert_eq!("missing-ca", certificate_id);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn dangling_timestamp_reference_is_rejected() {
    let mut refs = timestamp("refs-1", TimestampKind::RefsOnly, utc(2021, 1, 1));
    refs.references = vec![reference("unknown-crl", "SHA256")];
    let data = DiagnosticBuilder::standard()
        .signature(SignatureBuilder::new().timestamp(refs).build())
        .build();

    let error = ValidationProcess::builder()
        .diagnostic_data(data)
        .policy(ValidationPolicy::default())
        .validation_time(now())
        .build()
        .unwrap_err();

    assert!(matches!(error, ValidationError::UnknownReference { .. }));
}

#[test]
fn malformed_diagnostic_data_is_a_decode_error() {
    let error = DiagnosticData::from_json("{ \"signatures\": 3 }").unwrap_err();

    assert!(matches!(error, ValidationError::Decode(_)));
}

#[test]
fn diagnostic_data_round_trips_through_json() {
    let data = sample();
    let json = serde_json::to_string(&data).unwrap();

    assert_eq!(data, DiagnosticData::from_json(&json).unwrap());
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let validation = process(sample(), ValidationPolicy::default(), now());

    let first = validation.validate().to_json().unwrap();
    let second = validation.validate().to_json().unwrap();

    assert_eq!(first, second);
}

#[test]
fn signatures_are_reported_in_input_order() {
    let report = process(sample(), ValidationPolicy::default(), now()).validate();

    let ids: Vec<&str> = report
        .signatures
        .iter()
        .map(|s| s.signature_id.as_str())
        .collect();
    assert_eq!(vec![SIGNATURE, "signature-2"], ids);
    assert_eq!(now(), report.validation_time);
    assert_eq!("default", report.policy_name);
    assert!(report.signature("signature-3").is_none());
}

#[test]
fn policy_can_be_adjusted_after_construction() {
    let validation = process(sample(), ValidationPolicy::default(), now())
        .with_policy(|policy| policy.name = "adjusted".to_string());

    let report = validation.validate();

    assert_eq!("adjusted", report.policy_name);
}

#[test]
fn report_serializes_the_full_result_tree() {
    let policy = ValidationPolicy::default().with_level(ConstraintId::LtvAttributes, Level::Fail);
    let report = process(sample(), policy, now()).validate();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!("2024-01-01T00:00:00Z", json["validation_time"]);
    let signature = &json["signatures"][0];
    assert_eq!(SIGNATURE, signature["signature_id"]);
    for section in [
        "basic_building_blocks",
        "basic_validation",
        "timestamps",
        "adest",
        "long_term",
        "conclusion",
    ] {
        assert!(!signature[section].is_null(), "{section}");
    }
    assert!(json["proof_of_existence"].as_array().unwrap().len() > 1);
    assert_eq!(
        Indication::Valid,
        report.signature(SIGNATURE).unwrap().indication()
    );
    assert_eq!(
        Indication::Indeterminate(SubIndication::NoTimestamp),
        report.signature("signature-2").unwrap().indication()
    );
}

#[test]
fn timestamp_reports_are_reachable_by_id() {
    let report = process(sample(), ValidationPolicy::default(), now()).validate();
    let signature = report.signature(SIGNATURE).unwrap();

    assert_eq!(2, signature.timestamps.len());
    assert!(signature.timestamp("archive-1").is_some());
    assert!(signature.timestamp("content-9").is_none());
}
