// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ades_validation::bbb::{self, BbbResult, BbbSubject, PendingProof};
use ades_validation::context::ValidationContext;
use ades_validation::diagnostic::{DiagnosticData, RevocationStatus, TimestampKind};
use ades_validation::policy::{ConstraintId, ValidationPolicy};
use ades_validation_chain::{ConstraintStatus, Indication, Level, MessageTag, SubIndication};
use ades_validation_test_utils::{
    certificate, crypto, good_revocation, now, revoked, timestamp, utc, DiagnosticBuilder,
    SignatureBuilder, ROOT, SIGNER, SIGNER_REVOCATION,
};
use chrono::Duration;

const CA: &str = "intermediate-ca";

fn signature_bbb(data: &DiagnosticData, policy: &ValidationPolicy) -> BbbResult {
    let ctx = ValidationContext::new(data, policy, now());
    bbb::validate(&ctx, BbbSubject::Signature(&data.signatures[0]))
}

fn with_signature(builder: SignatureBuilder) -> DiagnosticData {
    DiagnosticBuilder::standard().signature(builder.build()).build()
}

#[test]
fn valid_signature_runs_every_stage() {
    let data = with_signature(SignatureBuilder::new());

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Valid, result.indication());
    assert!(result.vci.is_some());
    assert!(result.cv.is_some());
    assert!(result.sav.is_some());
    assert!(result.xcv.is_some());
    assert_eq!(None, result.pending);
}

#[test]
fn unresolved_signing_certificate_stops_at_identification() {
    let data = with_signature(SignatureBuilder::new().edit(|s| s.token.signing_certificate = None));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::NoSigningCertificateFound),
        result.indication()
    );
    assert!(result.vci.is_none());
    assert!(result.xcv.is_none());
}

#[test]
fn digest_mismatch_is_hash_failure_and_skips_later_stages() {
    let data = with_signature(SignatureBuilder::new().edit(|s| s.token.reference_data_intact = false));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Invalid(SubIndication::HashFailure), result.indication());
    let cv = result.cv.as_ref().unwrap();
    assert_eq!(Some(ConstraintStatus::NotOk), cv.status(MessageTag::BbbCvIrdoi));
    assert_eq!(None, cv.status(MessageTag::BbbCvIsi));
    assert!(result.sav.is_none());
}

#[test]
fn missing_signed_data_is_indeterminate() {
    let data = with_signature(SignatureBuilder::new().edit(|s| s.token.reference_data_found = false));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::SignedDataNotFound),
        result.indication()
    );
}

#[test]
fn broken_signature_value_is_sig_crypto_failure() {
    let data = with_signature(SignatureBuilder::new().edit(|s| s.token.signature_intact = false));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Invalid(SubIndication::SigCryptoFailure), result.indication());
}

#[test]
fn short_key_fails_cryptographic_constraints() {
    let data = with_signature(SignatureBuilder::new().crypto(crypto("SHA256", "RSA", 512)));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailure),
        result.indication()
    );
    assert_eq!(None, result.pending);
}

#[test]
fn expired_digest_algorithm_is_pending_proof_of_existence() {
    let data = with_signature(SignatureBuilder::new().crypto(crypto("SHA1", "RSA", 2048)));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailureNoPoe),
        result.sav_indication().unwrap()
    );
    match result.pending.as_ref().unwrap() {
        PendingProof::Crypto {
            algorithm,
            expiration,
            ..
        } => {
            assert_eq!("SHA1", algorithm);
            assert!(*expiration < utc(2010, 1, 1));
        }
        other => panic!("unexpected pending proof {other:?}"),
    }
}

#[test]
fn untrusted_chain_has_no_certificate_chain() {
    let data = DiagnosticBuilder::standard()
        .edit_certificate(ROOT, |c| c.trusted = false)
        .signature(SignatureBuilder::new().build())
        .build();

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::NoCertificateChainFound),
        result.indication()
    );
}

#[test]
fn policy_trust_anchor_completes_the_chain() {
    let data = DiagnosticBuilder::standard()
        .edit_certificate(ROOT, |c| c.trusted = false)
        .signature(SignatureBuilder::new().build())
        .build();
    let mut policy = ValidationPolicy::default();
    policy.trusted_certificates.insert(ROOT.to_string());

    let result = signature_bbb(&data, &policy);

    assert_eq!(Indication::Valid, result.indication());
}

#[test]
fn missing_revocation_data_is_try_later() {
    let mut data = with_signature(SignatureBuilder::new());
    data.revocations.retain(|r| r.certificate_id != SIGNER);

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Indeterminate(SubIndication::TryLater), result.indication());
    assert_eq!(
        Some(ConstraintStatus::NotOk),
        result.xcv.as_ref().unwrap().status(MessageTag::BbbXcvIrdpfc)
    );
}

#[test]
fn stale_revocation_data_is_try_later_when_freshness_is_configured() {
    let data = with_signature(SignatureBuilder::new());
    let policy = ValidationPolicy::default().with_max_revocation_freshness(Duration::days(30));

    let result = signature_bbb(&data, &policy);

    assert_eq!(Indication::Indeterminate(SubIndication::TryLater), result.indication());
    assert_eq!(
        Some(ConstraintStatus::NotOk),
        result.xcv.as_ref().unwrap().status(MessageTag::BbbXcvIrif)
    );
}

#[test]
fn certificate_on_hold_is_try_later() {
    let mut on_hold = good_revocation(SIGNER_REVOCATION, SIGNER, utc(2023, 1, 1));
    on_hold.status = RevocationStatus::OnHold;
    let data = DiagnosticBuilder::standard()
        .revocation(on_hold)
        .signature(SignatureBuilder::new().build())
        .build();

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Indeterminate(SubIndication::TryLater), result.indication());
}

#[test]
fn revoked_signing_certificate_carries_revocation_time() {
    let data = DiagnosticBuilder::standard()
        .revocation(revoked("signer-crl", SIGNER, utc(2022, 7, 1), utc(2022, 6, 1)))
        .signature(SignatureBuilder::new().build())
        .build();

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::RevokedNoPoe),
        result.indication()
    );
    assert_eq!(
        Some(&PendingProof::Revoked {
            certificate_id: SIGNER.to_string(),
            revocation_time: utc(2022, 6, 1),
        }),
        result.pending.as_ref()
    );
    let record = result
        .xcv
        .as_ref()
        .unwrap()
        .constraints
        .iter()
        .find(|c| c.tag == MessageTag::BbbXcvIscr)
        .unwrap();
    assert_eq!(
        Some(&"2022-06-01T00:00:00+00:00".to_string()),
        record.attributes.get("RevocationTime")
    );
}

#[test]
fn revoked_intermediate_is_revoked_ca_no_poe() {
    let data = DiagnosticBuilder::standard()
        .certificate(certificate(CA, utc(2015, 1, 1), utc(2035, 1, 1)))
        .revocation(revoked("ca-crl", CA, utc(2022, 7, 1), utc(2022, 6, 1)))
        .signature(SignatureBuilder::new().signer(SIGNER, &[SIGNER, CA, ROOT]).build())
        .build();

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::RevokedCaNoPoe),
        result.indication()
    );
    assert_eq!(
        Some(&PendingProof::RevokedCa {
            certificate_id: CA.to_string(),
            revocation_time: utc(2022, 6, 1),
        }),
        result.pending.as_ref()
    );
}

#[test]
fn expired_intermediate_is_out_of_bounds() {
    let data = DiagnosticBuilder::standard()
        .certificate(certificate(CA, utc(2015, 1, 1), utc(2020, 1, 1)))
        .revocation(good_revocation("ca-crl", CA, utc(2019, 1, 1)))
        .signature(SignatureBuilder::new().signer(SIGNER, &[SIGNER, CA, ROOT]).build())
        .build();

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(
        Indication::Indeterminate(SubIndication::OutOfBoundsNoPoe),
        result.indication()
    );
    assert_eq!(
        Some(ConstraintStatus::NotOk),
        result.xcv.as_ref().unwrap().status(MessageTag::BbbXcvIctivrca)
    );
}

#[test]
fn warn_level_records_a_warning_and_continues() {
    let data = with_signature(SignatureBuilder::new().edit(|s| {
        if let Some(signer) = s.token.signing_certificate.as_mut() {
            signer.issuer_serial_match = false;
        }
    }));

    let result = signature_bbb(&data, &ValidationPolicy::default());

    assert_eq!(Indication::Valid, result.indication());
    assert_eq!(
        Some(ConstraintStatus::Warning),
        result.isc.status(MessageTag::BbbIcsAidnasne)
    );
    assert_eq!(1, result.isc.conclusion.warnings.len());
}

#[test]
fn lowered_revocation_level_lets_revoked_certificate_pass() {
    let data = DiagnosticBuilder::standard()
        .revocation(revoked("signer-crl", SIGNER, utc(2022, 7, 1), utc(2022, 6, 1)))
        .signature(SignatureBuilder::new().build())
        .build();
    let policy = ValidationPolicy::default()
        .with_level(ConstraintId::SigningCertificateNotRevoked, Level::Warn);

    let result = signature_bbb(&data, &policy);

    assert_eq!(Indication::Valid, result.indication());
    assert_eq!(
        Some(ConstraintStatus::Warning),
        result.xcv.as_ref().unwrap().status(MessageTag::BbbXcvIscr)
    );
}

#[test]
fn timestamp_tokens_skip_signature_only_checks() {
    let mut ts = timestamp("ts-1", TimestampKind::Signature, utc(2021, 1, 1));
    if let Some(signer) = ts.token.signing_certificate.as_mut() {
        signer.attribute_present = false;
    }
    let data = with_signature(SignatureBuilder::new().timestamp(ts));
    let policy = ValidationPolicy::default();
    let ctx = ValidationContext::new(&data, &policy, now());

    let result = bbb::validate(&ctx, BbbSubject::Timestamp(&data.signatures[0].timestamps[0]));

    assert_eq!(Indication::Valid, result.indication());
    assert_eq!(
        Some(ConstraintStatus::Ignored),
        result.isc.status(MessageTag::BbbIcsIsascp)
    );
    assert!(result.vci.as_ref().unwrap().constraints.is_empty());
    assert_eq!(None, result.sav.as_ref().unwrap().status(MessageTag::BbbSavIsqpstp));
}
