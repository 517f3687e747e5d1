// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test-only builders for validation scenarios.
//!
//! [`DiagnosticBuilder::standard`] sets up a small PKI: a trusted root, a signer and a
//! timestamping authority, each with good revocation data. Signatures and timestamps built
//! here pass every cryptographic check unless a test says otherwise.

use ades_validation::diagnostic::{
    CertificateData, CryptoInfo, DiagnosticData, RevocationData, RevocationStatus,
    SignatureData, SigningCertificateRef, TimestampData, TimestampKind, TimestampReference,
    TokenData,
};
use ades_validation::policy::ValidationPolicy;
use ades_validation::report::ValidationReport;
use ades_validation::ValidationProcess;
use chrono::{DateTime, TimeZone, Utc};

pub const ROOT: &str = "root-ca";
pub const SIGNER: &str = "signer";
pub const TSA: &str = "tsa";
pub const SIGNER_REVOCATION: &str = "signer-ocsp";
pub const TSA_REVOCATION: &str = "tsa-ocsp";
pub const SIGNATURE: &str = "signature-1";
pub const DOCUMENT: &str = "document";

/// Midnight UTC of the given day.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid calendar date")
}

/// Default validation time of the fixtures.
pub fn now() -> DateTime<Utc> {
    utc(2024, 1, 1)
}

pub fn crypto(digest_algorithm: &str, encryption_algorithm: &str, key_length: u32) -> CryptoInfo {
    CryptoInfo {
        digest_algorithm: digest_algorithm.to_string(),
        encryption_algorithm: encryption_algorithm.to_string(),
        key_length,
    }
}

pub fn sha256_rsa() -> CryptoInfo {
    crypto("SHA256", "RSA", 2048)
}

pub fn certificate(id: &str, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> CertificateData {
    CertificateData {
        id: id.to_string(),
        not_before,
        not_after,
        trusted: false,
        signature_intact: true,
        crypto: sha256_rsa(),
    }
}

pub fn good_revocation(id: &str, certificate_id: &str, issuing_time: DateTime<Utc>) -> RevocationData {
    RevocationData {
        id: id.to_string(),
        certificate_id: certificate_id.to_string(),
        issuing_time,
        next_update: None,
        status: RevocationStatus::Good,
        signature_intact: true,
        crypto: sha256_rsa(),
    }
}

pub fn revoked(
    id: &str,
    certificate_id: &str,
    issuing_time: DateTime<Utc>,
    revocation_time: DateTime<Utc>,
) -> RevocationData {
    RevocationData {
        status: RevocationStatus::Revoked {
            time: revocation_time,
        },
        ..good_revocation(id, certificate_id, issuing_time)
    }
}

/// A token signed by `signer` whose chain is `chain`, passing every check.
pub fn token(id: &str, signer: &str, chain: &[&str]) -> TokenData {
    TokenData {
        id: id.to_string(),
        signing_certificate: Some(SigningCertificateRef {
            certificate_id: signer.to_string(),
            attribute_present: true,
            digest_match: true,
            issuer_serial_match: true,
        }),
        certificate_chain: chain.iter().map(|s| s.to_string()).collect(),
        reference_data_found: true,
        reference_data_intact: true,
        signature_intact: true,
        crypto: sha256_rsa(),
    }
}

/// A timestamp issued by [`TSA`].
pub fn timestamp(id: &str, kind: TimestampKind, production_time: DateTime<Utc>) -> TimestampData {
    TimestampData {
        token: token(id, TSA, &[TSA, ROOT]),
        kind,
        production_time,
        message_imprint_found: true,
        message_imprint_intact: true,
        references: Vec::new(),
    }
}

pub fn reference(object_id: &str, digest_algorithm: &str) -> TimestampReference {
    TimestampReference {
        object_id: object_id.to_string(),
        digest_algorithm: digest_algorithm.to_string(),
    }
}

/// Fluent construction of one signature.
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    data: SignatureData,
}

impl SignatureBuilder {
    /// Signature [`SIGNATURE`] over [`DOCUMENT`] by [`SIGNER`], claimed at 2021-01-01.
    pub fn new() -> Self {
        Self::with_id(SIGNATURE)
    }

    pub fn with_id(id: &str) -> Self {
        Self {
            data: SignatureData {
                token: token(id, SIGNER, &[SIGNER, ROOT]),
                claimed_signing_time: Some(utc(2021, 1, 1)),
                signed_data_objects: vec![DOCUMENT.to_string()],
                content_type_present: true,
                signature_policy: None,
                certificate_ids: vec![SIGNER.to_string(), ROOT.to_string()],
                revocation_ids: Vec::new(),
                timestamps: Vec::new(),
            },
        }
    }

    pub fn timestamp(mut self, timestamp: TimestampData) -> Self {
        self.data.timestamps.push(timestamp);
        self
    }

    pub fn claimed_signing_time(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.data.claimed_signing_time = time;
        self
    }

    pub fn signer(mut self, signer: &str, chain: &[&str]) -> Self {
        let id = self.data.token.id.clone();
        self.data.token = token(&id, signer, chain);
        self
    }

    pub fn crypto(mut self, crypto: CryptoInfo) -> Self {
        self.data.token.crypto = crypto;
        self
    }

    pub fn edit(mut self, edit: impl FnOnce(&mut SignatureData)) -> Self {
        edit(&mut self.data);
        self
    }

    pub fn build(self) -> SignatureData {
        self.data
    }
}

impl Default for SignatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent construction of a complete diagnostic data set.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBuilder {
    data: DiagnosticData,
}

impl DiagnosticBuilder {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trusted root, signer valid 2019–2030 and TSA valid 2015–2035, both with good
    /// revocation data issued 2019-06-01.
    pub fn standard() -> Self {
        let mut root = certificate(ROOT, utc(2010, 1, 1), utc(2040, 1, 1));
        root.trusted = true;
        Self::empty()
            .certificate(root)
            .certificate(certificate(SIGNER, utc(2019, 1, 1), utc(2030, 1, 1)))
            .certificate(certificate(TSA, utc(2015, 1, 1), utc(2035, 1, 1)))
            .revocation(good_revocation(SIGNER_REVOCATION, SIGNER, utc(2019, 6, 1)))
            .revocation(good_revocation(TSA_REVOCATION, TSA, utc(2019, 6, 1)))
    }

    /// Adds `certificate`, replacing any certificate with the same id.
    pub fn certificate(mut self, certificate: CertificateData) -> Self {
        self.data.certificates.retain(|c| c.id != certificate.id);
        self.data.certificates.push(certificate);
        self
    }

    pub fn edit_certificate(mut self, id: &str, edit: impl FnOnce(&mut CertificateData)) -> Self {
        if let Some(certificate) = self.data.certificates.iter_mut().find(|c| c.id == id) {
            edit(certificate);
        }
        self
    }

    /// Adds `revocation`, replacing any entry with the same id.
    pub fn revocation(mut self, revocation: RevocationData) -> Self {
        self.data.revocations.retain(|r| r.id != revocation.id);
        self.data.revocations.push(revocation);
        self
    }

    pub fn signature(mut self, signature: SignatureData) -> Self {
        self.data.signatures.push(signature);
        self
    }

    pub fn build(self) -> DiagnosticData {
        self.data
    }
}

pub fn process(
    data: DiagnosticData,
    policy: ValidationPolicy,
    validation_time: DateTime<Utc>,
) -> ValidationProcess {
    ValidationProcess::builder()
        .diagnostic_data(data)
        .policy(policy)
        .validation_time(validation_time)
        .build()
        .expect("complete validation inputs")
}

/// Runs a full validation at [`now`].
pub fn validate(data: DiagnosticData, policy: ValidationPolicy) -> ValidationReport {
    process(data, policy, now()).validate()
}
