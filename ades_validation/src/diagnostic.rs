// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Already-extracted facts about the signatures under validation.
//!
//! Parsing containers and verifying digests or signature values happens elsewhere; this model
//! only carries the outcome of those operations together with the identifiers and times the
//! validation processes reason about.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Algorithms used to produce a signature value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoInfo {
    pub digest_algorithm: String,
    pub encryption_algorithm: String,
    pub key_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    pub id: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Trust anchor flag set by the trust-list collaborator.
    #[serde(default)]
    pub trusted: bool,
    pub signature_intact: bool,
    pub crypto: CryptoInfo,
}

impl CertificateData {
    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        self.not_before <= time && time <= self.not_after
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RevocationStatus {
    Good,
    Revoked { time: DateTime<Utc> },
    OnHold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationData {
    pub id: String,
    /// Certificate whose status this entry reports.
    pub certificate_id: String,
    pub issuing_time: DateTime<Utc>,
    #[serde(default)]
    pub next_update: Option<DateTime<Utc>>,
    pub status: RevocationStatus,
    pub signature_intact: bool,
    pub crypto: CryptoInfo,
}

impl RevocationData {
    pub fn revocation_time(&self) -> Option<DateTime<Utc>> {
        match self.status {
            RevocationStatus::Revoked { time } => Some(time),
            _ => None,
        }
    }
}

/// Reference from a token to the certificate it claims as signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCertificateRef {
    pub certificate_id: String,
    /// The signed 'signing-certificate' attribute is present.
    pub attribute_present: bool,
    pub digest_match: bool,
    pub issuer_serial_match: bool,
}

/// Facts shared by signatures and timestamp tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub id: String,
    #[serde(default)]
    pub signing_certificate: Option<SigningCertificateRef>,
    /// Signing certificate first, ending with the certificate closest to the anchor.
    #[serde(default)]
    pub certificate_chain: Vec<String>,
    /// Signed data objects (signatures) or message imprint (timestamps) found.
    pub reference_data_found: bool,
    pub reference_data_intact: bool,
    pub signature_intact: bool,
    pub crypto: CryptoInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    /// Computed over the signed content before signing.
    Content,
    /// Computed over the signature value.
    Signature,
    /// Computed over the signature value and the validation data references.
    ValidationData,
    /// Computed over the validation data references only.
    RefsOnly,
    Archive,
}

impl TimestampKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampKind::Content => "content",
            TimestampKind::Signature => "signature",
            TimestampKind::ValidationData => "validation_data",
            TimestampKind::RefsOnly => "refs_only",
            TimestampKind::Archive => "archive",
        }
    }
}

/// A certificate or revocation entry covered by digest in a timestamped reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampReference {
    pub object_id: String,
    pub digest_algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampData {
    pub token: TokenData,
    pub kind: TimestampKind,
    pub production_time: DateTime<Utc>,
    pub message_imprint_found: bool,
    pub message_imprint_intact: bool,
    #[serde(default)]
    pub references: Vec<TimestampReference>,
}

impl TimestampData {
    pub fn id(&self) -> &str {
        &self.token.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePolicyRef {
    pub identified: bool,
    pub hash_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
    pub token: TokenData,
    #[serde(default)]
    pub claimed_signing_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_data_objects: Vec<String>,
    #[serde(default)]
    pub content_type_present: bool,
    #[serde(default)]
    pub signature_policy: Option<SignaturePolicyRef>,
    /// Certificates embedded in the signature.
    #[serde(default)]
    pub certificate_ids: Vec<String>,
    /// Revocation entries embedded in the signature.
    #[serde(default)]
    pub revocation_ids: Vec<String>,
    /// Timestamps in attribute order.
    #[serde(default)]
    pub timestamps: Vec<TimestampData>,
}

impl SignatureData {
    pub fn id(&self) -> &str {
        &self.token.id
    }

    pub fn signing_time_present(&self) -> bool {
        self.claimed_signing_time.is_some()
    }

    pub fn timestamps_of(&self, kind: TimestampKind) -> impl Iterator<Item = &TimestampData> {
        self.timestamps.iter().filter(move |t| t.kind == kind)
    }

    pub fn has_content_timestamp(&self) -> bool {
        self.timestamps_of(TimestampKind::Content).next().is_some()
    }

    pub fn timestamp(&self, id: &str) -> Option<&TimestampData> {
        self.timestamps.iter().find(|t| t.id() == id)
    }
}

/// Complete input of one validation run.
///
/// Certificates and revocation entries live in pools shared by every signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticData {
    #[serde(default)]
    pub certificates: Vec<CertificateData>,
    #[serde(default)]
    pub revocations: Vec<RevocationData>,
    #[serde(default)]
    pub signatures: Vec<SignatureData>,
}

impl DiagnosticData {
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::Decode(e.to_string()))
    }

    pub fn certificate(&self, id: &str) -> Option<&CertificateData> {
        self.certificates.iter().find(|c| c.id == id)
    }

    pub fn revocation(&self, id: &str) -> Option<&RevocationData> {
        self.revocations.iter().find(|r| r.id == id)
    }

    pub fn revocations_for<'s, 'c>(
        &'s self,
        certificate_id: &'c str,
    ) -> impl Iterator<Item = &'s RevocationData> + 'c
    where
        's: 'c,
    {
        self.revocations
            .iter()
            .filter(move |r| r.certificate_id == certificate_id)
    }

    /// Checks that every identifier referenced by a signature or timestamp resolves.
    pub fn check_references(&self) -> Result<(), ValidationError> {
        let certificates: BTreeSet<&str> = self.certificates.iter().map(|c| c.id.as_str()).collect();
        let revocations: BTreeSet<&str> = self.revocations.iter().map(|r| r.id.as_str()).collect();

        for revocation in &self.revocations {
            if !certificates.contains(revocation.certificate_id.as_str()) {
                return Err(ValidationError::UnknownCertificate {
                    referrer: revocation.id.clone(),
                    certificate_id: revocation.certificate_id.clone(),
                });
            }
        }

        let check_token = |token: &TokenData| -> Result<(), ValidationError> {
            let signer = token.signing_certificate.iter().map(|s| &s.certificate_id);
            for id in signer.chain(token.certificate_chain.iter()) {
                if !certificates.contains(id.as_str()) {
                    return Err(ValidationError::UnknownCertificate {
                        referrer: token.id.clone(),
                        certificate_id: id.clone(),
                    });
                }
            }
            Ok(())
        };

        for signature in &self.signatures {
            check_token(&signature.token)?;
            for id in &signature.certificate_ids {
                if !certificates.contains(id.as_str()) {
                    return Err(ValidationError::UnknownCertificate {
                        referrer: signature.id().to_string(),
                        certificate_id: id.clone(),
                    });
                }
            }
            for id in &signature.revocation_ids {
                if !revocations.contains(id.as_str()) {
                    return Err(ValidationError::UnknownRevocation {
                        referrer: signature.id().to_string(),
                        revocation_id: id.clone(),
                    });
                }
            }
            for timestamp in &signature.timestamps {
                check_token(&timestamp.token)?;
                for reference in &timestamp.references {
                    let id = reference.object_id.as_str();
                    if !certificates.contains(id) && !revocations.contains(id) {
                        return Err(ValidationError::UnknownReference {
                            referrer: timestamp.id().to_string(),
                            object_id: reference.object_id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
