// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::diagnostic::{CertificateData, DiagnosticData, RevocationData, TokenData};
use crate::policy::{ConstraintId, TokenContext, ValidationPolicy};
use ades_validation_chain::Level;
use chrono::{DateTime, Utc};

/// Read-only inputs shared by every process of one validation run.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub diagnostic: &'a DiagnosticData,
    pub policy: &'a ValidationPolicy,
    pub validation_time: DateTime<Utc>,
}

/// Certificates of a token from its signer toward the anchor.
#[derive(Debug, Clone)]
pub struct CertificatePath<'a> {
    /// Truncated after the first trust anchor when one is present.
    pub certificates: Vec<&'a CertificateData>,
    pub anchored: bool,
}

impl<'a> CertificatePath<'a> {
    pub fn signing_certificate(&self) -> Option<&'a CertificateData> {
        self.certificates.first().copied()
    }
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        diagnostic: &'a DiagnosticData,
        policy: &'a ValidationPolicy,
        validation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            diagnostic,
            policy,
            validation_time,
        }
    }

    pub fn level(&self, id: ConstraintId, context: TokenContext) -> Level {
        self.policy.level(id, context)
    }

    pub fn certificate(&self, id: &str) -> Option<&'a CertificateData> {
        self.diagnostic.certificate(id)
    }

    pub fn is_trust_anchor(&self, certificate: &CertificateData) -> bool {
        self.policy.is_trust_anchor(certificate)
    }

    /// The certificate referenced by the token's signing-certificate reference.
    pub fn signing_certificate(&self, token: &TokenData) -> Option<&'a CertificateData> {
        token
            .signing_certificate
            .as_ref()
            .and_then(|r| self.certificate(&r.certificate_id))
    }

    pub fn certificate_path(&self, token: &TokenData) -> CertificatePath<'a> {
        let mut certificates = Vec::with_capacity(token.certificate_chain.len());
        let mut anchored = false;
        for id in &token.certificate_chain {
            let Some(certificate) = self.certificate(id) else {
                continue;
            };
            certificates.push(certificate);
            if self.is_trust_anchor(certificate) {
                anchored = true;
                break;
            }
        }
        CertificatePath {
            certificates,
            anchored,
        }
    }

    /// Most recently issued revocation entry for `certificate_id` not issued after `at`.
    pub fn latest_revocation(
        &self,
        certificate_id: &str,
        at: DateTime<Utc>,
    ) -> Option<&'a RevocationData> {
        self.diagnostic
            .revocations_for(certificate_id)
            .filter(|r| r.issuing_time <= at)
            .max_by(|a, b| a.issuing_time.cmp(&b.issuing_time).then_with(|| b.id.cmp(&a.id)))
    }
}
