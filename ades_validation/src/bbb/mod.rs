// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Basic building blocks run for every signature and timestamp token.
//!
//! The five stages run in a fixed order and the first non-valid stage terminates the
//! pipeline:
//! 1) identification of the signing certificate (ISC)
//! 2) validation context initialisation (VCI)
//! 3) cryptographic verification (CV), ahead of chain work so later passes can skip it
//! 4) signature acceptance validation (SAV)
//! 5) X.509 certificate validation (XCV) at the validation time

mod cv;
mod isc;
mod sav;
mod vci;
mod xcv;

use crate::context::ValidationContext;
use crate::diagnostic::{SignatureData, TimestampData, TokenData};
use crate::policy::TokenContext;
use ades_validation_chain::{ChainResult, Conclusion, Indication, SubIndication};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const CHAIN_NAME_ISC: &str = "IdentificationOfTheSigningCertificate";
pub const CHAIN_NAME_VCI: &str = "ValidationContextInitialisation";
pub const CHAIN_NAME_CV: &str = "CryptographicVerification";
pub const CHAIN_NAME_SAV: &str = "SignatureAcceptanceValidation";
pub const CHAIN_NAME_XCV: &str = "X509CertificateValidation";

pub(crate) const ATTRIBUTE_CERTIFICATE: &str = "Certificate";
pub(crate) const ATTRIBUTE_ALGORITHM: &str = "Algorithm";
pub(crate) const ATTRIBUTE_ALGORITHM_EXPIRATION: &str = "AlgorithmExpiration";
pub(crate) const ATTRIBUTE_REVOCATION: &str = "Revocation";
pub(crate) const ATTRIBUTE_REVOCATION_TIME: &str = "RevocationTime";
pub(crate) const ATTRIBUTE_NOT_BEFORE: &str = "NotBefore";
pub(crate) const ATTRIBUTE_NOT_AFTER: &str = "NotAfter";

/// The token a building-blocks run is evaluated for.
#[derive(Debug, Clone, Copy)]
pub enum BbbSubject<'a> {
    Signature(&'a SignatureData),
    Timestamp(&'a TimestampData),
}

impl<'a> BbbSubject<'a> {
    pub fn token(&self) -> &'a TokenData {
        match self {
            BbbSubject::Signature(s) => &s.token,
            BbbSubject::Timestamp(t) => &t.token,
        }
    }

    pub fn context(&self) -> TokenContext {
        match self {
            BbbSubject::Signature(_) => TokenContext::Signature,
            BbbSubject::Timestamp(_) => TokenContext::Timestamp,
        }
    }
}

/// What a later proof of existence must show to resolve a `*_NO_POE` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingProof {
    /// An algorithm used by `object_id` expired at `expiration`.
    Crypto {
        object_id: String,
        algorithm: String,
        expiration: DateTime<Utc>,
    },
    Revoked {
        certificate_id: String,
        revocation_time: DateTime<Utc>,
    },
    RevokedCa {
        certificate_id: String,
        revocation_time: DateTime<Utc>,
    },
    OutOfBounds {
        certificate_id: String,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
    },
}

/// Output of the building blocks for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BbbResult {
    pub token_id: String,
    pub isc: ChainResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vci: Option<ChainResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<ChainResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sav: Option<ChainResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xcv: Option<ChainResult>,
    pub conclusion: Conclusion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingProof>,
}

impl BbbResult {
    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn is_valid(&self) -> bool {
        self.conclusion.is_valid()
    }

    /// Indication of the signature acceptance stage, when it ran.
    pub fn sav_indication(&self) -> Option<Indication> {
        self.sav.as_ref().map(ChainResult::indication)
    }

    /// Indication of the certificate validation stage, when it ran.
    pub fn xcv_indication(&self) -> Option<Indication> {
        self.xcv.as_ref().map(ChainResult::indication)
    }
}

/// Runs the building blocks for `subject` at the context's validation time.
pub fn validate(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> BbbResult {
    let token = subject.token();
    let mut result = BbbResult {
        token_id: token.id.clone(),
        isc: isc::execute(ctx, subject),
        vci: None,
        cv: None,
        sav: None,
        xcv: None,
        conclusion: Conclusion::valid(),
        pending: None,
    };

    let stages: [(fn(&ValidationContext<'_>, BbbSubject<'_>) -> ChainResult, Stage); 4] = [
        (vci::execute, Stage::Vci),
        (cv::execute, Stage::Cv),
        (sav::execute, Stage::Sav),
        (xcv::execute, Stage::Xcv),
    ];

    let mut last = result.isc.conclusion.clone();
    for (execute, stage) in stages {
        if !last.is_valid() {
            break;
        }
        let chain = execute(ctx, subject);
        last = chain.conclusion.clone();
        match stage {
            Stage::Vci => result.vci = Some(chain),
            Stage::Cv => result.cv = Some(chain),
            Stage::Sav => result.sav = Some(chain),
            Stage::Xcv => result.xcv = Some(chain),
        }
    }

    result.pending = pending_proof(ctx, subject, last.indication);
    result.conclusion = last;
    debug!(token = %result.token_id, indication = %result.conclusion.indication, "basic building blocks done");
    result
}

#[derive(Clone, Copy)]
enum Stage {
    Vci,
    Cv,
    Sav,
    Xcv,
}

fn pending_proof(
    ctx: &ValidationContext<'_>,
    subject: BbbSubject<'_>,
    indication: Indication,
) -> Option<PendingProof> {
    let Indication::Indeterminate(sub) = indication else {
        return None;
    };
    let token = subject.token();
    let path = ctx.certificate_path(token);
    let time = ctx.validation_time;

    match sub {
        SubIndication::CryptoConstraintsFailureNoPoe => ctx
            .policy
            .cryptographic
            .expiration_of(&token.crypto)
            .filter(|e| e.expiration <= time)
            .map(|e| (token.id.clone(), e))
            .or_else(|| xcv::expired_chain_algorithm(ctx, &path))
            .map(|(object_id, e)| PendingProof::Crypto {
                object_id,
                algorithm: e.algorithm,
                expiration: e.expiration,
            }),
        SubIndication::RevokedNoPoe => {
            let signing = ctx.signing_certificate(token)?;
            let revocation_time = ctx.latest_revocation(&signing.id, time)?.revocation_time()?;
            Some(PendingProof::Revoked {
                certificate_id: signing.id.clone(),
                revocation_time,
            })
        }
        SubIndication::RevokedCaNoPoe => {
            xcv::revoked_ca(ctx, &path).map(|(ca, revocation_time)| PendingProof::RevokedCa {
                certificate_id: ca.id.clone(),
                revocation_time,
            })
        }
        SubIndication::OutOfBoundsNoPoe => ctx
            .signing_certificate(token)
            .filter(|c| !c.is_valid_at(time))
            .or_else(|| xcv::out_of_bounds_ca(ctx, &path))
            .map(|c| PendingProof::OutOfBounds {
                certificate_id: c.id.clone(),
                not_before: c.not_before,
                not_after: c.not_after,
            }),
        _ => None,
    }
}
