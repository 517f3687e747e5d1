// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Refining reason attached to a non-valid [`Indication`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubIndication {
    NoSigningCertificateFound,
    FormatFailure,
    PolicyProcessingError,
    SignedDataNotFound,
    HashFailure,
    SigCryptoFailure,
    SigConstraintsFailure,
    CertificateChainGeneralFailure,
    CryptoConstraintsFailure,
    CryptoConstraintsFailureNoPoe,
    Expired,
    NotYetValid,
    Revoked,
    RevokedNoPoe,
    RevokedCaNoPoe,
    OutOfBoundsNoPoe,
    NoCertificateChainFound,
    TryLater,
    NoPoe,
    TimestampOrderFailure,
    NoTimestamp,
    NoValidTimestamp,
    ClaimedSigningTimeAbsent,
}

impl SubIndication {
    /// Stable wire name (e.g. `REVOKED_NO_POE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SubIndication::NoSigningCertificateFound => "NO_SIGNING_CERTIFICATE_FOUND",
            SubIndication::FormatFailure => "FORMAT_FAILURE",
            SubIndication::PolicyProcessingError => "POLICY_PROCESSING_ERROR",
            SubIndication::SignedDataNotFound => "SIGNED_DATA_NOT_FOUND",
            SubIndication::HashFailure => "HASH_FAILURE",
            SubIndication::SigCryptoFailure => "SIG_CRYPTO_FAILURE",
            SubIndication::SigConstraintsFailure => "SIG_CONSTRAINTS_FAILURE",
            SubIndication::CertificateChainGeneralFailure => "CERTIFICATE_CHAIN_GENERAL_FAILURE",
            SubIndication::CryptoConstraintsFailure => "CRYPTO_CONSTRAINTS_FAILURE",
            SubIndication::CryptoConstraintsFailureNoPoe => "CRYPTO_CONSTRAINTS_FAILURE_NO_POE",
            SubIndication::Expired => "EXPIRED",
            SubIndication::NotYetValid => "NOT_YET_VALID",
            SubIndication::Revoked => "REVOKED",
            SubIndication::RevokedNoPoe => "REVOKED_NO_POE",
            SubIndication::RevokedCaNoPoe => "REVOKED_CA_NO_POE",
            SubIndication::OutOfBoundsNoPoe => "OUT_OF_BOUNDS_NO_POE",
            SubIndication::NoCertificateChainFound => "NO_CERTIFICATE_CHAIN_FOUND",
            SubIndication::TryLater => "TRY_LATER",
            SubIndication::NoPoe => "NO_POE",
            SubIndication::TimestampOrderFailure => "TIMESTAMP_ORDER_FAILURE",
            SubIndication::NoTimestamp => "NO_TIMESTAMP",
            SubIndication::NoValidTimestamp => "NO_VALID_TIMESTAMP",
            SubIndication::ClaimedSigningTimeAbsent => "CLAIMED_SIGNING_TIME_ABSENT",
        }
    }

    /// The sub-indications a later proof of existence may still resolve.
    pub fn awaits_proof_of_existence(&self) -> bool {
        matches!(
            self,
            SubIndication::RevokedNoPoe
                | SubIndication::RevokedCaNoPoe
                | SubIndication::OutOfBoundsNoPoe
                | SubIndication::CryptoConstraintsFailureNoPoe
        )
    }
}

impl fmt::Display for SubIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state verdict.
///
/// A sub-indication is carried by the non-valid variants only, so a valid
/// verdict can never hold a refining reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "indication",
    content = "sub_indication",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum Indication {
    #[default]
    Valid,
    Invalid(SubIndication),
    Indeterminate(SubIndication),
}

impl Indication {
    pub fn is_valid(&self) -> bool {
        matches!(self, Indication::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Indication::Invalid(_))
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Indication::Indeterminate(_))
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        match self {
            Indication::Valid => None,
            Indication::Invalid(sub) | Indication::Indeterminate(sub) => Some(*sub),
        }
    }

    /// True for `Indeterminate` with one of the given sub-indications.
    pub fn is_indeterminate_with(&self, subs: &[SubIndication]) -> bool {
        match self {
            Indication::Indeterminate(sub) => subs.contains(sub),
            _ => false,
        }
    }

    /// The bare verdict name without its sub-indication.
    pub fn label(&self) -> &'static str {
        match self {
            Indication::Valid => "VALID",
            Indication::Invalid(_) => "INVALID",
            Indication::Indeterminate(_) => "INDETERMINATE",
        }
    }
}

impl fmt::Display for Indication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_indication() {
            Some(sub) => write!(f, "{}/{}", self.label(), sub),
            None => f.write_str(self.label()),
        }
    }
}
