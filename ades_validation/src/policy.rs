// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation policy: constraint levels, cryptographic constraints and time tolerances.
//!
//! A policy is immutable for the duration of a run. Policies load from JSON or TOML; any
//! field left out keeps the value of [`ValidationPolicy::default`].

use crate::diagnostic::{CertificateData, CryptoInfo};
use crate::error::PolicyError;
use ades_validation_chain::Level;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Named constraints whose level the policy controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintId {
    SigningCertificateIdentified,
    SigningCertificateAttributePresent,
    SigningCertificateDigestMatch,
    IssuerSerialMatch,
    SignaturePolicyIdentified,
    SignaturePolicyHashMatch,
    ReferenceDataFound,
    ReferenceDataIntact,
    SignatureIntact,
    SigningTimePresent,
    ContentTypePresent,
    CryptographicAcceptable,
    AlgorithmsReliable,
    ProspectiveChain,
    CertificateSignatures,
    RevocationDataPresent,
    RevocationFreshness,
    SigningCertificateNotRevoked,
    SigningCertificateNotOnHold,
    SigningCertificateValidityRange,
    CaCertificatesNotRevoked,
    CaCertificatesValidityRange,
    ChainCryptographicAcceptable,
    ChainAlgorithmsReliable,
    /// At least one timestamp present must be usable.
    TimestampRequired,
    TimestampCoherence,
    TimestampDelay,
    /// Keep processing timestamps for proof of existence after a valid AdES-T result.
    LtvAttributes,
    /// Severity of an unusable timestamp during long-term validation.
    LtvTimestampValidity,
}

/// Which kind of token a constraint is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenContext {
    Signature,
    Timestamp,
}

fn default_level(id: ConstraintId, context: TokenContext) -> Level {
    use ConstraintId::*;
    match (id, context) {
        (SigningCertificateAttributePresent, TokenContext::Timestamp)
        | (SigningCertificateDigestMatch, TokenContext::Timestamp)
        | (IssuerSerialMatch, TokenContext::Timestamp)
        | (SigningTimePresent, TokenContext::Timestamp) => Level::Ignore,
        (IssuerSerialMatch, _) | (SigningTimePresent, _) => Level::Warn,
        (SignaturePolicyIdentified, _)
        | (SignaturePolicyHashMatch, _)
        | (ContentTypePresent, _)
        | (LtvAttributes, _) => Level::Ignore,
        (LtvTimestampValidity, _) => Level::Inform,
        _ => Level::Fail,
    }
}

/// Expiration of one algorithm as configured in the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmExpiration {
    pub algorithm: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptographicConstraints {
    pub acceptable_digest_algorithms: BTreeSet<String>,
    pub acceptable_encryption_algorithms: BTreeSet<String>,
    /// Minimum key length in bits per encryption algorithm.
    pub minimum_key_sizes: BTreeMap<String, u32>,
    /// Date after which an algorithm is no longer considered reliable.
    ///
    /// Encryption algorithms may be keyed with their key length (e.g. `RSA1024`); that entry
    /// takes precedence over the bare algorithm name.
    pub algorithm_expiration: BTreeMap<String, DateTime<Utc>>,
}

impl Default for CryptographicConstraints {
    fn default() -> Self {
        let strings = |items: &[&str]| -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        let algorithm_expiration = [
            ("SHA1", 2009, 12, 31),
            ("RSA1024", 2013, 12, 31),
            ("DSA1024", 2013, 12, 31),
        ]
        .iter()
        .filter_map(|(alg, y, m, d)| {
            Utc.with_ymd_and_hms(*y, *m, *d, 23, 59, 59)
                .single()
                .map(|t| (alg.to_string(), t))
        })
        .collect();

        Self {
            acceptable_digest_algorithms: strings(&[
                "SHA1", "SHA224", "SHA256", "SHA384", "SHA512", "SHA3-256", "SHA3-384",
                "SHA3-512",
            ]),
            acceptable_encryption_algorithms: strings(&["RSA", "DSA", "ECDSA", "EdDSA"]),
            minimum_key_sizes: [("RSA", 1024), ("DSA", 1024), ("ECDSA", 160)]
                .iter()
                .map(|(alg, bits)| (alg.to_string(), *bits))
                .collect(),
            algorithm_expiration,
        }
    }
}

impl CryptographicConstraints {
    /// Algorithms and key length are on the policy's acceptable lists.
    pub fn is_acceptable(&self, crypto: &CryptoInfo) -> bool {
        self.acceptable_digest_algorithms
            .contains(&crypto.digest_algorithm)
            && self
                .acceptable_encryption_algorithms
                .contains(&crypto.encryption_algorithm)
            && self
                .minimum_key_sizes
                .get(&crypto.encryption_algorithm)
                .map_or(true, |min| crypto.key_length >= *min)
    }

    pub fn digest_expiration(&self, digest_algorithm: &str) -> Option<DateTime<Utc>> {
        self.algorithm_expiration.get(digest_algorithm).copied()
    }

    pub fn encryption_expiration(&self, algorithm: &str, key_length: u32) -> Option<AlgorithmExpiration> {
        let with_key = format!("{algorithm}{key_length}");
        if let Some(expiration) = self.algorithm_expiration.get(&with_key) {
            return Some(AlgorithmExpiration {
                algorithm: with_key,
                expiration: *expiration,
            });
        }
        self.algorithm_expiration
            .get(algorithm)
            .map(|expiration| AlgorithmExpiration {
                algorithm: algorithm.to_string(),
                expiration: *expiration,
            })
    }

    /// Earliest expiration among the digest and encryption algorithms of `crypto`.
    pub fn expiration_of(&self, crypto: &CryptoInfo) -> Option<AlgorithmExpiration> {
        let digest = self
            .digest_expiration(&crypto.digest_algorithm)
            .map(|expiration| AlgorithmExpiration {
                algorithm: crypto.digest_algorithm.clone(),
                expiration,
            });
        let encryption =
            self.encryption_expiration(&crypto.encryption_algorithm, crypto.key_length);
        match (digest, encryption) {
            (Some(d), Some(e)) => Some(if e.expiration < d.expiration { e } else { d }),
            (d, e) => d.or(e),
        }
    }

    /// All algorithms of `crypto` are still reliable at `time`.
    pub fn is_reliable_at(&self, crypto: &CryptoInfo, time: DateTime<Utc>) -> bool {
        self.expiration_of(crypto)
            .map_or(true, |e| time < e.expiration)
    }

    /// The digest algorithm is still reliable at `time`.
    pub fn digest_reliable_at(&self, digest_algorithm: &str, time: DateTime<Utc>) -> bool {
        self.digest_expiration(digest_algorithm)
            .map_or(true, |expiration| time < expiration)
    }

    /// The digest algorithm stays reliable until at least `time`.
    pub fn digest_reliable_until(&self, digest_algorithm: &str, time: DateTime<Utc>) -> bool {
        self.digest_expiration(digest_algorithm)
            .map_or(true, |expiration| expiration >= time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub name: String,
    /// Level overrides applied to signatures and, absent a timestamp override, to timestamps.
    pub levels: BTreeMap<ConstraintId, Level>,
    /// Level overrides applied to timestamp tokens only.
    pub timestamp_levels: BTreeMap<ConstraintId, Level>,
    pub cryptographic: CryptographicConstraints,
    /// Maximum accepted delay between the claimed signing time and the best-signature-time.
    pub timestamp_delay_seconds: Option<i64>,
    /// Maximum accepted age of revocation data.
    pub max_revocation_freshness_seconds: Option<i64>,
    /// Additional trust anchors by certificate id.
    pub trusted_certificates: BTreeSet<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            levels: BTreeMap::new(),
            timestamp_levels: BTreeMap::new(),
            cryptographic: CryptographicConstraints::default(),
            timestamp_delay_seconds: None,
            max_revocation_freshness_seconds: None,
            trusted_certificates: BTreeSet::new(),
        }
    }
}

impl ValidationPolicy {
    pub fn from_json(content: &str) -> Result<Self, PolicyError> {
        serde_json::from_str::<Self>(content)?.checked()
    }

    pub fn from_toml(content: &str) -> Result<Self, PolicyError> {
        toml::from_str::<Self>(content)?.checked()
    }

    /// Rejects durations that do not fit a `TimeDelta`.
    fn checked(self) -> Result<Self, PolicyError> {
        let fields = [
            ("timestamp_delay_seconds", self.timestamp_delay_seconds),
            (
                "max_revocation_freshness_seconds",
                self.max_revocation_freshness_seconds,
            ),
        ];
        for (field, value) in fields {
            if let Some(seconds) = value.filter(|s| Duration::try_seconds(*s).is_none()) {
                return Err(PolicyError::OutOfRange { field, seconds });
            }
        }
        Ok(self)
    }

    /// Loads a policy file, choosing the format from its extension (`.toml`, otherwise JSON).
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn level(&self, id: ConstraintId, context: TokenContext) -> Level {
        if context == TokenContext::Timestamp {
            if let Some(level) = self.timestamp_levels.get(&id) {
                return *level;
            }
        }
        self.levels
            .get(&id)
            .copied()
            .unwrap_or_else(|| default_level(id, context))
    }

    pub fn with_level(mut self, id: ConstraintId, level: Level) -> Self {
        self.levels.insert(id, level);
        self
    }

    pub fn with_timestamp_level(mut self, id: ConstraintId, level: Level) -> Self {
        self.timestamp_levels.insert(id, level);
        self
    }

    pub fn with_timestamp_delay(mut self, delay: Duration) -> Self {
        self.timestamp_delay_seconds = Some(delay.num_seconds());
        self
    }

    pub fn with_max_revocation_freshness(mut self, freshness: Duration) -> Self {
        self.max_revocation_freshness_seconds = Some(freshness.num_seconds());
        self
    }

    pub fn with_algorithm_expiration(
        mut self,
        algorithm: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        self.cryptographic
            .algorithm_expiration
            .insert(algorithm.into(), expiration);
        self
    }

    /// Saturates at [`Duration::MAX`] for values set in code beyond the loadable range.
    pub fn timestamp_delay(&self) -> Option<Duration> {
        self.timestamp_delay_seconds.map(saturating_seconds)
    }

    pub fn max_revocation_freshness(&self) -> Option<Duration> {
        self.max_revocation_freshness_seconds.map(saturating_seconds)
    }

    pub fn is_trust_anchor(&self, certificate: &CertificateData) -> bool {
        certificate.trusted || self.trusted_certificates.contains(&certificate.id)
    }
}

fn saturating_seconds(seconds: i64) -> Duration {
    Duration::try_seconds(seconds).unwrap_or(if seconds < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}
