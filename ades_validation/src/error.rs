// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Hard failures that prevent a validation run from producing a report.
///
/// Validation outcomes such as a revoked certificate are never errors; they are reported as
/// conclusions.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing mandatory input: {0}")]
    MissingInput(&'static str),

    #[error("{referrer} references unknown certificate {certificate_id}")]
    UnknownCertificate {
        referrer: String,
        certificate_id: String,
    },

    #[error("{referrer} references unknown revocation data {revocation_id}")]
    UnknownRevocation {
        referrer: String,
        revocation_id: String,
    },

    #[error("{referrer} references unknown object {object_id}")]
    UnknownReference { referrer: String, object_id: String },

    #[error("diagnostic data decoding failed: {0}")]
    Decode(String),

    #[error("internal validation fault: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("policy TOML parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("policy field {field} is out of range: {seconds} seconds")]
    OutOfRange { field: &'static str, seconds: i64 },
}
