// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::adest::AdestResult;
use crate::basic_validation::BasicValidationResult;
use crate::bbb::BbbResult;
use crate::long_term::LongTermResult;
use crate::poe::PoeEntry;
use crate::timestamp_validation::TimestampReport;
use ades_validation_chain::{Conclusion, Indication};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Every process output for one signature, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureReport {
    pub signature_id: String,
    pub basic_building_blocks: BbbResult,
    pub basic_validation: BasicValidationResult,
    pub timestamps: Vec<TimestampReport>,
    pub adest: AdestResult,
    pub long_term: LongTermResult,
    /// Final outcome for the signature.
    pub conclusion: Conclusion,
}

impl SignatureReport {
    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn timestamp(&self, id: &str) -> Option<&TimestampReport> {
        self.timestamps.iter().find(|t| t.timestamp_id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub validation_time: DateTime<Utc>,
    pub policy_name: String,
    pub signatures: Vec<SignatureReport>,
    /// Final state of the proof-of-existence store.
    pub proof_of_existence: Vec<PoeEntry>,
}

impl ValidationReport {
    pub fn signature(&self, id: &str) -> Option<&SignatureReport> {
        self.signatures.iter().find(|s| s.signature_id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
