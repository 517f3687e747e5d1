// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::bbb::{self, BbbResult, BbbSubject};
use crate::context::ValidationContext;
use crate::diagnostic::{SignatureData, TimestampData, TimestampKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Building-blocks results of a signature's timestamps keyed by timestamp id.
pub type TimestampResults = BTreeMap<String, BbbResult>;

/// Runs the building blocks for every timestamp of `signature`, whatever its kind.
pub fn validate(ctx: &ValidationContext<'_>, signature: &SignatureData) -> TimestampResults {
    signature
        .timestamps
        .iter()
        .map(|t| (t.id().to_string(), bbb::validate(ctx, BbbSubject::Timestamp(t))))
        .collect()
}

/// Per-timestamp section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampReport {
    pub timestamp_id: String,
    pub kind: TimestampKind,
    pub production_time: DateTime<Utc>,
    pub basic_building_blocks: BbbResult,
}

impl TimestampReport {
    pub fn new(timestamp: &TimestampData, basic_building_blocks: BbbResult) -> Self {
        Self {
            timestamp_id: timestamp.id().to_string(),
            kind: timestamp.kind,
            production_time: timestamp.production_time,
            basic_building_blocks,
        }
    }
}
