// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::level::Level;
use crate::message_tag::MessageTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recorded outcome of one executed (or skipped) constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintStatus {
    Ok,
    NotOk,
    Warning,
    Information,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub tag: MessageTag,
    pub level: Level,
    pub status: ConstraintStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}
