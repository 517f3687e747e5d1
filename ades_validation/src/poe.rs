// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Proof-of-existence ledger shared by every signature of one validation run.

use crate::ids::PoeSubject;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// What established a proof of existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PoeOrigin {
    /// Every object visible at validation time exists at validation time.
    ValidationTime,
    Timestamp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoeEntry {
    /// Human-readable name of the proven object.
    pub label: String,
    pub time: DateTime<Utc>,
    pub origin: PoeOrigin,
}

/// Append-only map from object to the earliest time it is proven to have existed.
///
/// Entries are never removed and their times only move earlier. Readers run concurrently and
/// writers are serialized by the inner lock.
#[derive(Debug, Default)]
pub struct PoeStore {
    entries: RwLock<BTreeMap<PoeSubject, PoeEntry>>,
}

impl PoeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a proof for `subject` at `time`.
    ///
    /// Returns true when the store changed, i.e. the subject had no proof yet or only a later one.
    pub fn add(
        &self,
        subject: PoeSubject,
        label: impl Into<String>,
        time: DateTime<Utc>,
        origin: PoeOrigin,
    ) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(&subject) {
            Some(existing) if existing.time <= time => false,
            Some(existing) => {
                trace!(label = %existing.label, from = %existing.time, to = %time, "proof of existence lowered");
                existing.time = time;
                existing.origin = origin;
                true
            }
            None => {
                let label = label.into();
                trace!(label = %label, time = %time, "proof of existence added");
                entries.insert(subject, PoeEntry { label, time, origin });
                true
            }
        }
    }

    pub fn add_object(&self, object_id: &str, time: DateTime<Utc>, origin: PoeOrigin) -> bool {
        self.add(PoeSubject::object(object_id), object_id, time, origin)
    }

    pub fn add_digest(
        &self,
        digest_algorithm: &str,
        object_id: &str,
        time: DateTime<Utc>,
        origin: PoeOrigin,
    ) -> bool {
        self.add(
            PoeSubject::digest(digest_algorithm, object_id),
            format!("{digest_algorithm}({object_id})"),
            time,
            origin,
        )
    }

    pub fn lowest(&self, subject: &PoeSubject) -> Option<DateTime<Utc>> {
        self.entries.read().get(subject).map(|e| e.time)
    }

    pub fn lowest_for_object(&self, object_id: &str) -> Option<DateTime<Utc>> {
        self.lowest(&PoeSubject::object(object_id))
    }

    /// The object is proven to exist at or before `time`.
    pub fn has_poe_at_or_before(&self, object_id: &str, time: DateTime<Utc>) -> bool {
        self.lowest_for_object(object_id)
            .map_or(false, |lowest| lowest <= time)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of every entry ordered by subject key.
    pub fn entries(&self) -> Vec<PoeEntry> {
        self.entries.read().values().cloned().collect()
    }
}
