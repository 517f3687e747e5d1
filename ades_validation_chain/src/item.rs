// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::indication::Indication;
use crate::level::Level;
use crate::message_tag::MessageTag;
use std::collections::BTreeMap;
use std::fmt;

/// Lazily evaluated predicate owned by a [`ConstraintItem`].
pub type Check<'a> = Box<dyn FnOnce() -> bool + 'a>;

/// One named check in a [`crate::chain::Chain`].
///
/// The predicate only runs when the chain reaches the item, so any side effects it performs
/// never happen once an earlier `Fail` item has stopped the chain.
pub struct ConstraintItem<'a> {
    pub(crate) tag: MessageTag,
    pub(crate) level: Level,
    pub(crate) failure: Indication,
    pub(crate) success: Option<Indication>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) check: Check<'a>,
}

impl<'a> ConstraintItem<'a> {
    /// Creates an item that yields `failure` when `check` returns false at [`Level::Fail`].
    pub fn new(
        tag: MessageTag,
        level: Level,
        failure: Indication,
        check: impl FnOnce() -> bool + 'a,
    ) -> Self {
        Self {
            tag,
            level,
            failure,
            success: None,
            attributes: BTreeMap::new(),
            check: Box::new(check),
        }
    }

    /// Terminates the chain early with `indication` when this `Fail` item succeeds.
    pub fn on_success(mut self, indication: Indication) -> Self {
        self.success = Some(indication);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self) -> MessageTag {
        self.tag
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Debug for ConstraintItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintItem")
            .field("tag", &self.tag)
            .field("level", &self.level)
            .field("failure", &self.failure)
            .field("success", &self.success)
            .finish_non_exhaustive()
    }
}
