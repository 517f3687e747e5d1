// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::audit::{ConstraintRecord, ConstraintStatus};
use crate::conclusion::{Conclusion, Message};
use crate::indication::Indication;
use crate::item::ConstraintItem;
use crate::level::Level;
use crate::message_tag::MessageTag;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered list of constraints executed by a single driver.
///
/// Execution rules:
/// - `Fail`: a failing check records `NOT_OK`, sets the item's failure indication and stops.
///   A passing check with a custom success indication stops with that indication.
/// - `Warn` / `Inform`: a failing check records a warning or info and execution continues.
/// - `Ignore`: the check never runs.
///
/// A chain with no failing `Fail` item concludes [`Indication::Valid`].
#[derive(Debug)]
pub struct Chain<'a> {
    title: String,
    items: Vec<ConstraintItem<'a>>,
}

impl<'a> Chain<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ConstraintItem<'a>) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn with(mut self, item: ConstraintItem<'a>) -> Self {
        self.items.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn execute(self) -> ChainResult {
        let mut constraints = Vec::with_capacity(self.items.len());
        let mut conclusion = Conclusion::valid();

        for item in self.items {
            let ConstraintItem {
                tag,
                level,
                failure,
                success,
                attributes,
                check,
            } = item;

            if level.is_ignored() {
                debug!(chain = %self.title, tag = %tag, "constraint ignored");
                constraints.push(ConstraintRecord {
                    tag,
                    level,
                    status: ConstraintStatus::Ignored,
                    attributes,
                });
                continue;
            }

            let passed = check();
            debug!(chain = %self.title, tag = %tag, ?level, passed, "constraint evaluated");

            let status = match (passed, level) {
                (true, _) => ConstraintStatus::Ok,
                (false, Level::Fail) => ConstraintStatus::NotOk,
                (false, Level::Warn) => ConstraintStatus::Warning,
                (false, _) => ConstraintStatus::Information,
            };

            let message = Message {
                tag,
                text: tag.answer().to_string(),
                attributes: attributes.clone(),
            };
            constraints.push(ConstraintRecord {
                tag,
                level,
                status,
                attributes,
            });

            match status {
                ConstraintStatus::Ok => {
                    if let (Level::Fail, Some(indication)) = (level, success) {
                        conclusion.indication = indication;
                        break;
                    }
                }
                ConstraintStatus::NotOk => {
                    conclusion.indication = failure;
                    conclusion.errors.push(message);
                    break;
                }
                ConstraintStatus::Warning => conclusion.warnings.push(message),
                ConstraintStatus::Information => conclusion.infos.push(message),
                ConstraintStatus::Ignored => {}
            }
        }

        ChainResult {
            title: self.title,
            constraints,
            conclusion,
        }
    }
}

/// Recorded outcome of a [`Chain`] execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainResult {
    pub title: String,
    pub constraints: Vec<ConstraintRecord>,
    pub conclusion: Conclusion,
}

impl ChainResult {
    /// A result with no constraints that concludes with `indication`.
    pub fn from_indication(title: impl Into<String>, indication: Indication) -> Self {
        Self {
            title: title.into(),
            constraints: Vec::new(),
            conclusion: Conclusion::with_indication(indication),
        }
    }

    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn is_valid(&self) -> bool {
        self.conclusion.is_valid()
    }

    /// Status recorded for `tag`; `None` when the chain never reached it.
    pub fn status(&self, tag: MessageTag) -> Option<ConstraintStatus> {
        self.constraints
            .iter()
            .find(|c| c.tag == tag)
            .map(|c| c.status)
    }

    pub fn statuses(&self, tag: MessageTag) -> impl Iterator<Item = ConstraintStatus> + '_ {
        self.constraints
            .iter()
            .filter(move |c| c.tag == tag)
            .map(|c| c.status)
    }
}
