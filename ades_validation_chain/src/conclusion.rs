// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::indication::{Indication, SubIndication};
use crate::message_tag::MessageTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute key carrying the best-signature-time on AdES-T conclusions.
pub const ATTRIBUTE_BEST_SIGNATURE_TIME: &str = "BestSignatureTime";
/// Attribute key carrying the control time on past signature validation conclusions.
pub const ATTRIBUTE_CONTROL_TIME: &str = "ControlTime";

/// A tagged diagnostic attached to a [`Conclusion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub tag: MessageTag,
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Message {
    /// Message using the tag's negative answer as text.
    pub fn from_tag(tag: MessageTag) -> Self {
        Self {
            tag,
            text: tag.answer().to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Result of one validation process or chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conclusion {
    pub indication: Indication,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<Message>,
}

impl Conclusion {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn with_indication(indication: Indication) -> Self {
        Self {
            indication,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.indication.is_valid()
    }

    pub fn sub_indication(&self) -> Option<SubIndication> {
        self.indication.sub_indication()
    }

    /// Append every message of `other` after this conclusion's own messages.
    pub fn absorb_messages(&mut self, other: &Conclusion) {
        self.errors.extend(other.errors.iter().cloned());
        self.warnings.extend(other.warnings.iter().cloned());
        self.infos.extend(other.infos.iter().cloned());
    }

    /// First info carrying `key`, if any.
    pub fn info_attribute(&self, key: &str) -> Option<&str> {
        self.infos
            .iter()
            .find_map(|m| m.attributes.get(key).map(String::as_str))
    }
}
