// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

/// Severity assigned to a single constraint.
///
/// Only `Fail` can stop a chain. `Warn` and `Inform` record their outcome and always let the
/// chain continue, while `Ignore` skips the check entirely.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Ignore,
    Inform,
    Warn,
    #[default]
    Fail,
}

impl Level {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Level::Ignore)
    }
}
