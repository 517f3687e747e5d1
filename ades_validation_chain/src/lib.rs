// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conclusion model and constraint engine shared by every AdES validation process.
//!
//! A validation process is expressed as one or more [`chain::Chain`]s of
//! [`item::ConstraintItem`]s. Executing a chain yields a [`chain::ChainResult`] holding the
//! per-constraint audit trail and a [`conclusion::Conclusion`].

pub mod audit;
pub mod chain;
pub mod conclusion;
pub mod indication;
pub mod item;
pub mod level;
pub mod message_tag;

pub use audit::{ConstraintRecord, ConstraintStatus};
pub use chain::{Chain, ChainResult};
pub use conclusion::{Conclusion, Message};
pub use indication::{Indication, SubIndication};
pub use item::ConstraintItem;
pub use level::Level;
pub use message_tag::MessageTag;
