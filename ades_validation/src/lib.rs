// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation processes for advanced electronic signatures.
//!
//! Input is already-extracted [`diagnostic::DiagnosticData`]: certificates, revocation
//! entries, signatures and their timestamps, together with the outcome of every
//! cryptographic check. Output is a [`report::ValidationReport`] with one conclusion per
//! signature and the conclusions of every intermediate process.
//!
//! Start with [`validator::ValidationProcess::builder`].

pub mod adest;
pub mod basic_validation;
pub mod bbb;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod ids;
pub mod long_term;
pub mod past_certificate;
pub mod past_signature;
pub mod poe;
pub mod poe_extraction;
pub mod policy;
pub mod report;
pub mod timestamp_validation;
pub mod validator;

mod resolution;

pub use error::{PolicyError, ValidationError};
pub use validator::{ValidationProcess, ValidationProcessBuilder};
