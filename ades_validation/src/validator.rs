// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation process driver.
//!
//! Per signature the processes run in a fixed order:
//! timestamp building blocks → signature building blocks → basic validation → AdES-T →
//! long-term validation. The proof-of-existence store lives for one [`ValidationProcess::validate`]
//! call and is shared by every signature of the run.

use crate::adest;
use crate::basic_validation;
use crate::bbb::{self, BbbSubject};
use crate::context::ValidationContext;
use crate::diagnostic::{DiagnosticData, SignatureData};
use crate::error::ValidationError;
use crate::long_term;
use crate::poe::PoeStore;
use crate::policy::ValidationPolicy;
use crate::report::{SignatureReport, ValidationReport};
use crate::timestamp_validation::{self, TimestampReport};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Collects the mandatory inputs of a [`ValidationProcess`].
#[derive(Debug, Default)]
pub struct ValidationProcessBuilder {
    diagnostic_data: Option<DiagnosticData>,
    policy: Option<ValidationPolicy>,
    validation_time: Option<DateTime<Utc>>,
}

impl ValidationProcessBuilder {
    pub fn diagnostic_data(mut self, diagnostic_data: DiagnosticData) -> Self {
        self.diagnostic_data = Some(diagnostic_data);
        self
    }

    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn validation_time(mut self, validation_time: DateTime<Utc>) -> Self {
        self.validation_time = Some(validation_time);
        self
    }

    /// Fails when an input is missing or the diagnostic data has dangling references.
    pub fn build(self) -> Result<ValidationProcess, ValidationError> {
        let diagnostic_data = self
            .diagnostic_data
            .ok_or(ValidationError::MissingInput("diagnostic data"))?;
        let policy = self
            .policy
            .ok_or(ValidationError::MissingInput("validation policy"))?;
        let validation_time = self
            .validation_time
            .ok_or(ValidationError::MissingInput("validation time"))?;
        diagnostic_data.check_references()?;

        Ok(ValidationProcess {
            diagnostic_data,
            policy,
            validation_time,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidationProcess {
    diagnostic_data: DiagnosticData,
    policy: ValidationPolicy,
    validation_time: DateTime<Utc>,
}

impl ValidationProcess {
    pub fn builder() -> ValidationProcessBuilder {
        ValidationProcessBuilder::default()
    }

    /// Adjust the policy after construction.
    pub fn with_policy(mut self, configure: impl FnOnce(&mut ValidationPolicy)) -> Self {
        configure(&mut self.policy);
        self
    }

    pub fn context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.diagnostic_data, &self.policy, self.validation_time)
    }

    pub fn diagnostic_data(&self) -> &DiagnosticData {
        &self.diagnostic_data
    }

    /// Validates every signature in input order with a fresh proof-of-existence store.
    pub fn validate(&self) -> ValidationReport {
        let store = PoeStore::new();
        let signatures = self
            .diagnostic_data
            .signatures
            .iter()
            .map(|signature| self.validate_signature(signature, &store))
            .collect();

        ValidationReport {
            validation_time: self.validation_time,
            policy_name: self.policy.name.clone(),
            signatures,
            proof_of_existence: store.entries(),
        }
    }

    /// Validates one signature against a caller-provided store.
    pub fn validate_signature(&self, signature: &SignatureData, store: &PoeStore) -> SignatureReport {
        let ctx = self.context();
        debug!(signature = %signature.id(), validation_time = %self.validation_time, "validating signature");

        let timestamp_results = timestamp_validation::validate(&ctx, signature);
        let signature_bbb = bbb::validate(&ctx, BbbSubject::Signature(signature));
        let basic = basic_validation::validate(&ctx, signature, &signature_bbb, &timestamp_results);
        let adest = adest::validate(
            &ctx,
            signature,
            basic.conclusion(),
            signature_bbb.pending.as_ref(),
            &timestamp_results,
        );
        let long_term = long_term::validate(
            &ctx,
            store,
            signature,
            &signature_bbb,
            &adest,
            &timestamp_results,
        );

        let conclusion = long_term.conclusion.clone();
        info!(
            signature = %signature.id(),
            basic = %basic.indication(),
            adest = %adest.indication(),
            indication = %conclusion.indication,
            "signature validated"
        );

        let timestamps = signature
            .timestamps
            .iter()
            .filter_map(|t| {
                timestamp_results
                    .get(t.id())
                    .map(|result| TimestampReport::new(t, result.clone()))
            })
            .collect();

        SignatureReport {
            signature_id: signature.id().to_string(),
            basic_building_blocks: signature_bbb,
            basic_validation: basic,
            timestamps,
            adest,
            long_term,
            conclusion,
        }
    }
}
