// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Long-term validation.
//!
//! Grows the proof-of-existence store from the signature's own timestamps, then runs past
//! signature validation of the signature against it. Timestamps that cannot be trusted are
//! skipped rather than failing the signature, unless the policy makes their validity a
//! `Fail` constraint.

use crate::adest::AdestResult;
use crate::bbb::BbbResult;
use crate::context::ValidationContext;
use crate::diagnostic::{SignatureData, TimestampData, TimestampKind, TokenData};
use crate::error::ValidationError;
use crate::past_signature::{self, PastSignatureResult};
use crate::poe::{PoeOrigin, PoeStore};
use crate::poe_extraction;
use crate::policy::{ConstraintId, TokenContext};
use crate::timestamp_validation::TimestampResults;
use ades_validation_chain::{
    Chain, ChainResult, Conclusion, ConstraintItem, Indication, Level, MessageTag, SubIndication,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use tracing::{debug, warn};

pub const CHAIN_NAME_LTV: &str = "LongTermValidation";

const ATTRIBUTE_TIMESTAMP: &str = "Timestamp";

/// AdES-T outcomes a proof of existence may still resolve.
const RESOLVABLE: [SubIndication; 4] = [
    SubIndication::RevokedNoPoe,
    SubIndication::RevokedCaNoPoe,
    SubIndication::OutOfBoundsNoPoe,
    SubIndication::CryptoConstraintsFailureNoPoe,
];

/// Timestamp categories in processing order.
const CATEGORIES: [TimestampKind; 4] = [
    TimestampKind::Archive,
    TimestampKind::RefsOnly,
    TimestampKind::ValidationData,
    TimestampKind::Signature,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LtvTimestampOutcome {
    pub timestamp_id: String,
    pub kind: TimestampKind,
    /// Proofs of existence were taken from this timestamp.
    pub extracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_signature: Option<PastSignatureResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongTermResult {
    pub chain: ChainResult,
    pub timestamps: Vec<LtvTimestampOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_signature: Option<PastSignatureResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,
    pub conclusion: Conclusion,
}

impl LongTermResult {
    pub fn indication(&self) -> Indication {
        self.conclusion.indication
    }

    pub fn is_valid(&self) -> bool {
        self.conclusion.is_valid()
    }
}

pub fn validate(
    ctx: &ValidationContext<'_>,
    store: &PoeStore,
    signature: &SignatureData,
    bbb: &BbbResult,
    adest: &AdestResult,
    timestamps: &TimestampResults,
) -> LongTermResult {
    initialise_poe(ctx, store, signature);

    let adest_indication = adest.indication();
    let outcomes = RefCell::new(Vec::new());
    let mut chain = Chain::new(CHAIN_NAME_LTV);
    let mut accepted = ConstraintItem::new(
        MessageTag::LtvAbsv,
        Level::Fail,
        adest_indication,
        move || adest_indication.is_valid() || adest_indication.is_indeterminate_with(&RESOLVABLE),
    );
    if adest_indication.is_valid()
        && ctx
            .level(ConstraintId::LtvAttributes, TokenContext::Signature)
            .is_ignored()
    {
        accepted = accepted.on_success(Indication::Valid);
    }
    chain.push(accepted);

    let level = ctx.level(ConstraintId::LtvTimestampValidity, TokenContext::Signature);
    for timestamp in processing_order(signature) {
        let failure = timestamps
            .get(timestamp.id())
            .map(BbbResult::indication)
            .filter(|i| !i.is_valid())
            .unwrap_or(Indication::Indeterminate(SubIndication::NoPoe));
        let outcomes = &outcomes;
        chain.push(
            ConstraintItem::new(MessageTag::LtvItspoe, level, failure, move || {
                match process_timestamp(ctx, store, signature, timestamp, timestamps) {
                    Ok(outcome) => {
                        let extracted = outcome.extracted;
                        outcomes.borrow_mut().push(outcome);
                        extracted
                    }
                    Err(error) => {
                        warn!(signature = %signature.id(), timestamp = %timestamp.id(), %error, "timestamp skipped");
                        false
                    }
                }
            })
            .with_attribute(ATTRIBUTE_TIMESTAMP, timestamp.id()),
        );
    }

    let chain = chain.execute();
    let processed = outcomes.into_inner();

    let (past_signature, conclusion) = if !chain.is_valid() {
        (None, chain.conclusion.clone())
    } else if adest_indication.is_valid() {
        (None, adest.conclusion().clone())
    } else {
        let psv = past_signature::validate(
            ctx,
            store,
            &signature.token,
            adest_indication,
            bbb.pending.as_ref(),
        );
        let conclusion = psv.conclusion().clone();
        (Some(psv), conclusion)
    };
    let control_time = past_signature.as_ref().and_then(|p| p.control_time);
    debug!(signature = %signature.id(), indication = %conclusion.indication, ?control_time, "long-term validation done");

    LongTermResult {
        chain,
        timestamps: processed,
        past_signature,
        control_time,
        conclusion,
    }
}

/// Every object visible in the signature exists at the validation time.
fn initialise_poe(ctx: &ValidationContext<'_>, store: &PoeStore, signature: &SignatureData) {
    let time = ctx.validation_time;
    let add = |id: &str| {
        store.add_object(id, time, PoeOrigin::ValidationTime);
    };
    // Revocation data gathered for the path is at hand now, embedded or not.
    let add_certificate = |id: &str| {
        add(id);
        ctx.diagnostic
            .revocations_for(id)
            .for_each(|revocation| add(&revocation.id));
    };
    let add_token = |token: &TokenData| {
        add(&token.id);
        if let Some(signer) = &token.signing_certificate {
            add_certificate(&signer.certificate_id);
        }
        token.certificate_chain.iter().for_each(|id| add_certificate(id));
    };

    add_token(&signature.token);
    signature.signed_data_objects.iter().for_each(|id| add(id));
    signature.certificate_ids.iter().for_each(|id| add(id));
    signature.revocation_ids.iter().for_each(|id| add(id));
    for timestamp in &signature.timestamps {
        add_token(&timestamp.token);
        timestamp
            .references
            .iter()
            .for_each(|r| add(&r.object_id));
    }
}

/// Non-content timestamps by category, newest first within a category.
fn processing_order(signature: &SignatureData) -> Vec<&TimestampData> {
    CATEGORIES
        .iter()
        .flat_map(|kind| {
            let mut category: Vec<&TimestampData> = signature.timestamps_of(*kind).collect();
            category.sort_by(|a, b| b.production_time.cmp(&a.production_time));
            category
        })
        .collect()
}

fn process_timestamp(
    ctx: &ValidationContext<'_>,
    store: &PoeStore,
    signature: &SignatureData,
    timestamp: &TimestampData,
    timestamps: &TimestampResults,
) -> Result<LtvTimestampOutcome, ValidationError> {
    let bbb = timestamps.get(timestamp.id()).ok_or_else(|| {
        ValidationError::Internal(format!(
            "no building-blocks result for timestamp {}",
            timestamp.id()
        ))
    })?;
    let mut outcome = LtvTimestampOutcome {
        timestamp_id: timestamp.id().to_string(),
        kind: timestamp.kind,
        extracted: false,
        past_signature: None,
    };
    if !(timestamp.message_imprint_found && timestamp.message_imprint_intact) {
        return Ok(outcome);
    }

    let usable = if bbb.is_valid() {
        true
    } else {
        let psv = past_signature::validate(
            ctx,
            store,
            &timestamp.token,
            bbb.indication(),
            bbb.pending.as_ref(),
        );
        let valid = psv.is_valid();
        outcome.past_signature = Some(psv);
        valid
    };

    if usable && poe_extraction::is_extractable(ctx, timestamp) {
        poe_extraction::extract(ctx, store, signature, timestamp);
        outcome.extracted = true;
    } else {
        debug!(
            timestamp = %timestamp.id(),
            certificate = ?ctx.signing_certificate(&timestamp.token).map(|c| &c.id),
            "timestamp not usable for proofs of existence"
        );
    }
    Ok(outcome)
}
