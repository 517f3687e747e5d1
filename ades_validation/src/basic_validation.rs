// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation process for basic signatures.
//!
//! Wraps the building-blocks conclusion of a signature. A content timestamp proves the
//! signature was produced after its generation time, which is enough to turn some
//! `*_NO_POE` outcomes into conclusive failures.

use crate::adest::{self, AdestResult};
use crate::bbb::{
    BbbResult, PendingProof, ATTRIBUTE_ALGORITHM, ATTRIBUTE_ALGORITHM_EXPIRATION,
    ATTRIBUTE_NOT_AFTER, ATTRIBUTE_REVOCATION_TIME,
};
use crate::context::ValidationContext;
use crate::diagnostic::SignatureData;
use crate::timestamp_validation::TimestampResults;
use ades_validation_chain::conclusion::ATTRIBUTE_BEST_SIGNATURE_TIME;
use ades_validation_chain::{
    Chain, ChainResult, Conclusion, ConstraintItem, ConstraintStatus, Indication, Level,
    MessageTag, SubIndication,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const CHAIN_NAME_BASIC_VALIDATION: &str = "BasicValidation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicValidationResult {
    pub chain: ChainResult,
    /// Narrowed AdES-T run over content timestamps, when one was needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_timestamps: Option<AdestResult>,
}

impl BasicValidationResult {
    pub fn conclusion(&self) -> &Conclusion {
        &self.chain.conclusion
    }

    pub fn indication(&self) -> Indication {
        self.chain.indication()
    }

    pub fn is_valid(&self) -> bool {
        self.chain.is_valid()
    }
}

pub fn validate(
    ctx: &ValidationContext<'_>,
    signature: &SignatureData,
    bbb: &BbbResult,
    timestamps: &TimestampResults,
) -> BasicValidationResult {
    let indication = bbb.indication();
    let mut chain = Chain::new(CHAIN_NAME_BASIC_VALIDATION);
    let mut content_timestamps = None;

    if let Some(pending) = content_timestamp_escape(bbb).filter(|_| signature.has_content_timestamp()) {
        let narrowed = adest::validate_content_timestamps(ctx, signature, timestamps);
        let proven = narrowed.is_valid().then_some(narrowed.best_signature_time);
        debug!(signature = %signature.id(), ?proven, "content timestamps evaluated");

        chain.push(ConstraintItem::new(
            MessageTag::BsvIctsv,
            Level::Inform,
            indication,
            move || proven.is_some(),
        ));
        if let Some(best_signature_time) = proven {
            push_reclassification(&mut chain, pending, best_signature_time);
        }
        content_timestamps = Some(narrowed);
    }

    chain.push(ConstraintItem::new(
        MessageTag::BsvIfbbbr,
        Level::Fail,
        indication,
        move || indication.is_valid(),
    ));

    let mut chain = chain.execute();
    chain.conclusion.absorb_messages(&bbb.conclusion);
    debug!(signature = %signature.id(), indication = %chain.indication(), "basic validation done");

    BasicValidationResult {
        chain,
        content_timestamps,
    }
}

/// The pending proof a content timestamp may settle.
///
/// Only the signature value's own algorithms and the signing certificate's status qualify;
/// CA outcomes are left to long-term validation.
fn content_timestamp_escape(bbb: &BbbResult) -> Option<&PendingProof> {
    if !bbb.indication().is_indeterminate() {
        return None;
    }
    let pending = bbb.pending.as_ref()?;
    let failed = |stage: &Option<ChainResult>, tag: MessageTag| {
        stage.as_ref().and_then(|c| c.status(tag)) == Some(ConstraintStatus::NotOk)
    };
    let applies = match pending {
        PendingProof::Crypto { .. } => failed(&bbb.sav, MessageTag::BbbSavAsar),
        PendingProof::Revoked { .. } => failed(&bbb.xcv, MessageTag::BbbXcvIscr),
        PendingProof::OutOfBounds { .. } => failed(&bbb.xcv, MessageTag::BbbXcvIctivrsc),
        PendingProof::RevokedCa { .. } => false,
    };
    applies.then_some(pending)
}

fn push_reclassification<'a>(
    chain: &mut Chain<'a>,
    pending: &PendingProof,
    best_signature_time: DateTime<Utc>,
) {
    let item = match pending {
        PendingProof::Crypto {
            algorithm,
            expiration,
            ..
        } => {
            let expiration = *expiration;
            ConstraintItem::new(
                MessageTag::BsvIarctst,
                Level::Fail,
                Indication::Invalid(SubIndication::CryptoConstraintsFailure),
                move || best_signature_time <= expiration,
            )
            .with_attribute(ATTRIBUTE_ALGORITHM, algorithm.clone())
            .with_attribute(ATTRIBUTE_ALGORITHM_EXPIRATION, expiration.to_rfc3339())
        }
        PendingProof::Revoked {
            revocation_time, ..
        } => {
            let revocation_time = *revocation_time;
            ConstraintItem::new(
                MessageTag::BsvIscnrbct,
                Level::Fail,
                Indication::Invalid(SubIndication::Revoked),
                move || best_signature_time <= revocation_time,
            )
            .with_attribute(ATTRIBUTE_REVOCATION_TIME, revocation_time.to_rfc3339())
        }
        PendingProof::OutOfBounds { not_after, .. } => {
            let not_after = *not_after;
            ConstraintItem::new(
                MessageTag::BsvIscnebct,
                Level::Fail,
                Indication::Invalid(SubIndication::Expired),
                move || best_signature_time <= not_after,
            )
            .with_attribute(ATTRIBUTE_NOT_AFTER, not_after.to_rfc3339())
        }
        PendingProof::RevokedCa { .. } => return,
    };
    chain.push(item.with_attribute(ATTRIBUTE_BEST_SIGNATURE_TIME, best_signature_time.to_rfc3339()));
}
