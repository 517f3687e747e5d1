// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Past signature validation.
//!
//! Re-examines a token whose current outcome is pending a proof of existence, using the
//! control time from past certificate validation and the earliest proof held for the token.

use crate::bbb::PendingProof;
use crate::context::ValidationContext;
use crate::diagnostic::TokenData;
use crate::past_certificate::{self, PastCertificateResult};
use crate::poe::PoeStore;
use crate::resolution::{push_resolution, ReferenceTime};
use ades_validation_chain::conclusion::ATTRIBUTE_CONTROL_TIME;
use ades_validation_chain::{
    Chain, ChainResult, Conclusion, ConstraintItem, Indication, Level, Message, MessageTag,
    SubIndication,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const CHAIN_NAME_PSV: &str = "PastSignatureValidation";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastSignatureResult {
    pub past_certificate: PastCertificateResult,
    pub chain: ChainResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,
}

impl PastSignatureResult {
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

/// Validates `token` in the past.
///
/// `current` is the token's present outcome and `pending` what a proof of existence must
/// show to resolve it. A non-valid outcome with nothing pending cannot be resolved and is
/// returned unchanged.
pub fn validate(
    ctx: &ValidationContext<'_>,
    store: &PoeStore,
    token: &TokenData,
    current: Indication,
    pending: Option<&PendingProof>,
) -> PastSignatureResult {
    let past_certificate = past_certificate::validate(ctx, store, token);
    let control_time = past_certificate.control_time;

    if !current.is_valid() && pending.is_none() {
        return PastSignatureResult {
            past_certificate,
            chain: ChainResult::from_indication(CHAIN_NAME_PSV, current),
            control_time,
        };
    }

    let pcv_indication = past_certificate.indication();
    let unresolved = if current.is_valid() {
        Indication::Indeterminate(SubIndication::NoPoe)
    } else {
        current
    };
    let poe_time = store.lowest_for_object(&token.id);

    let mut chain = Chain::new(CHAIN_NAME_PSV);
    chain.push(ConstraintItem::new(
        MessageTag::PsvIpcvc,
        Level::Fail,
        if current.is_valid() { pcv_indication } else { current },
        move || pcv_indication.is_valid(),
    ));
    chain.push(ConstraintItem::new(
        MessageTag::PsvIpsvc,
        Level::Fail,
        unresolved,
        move || matches!((poe_time, control_time), (Some(poe), Some(control)) if poe <= control),
    ));
    if let (Some(pending), Some(poe_time)) = (pending, poe_time) {
        push_resolution(&mut chain, pending, current, poe_time, ReferenceTime::ControlTime);
    }

    let mut chain = chain.execute();
    if let (true, Some(control_time)) = (chain.is_valid(), control_time) {
        chain.conclusion.infos.push(
            Message::from_tag(MessageTag::PsvCtr)
                .with_attribute(ATTRIBUTE_CONTROL_TIME, control_time.to_rfc3339()),
        );
    }
    debug!(token = %token.id, indication = %chain.indication(), ?control_time, "past signature validation done");

    PastSignatureResult {
        past_certificate,
        chain,
        control_time,
    }
}
