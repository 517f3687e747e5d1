// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{BbbSubject, CHAIN_NAME_VCI};
use crate::context::ValidationContext;
use crate::policy::{ConstraintId, TokenContext};
use ades_validation_chain::{
    Chain, ChainResult, ConstraintItem, Indication, MessageTag, SubIndication,
};

/// Timestamp tokens carry no signature policy, so their context is trivially valid.
pub(super) fn execute(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> ChainResult {
    let BbbSubject::Signature(signature) = subject else {
        return Chain::new(CHAIN_NAME_VCI).execute();
    };
    let policy = signature.signature_policy.as_ref();
    let failure = Indication::Indeterminate(SubIndication::PolicyProcessingError);

    Chain::new(CHAIN_NAME_VCI)
        .with(ConstraintItem::new(
            MessageTag::BbbVciIspk,
            ctx.level(ConstraintId::SignaturePolicyIdentified, TokenContext::Signature),
            failure,
            || policy.map_or(false, |p| p.identified),
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbVciIsphv,
            ctx.level(ConstraintId::SignaturePolicyHashMatch, TokenContext::Signature),
            failure,
            || policy.map_or(false, |p| p.hash_match),
        ))
        .execute()
}
