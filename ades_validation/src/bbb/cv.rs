// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{BbbSubject, CHAIN_NAME_CV};
use crate::context::ValidationContext;
use crate::policy::ConstraintId;
use ades_validation_chain::{
    Chain, ChainResult, ConstraintItem, Indication, MessageTag, SubIndication,
};

pub(super) fn execute(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> ChainResult {
    let token = subject.token();
    let level = |id| ctx.level(id, subject.context());

    Chain::new(CHAIN_NAME_CV)
        .with(ConstraintItem::new(
            MessageTag::BbbCvIrdof,
            level(ConstraintId::ReferenceDataFound),
            Indication::Indeterminate(SubIndication::SignedDataNotFound),
            || token.reference_data_found,
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbCvIrdoi,
            level(ConstraintId::ReferenceDataIntact),
            Indication::Invalid(SubIndication::HashFailure),
            || token.reference_data_intact,
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbCvIsi,
            level(ConstraintId::SignatureIntact),
            Indication::Invalid(SubIndication::SigCryptoFailure),
            || token.signature_intact,
        ))
        .execute()
}
