// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{
    BbbSubject, ATTRIBUTE_ALGORITHM, ATTRIBUTE_ALGORITHM_EXPIRATION, CHAIN_NAME_SAV,
};
use crate::context::ValidationContext;
use crate::policy::{ConstraintId, TokenContext};
use ades_validation_chain::{
    Chain, ChainResult, ConstraintItem, Indication, MessageTag, SubIndication,
};

pub(super) fn execute(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> ChainResult {
    let token = subject.token();
    let context = subject.context();
    let crypto = &ctx.policy.cryptographic;
    let mut chain = Chain::new(CHAIN_NAME_SAV);

    if let BbbSubject::Signature(signature) = subject {
        let constraints_failure = Indication::Invalid(SubIndication::SigConstraintsFailure);
        chain.push(ConstraintItem::new(
            MessageTag::BbbSavIsqpstp,
            ctx.level(ConstraintId::SigningTimePresent, TokenContext::Signature),
            constraints_failure,
            || signature.signing_time_present(),
        ));
        chain.push(ConstraintItem::new(
            MessageTag::BbbSavIsqpctp,
            ctx.level(ConstraintId::ContentTypePresent, TokenContext::Signature),
            constraints_failure,
            || signature.content_type_present,
        ));
    }

    chain.push(ConstraintItem::new(
        MessageTag::BbbSavAsccm,
        ctx.level(ConstraintId::CryptographicAcceptable, context),
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailure),
        || crypto.is_acceptable(&token.crypto),
    ));

    let mut reliable = ConstraintItem::new(
        MessageTag::BbbSavAsar,
        ctx.level(ConstraintId::AlgorithmsReliable, context),
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailureNoPoe),
        || crypto.is_reliable_at(&token.crypto, ctx.validation_time),
    );
    if let Some(expiration) = crypto.expiration_of(&token.crypto) {
        reliable = reliable
            .with_attribute(ATTRIBUTE_ALGORITHM, expiration.algorithm)
            .with_attribute(
                ATTRIBUTE_ALGORITHM_EXPIRATION,
                expiration.expiration.to_rfc3339(),
            );
    }
    chain.push(reliable);

    chain.execute()
}
