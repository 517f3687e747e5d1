// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{BbbSubject, CHAIN_NAME_ISC};
use crate::context::ValidationContext;
use crate::policy::ConstraintId;
use ades_validation_chain::{
    Chain, ChainResult, ConstraintItem, Indication, MessageTag, SubIndication,
};

pub(super) fn execute(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> ChainResult {
    let token = subject.token();
    let reference = token.signing_certificate.as_ref();
    let level = |id| ctx.level(id, subject.context());
    let not_found = Indication::Indeterminate(SubIndication::NoSigningCertificateFound);

    Chain::new(CHAIN_NAME_ISC)
        .with(ConstraintItem::new(
            MessageTag::BbbIcsIsci,
            level(ConstraintId::SigningCertificateIdentified),
            not_found,
            || ctx.signing_certificate(token).is_some(),
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbIcsIsascp,
            level(ConstraintId::SigningCertificateAttributePresent),
            not_found,
            || reference.map_or(false, |r| r.attribute_present),
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbIcsIcdvv,
            level(ConstraintId::SigningCertificateDigestMatch),
            not_found,
            || reference.map_or(false, |r| r.digest_match),
        ))
        .with(ConstraintItem::new(
            MessageTag::BbbIcsAidnasne,
            level(ConstraintId::IssuerSerialMatch),
            not_found,
            || reference.map_or(false, |r| r.issuer_serial_match),
        ))
        .execute()
}
