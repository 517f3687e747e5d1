// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{
    BbbSubject, ATTRIBUTE_ALGORITHM, ATTRIBUTE_ALGORITHM_EXPIRATION, ATTRIBUTE_CERTIFICATE,
    ATTRIBUTE_NOT_AFTER, ATTRIBUTE_NOT_BEFORE, ATTRIBUTE_REVOCATION_TIME, CHAIN_NAME_XCV,
};
use crate::context::{CertificatePath, ValidationContext};
use crate::diagnostic::{CertificateData, RevocationStatus};
use crate::policy::{AlgorithmExpiration, ConstraintId};
use ades_validation_chain::{
    Chain, ChainResult, ConstraintItem, Indication, MessageTag, SubIndication,
};
use chrono::{DateTime, Utc};

pub(super) fn execute(ctx: &ValidationContext<'_>, subject: BbbSubject<'_>) -> ChainResult {
    let token = subject.token();
    let level = |id| ctx.level(id, subject.context());
    let time = ctx.validation_time;
    let path = ctx.certificate_path(token);
    let signing = ctx.signing_certificate(token);
    let signer_is_anchor = signing.map_or(false, |c| ctx.is_trust_anchor(c));
    let revocation = signing.and_then(|c| ctx.latest_revocation(&c.id, time));
    let revocation_time = revocation.and_then(|r| r.revocation_time());

    let mut chain = Chain::new(CHAIN_NAME_XCV);
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvCccbb,
        level(ConstraintId::ProspectiveChain),
        Indication::Indeterminate(SubIndication::NoCertificateChainFound),
        || path.anchored,
    ));
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvIcsi,
        level(ConstraintId::CertificateSignatures),
        Indication::Indeterminate(SubIndication::CertificateChainGeneralFailure),
        || non_anchors(ctx, &path).all(|c| c.signature_intact),
    ));

    // Signing certificate status at validation time.
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvIrdpfc,
        level(ConstraintId::RevocationDataPresent),
        Indication::Indeterminate(SubIndication::TryLater),
        || signer_is_anchor || revocation.is_some(),
    ));
    if let Some(freshness) = ctx.policy.max_revocation_freshness() {
        chain.push(ConstraintItem::new(
            MessageTag::BbbXcvIrif,
            level(ConstraintId::RevocationFreshness),
            Indication::Indeterminate(SubIndication::TryLater),
            move || signer_is_anchor || revocation.map_or(false, |r| time - r.issuing_time <= freshness),
        ));
    }
    let mut not_revoked = ConstraintItem::new(
        MessageTag::BbbXcvIscr,
        level(ConstraintId::SigningCertificateNotRevoked),
        Indication::Indeterminate(SubIndication::RevokedNoPoe),
        move || revocation_time.is_none(),
    );
    if let Some(revoked_at) = revocation_time {
        not_revoked = not_revoked.with_attribute(ATTRIBUTE_REVOCATION_TIME, revoked_at.to_rfc3339());
    }
    chain.push(not_revoked);
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvIscoh,
        level(ConstraintId::SigningCertificateNotOnHold),
        Indication::Indeterminate(SubIndication::TryLater),
        move || !matches!(revocation.map(|r| r.status), Some(RevocationStatus::OnHold)),
    ));
    let mut in_range = ConstraintItem::new(
        MessageTag::BbbXcvIctivrsc,
        level(ConstraintId::SigningCertificateValidityRange),
        Indication::Indeterminate(SubIndication::OutOfBoundsNoPoe),
        move || signing.map_or(false, |c| c.is_valid_at(time)),
    );
    if let Some(certificate) = signing {
        in_range = in_range
            .with_attribute(ATTRIBUTE_NOT_BEFORE, certificate.not_before.to_rfc3339())
            .with_attribute(ATTRIBUTE_NOT_AFTER, certificate.not_after.to_rfc3339());
    }
    chain.push(in_range);

    // Intermediate CA certificates.
    let mut ca_revoked = ConstraintItem::new(
        MessageTag::BbbXcvIicr,
        level(ConstraintId::CaCertificatesNotRevoked),
        Indication::Indeterminate(SubIndication::RevokedCaNoPoe),
        || revoked_ca(ctx, &path).is_none(),
    );
    if let Some((ca, revoked_at)) = revoked_ca(ctx, &path) {
        ca_revoked = ca_revoked
            .with_attribute(ATTRIBUTE_CERTIFICATE, ca.id.clone())
            .with_attribute(ATTRIBUTE_REVOCATION_TIME, revoked_at.to_rfc3339());
    }
    chain.push(ca_revoked);
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvIctivrca,
        level(ConstraintId::CaCertificatesValidityRange),
        Indication::Indeterminate(SubIndication::OutOfBoundsNoPoe),
        || out_of_bounds_ca(ctx, &path).is_none(),
    ));

    // Chain cryptography.
    chain.push(ConstraintItem::new(
        MessageTag::BbbXcvAcccm,
        level(ConstraintId::ChainCryptographicAcceptable),
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailure),
        || non_anchors(ctx, &path).all(|c| ctx.policy.cryptographic.is_acceptable(&c.crypto)),
    ));
    let mut chain_reliable = ConstraintItem::new(
        MessageTag::BbbXcvAccar,
        level(ConstraintId::ChainAlgorithmsReliable),
        Indication::Indeterminate(SubIndication::CryptoConstraintsFailureNoPoe),
        || expired_chain_algorithm(ctx, &path).is_none(),
    );
    if let Some((certificate_id, expiration)) = expired_chain_algorithm(ctx, &path) {
        chain_reliable = chain_reliable
            .with_attribute(ATTRIBUTE_CERTIFICATE, certificate_id)
            .with_attribute(ATTRIBUTE_ALGORITHM, expiration.algorithm)
            .with_attribute(
                ATTRIBUTE_ALGORITHM_EXPIRATION,
                expiration.expiration.to_rfc3339(),
            );
    }
    chain.push(chain_reliable);

    chain.execute()
}

/// Certificates of the path that are not trust anchors.
pub(crate) fn non_anchors<'p, 'a>(
    ctx: &'p ValidationContext<'a>,
    path: &'p CertificatePath<'a>,
) -> impl Iterator<Item = &'a CertificateData> + 'p {
    path.certificates
        .iter()
        .copied()
        .filter(move |c| !ctx.is_trust_anchor(c))
}

fn intermediates<'p, 'a>(
    ctx: &'p ValidationContext<'a>,
    path: &'p CertificatePath<'a>,
) -> impl Iterator<Item = &'a CertificateData> + 'p {
    non_anchors(ctx, path).skip(1)
}

/// First intermediate CA revoked at the validation time, with its revocation time.
pub(crate) fn revoked_ca<'a>(
    ctx: &ValidationContext<'a>,
    path: &CertificatePath<'a>,
) -> Option<(&'a CertificateData, DateTime<Utc>)> {
    intermediates(ctx, path).find_map(|ca| {
        ctx.latest_revocation(&ca.id, ctx.validation_time)
            .and_then(|r| r.revocation_time())
            .map(|t| (ca, t))
    })
}

/// First intermediate CA outside its validity range at the validation time.
pub(crate) fn out_of_bounds_ca<'a>(
    ctx: &ValidationContext<'a>,
    path: &CertificatePath<'a>,
) -> Option<&'a CertificateData> {
    intermediates(ctx, path).find(|ca| !ca.is_valid_at(ctx.validation_time))
}

/// First chain certificate signed with an algorithm expired at the validation time.
pub(crate) fn expired_chain_algorithm(
    ctx: &ValidationContext<'_>,
    path: &CertificatePath<'_>,
) -> Option<(String, AlgorithmExpiration)> {
    non_anchors(ctx, path).find_map(|c| {
        ctx.policy
            .cryptographic
            .expiration_of(&c.crypto)
            .filter(|e| e.expiration <= ctx.validation_time)
            .map(|e| (c.id.clone(), e))
    })
}
