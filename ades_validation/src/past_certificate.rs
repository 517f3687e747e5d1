// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Past certificate validation and control-time sliding.
//!
//! The control time starts at the validation time and slides down the certification path,
//! from the certificate closest to the trust anchor to the signing certificate. Each step
//! requires revocation data issued before the control time and proofs that both the
//! certificate and that revocation data existed at it, then moves the control time to the
//! earliest point the step's evidence is still trustworthy.

use crate::bbb::{ATTRIBUTE_CERTIFICATE, ATTRIBUTE_REVOCATION};
use crate::context::ValidationContext;
use crate::diagnostic::{CertificateData, RevocationData, TokenData};
use crate::poe::PoeStore;
use ades_validation_chain::conclusion::ATTRIBUTE_CONTROL_TIME;
use ades_validation_chain::{
    Chain, ChainResult, Conclusion, ConstraintItem, Indication, Level, MessageTag, SubIndication,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const CHAIN_NAME_PCV: &str = "PastCertificateValidation";
pub const CHAIN_NAME_CONTROL_TIME_SLIDING: &str = "ControlTimeSliding";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PastCertificateResult {
    pub chain: ChainResult,
    /// One chain per sliding step, anchor side first.
    pub sliding: Vec<ChainResult>,
    pub conclusion: Conclusion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<DateTime<Utc>>,
}

impl PastCertificateResult {
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
    token: &TokenData,
) -> PastCertificateResult {
    let path = ctx.certificate_path(token);
    let non_anchors: Vec<&CertificateData> = path
        .certificates
        .iter()
        .copied()
        .filter(|c| !ctx.is_trust_anchor(c))
        .collect();
    let latest_start = path.certificates.iter().map(|c| c.not_before).max();
    let earliest_end = path.certificates.iter().map(|c| c.not_after).min();

    let chain = Chain::new(CHAIN_NAME_PCV)
        .with(ConstraintItem::new(
            MessageTag::PcvIccbta,
            Level::Fail,
            Indication::Indeterminate(SubIndication::NoCertificateChainFound),
            || path.anchored,
        ))
        .with(ConstraintItem::new(
            MessageTag::PcvIvrie,
            Level::Fail,
            Indication::Indeterminate(SubIndication::CertificateChainGeneralFailure),
            move || matches!((latest_start, earliest_end), (Some(start), Some(end)) if start <= end),
        ))
        .with(ConstraintItem::new(
            MessageTag::PcvIcsi,
            Level::Fail,
            Indication::Indeterminate(SubIndication::CertificateChainGeneralFailure),
            || non_anchors.iter().all(|c| c.signature_intact),
        ))
        .execute();

    if !chain.is_valid() {
        let conclusion = chain.conclusion.clone();
        return PastCertificateResult {
            chain,
            sliding: Vec::new(),
            conclusion,
            control_time: None,
        };
    }

    let mut control_time = ctx.validation_time;
    let mut sliding = Vec::with_capacity(non_anchors.len());
    for certificate in non_anchors.iter().rev() {
        let (step, next) = slide(ctx, store, certificate, control_time);
        let failed = (!step.is_valid()).then(|| step.conclusion.clone());
        sliding.push(step);
        if let Some(conclusion) = failed {
            debug!(token = %token.id, certificate = %certificate.id, indication = %conclusion.indication, "control-time sliding stopped");
            return PastCertificateResult {
                chain,
                sliding,
                conclusion,
                control_time: None,
            };
        }
        control_time = next;
    }

    debug!(token = %token.id, %control_time, "control time established");
    PastCertificateResult {
        chain,
        sliding,
        conclusion: Conclusion::valid(),
        control_time: Some(control_time),
    }
}

/// One sliding step for `certificate`; returns the step chain and the next control time.
fn slide(
    ctx: &ValidationContext<'_>,
    store: &PoeStore,
    certificate: &CertificateData,
    control_time: DateTime<Utc>,
) -> (ChainResult, DateTime<Utc>) {
    let candidates: Vec<&RevocationData> =
        ctx.diagnostic.revocations_for(&certificate.id).collect();
    let chosen = candidates
        .iter()
        .copied()
        .filter(|r| certificate.is_valid_at(r.issuing_time) && r.issuing_time <= control_time)
        .max_by(|a, b| a.issuing_time.cmp(&b.issuing_time).then_with(|| b.id.cmp(&a.id)));
    let no_poe = Indication::Indeterminate(SubIndication::NoPoe);

    let step = Chain::new(CHAIN_NAME_CONTROL_TIME_SLIDING)
        .with(
            ConstraintItem::new(MessageTag::CtsDrie, Level::Fail, no_poe, || {
                !candidates.is_empty()
            })
            .with_attribute(ATTRIBUTE_CERTIFICATE, certificate.id.clone())
            .with_attribute(ATTRIBUTE_CONTROL_TIME, control_time.to_rfc3339()),
        )
        .with(ConstraintItem::new(
            MessageTag::CtsIriiwcv,
            Level::Fail,
            no_poe,
            || {
                candidates
                    .iter()
                    .any(|r| certificate.is_valid_at(r.issuing_time))
            },
        ))
        .with(ConstraintItem::new(
            MessageTag::CtsIriibct,
            Level::Fail,
            no_poe,
            || chosen.is_some(),
        ))
        .with(ConstraintItem::new(
            MessageTag::CtsDpoebct,
            Level::Fail,
            no_poe,
            || store.has_poe_at_or_before(&certificate.id, control_time),
        ))
        .with({
            let item = ConstraintItem::new(MessageTag::CtsDrpoebct, Level::Fail, no_poe, || {
                chosen.map_or(false, |r| store.has_poe_at_or_before(&r.id, control_time))
            });
            match chosen {
                Some(r) => item.with_attribute(ATTRIBUTE_REVOCATION, r.id.clone()),
                None => item,
            }
        })
        .execute();

    let Some(revocation) = chosen.filter(|_| step.is_valid()) else {
        return (step, control_time);
    };

    let mut next = control_time;
    if let Some(revoked_at) = revocation.revocation_time() {
        next = next.min(revoked_at);
    } else if let Some(freshness) = ctx.policy.max_revocation_freshness() {
        if control_time - revocation.issuing_time > freshness {
            next = next.min(revocation.issuing_time);
        }
    }
    for crypto in [&certificate.crypto, &revocation.crypto] {
        if let Some(expiration) = ctx.policy.cryptographic.expiration_of(crypto) {
            next = next.min(expiration.expiration);
        }
    }
    (step, next)
}
