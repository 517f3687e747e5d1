// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resolution of `*_NO_POE` outcomes against a proven time.
//!
//! AdES-T resolves against the best-signature-time and past signature validation resolves
//! against the lowest proof of existence of the signature, once past certificate validation
//! has established a control time. The rules are the same; only the validity-range case
//! differs because a best-signature-time alone does not establish the certificate status.

use crate::bbb::{
    PendingProof, ATTRIBUTE_ALGORITHM, ATTRIBUTE_ALGORITHM_EXPIRATION, ATTRIBUTE_NOT_AFTER,
    ATTRIBUTE_NOT_BEFORE, ATTRIBUTE_REVOCATION_TIME,
};
use ades_validation_chain::{Chain, ConstraintItem, Indication, Level, MessageTag, SubIndication};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceTime {
    BestSignatureTime,
    ControlTime,
}

struct Tags {
    before_revocation: MessageTag,
    after_issuance: MessageTag,
    before_expiration: MessageTag,
    status_established: MessageTag,
    algorithm_reliable: MessageTag,
}

impl ReferenceTime {
    fn tags(self) -> Tags {
        match self {
            ReferenceTime::BestSignatureTime => Tags {
                before_revocation: MessageTag::AdestIrtpbst,
                after_issuance: MessageTag::AdestIbstaidsc,
                before_expiration: MessageTag::AdestIbstbedsc,
                status_established: MessageTag::AdestIscvebst,
                algorithm_reliable: MessageTag::AdestIarbst,
            },
            ReferenceTime::ControlTime => Tags {
                before_revocation: MessageTag::PsvIpoebrt,
                after_issuance: MessageTag::PsvIpoeaid,
                before_expiration: MessageTag::PsvIpoebed,
                status_established: MessageTag::PsvIscvect,
                algorithm_reliable: MessageTag::PsvIpoear,
            },
        }
    }
}

/// Appends the `Fail` items that clear `pending` when `time` proves it harmless.
///
/// An item that does not pass keeps `unresolved`, except for validity ranges where a time
/// before issuance or after expiration is conclusive.
pub(crate) fn push_resolution<'a>(
    chain: &mut Chain<'a>,
    pending: &PendingProof,
    unresolved: Indication,
    time: DateTime<Utc>,
    reference: ReferenceTime,
) {
    let tags = reference.tags();
    match pending {
        PendingProof::Revoked {
            revocation_time, ..
        }
        | PendingProof::RevokedCa {
            revocation_time, ..
        } => {
            let revocation_time = *revocation_time;
            chain.push(
                ConstraintItem::new(tags.before_revocation, Level::Fail, unresolved, move || {
                    time < revocation_time
                })
                .with_attribute(ATTRIBUTE_REVOCATION_TIME, revocation_time.to_rfc3339()),
            );
        }
        PendingProof::OutOfBounds {
            not_before,
            not_after,
            ..
        } => {
            let (not_before, not_after) = (*not_before, *not_after);
            chain.push(
                ConstraintItem::new(
                    tags.after_issuance,
                    Level::Fail,
                    Indication::Invalid(SubIndication::NotYetValid),
                    move || time >= not_before,
                )
                .with_attribute(ATTRIBUTE_NOT_BEFORE, not_before.to_rfc3339()),
            );
            chain.push(
                ConstraintItem::new(
                    tags.before_expiration,
                    Level::Fail,
                    Indication::Invalid(SubIndication::Expired),
                    move || time <= not_after,
                )
                .with_attribute(ATTRIBUTE_NOT_AFTER, not_after.to_rfc3339()),
            );
            chain.push(ConstraintItem::new(
                tags.status_established,
                Level::Fail,
                unresolved,
                move || reference == ReferenceTime::ControlTime,
            ));
        }
        PendingProof::Crypto {
            algorithm,
            expiration,
            ..
        } => {
            let expiration = *expiration;
            chain.push(
                ConstraintItem::new(tags.algorithm_reliable, Level::Fail, unresolved, move || {
                    expiration >= time
                })
                .with_attribute(ATTRIBUTE_ALGORITHM, algorithm.clone())
                .with_attribute(ATTRIBUTE_ALGORITHM_EXPIRATION, expiration.to_rfc3339()),
            );
        }
    }
}
