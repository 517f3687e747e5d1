// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation process for signatures with time (AdES-T).
//!
//! The best-signature-time starts at the validation time and only moves earlier, each time a
//! conclusive timestamp produced before it is accepted. It is then used to resolve the
//! outcomes that basic validation could not decide without a proof of existence.

use crate::bbb::{BbbResult, PendingProof};
use crate::context::ValidationContext;
use crate::diagnostic::{SignatureData, TimestampData, TimestampKind};
use crate::policy::{ConstraintId, TokenContext};
use crate::resolution::{push_resolution, ReferenceTime};
use crate::timestamp_validation::TimestampResults;
use ades_validation_chain::conclusion::ATTRIBUTE_BEST_SIGNATURE_TIME;
use ades_validation_chain::{
    Chain, ChainResult, Conclusion, ConstraintItem, Indication, Level, Message, MessageTag,
    SubIndication,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

pub const CHAIN_NAME_ADEST: &str = "AdESTValidation";
pub const CHAIN_NAME_CONTENT_TIMESTAMPS: &str = "ContentTimestampsAdESTValidation";
pub const CHAIN_NAME_TIMESTAMP_ACCEPTANCE: &str = "TimestampAcceptance";

const ATTRIBUTE_TIMESTAMP: &str = "Timestamp";

/// Basic validation outcomes a timestamp may still turn into a valid signature.
const RESOLVABLE_BASIC: [SubIndication; 3] = [
    SubIndication::CryptoConstraintsFailureNoPoe,
    SubIndication::OutOfBoundsNoPoe,
    SubIndication::RevokedNoPoe,
];

/// Timestamp outcomes that still prove a production time.
const CONCLUSIVE_TIMESTAMP: [SubIndication; 4] = [
    SubIndication::CryptoConstraintsFailureNoPoe,
    SubIndication::OutOfBoundsNoPoe,
    SubIndication::RevokedNoPoe,
    SubIndication::RevokedCaNoPoe,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPresence {
    /// The signature carries no timestamp of the processed kinds.
    Absent,
    NoneAccepted,
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampAcceptance {
    pub timestamp_id: String,
    pub chain: ChainResult,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdestResult {
    pub chain: ChainResult,
    pub best_signature_time: DateTime<Utc>,
    pub presence: TimestampPresence,
    pub timestamps: Vec<TimestampAcceptance>,
    /// Timestamps that moved the best-signature-time, in processing order.
    pub accepted_timestamps: Vec<String>,
}

impl AdestResult {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    ContentTimestamps,
    SignatureTimestamps,
}

impl Scope {
    fn includes(self, kind: TimestampKind) -> bool {
        match self {
            Scope::ContentTimestamps => kind == TimestampKind::Content,
            Scope::SignatureTimestamps => kind != TimestampKind::Content,
        }
    }
}

/// AdES-T over the non-content timestamps of `signature`.
pub fn validate(
    ctx: &ValidationContext<'_>,
    signature: &SignatureData,
    basic: &Conclusion,
    pending: Option<&PendingProof>,
    timestamps: &TimestampResults,
) -> AdestResult {
    run(
        ctx,
        signature,
        basic.indication,
        pending,
        timestamps,
        Scope::SignatureTimestamps,
    )
}

/// AdES-T restricted to content timestamps.
///
/// Only establishes the best-signature-time those timestamps prove; it never resolves
/// pending outcomes nor checks ordering or delays.
pub fn validate_content_timestamps(
    ctx: &ValidationContext<'_>,
    signature: &SignatureData,
    timestamps: &TimestampResults,
) -> AdestResult {
    run(
        ctx,
        signature,
        Indication::Valid,
        None,
        timestamps,
        Scope::ContentTimestamps,
    )
}

fn run(
    ctx: &ValidationContext<'_>,
    signature: &SignatureData,
    basic: Indication,
    pending: Option<&PendingProof>,
    timestamps: &TimestampResults,
    scope: Scope,
) -> AdestResult {
    let acceptable = basic.is_valid() || basic.is_indeterminate_with(&RESOLVABLE_BASIC);
    let candidates: Vec<&TimestampData> = signature
        .timestamps
        .iter()
        .filter(|t| scope.includes(t.kind))
        .collect();

    let mut best_signature_time = ctx.validation_time;
    let mut outcomes = Vec::new();
    let mut accepted_timestamps = Vec::new();
    if acceptable {
        for timestamp in &candidates {
            let chain = accept_timestamp(timestamp, timestamps.get(timestamp.id()), best_signature_time);
            let accepted = chain.is_valid();
            if accepted {
                debug!(
                    signature = %signature.id(),
                    timestamp = %timestamp.id(),
                    time = %timestamp.production_time,
                    "best-signature-time lowered"
                );
                best_signature_time = timestamp.production_time;
                accepted_timestamps.push(timestamp.id().to_string());
            }
            outcomes.push(TimestampAcceptance {
                timestamp_id: timestamp.id().to_string(),
                chain,
                accepted,
            });
        }
    }

    let presence = if candidates.is_empty() {
        TimestampPresence::Absent
    } else if accepted_timestamps.is_empty() {
        TimestampPresence::NoneAccepted
    } else {
        TimestampPresence::Accepted
    };

    // A signature without any timestamp never has a best-signature-time of its own; the
    // policy only decides whether unusable timestamps are tolerated.
    let (title, usable_required) = match scope {
        Scope::ContentTimestamps => (CHAIN_NAME_CONTENT_TIMESTAMPS, Level::Fail),
        Scope::SignatureTimestamps => (
            CHAIN_NAME_ADEST,
            ctx.level(ConstraintId::TimestampRequired, TokenContext::Signature),
        ),
    };

    let mut chain = Chain::new(title);
    chain.push(ConstraintItem::new(
        MessageTag::AdestRobvpiic,
        Level::Fail,
        basic,
        move || acceptable,
    ));
    chain.push(ConstraintItem::new(
        MessageTag::AdestItsp,
        Level::Fail,
        Indication::Indeterminate(SubIndication::NoTimestamp),
        move || presence != TimestampPresence::Absent,
    ));
    chain.push(ConstraintItem::new(
        MessageTag::AdestIvtsp,
        usable_required,
        Indication::Indeterminate(SubIndication::NoValidTimestamp),
        move || presence == TimestampPresence::Accepted,
    ));

    if scope == Scope::SignatureTimestamps {
        if !basic.is_valid() {
            match pending {
                Some(pending) => push_resolution(
                    &mut chain,
                    pending,
                    basic,
                    best_signature_time,
                    ReferenceTime::BestSignatureTime,
                ),
                // Without a pending proof the basic outcome stands.
                None => {
                    chain.push(ConstraintItem::new(
                        MessageTag::AdestRobvpiic,
                        Level::Fail,
                        basic,
                        || false,
                    ));
                }
            }
        }
        push_coherence(ctx, &mut chain, signature, timestamps);
        push_delay(ctx, &mut chain, signature, best_signature_time);
    }

    let mut chain = chain.execute();
    if chain.is_valid() {
        chain.conclusion.infos.push(
            Message::from_tag(MessageTag::AdestBstr)
                .with_attribute(ATTRIBUTE_BEST_SIGNATURE_TIME, best_signature_time.to_rfc3339()),
        );
    }
    debug!(signature = %signature.id(), indication = %chain.indication(), %best_signature_time, "AdES-T validation done");

    AdestResult {
        chain,
        best_signature_time,
        presence,
        timestamps: outcomes,
        accepted_timestamps,
    }
}

fn accept_timestamp(
    timestamp: &TimestampData,
    bbb: Option<&BbbResult>,
    best_signature_time: DateTime<Utc>,
) -> ChainResult {
    let Some(bbb) = bbb else {
        return ChainResult::from_indication(
            CHAIN_NAME_TIMESTAMP_ACCEPTANCE,
            Indication::Indeterminate(SubIndication::NoValidTimestamp),
        );
    };
    let bbb_indication = bbb.indication();
    let production_time = timestamp.production_time;

    Chain::new(CHAIN_NAME_TIMESTAMP_ACCEPTANCE)
        .with(
            ConstraintItem::new(
                MessageTag::AdestImidf,
                Level::Fail,
                Indication::Indeterminate(SubIndication::SignedDataNotFound),
                || timestamp.message_imprint_found,
            )
            .with_attribute(ATTRIBUTE_TIMESTAMP, timestamp.id()),
        )
        .with(ConstraintItem::new(
            MessageTag::AdestImivc,
            Level::Fail,
            Indication::Invalid(SubIndication::HashFailure),
            || timestamp.message_imprint_intact,
        ))
        .with(ConstraintItem::new(
            MessageTag::AdestItvpc,
            Level::Fail,
            bbb_indication,
            move || {
                bbb_indication.is_valid() || bbb_indication.is_indeterminate_with(&CONCLUSIVE_TIMESTAMP)
            },
        ))
        .with(
            ConstraintItem::new(
                MessageTag::AdestIstptdabst,
                Level::Fail,
                Indication::Indeterminate(SubIndication::NoValidTimestamp),
                move || production_time < best_signature_time,
            )
            .with_attribute(ATTRIBUTE_BEST_SIGNATURE_TIME, best_signature_time.to_rfc3339()),
        )
        .execute()
}

/// Latest of `before` strictly precedes earliest of `after`; vacuous when either is empty.
fn ordered(before: &[DateTime<Utc>], after: &[DateTime<Utc>]) -> bool {
    match (before.iter().max(), after.iter().min()) {
        (Some(latest), Some(earliest)) => latest < earliest,
        _ => true,
    }
}

fn push_coherence<'a>(
    ctx: &ValidationContext<'_>,
    chain: &mut Chain<'a>,
    signature: &SignatureData,
    timestamps: &TimestampResults,
) {
    // Only timestamps whose building blocks concluded valid take part in ordering.
    let times = |kinds: &[TimestampKind]| -> Vec<DateTime<Utc>> {
        signature
            .timestamps
            .iter()
            .filter(|t| kinds.contains(&t.kind))
            .filter(|t| timestamps.get(t.id()).map_or(false, BbbResult::is_valid))
            .map(|t| t.production_time)
            .collect()
    };
    let content = times(&[TimestampKind::Content]);
    let signature_ts = times(&[TimestampKind::Signature]);
    let validation_data = times(&[TimestampKind::ValidationData, TimestampKind::RefsOnly]);
    let archive = times(&[TimestampKind::Archive]);

    let level = ctx.level(ConstraintId::TimestampCoherence, TokenContext::Signature);
    let failure = Indication::Invalid(SubIndication::TimestampOrderFailure);
    let pairs = [
        (MessageTag::AdestIctsbst, ordered(&content, &signature_ts)),
        (MessageTag::AdestIstbvdt, ordered(&signature_ts, &validation_data)),
        (MessageTag::AdestIstbat, ordered(&signature_ts, &archive)),
        (MessageTag::AdestIvdtbat, ordered(&validation_data, &archive)),
    ];
    for (tag, coherent) in pairs {
        chain.push(ConstraintItem::new(tag, level, failure, move || coherent));
    }
}

fn push_delay<'a>(
    ctx: &ValidationContext<'_>,
    chain: &mut Chain<'a>,
    signature: &SignatureData,
    best_signature_time: DateTime<Utc>,
) {
    let Some(delay) = ctx.policy.timestamp_delay() else {
        return;
    };
    let level = ctx.level(ConstraintId::TimestampDelay, TokenContext::Signature);
    let claimed = signature.claimed_signing_time;

    chain.push(ConstraintItem::new(
        MessageTag::AdestIcstp,
        level,
        Indication::Indeterminate(SubIndication::ClaimedSigningTimeAbsent),
        move || claimed.is_some(),
    ));
    chain.push(
        ConstraintItem::new(
            MessageTag::AdestIstwd,
            level,
            Indication::Invalid(SubIndication::SigConstraintsFailure),
            move || {
                // A deadline beyond the representable range is always met.
                claimed.map_or(false, |c| {
                    c.checked_add_signed(delay)
                        .map_or(true, |deadline| deadline >= best_signature_time)
                })
            },
        )
        .with_attribute(ATTRIBUTE_BEST_SIGNATURE_TIME, best_signature_time.to_rfc3339()),
    );
}
