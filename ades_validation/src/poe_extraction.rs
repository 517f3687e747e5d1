// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Proof-of-existence extraction from timestamp tokens.
//!
//! What a timestamp proves depends on what it covers:
//! - signature timestamp: the signature value
//! - validation-data timestamp: the signature value and the referenced validation data
//! - refs-only timestamp: the referenced validation data
//! - archive timestamp: everything in the signature that precedes it
//!
//! Content timestamps predate the signature and prove nothing about it.

use crate::context::ValidationContext;
use crate::diagnostic::{SignatureData, TimestampData, TimestampKind, TokenData};
use crate::poe::{PoeOrigin, PoeStore};
use chrono::{DateTime, Utc};
use tracing::debug;

/// The timestamp's own digest algorithm was still reliable when it was produced.
pub fn is_extractable(ctx: &ValidationContext<'_>, timestamp: &TimestampData) -> bool {
    ctx.policy
        .cryptographic
        .digest_reliable_at(&timestamp.token.crypto.digest_algorithm, timestamp.production_time)
}

/// Registers every proof `timestamp` gives; returns how many store entries changed.
///
/// Callers decide beforehand whether the timestamp can be trusted, see [`is_extractable`].
pub fn extract(
    ctx: &ValidationContext<'_>,
    store: &PoeStore,
    signature: &SignatureData,
    timestamp: &TimestampData,
) -> usize {
    let mut extraction = Extraction {
        ctx,
        store,
        origin: PoeOrigin::Timestamp(timestamp.id().to_string()),
        time: timestamp.production_time,
        changed: 0,
    };

    match timestamp.kind {
        TimestampKind::Content => {}
        TimestampKind::Signature => extraction.object(signature.id()),
        TimestampKind::ValidationData => {
            extraction.object(signature.id());
            extraction.references(timestamp);
        }
        TimestampKind::RefsOnly => extraction.references(timestamp),
        TimestampKind::Archive => extraction.archive(signature, timestamp),
    }
    let changed = extraction.changed;

    debug!(
        signature = %signature.id(),
        timestamp = %timestamp.id(),
        kind = timestamp.kind.as_str(),
        changed,
        "proofs of existence extracted"
    );
    changed
}

struct Extraction<'c, 's> {
    ctx: &'c ValidationContext<'c>,
    store: &'s PoeStore,
    origin: PoeOrigin,
    time: DateTime<Utc>,
    changed: usize,
}

impl Extraction<'_, '_> {
    fn object(&mut self, object_id: &str) {
        if self.store.add_object(object_id, self.time, self.origin.clone()) {
            self.changed += 1;
        }
    }

    fn token(&mut self, token: &TokenData) {
        self.object(&token.id);
        if let Some(signer) = &token.signing_certificate {
            self.object(&signer.certificate_id);
        }
        for id in &token.certificate_chain {
            self.object(id);
        }
    }

    /// Digest proofs for every reference, upgraded to object proofs when the digest
    /// algorithm outlives the later proof already held for the object.
    fn references(&mut self, timestamp: &TimestampData) {
        for reference in &timestamp.references {
            let algorithm = reference.digest_algorithm.as_str();
            let object_id = reference.object_id.as_str();
            if self
                .store
                .add_digest(algorithm, object_id, self.time, self.origin.clone())
            {
                self.changed += 1;
            }

            let Some(existing) = self.store.lowest_for_object(object_id) else {
                continue;
            };
            if existing > self.time
                && self
                    .ctx
                    .policy
                    .cryptographic
                    .digest_reliable_until(algorithm, existing)
            {
                self.object(object_id);
            }
        }
    }

    fn archive(&mut self, signature: &SignatureData, archive: &TimestampData) {
        for id in &signature.signed_data_objects {
            self.object(id);
        }
        self.token(&signature.token);
        for id in &signature.certificate_ids {
            self.object(id);
        }
        for id in &signature.revocation_ids {
            self.object(id);
        }

        // Attributes after this archive timestamp are not covered by it.
        for covered in signature
            .timestamps
            .iter()
            .take_while(|t| t.id() != archive.id())
        {
            self.token(&covered.token);
            for reference in &covered.references {
                self.object(&reference.object_id);
            }
        }
    }
}
