// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key of a proof-of-existence entry.
///
/// An object and the digest of that object are distinct subjects: a proof over a digest does
/// not prove the object itself until the indirect rule upgrades it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoeSubject(pub [u8; 32]);

impl PoeSubject {
    pub fn object(object_id: &str) -> Self {
        sha256_domain_separated(b"AdES.Validation/Poe/object", &[object_id.as_bytes()])
    }

    pub fn digest(digest_algorithm: &str, object_id: &str) -> Self {
        sha256_domain_separated(
            b"AdES.Validation/Poe/digest",
            &[digest_algorithm.as_bytes(), object_id.as_bytes()],
        )
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PoeSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoeSubject({})", self.to_hex())
    }
}

impl Serialize for PoeSubject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Hashes `domain`, a separator, then every part behind its big-endian length.
fn sha256_domain_separated(domain: &[u8], parts: &[&[u8]]) -> PoeSubject {
    let hasher = parts.iter().fold(
        Sha256::new().chain_update(domain).chain_update([0u8]),
        |hasher, part| {
            hasher
                .chain_update((part.len() as u64).to_be_bytes())
                .chain_update(part)
        },
    );
    let mut subject = [0u8; 32];
    subject.copy_from_slice(&hasher.finalize());
    PoeSubject(subject)
}
