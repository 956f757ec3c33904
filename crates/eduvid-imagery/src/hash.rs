//! Stable string hashing for palette choice and fallback seeds.
//!
//! `std`'s `DefaultHasher` is not guaranteed stable across releases, so seeds
//! are derived from a SHA-256 digest instead.

use sha2::{Digest, Sha256};

/// First eight bytes of the SHA-256 digest of `text`, big-endian.
pub fn stable_hash(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Seed for a topic/slot pair.
pub fn slot_seed(topic: &str, slot: usize) -> u64 {
    stable_hash(topic).wrapping_add(slot as u64)
}
