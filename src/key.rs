//! Key derivation.
//!
//! An identifier (typically a URL) is hashed with SHA-256 and the first
//! eight digest bytes, read big-endian, are truncated to their top
//! `num_bits` bits. Distinct identifiers may collide; a digest never tries
//! to resolve collisions, which is where its false positives come from.

use sha2::{Digest, Sha256};

/// Width of a derived key in bits, always within `1..=64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyBits(u8);

impl KeyBits {
    /// Key width for a digest with the given parameters.
    ///
    /// Returns `None` unless `n_log2 + p_log2` lies within `1..=64`.
    pub fn new(n_log2: u8, p_log2: u8) -> Option<Self> {
        Self::from_width(u32::from(n_log2) + u32::from(p_log2))
    }

    /// Key width from a raw bit count.
    pub fn from_width(bits: u32) -> Option<Self> {
        match bits {
            1..=64 => Some(Self(bits as u8)),
            _ => None,
        }
    }

    /// Number of bits.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether `key` lies in `[0, 2^bits)`.
    pub fn fits(self, key: u64) -> bool {
        self.0 == 64 || key >> self.0 == 0
    }
}

/// Derive the key for `identifier`.
///
/// Deterministic across calls and platforms.
pub fn derive_key(identifier: &[u8], bits: KeyBits) -> u64 {
    let digest = Sha256::digest(identifier);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) >> (64 - u32::from(bits.get()))
}

/// Exponent `N_log2` for a digest holding `count` keys.
///
/// `1` for `count <= 2`, otherwise the bit length of `count - 1`.
pub fn domain_exponent(count: usize) -> u8 {
    if count <= 2 {
        return 1;
    }
    (usize::BITS - (count - 1).leading_zeros()) as u8
}
