//! Golomb-Rice coding of sorted key sequences.
//!
//! Keys are coded as gaps from their predecessor (the first key from 0).
//! Each gap is split by the divisor `2^p_log2` into a unary quotient and a
//! `p_log2`-bit remainder. Duplicate keys are allowed and produce zero gaps.

use crate::bits::{BitReader, BitWriter};
use crate::error::{DecodeError, DigestError, Result};

/// Golomb-Rice codec with a fixed remainder width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GolombRice {
    p_log2: u8,
}

impl GolombRice {
    /// Create a codec with divisor `2^p_log2`.
    ///
    /// Returns `None` for `p_log2 >= 64`, which cannot address a 64-bit key.
    pub fn new(p_log2: u8) -> Option<Self> {
        (p_log2 < 64).then_some(Self { p_log2 })
    }

    /// Remainder width in bits.
    pub fn p_log2(&self) -> u8 {
        self.p_log2
    }

    fn width(&self) -> u32 {
        u32::from(self.p_log2)
    }

    fn split(&self, delta: u64) -> (u64, u64) {
        let mask = (1u64 << self.p_log2) - 1;
        (delta >> self.p_log2, delta & mask)
    }

    fn join(&self, quotient: u64, remainder: u64) -> Option<u64> {
        if quotient > u64::MAX >> self.p_log2 {
            return None;
        }
        Some((quotient << self.p_log2) | remainder)
    }

    /// Number of bits [`GolombRice::encode`] writes for ascending `keys`.
    ///
    /// Saturates at `u64::MAX`.
    pub fn encoded_bits(&self, keys: &[u64]) -> u64 {
        let pair_overhead = u64::from(self.p_log2) + 1;
        let mut previous = 0u64;
        let mut bits = 0u64;
        for &key in keys {
            let (quotient, _) = self.split(key.saturating_sub(previous));
            bits = bits.saturating_add(quotient).saturating_add(pair_overhead);
            previous = key;
        }
        bits
    }

    /// Encode ascending `keys` into `writer`.
    ///
    /// On error the writer holds a partial stream that must be discarded.
    pub fn encode(&self, keys: &[u64], writer: &mut BitWriter<'_>) -> Result<()> {
        let mut previous = 0u64;
        for (index, &key) in keys.iter().enumerate() {
            if key < previous {
                return Err(DigestError::Unsorted {
                    index,
                    previous,
                    current: key,
                });
            }
            let (quotient, remainder) = self.split(key - previous);
            writer.write_unary(quotient)?;
            writer.write_fixed(remainder, self.width())?;
            previous = key;
        }
        Ok(())
    }

    /// Decode keys until the reader runs out of input.
    ///
    /// Running out inside a unary quotient marks the end of the stream:
    /// it covers both an exact byte boundary and the one-bit padding left by
    /// [`BitWriter::finish`]. Running out inside a remainder is
    /// [`DigestError::TruncatedInput`]. A complete pair beyond `max_keys`
    /// fails with [`DecodeError::TooManyKeys`].
    pub fn decode(&self, reader: &mut BitReader<'_>, max_keys: usize) -> Result<Vec<u64>> {
        let mut keys = Vec::new();
        let mut sum = 0u64;
        loop {
            let quotient = match reader.read_unary() {
                Ok(quotient) => quotient,
                Err(DigestError::TruncatedInput { .. }) => break,
                Err(err) => return Err(err),
            };
            let remainder = reader.read_fixed(self.width())?;
            if keys.len() == max_keys {
                return Err(DecodeError::TooManyKeys { max_keys }.into());
            }
            let delta = self
                .join(quotient, remainder)
                .ok_or(DecodeError::KeyOverflow)?;
            sum = sum.checked_add(delta).ok_or(DecodeError::KeyOverflow)?;
            keys.push(sum);
        }
        Ok(keys)
    }
}
