//! The cache digest container and the set operations built on it.
//!
//! Wire format:
//!
//! ```text
//! byte 0   N_log2
//! byte 1   P_log2
//! byte 2.. Golomb-Rice coded gaps between sorted keys, padded with 1-bits
//! ```
//!
//! There is no key count; the stream ends with the buffer.

use crate::bits::{BitReader, BitWriter};
use crate::config::DigestConfig;
use crate::error::{DecodeError, DigestError, Result};
use crate::golomb::GolombRice;
use crate::key::{derive_key, domain_exponent, KeyBits};

const HEADER_FIELD_BITS: u32 = 8;
const HEADER_LEN: usize = 2;

/// Outcome of offering one identifier to [`CacheDigest::push`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushVerdict {
    /// The key was already present; the client probably has the resource.
    AlreadyCached,
    /// The key was absent and has now been added.
    NotCached,
}

impl PushVerdict {
    /// Whether the resource should be pushed to the client.
    pub fn should_push(self) -> bool {
        self == PushVerdict::NotCached
    }
}

/// A Golomb-coded set of identifier keys.
///
/// Keys are always sorted ascending. Membership answers may be false
/// positives but never false negatives for identifiers that were added
/// under the same parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheDigest {
    n_log2: u8,
    codec: GolombRice,
    key_bits: KeyBits,
    keys: Vec<u64>,
    max_keys: usize,
}

fn parameters(n_log2: u8, p_log2: u8) -> Option<(KeyBits, GolombRice)> {
    Some((KeyBits::new(n_log2, p_log2)?, GolombRice::new(p_log2)?))
}

impl CacheDigest {
    /// Build a digest over `identifiers`.
    ///
    /// `N_log2` is sized from the number of identifiers and `P_log2` comes
    /// from `config`.
    pub fn build<I>(identifiers: I, config: &DigestConfig) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let identifiers: Vec<I::Item> = identifiers.into_iter().collect();
        if identifiers.len() > config.max_keys {
            return Err(DigestError::CapacityExceeded {
                capacity: config.max_keys,
            });
        }

        let n_log2 = domain_exponent(identifiers.len());
        let (key_bits, codec) =
            parameters(n_log2, config.p_log2).ok_or(DigestError::InvalidParameters {
                n_log2,
                p_log2: config.p_log2,
            })?;

        let mut keys: Vec<u64> = identifiers
            .iter()
            .map(|id| derive_key(id.as_ref(), key_bits))
            .collect();
        keys.sort_unstable();

        Ok(Self {
            n_log2,
            codec,
            key_bits,
            keys,
            max_keys: config.max_keys,
        })
    }

    /// Build a digest over `identifiers` and encode it.
    pub fn build_and_encode<I>(identifiers: I, config: &DigestConfig) -> Result<Vec<u8>>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        Self::build(identifiers, config)?.encode(config.max_encoded_len)
    }

    /// Encode into at most `max_encoded_len` bytes.
    ///
    /// Fails with [`DigestError::EncodeOverflow`] if the digest does not fit;
    /// no partial output is returned.
    pub fn encode(&self, max_encoded_len: usize) -> Result<Vec<u8>> {
        let overflow = DigestError::EncodeOverflow {
            capacity: max_encoded_len,
        };
        let len = self.encoded_len();
        if len > max_encoded_len {
            return Err(overflow);
        }

        let mut buf = vec![0u8; len];
        let mut writer = BitWriter::new(&mut buf);
        self.write_to(&mut writer).map_err(|err| match err {
            DigestError::CapacityExceeded { .. } => overflow,
            other => other,
        })?;
        let written = writer.finish();
        buf.truncate(written);
        Ok(buf)
    }

    /// Exact size of [`CacheDigest::encode`] output in bytes.
    ///
    /// Saturates at `usize::MAX` for digests that could never be encoded.
    pub fn encoded_len(&self) -> usize {
        let header_bits = u64::from(2 * HEADER_FIELD_BITS);
        let bits = header_bits.saturating_add(self.codec.encoded_bits(&self.keys));
        usize::try_from(bits.div_ceil(8)).unwrap_or(usize::MAX)
    }

    fn write_to(&self, writer: &mut BitWriter<'_>) -> Result<()> {
        writer.write_fixed(u64::from(self.n_log2), HEADER_FIELD_BITS)?;
        writer.write_fixed(u64::from(self.codec.p_log2()), HEADER_FIELD_BITS)?;
        self.codec.encode(&self.keys, writer)
    }

    /// Decode an encoded digest.
    pub fn decode(bytes: &[u8], config: &DigestConfig) -> Result<Self> {
        match bytes.len() {
            0 => return Err(DecodeError::Empty.into()),
            len if len < HEADER_LEN => return Err(DecodeError::MissingHeader { len }.into()),
            len if len > config.max_encoded_len => {
                return Err(DecodeError::InputTooLarge {
                    len,
                    max: config.max_encoded_len,
                }
                .into())
            }
            _ => {}
        }

        let mut reader = BitReader::new(bytes);
        let n_log2 = read_header_field(&mut reader)?;
        let p_log2 = read_header_field(&mut reader)?;
        let (key_bits, codec) =
            parameters(n_log2, p_log2).ok_or(DecodeError::InvalidHeader { n_log2, p_log2 })?;

        let keys = codec
            .decode(&mut reader, config.max_keys)
            .map_err(truncation_as_decode_error)?;
        if let Some(&key) = keys.last() {
            if !key_bits.fits(key) {
                return Err(DecodeError::KeyOutOfRange {
                    key,
                    key_bits: key_bits.get(),
                }
                .into());
            }
        }

        Ok(Self {
            n_log2,
            codec,
            key_bits,
            keys,
            max_keys: config.max_keys,
        })
    }

    /// Domain size exponent.
    pub fn n_log2(&self) -> u8 {
        self.n_log2
    }

    /// Golomb-Rice divisor exponent.
    pub fn p_log2(&self) -> u8 {
        self.codec.p_log2()
    }

    /// Width of every key in this digest.
    pub fn key_bits(&self) -> KeyBits {
        self.key_bits
    }

    /// Sorted keys.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Number of keys, counting duplicates.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the digest holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key capacity enforced by [`CacheDigest::push`].
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Key for `identifier` under this digest's parameters.
    pub fn key_for(&self, identifier: impl AsRef<[u8]>) -> u64 {
        derive_key(identifier.as_ref(), self.key_bits)
    }

    /// Whether `identifier` is probably in the set.
    pub fn contains(&self, identifier: impl AsRef<[u8]>) -> bool {
        self.keys.binary_search(&self.key_for(identifier)).is_ok()
    }

    /// Membership of each identifier, in input order.
    pub fn check<I>(&self, identifiers: I) -> Vec<bool>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        identifiers.into_iter().map(|id| self.contains(id)).collect()
    }

    /// Offer identifiers in order, adding each absent key.
    ///
    /// Later identifiers see keys added for earlier ones in the same call.
    /// If the digest would grow past its key capacity the call fails with
    /// [`DigestError::CapacityExceeded`] and every key it added is removed
    /// again.
    pub fn push<I>(&mut self, identifiers: I) -> Result<Vec<PushVerdict>>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut verdicts = Vec::new();
        let mut added = Vec::new();
        for id in identifiers {
            let key = self.key_for(id);
            match self.keys.binary_search(&key) {
                Ok(_) => verdicts.push(PushVerdict::AlreadyCached),
                Err(pos) => {
                    if self.keys.len() >= self.max_keys {
                        self.remove_added(&added);
                        return Err(DigestError::CapacityExceeded {
                            capacity: self.max_keys,
                        });
                    }
                    self.keys.insert(pos, key);
                    added.push(key);
                    verdicts.push(PushVerdict::NotCached);
                }
            }
        }
        Ok(verdicts)
    }

    // Each added key was absent before the push, so it occurs exactly once.
    fn remove_added(&mut self, added: &[u64]) {
        for key in added {
            if let Ok(pos) = self.keys.binary_search(key) {
                self.keys.remove(pos);
            }
        }
    }
}

fn read_header_field(reader: &mut BitReader<'_>) -> Result<u8> {
    let value = reader
        .read_fixed(HEADER_FIELD_BITS)
        .map_err(truncation_as_decode_error)?;
    Ok(value as u8)
}

fn truncation_as_decode_error(err: DigestError) -> DigestError {
    match err {
        DigestError::TruncatedInput { bit_offset } => DecodeError::Truncated { bit_offset }.into(),
        other => other,
    }
}
