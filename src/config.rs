//! Digest parameters and capacity limits.

/// Default Golomb-Rice divisor exponent.
pub const DEFAULT_P_LOG2: u8 = 8;

/// Default bound on an encoded digest, in bytes.
pub const DEFAULT_MAX_ENCODED_LEN: usize = 1024;

/// Default bound on the number of keys held by a digest.
pub const DEFAULT_MAX_KEYS: usize = 1024;

/// Settings for building and decoding digests.
///
/// The two limits bound memory use against oversized or malformed input;
/// exceeding either is an error, never a silent truncation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestConfig {
    /// Golomb-Rice divisor exponent used when building.
    pub p_log2: u8,
    /// Largest encoded digest accepted or produced, in bytes.
    pub max_encoded_len: usize,
    /// Largest number of keys a digest may hold.
    pub max_keys: usize,
}

impl DigestConfig {
    /// Configuration with the default divisor and limits.
    pub fn new() -> Self {
        Self {
            p_log2: DEFAULT_P_LOG2,
            max_encoded_len: DEFAULT_MAX_ENCODED_LEN,
            max_keys: DEFAULT_MAX_KEYS,
        }
    }

    /// Use divisor `2^p_log2`.
    ///
    /// Larger values lower the false-positive rate at roughly one extra bit
    /// per key.
    pub fn with_p_log2(mut self, p_log2: u8) -> Self {
        self.p_log2 = p_log2;
        self
    }

    /// Bound the encoded size.
    pub fn with_max_encoded_len(mut self, max_encoded_len: usize) -> Self {
        self.max_encoded_len = max_encoded_len;
        self
    }

    /// Bound the key count.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self::new()
    }
}
