//! Error types for digest encoding and decoding.

/// Errors produced while building, encoding, decoding or updating a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// A fixed-capacity buffer ran out of room.
    #[error("capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Capacity of the exhausted buffer (bytes for writers, keys for digests).
        capacity: usize,
    },
    /// The bit reader ran past the end of its buffer inside a field.
    #[error("input truncated at bit offset {bit_offset}")]
    TruncatedInput {
        /// Bit position at which the reader hit the end of the buffer.
        bit_offset: usize,
    },
    /// The encoded digest is malformed.
    #[error("failed to decode digest: {0}")]
    Decode(#[source] DecodeError),
    /// The encoded digest does not fit into the output buffer.
    #[error("encoded digest exceeds the {capacity} byte output buffer")]
    EncodeOverflow {
        /// Maximum encoded length in bytes.
        capacity: usize,
    },
    /// `N_log2 + P_log2` is not a usable key width.
    #[error("invalid digest parameters: N_log2={n_log2}, P_log2={p_log2} (key width must be 1..=64 bits)")]
    InvalidParameters {
        /// Domain size exponent.
        n_log2: u8,
        /// Golomb-Rice divisor exponent.
        p_log2: u8,
    },
    /// Keys handed to the codec are not in ascending order.
    #[error("keys must be sorted ascending, found {current} after {previous} at index {index}")]
    Unsorted {
        /// Index of the first out-of-order key.
        index: usize,
        /// Key preceding the offending one.
        previous: u64,
        /// The offending key.
        current: u64,
    },
}

/// Reasons an encoded digest failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No bytes at all.
    #[error("digest is empty")]
    Empty,
    /// Fewer than the two header bytes.
    #[error("digest header is incomplete ({len} byte(s))")]
    MissingHeader {
        /// Number of bytes available.
        len: usize,
    },
    /// Header parameters do not describe a usable key width.
    #[error("header N_log2={n_log2}, P_log2={p_log2} gives an invalid key width")]
    InvalidHeader {
        /// Decoded domain size exponent.
        n_log2: u8,
        /// Decoded divisor exponent.
        p_log2: u8,
    },
    /// Input is larger than the configured maximum.
    #[error("digest of {len} bytes exceeds the {max} byte limit")]
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Configured limit.
        max: usize,
    },
    /// The bitstream ended in the middle of a remainder field.
    #[error("bitstream truncated at bit offset {bit_offset}")]
    Truncated {
        /// Bit position at which the stream ran out.
        bit_offset: usize,
    },
    /// More keys are encoded than the configured maximum.
    #[error("digest holds more than {max_keys} keys")]
    TooManyKeys {
        /// Configured key limit.
        max_keys: usize,
    },
    /// A delta or running key sum does not fit in 64 bits.
    #[error("key value overflows 64 bits")]
    KeyOverflow,
    /// A decoded key is wider than `N_log2 + P_log2` bits.
    #[error("key {key} does not fit in {key_bits} bits")]
    KeyOutOfRange {
        /// The decoded key.
        key: u64,
        /// Key width from the header.
        key_bits: u8,
    },
}

impl From<DecodeError> for DigestError {
    fn from(err: DecodeError) -> Self {
        DigestError::Decode(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DigestError>;
