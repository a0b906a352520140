//! HTTP cache digests as Golomb-coded sets.
//!
//! A client summarises the resources it has cached as a compact, sorted
//! set of hashed keys. A server decodes the digest and checks whether a
//! resource is already cached before pushing it.
//!
//! - Keys are the top `N_log2 + P_log2` bits of the SHA-256 of each
//!   identifier, where `2^N_log2` covers the number of identifiers.
//! - Sorted keys are delta-coded with Golomb-Rice coding using divisor
//!   `2^P_log2`.
//! - Lookups may return false positives (at a rate of about `2^-P_log2`)
//!   but never false negatives.
//!
//! # Example
//!
//! ```rust
//! use cache_digest::{CacheDigest, DigestConfig, PushVerdict};
//!
//! let config = DigestConfig::default();
//! let urls = ["https://example.com/style.css", "https://example.com/app.js"];
//!
//! // Client side
//! let encoded = CacheDigest::build_and_encode(urls, &config).unwrap();
//!
//! // Server side
//! let mut digest = CacheDigest::decode(&encoded, &config).unwrap();
//! assert!(digest.contains("https://example.com/app.js"));
//!
//! let verdicts = digest.push(["https://example.com/style.css"]).unwrap();
//! assert_eq!(verdicts, vec![PushVerdict::AlreadyCached]);
//! ```
//!
//! # References
//!
//! - Golomb, S. (1966). "Run-length encodings"
//! - Putze, Sanders, Singler (2007). "Cache-, Hash- and Space-Efficient Bloom Filters"
//! - Oku, Nottingham (2016). "Cache Digests for HTTP/2"

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bits;
mod config;
mod digest;
mod error;
mod golomb;
mod key;

pub use bits::{BitReader, BitWriter};
pub use config::{DigestConfig, DEFAULT_MAX_ENCODED_LEN, DEFAULT_MAX_KEYS, DEFAULT_P_LOG2};
pub use digest::{CacheDigest, PushVerdict};
pub use error::{DecodeError, DigestError, Result};
pub use golomb::GolombRice;
pub use key::{derive_key, domain_exponent, KeyBits};
