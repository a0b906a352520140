//! Property-based tests for cache digests.
//!
//! These tests verify invariants that must hold for all inputs, using
//! proptest to generate identifier sets and parameters.

use cache_digest::{derive_key, CacheDigest, DigestConfig, DigestError, KeyBits, PushVerdict};
use proptest::prelude::*;

/// Identifiers shaped like request URLs.
fn urls(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("https://[a-z]{1,8}\\.example/[a-z0-9/]{0,24}", 0..=max_len)
}

/// Arbitrary byte-string identifiers, duplicates included.
fn raw_identifiers(max_len: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..32), 0..=max_len)
}

/// Expected sorted keys for `identifiers` built with `p_log2`.
fn expected_keys<T: AsRef<[u8]>>(identifiers: &[T], p_log2: u8) -> Vec<u64> {
    let n_log2 = cache_digest::domain_exponent(identifiers.len());
    let bits = KeyBits::new(n_log2, p_log2).unwrap();
    let mut keys: Vec<u64> = identifiers
        .iter()
        .map(|id| derive_key(id.as_ref(), bits))
        .collect();
    keys.sort_unstable();
    keys
}

fn roomy_config(p_log2: u8) -> DigestConfig {
    DigestConfig::new()
        .with_p_log2(p_log2)
        .with_max_encoded_len(64 * 1024)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    // =======================================================================
    // ROUNDTRIP INVARIANT: decode(encode(x)).keys == sorted keys of x
    // =======================================================================

    #[test]
    fn roundtrip_urls(ids in urls(100), p_log2 in 0u8..=20) {
        let config = roomy_config(p_log2);

        let encoded = CacheDigest::build_and_encode(&ids, &config)
            .expect("encoding should succeed with a roomy buffer");
        let digest = CacheDigest::decode(&encoded, &config)
            .expect("decoding should succeed for freshly encoded data");

        prop_assert_eq!(digest.n_log2(), cache_digest::domain_exponent(ids.len()));
        prop_assert_eq!(digest.p_log2(), p_log2);
        let expected = expected_keys(&ids, p_log2);
        prop_assert_eq!(digest.keys(), expected.as_slice());
    }

    #[test]
    fn roundtrip_raw_identifiers(ids in raw_identifiers(60), p_log2 in 0u8..=40) {
        let config = roomy_config(p_log2);

        let encoded = CacheDigest::build_and_encode(&ids, &config)?;
        let digest = CacheDigest::decode(&encoded, &config)?;

        let expected = expected_keys(&ids, p_log2);
        prop_assert_eq!(digest.keys(), expected.as_slice());
    }

    #[test]
    fn roundtrip_repeated_identifier(id in "[a-z]{1,12}", copies in 1usize..20) {
        let ids = vec![id; copies];
        let config = DigestConfig::default();

        let encoded = CacheDigest::build_and_encode(&ids, &config)?;
        let digest = CacheDigest::decode(&encoded, &config)?;

        prop_assert_eq!(digest.len(), copies);
        prop_assert!(digest.keys().windows(2).all(|w| w[0] == w[1]));
    }

    // =======================================================================
    // MEMBERSHIP: no false negatives
    // =======================================================================

    #[test]
    fn no_false_negatives_after_build(ids in urls(100), p_log2 in 1u8..=16) {
        let digest = CacheDigest::build(&ids, &roomy_config(p_log2))?;
        for id in &ids {
            prop_assert!(digest.contains(id), "{} missing from digest", id);
        }
    }

    #[test]
    fn no_false_negatives_after_decode(ids in urls(100)) {
        let config = roomy_config(8);
        let encoded = CacheDigest::build_and_encode(&ids, &config)?;
        let digest = CacheDigest::decode(&encoded, &config)?;

        prop_assert!(digest.check(&ids).into_iter().all(|cached| cached));
    }

    // =======================================================================
    // PUSH: sortedness and visibility of earlier insertions
    // =======================================================================

    #[test]
    fn push_keeps_keys_sorted(base in urls(40), pushed in urls(40)) {
        let mut digest = CacheDigest::build(&base, &DigestConfig::default())?;
        let before = digest.len();

        let verdicts = digest.push(&pushed)?;

        prop_assert!(digest.keys().windows(2).all(|w| w[0] <= w[1]));
        let added = verdicts.iter().filter(|v| v.should_push()).count();
        prop_assert_eq!(digest.len(), before + added);
        for id in base.iter().chain(&pushed) {
            prop_assert!(digest.contains(id));
        }
    }

    #[test]
    fn push_twice_reports_cached(pushed in urls(30)) {
        let mut digest = CacheDigest::build(Vec::<String>::new(), &DigestConfig::default())?;
        digest.push(&pushed)?;

        let second = digest.push(&pushed)?;
        prop_assert!(second.iter().all(|v| *v == PushVerdict::AlreadyCached));
    }

    #[test]
    fn push_capacity_failure_leaves_digest_untouched(base in urls(8), pushed in urls(40)) {
        let config = DigestConfig::default().with_max_keys(8);
        let mut digest = CacheDigest::build(&base, &config)?;
        let snapshot = digest.clone();

        match digest.push(&pushed) {
            Ok(_) => prop_assert!(digest.len() <= 8),
            Err(err) => {
                prop_assert_eq!(err, DigestError::CapacityExceeded { capacity: 8 });
                prop_assert_eq!(digest, snapshot);
            }
        }
    }

    // =======================================================================
    // DETERMINISM
    // =======================================================================

    #[test]
    fn derive_key_is_deterministic(id in proptest::collection::vec(any::<u8>(), 0..64), width in 1u32..=64) {
        let bits = KeyBits::from_width(width).unwrap();
        let key = derive_key(&id, bits);

        prop_assert_eq!(key, derive_key(&id, bits));
        prop_assert!(bits.fits(key));
        // Narrower keys are prefixes of wider ones.
        let full = derive_key(&id, KeyBits::from_width(64).unwrap());
        prop_assert_eq!(key, full >> (64 - width));
    }

    #[test]
    fn encoding_ignores_input_order(mut ids in urls(50)) {
        let config = DigestConfig::default().with_max_encoded_len(4096);
        let forward = CacheDigest::build_and_encode(&ids, &config)?;
        ids.reverse();
        let reversed = CacheDigest::build_and_encode(&ids, &config)?;

        prop_assert_eq!(forward, reversed);
    }

    // =======================================================================
    // MALFORMED INPUT: decoding never panics
    // =======================================================================

    #[test]
    fn decode_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let config = DigestConfig::default();
        if let Ok(digest) = CacheDigest::decode(&bytes, &config) {
            prop_assert!(digest.len() <= config.max_keys);
            prop_assert!(digest.keys().windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(digest.keys().iter().all(|&k| digest.key_bits().fits(k)));
        }
    }

    #[test]
    fn truncated_digest_never_gains_keys(ids in urls(40), cut in 0usize..64) {
        let config = DigestConfig::default();
        let encoded = CacheDigest::build_and_encode(&ids, &config)?;
        let cut = cut.min(encoded.len());

        if let Ok(digest) = CacheDigest::decode(&encoded[..cut], &config) {
            prop_assert!(digest.len() <= ids.len());
        }
    }
}

// =======================================================================
// CAPACITY BOUNDARY (not proptest, but important)
// =======================================================================

#[test]
fn oversized_digest_fails_instead_of_truncating() {
    // Every key costs at least P_log2 + 1 = 9 bits, so 1000 keys need more
    // than 1024 bytes.
    let ids: Vec<String> = (0..1000).map(|i| format!("https://example.com/{i}")).collect();
    let result = CacheDigest::build_and_encode(&ids, &DigestConfig::default());

    assert_eq!(result, Err(DigestError::EncodeOverflow { capacity: 1024 }));
}

#[test]
fn too_many_identifiers_fail() {
    let ids: Vec<String> = (0..1025).map(|i| format!("/{i}")).collect();
    let result = CacheDigest::build_and_encode(&ids, &DigestConfig::default());

    assert_eq!(result, Err(DigestError::CapacityExceeded { capacity: 1024 }));
}

#[test]
fn larger_divisor_shrinks_false_positive_rate() {
    let cached: Vec<String> = (0..200).map(|i| format!("https://example.com/c/{i}")).collect();
    let lookups: Vec<String> = (0..2000).map(|i| format!("https://example.com/p/{i}")).collect();
    let config = DigestConfig::default().with_max_encoded_len(8192);

    let false_positives = |p_log2: u8| {
        let digest = CacheDigest::build(&cached, &config.clone().with_p_log2(p_log2)).unwrap();
        digest.check(&lookups).into_iter().filter(|&hit| hit).count()
    };

    let coarse = false_positives(2);
    let fine = false_positives(12);
    assert!(
        fine < coarse,
        "P_log2=12 gave {} false positives, P_log2=2 gave {}",
        fine,
        coarse
    );
}
