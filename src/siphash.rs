/// Numeric identifier hashing compatible with the Lytics backend.
///
/// The backend derives 64-bit identifiers with SipHash-2-4 under a fixed,
/// published key. The key provides compatibility only, not secrecy.
use std::hash::Hasher;

use siphasher::sip::SipHasher24;

/// SipHash key halves (k0, k1).
pub const SIPHASH_KEY: (u64, u64) = (0, 1);

/// Hash the UTF-8 bytes of `value`, reinterpreting the result as signed.
pub fn sip_hash(value: &str) -> i64 {
    let mut hasher = SipHasher24::new_with_keys(SIPHASH_KEY.0, SIPHASH_KEY.1);
    hasher.write(value.as_bytes());
    hasher.finish() as i64
}

/// True if `value` hashes to `expected`.
pub fn matches_identifier(value: &str, expected: i64) -> bool {
    sip_hash(value) == expected
}
