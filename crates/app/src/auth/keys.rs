//! API key generation and hashing.

use rand::{Rng, distributions::Alphanumeric, thread_rng};
use sha2::{Digest, Sha256};

/// Prefix on every issued venue API key.
pub const API_KEY_PREFIX: &str = "ik";

const API_KEY_RANDOM_CHARS: usize = 40;

/// Generate a raw venue API key. The raw key is shown exactly once at
/// creation time; only its hash is stored.
#[must_use]
pub fn generate_api_key() -> String {
    let random: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_RANDOM_CHARS)
        .map(char::from)
        .collect();

    format!("{API_KEY_PREFIX}_{random}")
}

/// Hash a raw API key for storage and lookup.
#[must_use]
pub fn hash_api_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}
