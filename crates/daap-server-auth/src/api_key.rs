// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API key generation, prefix extraction, and verification.
//!
//! A raw key is the product tag followed by 32 random bytes encoded as
//! URL-safe base64 without padding. The first 8 characters of the raw key
//! form the *prefix*, which is stored alongside an Argon2 hash of the full
//! key; the raw key itself exists only in the create/bootstrap response.
//!
//! Authentication looks candidates up by prefix and verifies the presented
//! key against each stored hash. Argon2 verification is constant-time, so a
//! hash mismatch is indistinguishable from a prefix miss.

use argon2::password_hash::{
	rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::argon2_config::argon2_instance;

/// Product tag prepended to every daap API key.
pub const API_KEY_TAG: &str = "daap_";

/// Number of random bytes in an API key.
pub const API_KEY_BYTES: usize = 32;

/// Length of the indexed key prefix.
pub const API_KEY_PREFIX_LEN: usize = 8;

/// A freshly generated API key.
///
/// `raw` is handed to the caller exactly once; only `prefix` and `hash` are
/// ever persisted.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
	pub raw: String,
	pub prefix: String,
	pub hash: String,
}

/// Generate a new API key.
///
/// The raw key format is the `daap_` tag followed by 43 base64url characters
/// (32 bytes, unpadded).
pub fn generate_api_key() -> GeneratedKey {
	use rand::RngCore;
	let mut bytes = [0u8; API_KEY_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	let raw = format!("{}{}", API_KEY_TAG, URL_SAFE_NO_PAD.encode(bytes));
	let prefix = key_prefix(&raw)
		.expect("generated key is longer than the prefix")
		.to_string();
	let hash = hash_api_key(&raw);
	GeneratedKey {
		raw,
		prefix,
		hash,
	}
}

/// Extract the 8-character prefix of a raw key.
///
/// Returns `None` when the presented key is shorter than the prefix, which
/// callers must treat as an invalid key.
pub fn key_prefix(raw: &str) -> Option<&str> {
	if raw.len() < API_KEY_PREFIX_LEN || !raw.is_char_boundary(API_KEY_PREFIX_LEN) {
		return None;
	}
	Some(&raw[..API_KEY_PREFIX_LEN])
}

/// Hash a raw API key using Argon2.
///
/// The resulting PHC string can be safely stored in the database.
/// Uses production-strength parameters in release builds and fast test
/// parameters in test builds.
pub fn hash_api_key(raw: &str) -> String {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(raw.as_bytes(), &salt)
		.expect("Argon2 hashing should not fail")
		.to_string()
}

/// Verify a raw API key against its stored Argon2 hash.
pub fn verify_api_key(raw: &str, hash: &str) -> bool {
	let parsed_hash = match PasswordHash::new(hash) {
		Ok(h) => h,
		Err(_) => return false,
	};
	argon2_instance()
		.verify_password(raw.as_bytes(), &parsed_hash)
		.is_ok()
}
