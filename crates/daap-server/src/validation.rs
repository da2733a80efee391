// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.
//!
//! Validation failures are collected into batches of field errors and
//! returned together, never short-circuited at the first failure.

use daap_server_api::FieldError;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static NAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{1,61}[a-z0-9]$").unwrap());

/// Validate a resource name (database, tier, blueprint).
///
/// Names are kebab-case: 3-63 characters, leading letter, trailing
/// alphanumeric, no consecutive hyphens. Callers trim before validating.
pub fn is_valid_name(name: &str) -> bool {
	NAME_REGEX.is_match(name) && !name.contains("--")
}

/// Validate a kebab-case name field, appending to the error batch.
pub fn require_valid_name(name: &str, field: &str, errors: &mut Vec<FieldError>) {
	if !is_valid_name(name) {
		errors.push(FieldError::new(
			field,
			"must be kebab-case: 3-63 characters, leading letter, no consecutive hyphens",
		));
	}
}

/// Validate a non-empty field, appending to the error batch.
pub fn require_non_empty(value: &str, field: &str, errors: &mut Vec<FieldError>) {
	if value.is_empty() {
		errors.push(FieldError::new(field, "must not be empty"));
	}
}

/// Parse a request-supplied id string.
pub fn parse_uuid_field(
	value: &str,
	field: &str,
	errors: &mut Vec<FieldError>,
) -> Option<Uuid> {
	match Uuid::parse_str(value) {
		Ok(id) => Some(id),
		Err(_) => {
			errors.push(FieldError::new(field, "must be a valid UUID"));
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn accepts_well_formed_names() {
		for name in ["orders", "cnpg-std", "a2c", "db-01", "a-1-b-2"] {
			assert!(is_valid_name(name), "{name} should be valid");
		}
	}

	#[test]
	fn rejects_malformed_names() {
		for name in [
			"",          // empty
			"ab",        // too short
			"1orders",   // leading digit
			"-orders",   // leading hyphen
			"orders-",   // trailing hyphen
			"or--ders",  // consecutive hyphens
			"Orders",    // uppercase
			"or_ders",   // underscore
			"or ders",   // whitespace
			&"a".repeat(64),
		] {
			assert!(!is_valid_name(name), "{name:?} should be invalid");
		}
	}

	#[test]
	fn boundary_lengths() {
		assert!(is_valid_name("abc"));
		assert!(is_valid_name(&format!("a{}", "b".repeat(62))));
		assert!(!is_valid_name(&format!("a{}", "b".repeat(63))));
	}

	#[test]
	fn error_batches_accumulate() {
		let mut errors = Vec::new();
		require_valid_name("BAD", "name", &mut errors);
		require_non_empty("", "purpose", &mut errors);
		assert!(parse_uuid_field("nope", "teamId", &mut errors).is_none());
		assert_eq!(errors.len(), 3);
	}

	proptest! {
		#[test]
		fn valid_names_never_contain_consecutive_hyphens(name in "[a-z][a-z0-9-]{1,61}[a-z0-9]") {
			if is_valid_name(&name) {
				prop_assert!(!name.contains("--"));
			}
		}
	}
}
