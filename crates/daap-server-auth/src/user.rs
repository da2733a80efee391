// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TeamId, UserId};

/// A user account authenticated by API key.
///
/// The raw API key is never stored; only its 8-character prefix (for indexed
/// lookup) and argon2 hash (for verification). Exactly one of the following
/// holds: the user is the superuser and has no team, or the user is a regular
/// member of exactly one team. Revocation is soft and permanent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub name: String,
	pub team_id: Option<TeamId>,
	pub is_superuser: bool,
	/// First 8 characters of the raw key, indexed for authentication.
	pub api_key_prefix: String,
	/// Argon2 hash of the full raw key.
	pub api_key_hash: String,
	pub revoked_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Returns true if the user can still authenticate.
	pub fn is_active(&self) -> bool {
		self.revoked_at.is_none()
	}
}
