// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! This module defines:
//!
//! - **ID newtypes**: type-safe wrappers around UUIDs for each entity kind
//!   ([`TeamId`], [`UserId`], [`BlueprintId`], [`TierId`], [`DatabaseId`])
//! - **[`TeamRole`]**: the two-valued role model (`platform` / `product`)
//! - **[`Identity`]**: the resolved caller context carried through requests
//!
//! All ID types serialize transparently as UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(TeamId, "Unique identifier for a team.");
define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(BlueprintId, "Unique identifier for a blueprint.");
define_id_type!(TierId, "Unique identifier for a tier.");
define_id_type!(DatabaseId, "Unique identifier for a managed database.");

// =============================================================================
// Team Roles
// =============================================================================

/// Role of a team within the platform.
///
/// `Platform` teams operate the service; `Product` teams consume it and are
/// subject to ownership scoping on everything they touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
	Platform,
	Product,
}

impl TeamRole {
	/// Returns all available team roles.
	pub fn all() -> &'static [TeamRole] {
		&[TeamRole::Platform, TeamRole::Product]
	}

	/// The stable string form persisted in the store.
	pub fn as_str(&self) -> &'static str {
		match self {
			TeamRole::Platform => "platform",
			TeamRole::Product => "product",
		}
	}
}

impl fmt::Display for TeamRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TeamRole {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"platform" => Ok(TeamRole::Platform),
			"product" => Ok(TeamRole::Product),
			other => Err(format!("unknown team role: {other}")),
		}
	}
}

// =============================================================================
// Identity
// =============================================================================

/// The resolved caller context: user plus optional team.
///
/// Assembled by authentication from a user row and (when present) its team,
/// passed by value through the request context. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub user_id: UserId,
	pub user_name: String,
	pub team_id: Option<TeamId>,
	pub team_name: Option<String>,
	pub role: Option<TeamRole>,
	pub is_superuser: bool,
}

impl Identity {
	/// Identity for the administrative superuser (no team, no role).
	pub fn superuser(user_id: UserId, user_name: impl Into<String>) -> Self {
		Self {
			user_id,
			user_name: user_name.into(),
			team_id: None,
			team_name: None,
			role: None,
			is_superuser: true,
		}
	}

	/// Identity for a regular team member.
	pub fn member(
		user_id: UserId,
		user_name: impl Into<String>,
		team_id: TeamId,
		team_name: impl Into<String>,
		role: TeamRole,
	) -> Self {
		Self {
			user_id,
			user_name: user_name.into(),
			team_id: Some(team_id),
			team_name: Some(team_name.into()),
			role: Some(role),
			is_superuser: false,
		}
	}

	/// Returns true if the caller belongs to a product team.
	pub fn is_product(&self) -> bool {
		self.role == Some(TeamRole::Product)
	}

	/// Returns true if the caller belongs to a platform team.
	pub fn is_platform(&self) -> bool {
		self.role == Some(TeamRole::Platform)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn team_role_round_trips_through_strings() {
		for role in TeamRole::all() {
			let parsed: TeamRole = role.as_str().parse().unwrap();
			assert_eq!(parsed, *role);
		}
	}

	#[test]
	fn team_role_rejects_unknown_values() {
		assert!("admin".parse::<TeamRole>().is_err());
		assert!("".parse::<TeamRole>().is_err());
		assert!("Platform".parse::<TeamRole>().is_err());
	}

	#[test]
	fn id_newtypes_are_distinct_random_values() {
		let a = DatabaseId::generate();
		let b = DatabaseId::generate();
		assert_ne!(a, b);
	}

	#[test]
	fn superuser_identity_has_no_team() {
		let identity = Identity::superuser(UserId::generate(), "superuser");
		assert!(identity.is_superuser);
		assert!(identity.team_id.is_none());
		assert!(identity.role.is_none());
		assert!(!identity.is_product());
		assert!(!identity.is_platform());
	}

	#[test]
	fn member_identity_carries_team_and_role() {
		let team_id = TeamId::generate();
		let identity = Identity::member(
			UserId::generate(),
			"alice",
			team_id,
			"ops",
			TeamRole::Platform,
		);
		assert!(!identity.is_superuser);
		assert_eq!(identity.team_id, Some(team_id));
		assert_eq!(identity.team_name.as_deref(), Some("ops"));
		assert!(identity.is_platform());
	}
}
