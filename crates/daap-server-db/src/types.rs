// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Product entity types and store parameter structs.
//!
//! `Team` and `User` live in `daap-server-auth`; this module defines the
//! product-facing entities (`Blueprint`, `Tier`, `Database`), their closed
//! status/strategy enums, and the parameter structs the stores accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use daap_server_auth::types::{BlueprintId, DatabaseId, TeamId, TierId};

// =============================================================================
// Enumerations
// =============================================================================

/// Lifecycle status of a managed database.
///
/// The persisted value is always one of these; the schema carries a matching
/// CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
	Provisioning,
	Ready,
	Error,
	Deleting,
	Deleted,
}

impl DatabaseStatus {
	/// Statuses the reconciler examines each tick.
	pub fn watched() -> &'static [DatabaseStatus] {
		&[
			DatabaseStatus::Provisioning,
			DatabaseStatus::Ready,
			DatabaseStatus::Error,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			DatabaseStatus::Provisioning => "provisioning",
			DatabaseStatus::Ready => "ready",
			DatabaseStatus::Error => "error",
			DatabaseStatus::Deleting => "deleting",
			DatabaseStatus::Deleted => "deleted",
		}
	}
}

impl fmt::Display for DatabaseStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DatabaseStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"provisioning" => Ok(DatabaseStatus::Provisioning),
			"ready" => Ok(DatabaseStatus::Ready),
			"error" => Ok(DatabaseStatus::Error),
			"deleting" => Ok(DatabaseStatus::Deleting),
			"deleted" => Ok(DatabaseStatus::Deleted),
			other => Err(format!("unknown database status: {other}")),
		}
	}
}

/// What happens to the underlying infrastructure when a tier's database is
/// destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestructionStrategy {
	Freeze,
	Archive,
	HardDelete,
}

impl DestructionStrategy {
	pub fn as_str(&self) -> &'static str {
		match self {
			DestructionStrategy::Freeze => "freeze",
			DestructionStrategy::Archive => "archive",
			DestructionStrategy::HardDelete => "hard_delete",
		}
	}
}

impl fmt::Display for DestructionStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DestructionStrategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"freeze" => Ok(DestructionStrategy::Freeze),
			"archive" => Ok(DestructionStrategy::Archive),
			"hard_delete" => Ok(DestructionStrategy::HardDelete),
			other => Err(format!("unknown destruction strategy: {other}")),
		}
	}
}

// =============================================================================
// Entities
// =============================================================================

/// An immutable multi-document infrastructure template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
	pub id: BlueprintId,
	pub name: String,
	/// Name of the registered provider that realizes this template.
	pub provider: String,
	/// Multi-document YAML text with Go template placeholders.
	pub manifests: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A platform-defined infrastructure profile selectable by product teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
	pub id: TierId,
	pub name: String,
	pub description: String,
	pub blueprint_id: Option<BlueprintId>,
	pub destruction_strategy: DestructionStrategy,
	pub backup_enabled: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// Joined at read time; not a column.
	pub blueprint_name: Option<String>,
}

/// The primary product entity: a managed database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
	pub id: DatabaseId,
	pub name: String,
	pub owner_team_id: TeamId,
	pub tier_id: Option<TierId>,
	pub purpose: String,
	pub namespace: String,
	pub status: DatabaseStatus,
	pub host: Option<String>,
	pub port: Option<i32>,
	pub secret_name: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub deleted_at: Option<DateTime<Utc>>,
	/// Joined at read time; not columns.
	pub owner_team_name: Option<String>,
	pub tier_name: Option<String>,
	pub blueprint_name: Option<String>,
	pub provider_name: Option<String>,
}

impl Database {
	/// Derived name of the primary cluster resource.
	pub fn cluster_name(&self) -> String {
		format!("daap-{}", self.name)
	}

	/// Derived name of the connection pooler resource.
	pub fn pooler_name(&self) -> String {
		format!("daap-{}-pooler", self.name)
	}
}

// =============================================================================
// Store parameters
// =============================================================================

/// Parameters for creating a team.
#[derive(Debug, Clone)]
pub struct NewTeam {
	pub name: String,
	pub role: daap_server_auth::TeamRole,
}

/// Parameters for creating a user.
///
/// The store receives the key *prefix* and *hash*; the raw key never reaches
/// this layer.
#[derive(Debug, Clone)]
pub struct NewUser {
	pub name: String,
	pub team_id: Option<TeamId>,
	pub is_superuser: bool,
	pub api_key_prefix: String,
	pub api_key_hash: String,
}

/// Parameters for creating a blueprint.
#[derive(Debug, Clone)]
pub struct NewBlueprint {
	pub name: String,
	pub provider: String,
	pub manifests: String,
}

/// Parameters for creating a tier.
#[derive(Debug, Clone)]
pub struct NewTier {
	pub name: String,
	pub description: String,
	pub blueprint_id: Option<BlueprintId>,
	pub destruction_strategy: DestructionStrategy,
	pub backup_enabled: bool,
}

/// Mutable tier fields; only supplied fields are written.
#[derive(Debug, Clone, Default)]
pub struct TierUpdate {
	pub description: Option<String>,
	pub destruction_strategy: Option<DestructionStrategy>,
	pub backup_enabled: Option<bool>,
}

impl TierUpdate {
	pub fn is_empty(&self) -> bool {
		self.description.is_none()
			&& self.destruction_strategy.is_none()
			&& self.backup_enabled.is_none()
	}
}

/// Parameters for creating a database. Status is always born `provisioning`.
#[derive(Debug, Clone)]
pub struct NewDatabase {
	pub name: String,
	pub owner_team_id: TeamId,
	pub tier_id: Option<TierId>,
	pub purpose: String,
	pub namespace: String,
}

/// Mutable database fields; only supplied fields are written.
///
/// Status is deliberately absent: status mutation is the reconciler's and
/// goes through `update_status`.
#[derive(Debug, Clone, Default)]
pub struct DatabaseUpdate {
	pub owner_team_id: Option<TeamId>,
	pub purpose: Option<String>,
}

impl DatabaseUpdate {
	pub fn is_empty(&self) -> bool {
		self.owner_team_id.is_none() && self.purpose.is_none()
	}
}

/// Connection details written when a database becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
	pub host: String,
	pub port: i32,
	pub secret_name: String,
}

/// Conjunctive list filters for databases. Soft-deleted rows are always
/// excluded.
#[derive(Debug, Clone, Default)]
pub struct DatabaseFilter {
	pub owner_team_id: Option<TeamId>,
	pub status: Option<DatabaseStatus>,
	/// Case-insensitive substring match on the name.
	pub name: Option<String>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Normalized page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
	pub page: i64,
	pub limit: i64,
}

impl Pagination {
	pub const DEFAULT_LIMIT: i64 = 20;
	pub const MAX_LIMIT: i64 = 100;

	/// Normalize raw query parameters: page < 1 defaults to 1, limit <= 0
	/// defaults to 20, limit > 100 clamps to 100.
	pub fn normalized(page: Option<i64>, limit: Option<i64>) -> Self {
		let page = page.filter(|p| *p >= 1).unwrap_or(1);
		let limit = match limit {
			Some(l) if l <= 0 => Self::DEFAULT_LIMIT,
			Some(l) => l.min(Self::MAX_LIMIT),
			None => Self::DEFAULT_LIMIT,
		};
		Self { page, limit }
	}

	pub fn offset(&self) -> i64 {
		(self.page - 1).saturating_mul(self.limit)
	}
}

impl Default for Pagination {
	fn default() -> Self {
		Self::normalized(None, None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn status_round_trips_through_strings() {
		for status in [
			DatabaseStatus::Provisioning,
			DatabaseStatus::Ready,
			DatabaseStatus::Error,
			DatabaseStatus::Deleting,
			DatabaseStatus::Deleted,
		] {
			let parsed: DatabaseStatus = status.as_str().parse().unwrap();
			assert_eq!(parsed, status);
		}
		assert!("unknown".parse::<DatabaseStatus>().is_err());
	}

	#[test]
	fn watched_statuses_exclude_terminal_states() {
		let watched = DatabaseStatus::watched();
		assert!(!watched.contains(&DatabaseStatus::Deleted));
		assert!(!watched.contains(&DatabaseStatus::Deleting));
		assert_eq!(watched.len(), 3);
	}

	#[test]
	fn destruction_strategy_round_trips_through_strings() {
		for strategy in [
			DestructionStrategy::Freeze,
			DestructionStrategy::Archive,
			DestructionStrategy::HardDelete,
		] {
			let parsed: DestructionStrategy = strategy.as_str().parse().unwrap();
			assert_eq!(parsed, strategy);
		}
	}

	#[test]
	fn derived_resource_names_use_the_daap_prefix() {
		let db = Database {
			id: DatabaseId::generate(),
			name: "orders".to_string(),
			owner_team_id: TeamId::generate(),
			tier_id: None,
			purpose: String::new(),
			namespace: "default".to_string(),
			status: DatabaseStatus::Provisioning,
			host: None,
			port: None,
			secret_name: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
			deleted_at: None,
			owner_team_name: None,
			tier_name: None,
			blueprint_name: None,
			provider_name: None,
		};
		assert_eq!(db.cluster_name(), "daap-orders");
		assert_eq!(db.pooler_name(), "daap-orders-pooler");
	}

	#[test]
	fn pagination_defaults_and_clamps() {
		assert_eq!(
			Pagination::normalized(None, None),
			Pagination { page: 1, limit: 20 }
		);
		assert_eq!(
			Pagination::normalized(Some(0), Some(0)),
			Pagination { page: 1, limit: 20 }
		);
		assert_eq!(
			Pagination::normalized(Some(-3), Some(500)),
			Pagination { page: 1, limit: 100 }
		);
		assert_eq!(
			Pagination::normalized(Some(3), Some(50)),
			Pagination { page: 3, limit: 50 }
		);
		assert_eq!(Pagination::normalized(Some(3), Some(50)).offset(), 100);
	}

	proptest! {
		#[test]
		fn pagination_is_always_within_bounds(page in any::<i64>(), limit in any::<i64>()) {
			let p = Pagination::normalized(Some(page), Some(limit));
			prop_assert!(p.page >= 1);
			prop_assert!(p.limit >= 1 && p.limit <= Pagination::MAX_LIMIT);
			prop_assert!(p.offset() >= 0);
		}
	}
}
