// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider capability contract.
//!
//! A provider realizes a database's rendered manifests on some orchestrator,
//! tears its resources down, and reports observed health. Implementations
//! register under a name in the process-global [`registry`] at startup;
//! blueprints refuse creation for unregistered provider names.
//!
//! Cancellation is cooperative: every operation is an `async fn` whose
//! future is dropped when the caller gives up. Implementations must be safe
//! for concurrent calls.

pub mod error;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::ProviderError;

use daap_server_db::Database;

/// The flat record handed to a provider, carrying every field the blueprint
/// engine may bind.
///
/// Optional relations bind as empty strings so the template variable set is
/// fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDatabase {
	pub id: String,
	pub name: String,
	pub namespace: String,
	pub cluster_name: String,
	pub pooler_name: String,
	pub owner_team: String,
	pub owner_team_id: String,
	pub tier: String,
	pub tier_id: String,
	pub blueprint: String,
	pub provider: String,
}

impl ProviderDatabase {
	/// Build the provider view of a database record.
	///
	/// Joined names must be populated (get/list reads do this); absent
	/// relations become empty strings.
	pub fn for_database(db: &Database) -> Self {
		Self {
			id: db.id.to_string(),
			name: db.name.clone(),
			namespace: db.namespace.clone(),
			cluster_name: db.cluster_name(),
			pooler_name: db.pooler_name(),
			owner_team: db.owner_team_name.clone().unwrap_or_default(),
			owner_team_id: db.owner_team_id.to_string(),
			tier: db.tier_name.clone().unwrap_or_default(),
			tier_id: db.tier_id.map(|t| t.to_string()).unwrap_or_default(),
			blueprint: db.blueprint_name.clone().unwrap_or_default(),
			provider: db.provider_name.clone().unwrap_or_default(),
		}
	}
}

/// Observed health of a database's provider resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Provisioning,
	Ready,
	Error,
}

/// Result of a provider health check.
///
/// Connection fields are populated only for `Ready` results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResult {
	pub status: HealthStatus,
	pub host: Option<String>,
	pub port: Option<i32>,
	pub secret_name: Option<String>,
}

impl HealthResult {
	/// A result with no connection details.
	pub fn status_only(status: HealthStatus) -> Self {
		Self {
			status,
			host: None,
			port: None,
			secret_name: None,
		}
	}
}

/// Capability contract every provider implements.
#[async_trait]
pub trait Provider: Send + Sync {
	/// Realize all resources in the rendered manifest bundle.
	async fn apply(&self, database: &ProviderDatabase, manifests: &str)
		-> Result<(), ProviderError>;

	/// Remove every resource labeled as belonging to this database in its
	/// namespace. Idempotent: missing resources do not fail.
	async fn delete(&self, database: &ProviderDatabase) -> Result<(), ProviderError>;

	/// Report observed health for this database's resources.
	async fn check_health(&self, database: &ProviderDatabase)
		-> Result<HealthResult, ProviderError>;
}
