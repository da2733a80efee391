// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Managed-database API types.

use chrono::{DateTime, Utc};
use daap_server_db::Database;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
	pub name: String,
	#[serde(default)]
	pub purpose: String,
	/// Tier referenced by its name.
	pub tier_name: Option<String>,
	/// Honored for platform callers only; product callers own what they
	/// create.
	pub owner_team_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatabaseRequest {
	pub owner_team_id: Option<String>,
	pub purpose: Option<String>,
}

/// List filters; all are conjunctive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DatabaseListQuery {
	pub owner_team_id: Option<String>,
	pub status: Option<String>,
	/// Case-insensitive substring match.
	pub name: Option<String>,
	pub page: Option<i64>,
	pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResponse {
	pub id: Uuid,
	pub name: String,
	pub owner_team_id: Uuid,
	pub owner_team_name: Option<String>,
	pub tier_id: Option<Uuid>,
	pub tier_name: Option<String>,
	pub purpose: String,
	pub namespace: String,
	pub cluster_name: String,
	pub pooler_name: String,
	pub status: String,
	pub host: Option<String>,
	pub port: Option<i32>,
	pub secret_name: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Database> for DatabaseResponse {
	fn from(database: Database) -> Self {
		Self {
			id: database.id.into_inner(),
			cluster_name: database.cluster_name(),
			pooler_name: database.pooler_name(),
			name: database.name,
			owner_team_id: database.owner_team_id.into_inner(),
			owner_team_name: database.owner_team_name,
			tier_id: database.tier_id.map(|t| t.into_inner()),
			tier_name: database.tier_name,
			purpose: database.purpose,
			namespace: database.namespace,
			status: database.status.as_str().to_string(),
			host: database.host,
			port: database.port,
			secret_name: database.secret_name,
			created_at: database.created_at,
			updated_at: database.updated_at,
		}
	}
}
