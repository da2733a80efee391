// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tier API types.
//!
//! Platform callers see the full tier; product callers get the
//! [`TierSummaryResponse`] projection only.

use chrono::{DateTime, Utc};
use daap_server_db::Tier;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierRequest {
	pub name: String,
	#[serde(default)]
	pub description: String,
	/// Blueprint referenced by name.
	pub blueprint_name: Option<String>,
	/// `"freeze"`, `"archive"`, or `"hard_delete"`.
	pub destruction_strategy: String,
	#[serde(default)]
	pub backup_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTierRequest {
	/// Present only to be rejected: tier names are immutable.
	pub name: Option<String>,
	pub description: Option<String>,
	pub destruction_strategy: Option<String>,
	pub backup_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
	pub id: Uuid,
	pub name: String,
	pub description: String,
	pub blueprint_id: Option<Uuid>,
	pub blueprint_name: Option<String>,
	pub destruction_strategy: String,
	pub backup_enabled: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Tier> for TierResponse {
	fn from(tier: Tier) -> Self {
		Self {
			id: tier.id.into_inner(),
			name: tier.name,
			description: tier.description,
			blueprint_id: tier.blueprint_id.map(|b| b.into_inner()),
			blueprint_name: tier.blueprint_name,
			destruction_strategy: tier.destruction_strategy.as_str().to_string(),
			backup_enabled: tier.backup_enabled,
			created_at: tier.created_at,
			updated_at: tier.updated_at,
		}
	}
}

/// What product teams see of a tier.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierSummaryResponse {
	pub id: Uuid,
	pub name: String,
	pub description: String,
}

impl From<Tier> for TierSummaryResponse {
	fn from(tier: Tier) -> Self {
		Self {
			id: tier.id.into_inner(),
			name: tier.name,
			description: tier.description,
		}
	}
}
