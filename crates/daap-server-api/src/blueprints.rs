// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blueprint API types.

use chrono::{DateTime, Utc};
use daap_server_db::Blueprint;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlueprintRequest {
	pub name: String,
	/// Must name a registered provider.
	pub provider: String,
	/// Multi-document YAML with Go template placeholders.
	pub manifests: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintResponse {
	pub id: Uuid,
	pub name: String,
	pub provider: String,
	pub manifests: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Blueprint> for BlueprintResponse {
	fn from(blueprint: Blueprint) -> Self {
		Self {
			id: blueprint.id.into_inner(),
			name: blueprint.name,
			provider: blueprint.provider,
			manifests: blueprint.manifests,
			created_at: blueprint.created_at,
			updated_at: blueprint.updated_at,
		}
	}
}
