// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Team API types.

use chrono::{DateTime, Utc};
use daap_server_auth::Team;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
	pub name: String,
	/// `"platform"` or `"product"`.
	pub role: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
	pub id: Uuid,
	pub name: String,
	pub role: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Team> for TeamResponse {
	fn from(team: Team) -> Self {
		Self {
			id: team.id.into_inner(),
			name: team.name,
			role: team.role.as_str().to_string(),
			created_at: team.created_at,
			updated_at: team.updated_at,
		}
	}
}
