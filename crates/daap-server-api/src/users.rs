// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User API types.
//!
//! The raw API key appears exactly once, in [`CreateUserResponse`]; no read
//! path ever returns it again.

use chrono::{DateTime, Utc};
use daap_server_auth::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
	pub name: String,
	/// Team the user belongs to.
	pub team_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	pub id: Uuid,
	pub name: String,
	pub team_id: Option<Uuid>,
	pub is_superuser: bool,
	/// Indexed key prefix; safe to display.
	pub api_key_prefix: String,
	pub revoked_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id.into_inner(),
			name: user.name,
			team_id: user.team_id.map(|t| t.into_inner()),
			is_superuser: user.is_superuser,
			api_key_prefix: user.api_key_prefix,
			revoked_at: user.revoked_at,
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

/// Returned once from user creation; `api_key` is never shown again.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
	#[serde(flatten)]
	pub user: UserResponse,
	pub api_key: String,
}
