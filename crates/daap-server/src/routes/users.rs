// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User management HTTP handlers. Superuser only.
//!
//! Creation is the single place a raw API key leaves the system (besides
//! the bootstrap log line). Deletion is a soft revoke; users are never
//! hard-deleted.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use daap_server_api::{CreateUserRequest, CreateUserResponse, UserResponse};
use daap_server_auth::api_key::generate_api_key;
use daap_server_auth::require_superuser;
use daap_server_auth::types::{TeamId, UserId};
use daap_server_db::NewUser;

use crate::api::AppState;
use crate::api_response::{self as respond, Ctx};
use crate::auth_middleware::RequireAuth;
use crate::error::ApiError;
use crate::validation::{parse_uuid_field, require_non_empty};

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created; the API key is shown exactly once", body = CreateUserResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Superuser required"),
        (status = 422, description = "Team does not exist")
    ),
    tag = "users"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name))]
pub async fn create_user(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}
	let Json(payload) = match payload {
		Ok(payload) => payload,
		Err(rejection) => {
			return respond::error(&ctx, ApiError::invalid_json(rejection.body_text()));
		}
	};

	let name = payload.name.trim().to_string();
	let mut errors = Vec::new();
	require_non_empty(&name, "name", &mut errors);
	let team_id = parse_uuid_field(&payload.team_id, "teamId", &mut errors);
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}
	let Some(team_id) = team_id else {
		return respond::error(&ctx, ApiError::internal());
	};

	// The raw key exists in this function and the response, nowhere else.
	let key = generate_api_key();
	let new_user = NewUser {
		name,
		team_id: Some(TeamId::new(team_id)),
		is_superuser: false,
		api_key_prefix: key.prefix,
		api_key_hash: key.hash,
	};

	match state.stores.users.create_user(new_user).await {
		Ok(user) => respond::created(
			&ctx,
			CreateUserResponse {
				user: UserResponse::from(user),
				api_key: key.raw,
			},
		),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users, revoked included", body = [UserResponse]),
        (status = 403, description = "Superuser required")
    ),
    tag = "users"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name))]
pub async fn list_users(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}

	match state.stores.users.list_users().await {
		Ok(users) => {
			let total = users.len() as i64;
			let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
			respond::list(&ctx, data, total, 1, total)
		}
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn get_user(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};

	match state.stores.users.get_user_by_id(&UserId::new(id)).await {
		Ok(Some(user)) => respond::ok(&ctx, UserResponse::from(user)),
		Ok(None) => respond::error(&ctx, ApiError::not_found("user")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User revoked (idempotent)"),
        (status = 403, description = "The superuser cannot be revoked"),
        (status = 404, description = "No such user")
    ),
    tag = "users"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn revoke_user(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};
	let id = UserId::new(id);

	// Business rule, not a store rule: the bootstrap identity stays.
	match state.stores.users.get_user_by_id(&id).await {
		Ok(Some(user)) if user.is_superuser => {
			return respond::error(
				&ctx,
				ApiError::forbidden("the superuser cannot be revoked"),
			);
		}
		Ok(Some(_)) => {}
		Ok(None) => return respond::error(&ctx, ApiError::not_found("user")),
		Err(e) => return respond::error(&ctx, e.into()),
	}

	// Both outcomes end with the user revoked; repeats are a no-op.
	match state.stores.users.revoke_user(&id).await {
		Ok(_) => respond::no_content(),
		Err(e) => respond::error(&ctx, e.into()),
	}
}
