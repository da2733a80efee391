// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Team management HTTP handlers. Superuser only.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use daap_server_api::{CreateTeamRequest, FieldError, TeamResponse};
use daap_server_auth::types::TeamId;
use daap_server_auth::{require_superuser, TeamRole};
use daap_server_db::NewTeam;

use crate::api::AppState;
use crate::api_response::{self as respond, Ctx};
use crate::auth_middleware::RequireAuth;
use crate::error::ApiError;
use crate::validation::require_non_empty;

#[utoipa::path(
    post,
    path = "/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Superuser required"),
        (status = 409, description = "Name already taken")
    ),
    tag = "teams"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name))]
pub async fn create_team(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateTeamRequest>, JsonRejection>,
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
	let role = match payload.role.parse::<TeamRole>() {
		Ok(role) => role,
		Err(_) => {
			errors.push(FieldError::new(
				"role",
				r#"must be "platform" or "product""#,
			));
			return respond::error(&ctx, ApiError::validation(errors));
		}
	};
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	match state.stores.teams.create_team(NewTeam { name, role }).await {
		Ok(team) => respond::created(&ctx, TeamResponse::from(team)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/teams",
    responses(
        (status = 200, description = "All teams", body = [TeamResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Superuser required")
    ),
    tag = "teams"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name))]
pub async fn list_teams(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}

	match state.stores.teams.list_teams().await {
		Ok(teams) => {
			let total = teams.len() as i64;
			let data: Vec<TeamResponse> = teams.into_iter().map(TeamResponse::from).collect();
			respond::list(&ctx, data, total, 1, total)
		}
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "The team", body = TeamResponse),
        (status = 400, description = "Invalid ID"),
        (status = 404, description = "No such team")
    ),
    tag = "teams"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn get_team(
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

	match state.stores.teams.get_team_by_id(&TeamId::new(id)).await {
		Ok(Some(team)) => respond::ok(&ctx, TeamResponse::from(team)),
		Ok(None) => respond::error(&ctx, ApiError::not_found("team")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    delete,
    path = "/teams/{id}",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 404, description = "No such team"),
        (status = 409, description = "Team still has users or databases")
    ),
    tag = "teams"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn delete_team(
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

	match state.stores.teams.delete_team(&TeamId::new(id)).await {
		Ok(true) => respond::no_content(),
		Ok(false) => respond::error(&ctx, ApiError::not_found("team")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}
