// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Managed-database HTTP handlers.
//!
//! Open to platform and product roles; the superuser is an administrative
//! identity and gets 403 here. Product callers are ownership-scoped by the
//! provisioning service: foreign rows read as absent, list filters are
//! pinned to the caller's team.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use daap_server_api::{
	CreateDatabaseRequest, DatabaseListQuery, DatabaseResponse, FieldError, UpdateDatabaseRequest,
};
use daap_server_auth::types::{DatabaseId, TeamId};
use daap_server_auth::{require_role, TeamRole};
use daap_server_db::{DatabaseFilter, DatabaseStatus, DatabaseUpdate, Pagination};
use daap_server_provisioning::CreateDatabase;

use crate::api::AppState;
use crate::api_response::{self as respond, Ctx};
use crate::auth_middleware::RequireAuth;
use crate::error::ApiError;
use crate::validation::{parse_uuid_field, require_valid_name};

const DATABASE_ROLES: &[TeamRole] = &[TeamRole::Platform, TeamRole::Product];

#[utoipa::path(
    post,
    path = "/databases",
    request_body = CreateDatabaseRequest,
    responses(
        (status = 201, description = "Database created in status provisioning", body = DatabaseResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Platform or product role required"),
        (status = 409, description = "An active database already has this name"),
        (status = 422, description = "Tier or owner team does not exist")
    ),
    tag = "databases"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name))]
pub async fn create_database(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateDatabaseRequest>, JsonRejection>,
) -> Response {
	if let Err(e) = require_role(&identity, DATABASE_ROLES) {
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
	require_valid_name(&name, "name", &mut errors);
	let owner_team_id = match &payload.owner_team_id {
		Some(raw) => parse_uuid_field(raw, "ownerTeamId", &mut errors).map(TeamId::new),
		None => None,
	};
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	let request = CreateDatabase {
		name,
		purpose: payload.purpose,
		tier_name: payload.tier_name,
		owner_team_id,
	};
	match state.provisioning.create(&identity, request).await {
		Ok(database) => respond::created(&ctx, DatabaseResponse::from(database)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/databases",
    params(DatabaseListQuery),
    responses(
        (status = 200, description = "Active databases, newest first", body = [DatabaseResponse]),
        (status = 400, description = "Malformed filter"),
        (status = 403, description = "Platform or product role required")
    ),
    tag = "databases"
)]
#[tracing::instrument(skip(state, query), fields(user = %identity.user_name))]
pub async fn list_databases(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	query: Result<Query<DatabaseListQuery>, QueryRejection>,
) -> Response {
	if let Err(e) = require_role(&identity, DATABASE_ROLES) {
		return respond::error(&ctx, e.into());
	}
	let Query(query) = match query {
		Ok(query) => query,
		Err(rejection) => {
			return respond::error(
				&ctx,
				ApiError::validation(vec![FieldError::new("query", rejection.body_text())]),
			);
		}
	};

	let mut errors = Vec::new();
	let owner_team_id = match &query.owner_team_id {
		Some(raw) => parse_uuid_field(raw, "ownerTeamId", &mut errors).map(TeamId::new),
		None => None,
	};
	let status = match &query.status {
		Some(raw) => match raw.parse::<DatabaseStatus>() {
			Ok(status) => Some(status),
			Err(_) => {
				errors.push(FieldError::new("status", "is not a known database status"));
				None
			}
		},
		None => None,
	};
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	let filter = DatabaseFilter {
		owner_team_id,
		status,
		name: query.name,
	};
	let page = Pagination::normalized(query.page, query.limit);

	match state.provisioning.list(&identity, filter, &page).await {
		Ok((databases, total)) => {
			let data: Vec<DatabaseResponse> =
				databases.into_iter().map(DatabaseResponse::from).collect();
			respond::list(&ctx, data, total, page.page, page.limit)
		}
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/databases/{id}",
    params(("id" = String, Path, description = "Database ID")),
    responses(
        (status = 200, description = "The database", body = DatabaseResponse),
        (status = 404, description = "Absent, deleted, or owned by another team")
    ),
    tag = "databases"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn get_database(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Response {
	if let Err(e) = require_role(&identity, DATABASE_ROLES) {
		return respond::error(&ctx, e.into());
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};

	match state.provisioning.get(&identity, &DatabaseId::new(id)).await {
		Ok(database) => respond::ok(&ctx, DatabaseResponse::from(database)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    patch,
    path = "/databases/{id}",
    params(("id" = String, Path, description = "Database ID")),
    request_body = UpdateDatabaseRequest,
    responses(
        (status = 200, description = "Updated database", body = DatabaseResponse),
        (status = 404, description = "Absent, deleted, or owned by another team"),
        (status = 422, description = "New owner team does not exist")
    ),
    tag = "databases"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name, %id))]
pub async fn update_database(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateDatabaseRequest>, JsonRejection>,
) -> Response {
	if let Err(e) = require_role(&identity, DATABASE_ROLES) {
		return respond::error(&ctx, e.into());
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};
	let Json(payload) = match payload {
		Ok(payload) => payload,
		Err(rejection) => {
			return respond::error(&ctx, ApiError::invalid_json(rejection.body_text()));
		}
	};

	let mut errors = Vec::new();
	let owner_team_id = match &payload.owner_team_id {
		Some(raw) => parse_uuid_field(raw, "ownerTeamId", &mut errors).map(TeamId::new),
		None => None,
	};
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	let update = DatabaseUpdate {
		owner_team_id,
		purpose: payload.purpose,
	};
	match state
		.provisioning
		.update(&identity, &DatabaseId::new(id), update)
		.await
	{
		Ok(database) => respond::ok(&ctx, DatabaseResponse::from(database)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    delete,
    path = "/databases/{id}",
    params(("id" = String, Path, description = "Database ID")),
    responses(
        (status = 204, description = "Provider teardown attempted, record soft-deleted"),
        (status = 404, description = "Absent, deleted, or owned by another team")
    ),
    tag = "databases"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn delete_database(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Response {
	if let Err(e) = require_role(&identity, DATABASE_ROLES) {
		return respond::error(&ctx, e.into());
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};

	match state
		.provisioning
		.delete(&identity, &DatabaseId::new(id))
		.await
	{
		Ok(()) => respond::no_content(),
		Err(e) => respond::error(&ctx, e.into()),
	}
}
