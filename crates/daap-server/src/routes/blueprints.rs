// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blueprint management HTTP handlers. Superuser only.
//!
//! Blueprints are validated at creation (template parse plus structural
//! checks on parseable documents) and immutable afterwards.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use daap_server_api::{BlueprintResponse, CreateBlueprintRequest, FieldError};
use daap_server_auth::require_superuser;
use daap_server_auth::types::BlueprintId;
use daap_server_blueprint::validate_manifests;
use daap_server_db::NewBlueprint;
use daap_server_provider::registry;

use crate::api::AppState;
use crate::api_response::{self as respond, Ctx};
use crate::auth_middleware::RequireAuth;
use crate::error::ApiError;
use crate::validation::require_valid_name;

#[utoipa::path(
    post,
    path = "/blueprints",
    request_body = CreateBlueprintRequest,
    responses(
        (status = 201, description = "Blueprint created", body = BlueprintResponse),
        (status = 400, description = "Validation failed (name, provider, or manifests)"),
        (status = 403, description = "Superuser required"),
        (status = 409, description = "Name already taken")
    ),
    tag = "blueprints"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name))]
pub async fn create_blueprint(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateBlueprintRequest>, JsonRejection>,
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
	require_valid_name(&name, "name", &mut errors);
	if !registry::has(&payload.provider) {
		errors.push(FieldError::new(
			"provider",
			format!("{} is not a registered provider", payload.provider),
		));
	}
	if let Err(e) = validate_manifests(&payload.manifests) {
		errors.push(FieldError::new("manifests", e.to_string()));
	}
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	let new_blueprint = NewBlueprint {
		name,
		provider: payload.provider,
		manifests: payload.manifests,
	};
	match state.stores.blueprints.create_blueprint(new_blueprint).await {
		Ok(blueprint) => respond::created(&ctx, BlueprintResponse::from(blueprint)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/blueprints",
    responses(
        (status = 200, description = "All blueprints", body = [BlueprintResponse]),
        (status = 403, description = "Superuser required")
    ),
    tag = "blueprints"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name))]
pub async fn list_blueprints(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
		return respond::error(&ctx, e.into());
	}

	match state.stores.blueprints.list_blueprints().await {
		Ok(blueprints) => {
			let total = blueprints.len() as i64;
			let data: Vec<BlueprintResponse> =
				blueprints.into_iter().map(BlueprintResponse::from).collect();
			respond::list(&ctx, data, total, 1, total)
		}
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/blueprints/{id}",
    params(("id" = String, Path, description = "Blueprint ID")),
    responses(
        (status = 200, description = "The blueprint", body = BlueprintResponse),
        (status = 404, description = "No such blueprint")
    ),
    tag = "blueprints"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn get_blueprint(
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

	match state
		.stores
		.blueprints
		.get_blueprint_by_id(&BlueprintId::new(id))
		.await
	{
		Ok(Some(blueprint)) => respond::ok(&ctx, BlueprintResponse::from(blueprint)),
		Ok(None) => respond::error(&ctx, ApiError::not_found("blueprint")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    delete,
    path = "/blueprints/{id}",
    params(("id" = String, Path, description = "Blueprint ID")),
    responses(
        (status = 204, description = "Blueprint deleted"),
        (status = 404, description = "No such blueprint"),
        (status = 409, description = "Blueprint still referenced by tiers")
    ),
    tag = "blueprints"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn delete_blueprint(
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

	match state
		.stores
		.blueprints
		.delete_blueprint(&BlueprintId::new(id))
		.await
	{
		Ok(true) => respond::no_content(),
		Ok(false) => respond::error(&ctx, ApiError::not_found("blueprint")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}
