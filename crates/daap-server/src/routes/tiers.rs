// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tier HTTP handlers.
//!
//! Mutations are superuser-only. Reads are role-scoped: platform teams and
//! the superuser see the full tier, product teams only the
//! `{id, name, description}` projection. Tier names are immutable; PATCH
//! rejects attempts to change them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use daap_server_api::{
	CreateTierRequest, FieldError, TierResponse, TierSummaryResponse, UpdateTierRequest,
};
use daap_server_auth::types::TierId;
use daap_server_auth::{require_role, require_superuser, Identity, TeamRole};
use daap_server_db::{DestructionStrategy, NewTier, TierUpdate};

use crate::api::AppState;
use crate::api_response::{self as respond, Ctx};
use crate::auth_middleware::RequireAuth;
use crate::error::ApiError;
use crate::validation::require_valid_name;

/// Reads are open to both roles and the superuser.
fn authorize_read(identity: &Identity) -> Result<(), ApiError> {
	if identity.is_superuser {
		return Ok(());
	}
	require_role(identity, &[TeamRole::Platform, TeamRole::Product]).map_err(Into::into)
}

#[utoipa::path(
    post,
    path = "/tiers",
    request_body = CreateTierRequest,
    responses(
        (status = 201, description = "Tier created", body = TierResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Superuser required"),
        (status = 409, description = "Name already taken"),
        (status = 422, description = "Blueprint does not exist")
    ),
    tag = "tiers"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name))]
pub async fn create_tier(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	payload: Result<Json<CreateTierRequest>, JsonRejection>,
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
	let destruction_strategy = match payload.destruction_strategy.parse::<DestructionStrategy>() {
		Ok(strategy) => strategy,
		Err(_) => {
			errors.push(FieldError::new(
				"destructionStrategy",
				r#"must be "freeze", "archive", or "hard_delete""#,
			));
			return respond::error(&ctx, ApiError::validation(errors));
		}
	};
	if !errors.is_empty() {
		return respond::error(&ctx, ApiError::validation(errors));
	}

	let blueprint_id = match &payload.blueprint_name {
		Some(blueprint_name) => {
			match state
				.stores
				.blueprints
				.get_blueprint_by_name(blueprint_name)
				.await
			{
				Ok(Some(blueprint)) => Some(blueprint.id),
				Ok(None) => {
					return respond::error(
						&ctx,
						ApiError::semantic(vec![FieldError::new(
							"blueprintName",
							format!("blueprint {blueprint_name} does not exist"),
						)]),
					);
				}
				Err(e) => return respond::error(&ctx, e.into()),
			}
		}
		None => None,
	};

	let new_tier = NewTier {
		name,
		description: payload.description,
		blueprint_id,
		destruction_strategy,
		backup_enabled: payload.backup_enabled,
	};
	match state.stores.tiers.create_tier(new_tier).await {
		Ok(tier) => respond::created(&ctx, TierResponse::from(tier)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    get,
    path = "/tiers",
    responses(
        (status = 200, description = "All tiers; product callers see the summary projection", body = [TierResponse]),
        (status = 403, description = "Role required")
    ),
    tag = "tiers"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name))]
pub async fn list_tiers(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
) -> Response {
	if let Err(e) = authorize_read(&identity) {
		return respond::error(&ctx, e);
	}

	let tiers = match state.stores.tiers.list_tiers().await {
		Ok(tiers) => tiers,
		Err(e) => return respond::error(&ctx, e.into()),
	};
	let total = tiers.len() as i64;

	if identity.is_product() {
		let data: Vec<TierSummaryResponse> =
			tiers.into_iter().map(TierSummaryResponse::from).collect();
		respond::list(&ctx, data, total, 1, total)
	} else {
		let data: Vec<TierResponse> = tiers.into_iter().map(TierResponse::from).collect();
		respond::list(&ctx, data, total, 1, total)
	}
}

#[utoipa::path(
    get,
    path = "/tiers/{id}",
    params(("id" = String, Path, description = "Tier ID")),
    responses(
        (status = 200, description = "The tier", body = TierResponse),
        (status = 404, description = "No such tier")
    ),
    tag = "tiers"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn get_tier(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Response {
	if let Err(e) = authorize_read(&identity) {
		return respond::error(&ctx, e);
	}
	let Ok(id) = Uuid::parse_str(&id) else {
		return respond::error(&ctx, ApiError::invalid_id());
	};

	match state.stores.tiers.get_tier_by_id(&TierId::new(id)).await {
		Ok(Some(tier)) => {
			if identity.is_product() {
				respond::ok(&ctx, TierSummaryResponse::from(tier))
			} else {
				respond::ok(&ctx, TierResponse::from(tier))
			}
		}
		Ok(None) => respond::error(&ctx, ApiError::not_found("tier")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    patch,
    path = "/tiers/{id}",
    params(("id" = String, Path, description = "Tier ID")),
    request_body = UpdateTierRequest,
    responses(
        (status = 200, description = "Updated tier", body = TierResponse),
        (status = 403, description = "Superuser required"),
        (status = 404, description = "No such tier"),
        (status = 422, description = "Attempted to change an immutable field")
    ),
    tag = "tiers"
)]
#[tracing::instrument(skip(state, payload), fields(user = %identity.user_name, %id))]
pub async fn update_tier(
	ctx: Ctx,
	RequireAuth(identity): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateTierRequest>, JsonRejection>,
) -> Response {
	if let Err(e) = require_superuser(&identity) {
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

	if payload.name.is_some() {
		return respond::error(&ctx, ApiError::immutable_field("name"));
	}
	let destruction_strategy = match payload.destruction_strategy {
		Some(raw) => match raw.parse::<DestructionStrategy>() {
			Ok(strategy) => Some(strategy),
			Err(_) => {
				return respond::error(
					&ctx,
					ApiError::validation(vec![FieldError::new(
						"destructionStrategy",
						r#"must be "freeze", "archive", or "hard_delete""#,
					)]),
				);
			}
		},
		None => None,
	};

	let update = TierUpdate {
		description: payload.description,
		destruction_strategy,
		backup_enabled: payload.backup_enabled,
	};
	match state.stores.tiers.update_tier(&TierId::new(id), update).await {
		Ok(tier) => respond::ok(&ctx, TierResponse::from(tier)),
		Err(e) => respond::error(&ctx, e.into()),
	}
}

#[utoipa::path(
    delete,
    path = "/tiers/{id}",
    params(("id" = String, Path, description = "Tier ID")),
    responses(
        (status = 204, description = "Tier deleted"),
        (status = 404, description = "No such tier"),
        (status = 409, description = "Active databases still reference the tier")
    ),
    tag = "tiers"
)]
#[tracing::instrument(skip(state), fields(user = %identity.user_name, %id))]
pub async fn delete_tier(
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

	match state.stores.tiers.delete_tier(&TierId::new(id)).await {
		Ok(true) => respond::no_content(),
		Ok(false) => respond::error(&ctx, ApiError::not_found("tier")),
		Err(e) => respond::error(&ctx, e.into()),
	}
}
