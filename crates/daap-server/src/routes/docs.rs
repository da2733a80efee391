// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document route. Unauthenticated.

use axum::Json;
use utoipa::OpenApi;

use daap_server_api::{
	ApiErrorBody, BlueprintResponse, ComponentHealth, CreateBlueprintRequest,
	CreateDatabaseRequest, CreateTeamRequest, CreateTierRequest, CreateUserRequest,
	CreateUserResponse, DatabaseResponse, FieldError, HealthResponse, Meta, TeamResponse,
	TierResponse, TierSummaryResponse, UpdateDatabaseRequest, UpdateTierRequest, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "daap",
		description = "Database-as-a-Service control plane"
	),
	paths(
		crate::routes::health::health_check,
		crate::routes::teams::create_team,
		crate::routes::teams::list_teams,
		crate::routes::teams::get_team,
		crate::routes::teams::delete_team,
		crate::routes::users::create_user,
		crate::routes::users::list_users,
		crate::routes::users::get_user,
		crate::routes::users::revoke_user,
		crate::routes::blueprints::create_blueprint,
		crate::routes::blueprints::list_blueprints,
		crate::routes::blueprints::get_blueprint,
		crate::routes::blueprints::delete_blueprint,
		crate::routes::tiers::create_tier,
		crate::routes::tiers::list_tiers,
		crate::routes::tiers::get_tier,
		crate::routes::tiers::update_tier,
		crate::routes::tiers::delete_tier,
		crate::routes::databases::create_database,
		crate::routes::databases::list_databases,
		crate::routes::databases::get_database,
		crate::routes::databases::update_database,
		crate::routes::databases::delete_database,
	),
	components(schemas(
		ApiErrorBody,
		BlueprintResponse,
		ComponentHealth,
		CreateBlueprintRequest,
		CreateDatabaseRequest,
		CreateTeamRequest,
		CreateTierRequest,
		CreateUserRequest,
		CreateUserResponse,
		DatabaseResponse,
		FieldError,
		HealthResponse,
		Meta,
		TeamResponse,
		TierResponse,
		TierSummaryResponse,
		UpdateDatabaseRequest,
		UpdateTierRequest,
		UserResponse,
	)),
	tags(
		(name = "health", description = "Liveness and dependency connectivity"),
		(name = "teams", description = "Team management"),
		(name = "users", description = "User and API key management"),
		(name = "blueprints", description = "Infrastructure templates"),
		(name = "tiers", description = "Infrastructure profiles"),
		(name = "databases", description = "Managed database lifecycle"),
	)
)]
pub struct ApiDoc;

/// GET /openapi.json - serve the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
