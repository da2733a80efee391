// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use daap_server_db::Stores;
use daap_server_identity::Authenticator;
use daap_server_provisioning::DatabaseProvisioningService;

use crate::middleware::{recover_panics, request_id};
use crate::routes;

/// Request bodies are capped before parsing.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub stores: Stores,
	pub authenticator: Authenticator,
	pub provisioning: DatabaseProvisioningService,
	pub version: String,
}

/// Create the application state over a store bundle.
pub fn create_app_state(
	stores: Stores,
	namespace: impl Into<String>,
	version: impl Into<String>,
) -> AppState {
	AppState {
		authenticator: Authenticator::new(stores.clone()),
		provisioning: DatabaseProvisioningService::new(stores.clone(), namespace),
		stores,
		version: version.into(),
	}
}

/// Assemble the router with all routes and request middleware.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/openapi.json", get(routes::docs::openapi_json))
		.route(
			"/teams",
			get(routes::teams::list_teams).post(routes::teams::create_team),
		)
		.route(
			"/teams/{id}",
			get(routes::teams::get_team).delete(routes::teams::delete_team),
		)
		.route(
			"/users",
			get(routes::users::list_users).post(routes::users::create_user),
		)
		.route(
			"/users/{id}",
			get(routes::users::get_user).delete(routes::users::revoke_user),
		)
		.route(
			"/blueprints",
			get(routes::blueprints::list_blueprints).post(routes::blueprints::create_blueprint),
		)
		.route(
			"/blueprints/{id}",
			get(routes::blueprints::get_blueprint).delete(routes::blueprints::delete_blueprint),
		)
		.route(
			"/tiers",
			get(routes::tiers::list_tiers).post(routes::tiers::create_tier),
		)
		.route(
			"/tiers/{id}",
			get(routes::tiers::get_tier)
				.patch(routes::tiers::update_tier)
				.delete(routes::tiers::delete_tier),
		)
		.route(
			"/databases",
			get(routes::databases::list_databases).post(routes::databases::create_database),
		)
		.route(
			"/databases/{id}",
			get(routes::databases::get_database)
				.patch(routes::databases::update_database)
				.delete(routes::databases::delete_database),
		)
		.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
		.layer(axum_middleware::from_fn(recover_panics))
		.layer(axum_middleware::from_fn(request_id))
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		)
		.with_state(state)
}
