// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler. Unauthenticated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use daap_server_api::{ComponentHealth, Envelope, HealthResponse, Meta};
use daap_server_provider::registry;

use crate::api::AppState;
use crate::api_response::Ctx;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - liveness plus dependency connectivity.
#[tracing::instrument(skip(state))]
pub async fn health_check(ctx: Ctx, State(state): State<AppState>) -> Response {
	let database = match state.stores.users.count_users().await {
		Ok(_) => ComponentHealth::healthy(),
		Err(e) => ComponentHealth::unhealthy(e.to_string()),
	};

	let providers = registry::names();
	let orchestrator = if providers.is_empty() {
		ComponentHealth::degraded("no providers registered")
	} else {
		ComponentHealth::healthy()
	};

	let (status_code, status) = if database.status == "unhealthy" {
		(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
	} else if orchestrator.status == "degraded" {
		(StatusCode::OK, "degraded")
	} else {
		(StatusCode::OK, "healthy")
	};

	let response = HealthResponse {
		status: status.to_string(),
		version: state.version.clone(),
		database,
		orchestrator,
		providers,
	};
	(
		status_code,
		Json(Envelope::data(response, Meta::single(&ctx.request_id))),
	)
		.into_response()
}
