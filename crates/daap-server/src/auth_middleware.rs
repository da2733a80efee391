// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication extractor.
//!
//! Handlers that name [`RequireAuth`] get a resolved [`Identity`] or the
//! request ends with a 401 envelope before the handler runs. No identity in
//! the request means 401; a present identity failing a *gate* is the
//! handler's 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use daap_server_auth::Identity;
use daap_server_identity::AuthError;

use crate::api::AppState;
use crate::api_response::error_with_request_id;
use crate::error::ApiError;
use crate::middleware::RequestId;

/// Header carrying the raw API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extracts and authenticates the caller.
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
	type Rejection = Response;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let request_id = parts
			.extensions
			.get::<RequestId>()
			.map(|id| id.0.clone())
			.unwrap_or_default();

		let Some(raw_key) = parts
			.headers
			.get(API_KEY_HEADER)
			.and_then(|value| value.to_str().ok())
		else {
			return Err(error_with_request_id(
				&request_id,
				ApiError::unauthenticated(),
			));
		};

		match state.authenticator.authenticate(raw_key).await {
			Ok(identity) => Ok(Self(identity)),
			Err(AuthError::InvalidKey) => Err(error_with_request_id(
				&request_id,
				ApiError::unauthenticated(),
			)),
			Err(AuthError::Store(e)) => {
				tracing::error!(error = %e, "authentication failed against the store");
				Err(error_with_request_id(&request_id, ApiError::internal()))
			}
		}
	}
}
