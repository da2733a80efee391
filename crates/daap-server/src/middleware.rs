// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request middleware: request-id plumbing and panic recovery.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use uuid::Uuid;

use crate::api_response::error_with_request_id;
use crate::error::ApiError;

/// The per-request id, planted into request extensions and echoed as the
/// `x-request-id` response header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn request_id(mut request: Request, next: Next) -> Response {
	let id = Uuid::new_v4().to_string();
	request.extensions_mut().insert(RequestId(id.clone()));

	let mut response = next.run(request).await;
	if let Ok(value) = HeaderValue::from_str(&id) {
		response.headers_mut().insert("x-request-id", value);
	}
	response
}

/// Convert handler panics into a 500 envelope with the request id
/// preserved.
pub async fn recover_panics(request: Request, next: Next) -> Response {
	let request_id = request
		.extensions()
		.get::<RequestId>()
		.map(|id| id.0.clone())
		.unwrap_or_default();

	match AssertUnwindSafe(next.run(request)).catch_unwind().await {
		Ok(response) => response,
		Err(panic) => {
			let message = panic
				.downcast_ref::<&str>()
				.map(|s| (*s).to_string())
				.or_else(|| panic.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| "panic with non-string payload".to_string());
			tracing::error!(request_id = %request_id, panic = %message, "request handler panicked");
			error_with_request_id(&request_id, ApiError::internal())
		}
	}
}
