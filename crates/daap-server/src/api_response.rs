// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Envelope builders and the per-request context.
//!
//! Handlers extract a [`Ctx`] (the request id planted by the middleware)
//! and build every response through these helpers so the `{data, error,
//! meta}` envelope is uniform across the surface.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::convert::Infallible;

use daap_server_api::{ApiErrorBody, Envelope, Meta};

use crate::error::ApiError;
use crate::middleware::RequestId;

/// Per-request context available to every handler.
#[derive(Debug, Clone)]
pub struct Ctx {
	pub request_id: String,
}

impl<S> FromRequestParts<S> for Ctx
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let request_id = parts
			.extensions
			.get::<RequestId>()
			.map(|id| id.0.clone())
			.unwrap_or_default();
		Ok(Self { request_id })
	}
}

/// 200 with a data envelope.
pub fn ok<T: Serialize>(ctx: &Ctx, data: T) -> Response {
	(
		StatusCode::OK,
		Json(Envelope::data(data, Meta::single(&ctx.request_id))),
	)
		.into_response()
}

/// 201 with a data envelope.
pub fn created<T: Serialize>(ctx: &Ctx, data: T) -> Response {
	(
		StatusCode::CREATED,
		Json(Envelope::data(data, Meta::single(&ctx.request_id))),
	)
		.into_response()
}

/// 200 with a list envelope; meta carries total/page/limit.
pub fn list<T: Serialize>(ctx: &Ctx, data: Vec<T>, total: i64, page: i64, limit: i64) -> Response {
	(
		StatusCode::OK,
		Json(Envelope::data(
			data,
			Meta::list(&ctx.request_id, total, page, limit),
		)),
	)
		.into_response()
}

/// 204, no body.
pub fn no_content() -> Response {
	StatusCode::NO_CONTENT.into_response()
}

/// An error envelope at the error's status.
pub fn error(ctx: &Ctx, err: ApiError) -> Response {
	error_with_request_id(&ctx.request_id, err)
}

/// An error envelope when only the raw request id is at hand (middleware,
/// extractors).
pub fn error_with_request_id(request_id: &str, err: ApiError) -> Response {
	let body = ApiErrorBody {
		code: err.code.as_str().to_string(),
		message: err.message,
		details: err.details,
	};
	(
		err.status,
		Json(Envelope::error(body, Meta::single(request_id))),
	)
		.into_response()
}
