// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The response envelope.
//!
//! Every response body is `{data, error, meta}`. `meta` always carries the
//! request id and a timestamp; list responses add `{total, page, limit}`.
//! Error bodies carry a stable uppercase `code`, a human-readable
//! `message`, and optionally per-field `details`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Response metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
	pub request_id: String,
	pub timestamp: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<i64>,
}

impl Meta {
	/// Metadata for a single (non-list) response.
	pub fn single(request_id: impl Into<String>) -> Self {
		Self {
			request_id: request_id.into(),
			timestamp: Utc::now(),
			total: None,
			page: None,
			limit: None,
		}
	}

	/// Metadata for a list response.
	pub fn list(request_id: impl Into<String>, total: i64, page: i64, limit: i64) -> Self {
		Self {
			request_id: request_id.into(),
			timestamp: Utc::now(),
			total: Some(total),
			page: Some(page),
			limit: Some(limit),
		}
	}
}

/// One failed field in a validation batch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

impl FieldError {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// The `error` half of the envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiErrorBody {
	/// Stable uppercase code from the closed set.
	pub code: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Vec<FieldError>>,
}

/// The response envelope. Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
	pub data: Option<T>,
	pub error: Option<ApiErrorBody>,
	pub meta: Meta,
}

impl<T: Serialize> Envelope<T> {
	pub fn data(data: T, meta: Meta) -> Self {
		Self {
			data: Some(data),
			error: None,
			meta,
		}
	}
}

impl Envelope<()> {
	pub fn error(error: ApiErrorBody, meta: Meta) -> Self {
		Self {
			data: None,
			error: Some(error),
			meta,
		}
	}
}
