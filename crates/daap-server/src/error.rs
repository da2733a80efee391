// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transport error vocabulary.
//!
//! Store and domain errors translate into `(status, code, message,
//! details)`; nothing is recovered here, only mapped. The `code` values are
//! a closed set and deterministic for a given failure.

use axum::http::StatusCode;
use daap_server_api::FieldError;
use daap_server_auth::AuthzError;
use daap_server_db::{DbError, EntityKind};
use daap_server_provisioning::ProvisionError;

/// Closed set of stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
	InvalidJson,
	ValidationError,
	InvalidId,
	NotFound,
	DuplicateName,
	TeamHasUsers,
	TierHasDatabases,
	BlueprintHasTiers,
	ImmutableField,
	Forbidden,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::InvalidJson => "INVALID_JSON",
			ErrorCode::ValidationError => "VALIDATION_ERROR",
			ErrorCode::InvalidId => "INVALID_ID",
			ErrorCode::NotFound => "NOT_FOUND",
			ErrorCode::DuplicateName => "DUPLICATE_NAME",
			ErrorCode::TeamHasUsers => "TEAM_HAS_USERS",
			ErrorCode::TierHasDatabases => "TIER_HAS_DATABASES",
			ErrorCode::BlueprintHasTiers => "BLUEPRINT_HAS_TIERS",
			ErrorCode::ImmutableField => "IMMUTABLE_FIELD",
			ErrorCode::Forbidden => "FORBIDDEN",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

/// A fully mapped API error, ready for the envelope.
#[derive(Debug, Clone)]
pub struct ApiError {
	pub status: StatusCode,
	pub code: ErrorCode,
	pub message: String,
	pub details: Option<Vec<FieldError>>,
}

impl ApiError {
	fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			status,
			code,
			message: message.into(),
			details: None,
		}
	}

	/// 400: the body is not parseable JSON (or exceeds the size cap).
	pub fn invalid_json(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidJson, message)
	}

	/// 400: input failed validation; details carry the full batch.
	pub fn validation(details: Vec<FieldError>) -> Self {
		Self {
			status: StatusCode::BAD_REQUEST,
			code: ErrorCode::ValidationError,
			message: "request validation failed".to_string(),
			details: Some(details),
		}
	}

	/// 422: the request parses and validates but is semantically rejected.
	pub fn semantic(details: Vec<FieldError>) -> Self {
		Self {
			status: StatusCode::UNPROCESSABLE_ENTITY,
			code: ErrorCode::ValidationError,
			message: "request was rejected".to_string(),
			details: Some(details),
		}
	}

	/// 400: a path id is not a valid UUID.
	pub fn invalid_id() -> Self {
		Self::new(
			StatusCode::BAD_REQUEST,
			ErrorCode::InvalidId,
			"identifier is not a valid UUID",
		)
	}

	/// 404, also used for ownership-scoped absence.
	pub fn not_found(what: impl Into<String>) -> Self {
		Self::new(
			StatusCode::NOT_FOUND,
			ErrorCode::NotFound,
			format!("{} not found", what.into()),
		)
	}

	/// 401: no identity could be resolved from the request.
	pub fn unauthenticated() -> Self {
		Self::new(
			StatusCode::UNAUTHORIZED,
			ErrorCode::Forbidden,
			"missing or invalid API key",
		)
	}

	/// 403: a valid identity failed a gate.
	pub fn forbidden(message: impl Into<String>) -> Self {
		Self::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
	}

	/// 422: an immutable field was supplied in an update.
	pub fn immutable_field(field: &str) -> Self {
		Self {
			status: StatusCode::UNPROCESSABLE_ENTITY,
			code: ErrorCode::ImmutableField,
			message: format!("{field} is immutable"),
			details: Some(vec![FieldError::new(field, "cannot be changed")]),
		}
	}

	/// 500, with the cause kept out of the response body.
	pub fn internal() -> Self {
		Self::new(
			StatusCode::INTERNAL_SERVER_ERROR,
			ErrorCode::InternalError,
			"internal server error",
		)
	}
}

impl From<AuthzError> for ApiError {
	fn from(e: AuthzError) -> Self {
		ApiError::forbidden(e.to_string())
	}
}

impl From<DbError> for ApiError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(entity) => ApiError::not_found(entity.as_str()),
			DbError::DuplicateName(entity) => ApiError::new(
				StatusCode::CONFLICT,
				ErrorCode::DuplicateName,
				format!("a {entity} with this name already exists"),
			),
			DbError::InvalidReference(entity) => ApiError::semantic(vec![FieldError::new(
				"reference",
				format!("{entity} refers to a row that does not exist"),
			)]),
			DbError::HasDependents { entity, dependents } => {
				let code = match entity {
					EntityKind::Team => ErrorCode::TeamHasUsers,
					EntityKind::Tier => ErrorCode::TierHasDatabases,
					EntityKind::Blueprint => ErrorCode::BlueprintHasTiers,
					_ => ErrorCode::InternalError,
				};
				ApiError::new(
					StatusCode::CONFLICT,
					code,
					format!("{entity} still has dependent {dependents} rows"),
				)
			}
			DbError::SuperuserExists | DbError::Sqlx(_) | DbError::Internal(_) => {
				tracing::error!(error = %e, "store error");
				ApiError::internal()
			}
		}
	}
}

impl From<ProvisionError> for ApiError {
	fn from(e: ProvisionError) -> Self {
		match e {
			ProvisionError::NotFound => ApiError::not_found("database"),
			ProvisionError::UnknownTier(name) => ApiError::semantic(vec![FieldError::new(
				"tierName",
				format!("tier {name} does not exist"),
			)]),
			ProvisionError::Store(e) => e.into(),
		}
	}
}
