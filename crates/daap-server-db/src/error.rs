// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store error vocabulary and Postgres violation classification.
//!
//! Write failures are classified from the driver's *structured* error data:
//! the SQLSTATE code plus the violated constraint's name. Raw error message
//! text is never inspected. The constraint names referenced here are the
//! ones declared in the migrations under `migrations/`.

use std::fmt;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for foreign key constraint violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQLSTATE for CHECK constraint violations.
const CHECK_VIOLATION: &str = "23514";

/// The entity a store operation was addressing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
	Team,
	User,
	Blueprint,
	Tier,
	Database,
}

impl EntityKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			EntityKind::Team => "team",
			EntityKind::User => "user",
			EntityKind::Blueprint => "blueprint",
			EntityKind::Tier => "tier",
			EntityKind::Database => "database",
		}
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(EntityKind),

	#[error("Duplicate name: a {0} with this name already exists")]
	DuplicateName(EntityKind),

	#[error("Invalid reference: {0} refers to a row that does not exist")]
	InvalidReference(EntityKind),

	#[error("{entity} still has dependent {dependents} rows")]
	HasDependents {
		entity: EntityKind,
		dependents: EntityKind,
	},

	#[error("a superuser already exists")]
	SuperuserExists,

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Classify a violation raised by an INSERT or UPDATE.
///
/// Unique violations become [`DbError::DuplicateName`] (or
/// [`DbError::SuperuserExists`] for the superuser singleton index); foreign
/// key violations become [`DbError::InvalidReference`]. Anything else is not
/// a write violation and returns `None`.
pub(crate) fn classify_write_violation(
	entity: EntityKind,
	code: &str,
	constraint: Option<&str>,
) -> Option<DbError> {
	match code {
		UNIQUE_VIOLATION => match constraint {
			Some("users_superuser_singleton_idx") => Some(DbError::SuperuserExists),
			Some(name) if name.ends_with("_name_key") || name.ends_with("_name_active_idx") => {
				Some(DbError::DuplicateName(entity))
			}
			_ => None,
		},
		FOREIGN_KEY_VIOLATION => Some(DbError::InvalidReference(entity)),
		_ => None,
	}
}

/// Classify a violation raised by a DELETE.
///
/// A foreign key violation on delete means the row is still referenced; the
/// violated constraint identifies the dependent entity. Deleting a team
/// concurrently with a user creation trips the team-presence CHECK through
/// the SET NULL cascade, which classifies the same way as an active user
/// reference.
pub(crate) fn classify_delete_violation(code: &str, constraint: Option<&str>) -> Option<DbError> {
	match (code, constraint) {
		(CHECK_VIOLATION, Some("users_team_presence_check")) => Some(DbError::HasDependents {
			entity: EntityKind::Team,
			dependents: EntityKind::User,
		}),
		(FOREIGN_KEY_VIOLATION, Some("databases_owner_team_id_fkey")) => {
			Some(DbError::HasDependents {
				entity: EntityKind::Team,
				dependents: EntityKind::Database,
			})
		}
		(FOREIGN_KEY_VIOLATION, Some("tiers_blueprint_id_fkey")) => Some(DbError::HasDependents {
			entity: EntityKind::Blueprint,
			dependents: EntityKind::Tier,
		}),
		_ => None,
	}
}

/// Convert an INSERT/UPDATE failure into the store vocabulary.
pub(crate) fn write_error(entity: EntityKind, e: sqlx::Error) -> DbError {
	if let Some(db_err) = e.as_database_error() {
		if let Some(code) = db_err.code() {
			if let Some(classified) = classify_write_violation(entity, &code, db_err.constraint()) {
				return classified;
			}
		}
	}
	DbError::Sqlx(e)
}

/// Convert a DELETE failure into the store vocabulary.
pub(crate) fn delete_error(e: sqlx::Error) -> DbError {
	if let Some(db_err) = e.as_database_error() {
		if let Some(code) = db_err.code() {
			if let Some(classified) = classify_delete_violation(&code, db_err.constraint()) {
				return classified;
			}
		}
	}
	DbError::Sqlx(e)
}
