// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! Users are never hard-deleted; revocation stamps `revoked_at` and removes
//! the user from the authentication candidate set. The prefix lookup only
//! ever sees non-revoked rows, matching the partial index on
//! `api_key_prefix`.

use async_trait::async_trait;
use daap_server_auth::{TeamId, User, UserId};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{write_error, DbError, EntityKind};
use crate::types::NewUser;

/// Outcome of a revocation attempt against an existing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
	/// The user was active and is now revoked.
	Revoked,
	/// The user was already revoked; `revoked_at` did not advance.
	AlreadyRevoked,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, new: NewUser) -> Result<User, DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn list_users(&self) -> Result<Vec<User>, DbError>;
	async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<User>, DbError>;
	async fn revoke_user(&self, id: &UserId) -> Result<RevokeOutcome, DbError>;
	async fn count_users(&self) -> Result<i64, DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
		self.create_user(new).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn list_users(&self) -> Result<Vec<User>, DbError> {
		self.list_users().await
	}

	async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<User>, DbError> {
		self.find_by_prefix(prefix).await
	}

	async fn revoke_user(&self, id: &UserId) -> Result<RevokeOutcome, DbError> {
		self.revoke_user(id).await
	}

	async fn count_users(&self) -> Result<i64, DbError> {
		self.count_users().await
	}
}

/// Repository for user database operations.
///
/// Only the key prefix and argon2 hash reach this layer; the raw key never
/// does.
#[derive(Clone)]
pub struct UserRepository {
	pool: PgPool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Create a new user.
	///
	/// # Errors
	/// - `DbError::InvalidReference` when `team_id` does not exist
	/// - `DbError::SuperuserExists` when a second superuser is attempted
	///
	/// # Database Constraints
	/// - `users_team_id_fkey`: team must exist
	/// - `users_team_presence_check`: superuser has no team, members have one
	/// - `users_superuser_singleton_idx`: at most one superuser
	#[tracing::instrument(skip(self, new), fields(name = %new.name, is_superuser = new.is_superuser))]
	pub async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
		let row = sqlx::query(
			r#"
			INSERT INTO users (id, name, team_id, is_superuser, api_key_prefix, api_key_hash)
			VALUES ($1, $2, $3, $4, $5, $6)
			RETURNING id, name, team_id, is_superuser, api_key_prefix, api_key_hash,
			          revoked_at, created_at, updated_at
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(&new.name)
		.bind(new.team_id.map(|t| t.into_inner()))
		.bind(new.is_superuser)
		.bind(&new.api_key_prefix)
		.bind(&new.api_key_hash)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::User, e))?;

		let user = parse_user_row(&row);
		tracing::debug!(user_id = %user.id, name = %user.name, "user created");
		Ok(user)
	}

	/// Get a user by ID, regardless of revocation status.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, team_id, is_superuser, api_key_prefix, api_key_hash,
			       revoked_at, created_at, updated_at
			FROM users
			WHERE id = $1
			"#,
		)
		.bind(id.as_uuid())
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| parse_user_row(&r)))
	}

	/// List all users, oldest first, including revoked ones.
	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, team_id, is_superuser, api_key_prefix, api_key_hash,
			       revoked_at, created_at, updated_at
			FROM users
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(parse_user_row).collect())
	}

	/// Find authentication candidates by key prefix.
	///
	/// Revoked users never appear here. Multiple candidates are possible:
	/// the prefix is short, and authentication verifies each candidate's
	/// hash.
	#[tracing::instrument(skip(self, prefix))]
	pub async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, team_id, is_superuser, api_key_prefix, api_key_hash,
			       revoked_at, created_at, updated_at
			FROM users
			WHERE api_key_prefix = $1 AND revoked_at IS NULL
			"#,
		)
		.bind(prefix)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(parse_user_row).collect())
	}

	/// Revoke a user (soft).
	///
	/// # Returns
	/// [`RevokeOutcome::AlreadyRevoked`] on repeat calls; `revoked_at` does
	/// not advance.
	///
	/// # Errors
	/// `DbError::NotFound` when no user exists with this ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn revoke_user(&self, id: &UserId) -> Result<RevokeOutcome, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET revoked_at = NOW(), updated_at = NOW()
			WHERE id = $1 AND revoked_at IS NULL
			"#,
		)
		.bind(id.as_uuid())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			tracing::info!(user_id = %id, "user revoked");
			return Ok(RevokeOutcome::Revoked);
		}

		let exists = sqlx::query("SELECT 1 FROM users WHERE id = $1")
			.bind(id.as_uuid())
			.fetch_optional(&self.pool)
			.await?
			.is_some();

		if exists {
			Ok(RevokeOutcome::AlreadyRevoked)
		} else {
			Err(DbError::NotFound(EntityKind::User))
		}
	}

	/// Count all users, revoked included. Used by the superuser bootstrap.
	#[tracing::instrument(skip(self))]
	pub async fn count_users(&self) -> Result<i64, DbError> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("count"))
	}
}

fn parse_user_row(row: &PgRow) -> User {
	User {
		id: UserId::new(row.get("id")),
		name: row.get("name"),
		team_id: row.get::<Option<Uuid>, _>("team_id").map(TeamId::new),
		is_superuser: row.get("is_superuser"),
		api_key_prefix: row.get("api_key_prefix"),
		api_key_hash: row.get("api_key_hash"),
		revoked_at: row.get("revoked_at"),
		created_at: row.get("created_at"),
		updated_at: row.get("updated_at"),
	}
}
