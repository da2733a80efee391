// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Team repository for database operations.

use async_trait::async_trait;
use daap_server_auth::{Team, TeamId, TeamRole};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{delete_error, write_error, DbError, EntityKind};
use crate::types::NewTeam;

#[async_trait]
pub trait TeamStore: Send + Sync {
	async fn create_team(&self, new: NewTeam) -> Result<Team, DbError>;
	async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, DbError>;
	async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, DbError>;
	async fn list_teams(&self) -> Result<Vec<Team>, DbError>;
	async fn delete_team(&self, id: &TeamId) -> Result<bool, DbError>;
}

#[async_trait]
impl TeamStore for TeamRepository {
	async fn create_team(&self, new: NewTeam) -> Result<Team, DbError> {
		self.create_team(new).await
	}

	async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, DbError> {
		self.get_team_by_id(id).await
	}

	async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, DbError> {
		self.get_team_by_name(name).await
	}

	async fn list_teams(&self) -> Result<Vec<Team>, DbError> {
		self.list_teams().await
	}

	async fn delete_team(&self, id: &TeamId) -> Result<bool, DbError> {
		self.delete_team(id).await
	}
}

/// Repository for team database operations.
#[derive(Clone)]
pub struct TeamRepository {
	pool: PgPool,
}

impl TeamRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Create a new team.
	///
	/// # Errors
	/// Returns `DbError::DuplicateName` when the name is taken.
	///
	/// # Database Constraints
	/// - `teams_name_key`: name must be globally unique
	/// - `teams_role_check`: role is `platform` or `product`
	#[tracing::instrument(skip(self, new), fields(name = %new.name, role = %new.role))]
	pub async fn create_team(&self, new: NewTeam) -> Result<Team, DbError> {
		let row = sqlx::query(
			r#"
			INSERT INTO teams (id, name, role)
			VALUES ($1, $2, $3)
			RETURNING id, name, role, created_at, updated_at
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(&new.name)
		.bind(new.role.as_str())
		.fetch_one(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Team, e))?;

		let team = parse_team_row(&row)?;
		tracing::debug!(team_id = %team.id, name = %team.name, "team created");
		Ok(team)
	}

	/// Get a team by ID.
	///
	/// # Returns
	/// `None` if no team exists with this ID.
	#[tracing::instrument(skip(self), fields(team_id = %id))]
	pub async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, role, created_at, updated_at
			FROM teams
			WHERE id = $1
			"#,
		)
		.bind(id.as_uuid())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_team_row(&r)).transpose()
	}

	/// Get a team by its unique name.
	#[tracing::instrument(skip(self))]
	pub async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, role, created_at, updated_at
			FROM teams
			WHERE name = $1
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_team_row(&r)).transpose()
	}

	/// List all teams, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_teams(&self) -> Result<Vec<Team>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, role, created_at, updated_at
			FROM teams
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_team_row).collect()
	}

	/// Delete a team.
	///
	/// # Returns
	/// `false` if no team exists with this ID.
	///
	/// # Errors
	/// Returns `DbError::HasDependents` while non-revoked users or any
	/// databases still reference the team. Revoked users do not block
	/// deletion; the SET NULL foreign key detaches them.
	#[tracing::instrument(skip(self), fields(team_id = %id))]
	pub async fn delete_team(&self, id: &TeamId) -> Result<bool, DbError> {
		let row = sqlx::query(
			"SELECT COUNT(*) AS count FROM users WHERE team_id = $1 AND revoked_at IS NULL",
		)
		.bind(id.as_uuid())
		.fetch_one(&self.pool)
		.await?;
		let active_users: i64 = row.get("count");

		if active_users > 0 {
			return Err(DbError::HasDependents {
				entity: EntityKind::Team,
				dependents: EntityKind::User,
			});
		}

		let result = sqlx::query("DELETE FROM teams WHERE id = $1")
			.bind(id.as_uuid())
			.execute(&self.pool)
			.await
			.map_err(delete_error)?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(team_id = %id, "team deleted");
		}
		Ok(deleted)
	}
}

fn parse_team_row(row: &PgRow) -> Result<Team, DbError> {
	let role_str: String = row.get("role");
	let role: TeamRole = role_str
		.parse()
		.map_err(|e: String| DbError::Internal(e))?;

	Ok(Team {
		id: TeamId::new(row.get("id")),
		name: row.get("name"),
		role,
		created_at: row.get("created_at"),
		updated_at: row.get("updated_at"),
	})
}
