// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database repository: CRUD over the primary product entity.
//!
//! All reads exclude soft-deleted rows and join the owning team, tier, and
//! blueprint in a single SELECT, so `owner_team_name`, `tier_name`,
//! `blueprint_name`, and `provider_name` are populated without extra round
//! trips. Status mutation is a separate path (`update_status`) reserved for
//! the reconciler; the general update only touches `owner_team_id` and
//! `purpose`.

use async_trait::async_trait;
use daap_server_auth::types::{DatabaseId, TeamId, TierId};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{write_error, DbError, EntityKind};
use crate::types::{
	ConnectionInfo, Database, DatabaseFilter, DatabaseStatus, DatabaseUpdate, NewDatabase,
	Pagination,
};

#[async_trait]
pub trait DatabaseStore: Send + Sync {
	async fn create_database(&self, new: NewDatabase) -> Result<Database, DbError>;
	async fn get_database(&self, id: &DatabaseId) -> Result<Option<Database>, DbError>;
	async fn list_databases(
		&self,
		filter: &DatabaseFilter,
		page: &Pagination,
	) -> Result<(Vec<Database>, i64), DbError>;
	async fn update_database(
		&self,
		id: &DatabaseId,
		update: DatabaseUpdate,
	) -> Result<Database, DbError>;
	async fn update_status(
		&self,
		id: &DatabaseId,
		status: DatabaseStatus,
		connection: Option<&ConnectionInfo>,
	) -> Result<bool, DbError>;
	async fn soft_delete_database(&self, id: &DatabaseId) -> Result<bool, DbError>;
}

#[async_trait]
impl DatabaseStore for DatabaseRepository {
	async fn create_database(&self, new: NewDatabase) -> Result<Database, DbError> {
		self.create_database(new).await
	}

	async fn get_database(&self, id: &DatabaseId) -> Result<Option<Database>, DbError> {
		self.get_database(id).await
	}

	async fn list_databases(
		&self,
		filter: &DatabaseFilter,
		page: &Pagination,
	) -> Result<(Vec<Database>, i64), DbError> {
		self.list_databases(filter, page).await
	}

	async fn update_database(
		&self,
		id: &DatabaseId,
		update: DatabaseUpdate,
	) -> Result<Database, DbError> {
		self.update_database(id, update).await
	}

	async fn update_status(
		&self,
		id: &DatabaseId,
		status: DatabaseStatus,
		connection: Option<&ConnectionInfo>,
	) -> Result<bool, DbError> {
		self.update_status(id, status, connection).await
	}

	async fn soft_delete_database(&self, id: &DatabaseId) -> Result<bool, DbError> {
		self.soft_delete_database(id).await
	}
}

/// Repository for managed-database operations.
#[derive(Clone)]
pub struct DatabaseRepository {
	pool: PgPool,
}

impl DatabaseRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Create a new database record in status `provisioning`.
	///
	/// # Errors
	/// - `DbError::DuplicateName` when an *active* database already has the
	///   name (`databases_name_active_idx`; deleted names are reusable)
	/// - `DbError::InvalidReference` when the owner team or tier is gone,
	///   including the lookup-then-insert race against a concurrent delete
	#[tracing::instrument(skip(self, new), fields(name = %new.name, owner_team_id = %new.owner_team_id))]
	pub async fn create_database(&self, new: NewDatabase) -> Result<Database, DbError> {
		let row = sqlx::query(
			r#"
			INSERT INTO databases (id, name, owner_team_id, tier_id, purpose, namespace, status)
			VALUES ($1, $2, $3, $4, $5, $6, 'provisioning')
			RETURNING id
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(&new.name)
		.bind(new.owner_team_id.as_uuid())
		.bind(new.tier_id.map(|t| t.into_inner()))
		.bind(&new.purpose)
		.bind(&new.namespace)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Database, e))?;

		let id = DatabaseId::new(row.get("id"));
		tracing::info!(database_id = %id, name = %new.name, "database created");
		self
			.get_database(&id)
			.await?
			.ok_or(DbError::NotFound(EntityKind::Database))
	}

	/// Get an active database by ID, with joined names populated.
	///
	/// # Returns
	/// `None` if no row exists or the row is soft-deleted.
	#[tracing::instrument(skip(self), fields(database_id = %id))]
	pub async fn get_database(&self, id: &DatabaseId) -> Result<Option<Database>, DbError> {
		let row = sqlx::query(&format!(
			"{DATABASE_SELECT} WHERE d.deleted_at IS NULL AND d.id = $1"
		))
		.bind(id.as_uuid())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_database_row(&r)).transpose()
	}

	/// List active databases, newest first.
	///
	/// Filters apply conjunctively; the name filter is a case-insensitive
	/// substring match. Returns the page plus the total row count, computed
	/// in the same statement.
	#[tracing::instrument(skip(self, filter), fields(page = page.page, limit = page.limit))]
	pub async fn list_databases(
		&self,
		filter: &DatabaseFilter,
		page: &Pagination,
	) -> Result<(Vec<Database>, i64), DbError> {
		let rows = sqlx::query(&format!(
			r#"{DATABASE_SELECT}
			WHERE d.deleted_at IS NULL
			  AND ($1::uuid IS NULL OR d.owner_team_id = $1)
			  AND ($2::text IS NULL OR d.status = $2)
			  AND ($3::text IS NULL OR d.name ILIKE '%' || $3 || '%')
			ORDER BY d.created_at DESC
			LIMIT $4 OFFSET $5
			"#
		))
		.bind(filter.owner_team_id.map(|t| t.into_inner()))
		.bind(filter.status.map(|s| s.as_str()))
		.bind(filter.name.as_deref())
		.bind(page.limit)
		.bind(page.offset())
		.fetch_all(&self.pool)
		.await?;

		let total = rows
			.first()
			.map(|r| r.get::<i64, _>("total_count"))
			.unwrap_or(0);
		let databases = rows
			.iter()
			.map(parse_database_row)
			.collect::<Result<Vec<_>, _>>()?;

		tracing::debug!(count = databases.len(), total, "listed databases");
		Ok((databases, total))
	}

	/// Update mutable database fields (`owner_team_id`, `purpose`).
	///
	/// Soft-deleted rows are not updatable.
	///
	/// # Errors
	/// - `DbError::NotFound` when the row is absent or soft-deleted
	/// - `DbError::InvalidReference` when the new owner team does not exist
	#[tracing::instrument(skip(self, update), fields(database_id = %id))]
	pub async fn update_database(
		&self,
		id: &DatabaseId,
		update: DatabaseUpdate,
	) -> Result<Database, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE databases
			SET owner_team_id = COALESCE($2, owner_team_id),
			    purpose = COALESCE($3, purpose),
			    updated_at = NOW()
			WHERE id = $1 AND deleted_at IS NULL
			"#,
		)
		.bind(id.as_uuid())
		.bind(update.owner_team_id.map(|t| t.into_inner()))
		.bind(update.purpose.as_deref())
		.execute(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Database, e))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(EntityKind::Database));
		}

		self
			.get_database(id)
			.await?
			.ok_or(DbError::NotFound(EntityKind::Database))
	}

	/// Write a reconciler-observed status, optionally with connection info.
	///
	/// Connection fields are only written when supplied; a transition to
	/// `error` leaves the last known connection details in place.
	///
	/// # Returns
	/// `false` when the row is absent or soft-deleted (no write occurred).
	#[tracing::instrument(skip(self, connection), fields(database_id = %id, status = %status))]
	pub async fn update_status(
		&self,
		id: &DatabaseId,
		status: DatabaseStatus,
		connection: Option<&ConnectionInfo>,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE databases
			SET status = $2,
			    host = COALESCE($3, host),
			    port = COALESCE($4, port),
			    secret_name = COALESCE($5, secret_name),
			    updated_at = NOW()
			WHERE id = $1 AND deleted_at IS NULL
			"#,
		)
		.bind(id.as_uuid())
		.bind(status.as_str())
		.bind(connection.map(|c| c.host.as_str()))
		.bind(connection.map(|c| c.port))
		.bind(connection.map(|c| c.secret_name.as_str()))
		.execute(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Database, e))?;

		let updated = result.rows_affected() > 0;
		if updated {
			tracing::info!(database_id = %id, status = %status, "database status updated");
		}
		Ok(updated)
	}

	/// Soft-delete a database: `deleted_at` and terminal status in a single
	/// statement.
	///
	/// # Returns
	/// `false` when the row is already gone; repeat calls are `NotFound`
	/// from the caller's perspective.
	#[tracing::instrument(skip(self), fields(database_id = %id))]
	pub async fn soft_delete_database(&self, id: &DatabaseId) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE databases
			SET deleted_at = NOW(), status = 'deleted', updated_at = NOW()
			WHERE id = $1 AND deleted_at IS NULL
			"#,
		)
		.bind(id.as_uuid())
		.execute(&self.pool)
		.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(database_id = %id, "database soft-deleted");
		}
		Ok(deleted)
	}
}

const DATABASE_SELECT: &str = r#"
	SELECT d.id, d.name, d.owner_team_id, d.tier_id, d.purpose, d.namespace, d.status,
	       d.host, d.port, d.secret_name, d.created_at, d.updated_at, d.deleted_at,
	       team.name AS owner_team_name, tier.name AS tier_name,
	       bp.name AS blueprint_name, bp.provider AS provider_name,
	       COUNT(*) OVER () AS total_count
	FROM databases d
	JOIN teams team ON team.id = d.owner_team_id
	LEFT JOIN tiers tier ON tier.id = d.tier_id
	LEFT JOIN blueprints bp ON bp.id = tier.blueprint_id
"#;

fn parse_database_row(row: &PgRow) -> Result<Database, DbError> {
	let status_str: String = row.get("status");
	let status: DatabaseStatus = status_str
		.parse()
		.map_err(|e: String| DbError::Internal(e))?;

	Ok(Database {
		id: DatabaseId::new(row.get("id")),
		name: row.get("name"),
		owner_team_id: TeamId::new(row.get("owner_team_id")),
		tier_id: row.get::<Option<Uuid>, _>("tier_id").map(TierId::new),
		purpose: row.get("purpose"),
		namespace: row.get("namespace"),
		status,
		host: row.get("host"),
		port: row.get("port"),
		secret_name: row.get("secret_name"),
		created_at: row.get("created_at"),
		updated_at: row.get("updated_at"),
		deleted_at: row.get("deleted_at"),
		owner_team_name: row.get("owner_team_name"),
		tier_name: row.get("tier_name"),
		blueprint_name: row.get("blueprint_name"),
		provider_name: row.get("provider_name"),
	})
}
