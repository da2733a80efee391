// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blueprint repository for database operations.
//!
//! Blueprints are immutable after creation; there is no update path.

use async_trait::async_trait;
use daap_server_auth::types::BlueprintId;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{delete_error, write_error, DbError, EntityKind};
use crate::types::{Blueprint, NewBlueprint};

#[async_trait]
pub trait BlueprintStore: Send + Sync {
	async fn create_blueprint(&self, new: NewBlueprint) -> Result<Blueprint, DbError>;
	async fn get_blueprint_by_id(&self, id: &BlueprintId) -> Result<Option<Blueprint>, DbError>;
	async fn get_blueprint_by_name(&self, name: &str) -> Result<Option<Blueprint>, DbError>;
	async fn list_blueprints(&self) -> Result<Vec<Blueprint>, DbError>;
	async fn delete_blueprint(&self, id: &BlueprintId) -> Result<bool, DbError>;
}

#[async_trait]
impl BlueprintStore for BlueprintRepository {
	async fn create_blueprint(&self, new: NewBlueprint) -> Result<Blueprint, DbError> {
		self.create_blueprint(new).await
	}

	async fn get_blueprint_by_id(&self, id: &BlueprintId) -> Result<Option<Blueprint>, DbError> {
		self.get_blueprint_by_id(id).await
	}

	async fn get_blueprint_by_name(&self, name: &str) -> Result<Option<Blueprint>, DbError> {
		self.get_blueprint_by_name(name).await
	}

	async fn list_blueprints(&self) -> Result<Vec<Blueprint>, DbError> {
		self.list_blueprints().await
	}

	async fn delete_blueprint(&self, id: &BlueprintId) -> Result<bool, DbError> {
		self.delete_blueprint(id).await
	}
}

/// Repository for blueprint database operations.
#[derive(Clone)]
pub struct BlueprintRepository {
	pool: PgPool,
}

impl BlueprintRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Create a new blueprint.
	///
	/// The manifests text is stored verbatim; template and structural
	/// validation happen in the blueprint engine before this call.
	///
	/// # Errors
	/// Returns `DbError::DuplicateName` when the name is taken.
	#[tracing::instrument(skip(self, new), fields(name = %new.name, provider = %new.provider))]
	pub async fn create_blueprint(&self, new: NewBlueprint) -> Result<Blueprint, DbError> {
		let row = sqlx::query(
			r#"
			INSERT INTO blueprints (id, name, provider, manifests)
			VALUES ($1, $2, $3, $4)
			RETURNING id, name, provider, manifests, created_at, updated_at
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(&new.name)
		.bind(&new.provider)
		.bind(&new.manifests)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Blueprint, e))?;

		let blueprint = parse_blueprint_row(&row);
		tracing::debug!(blueprint_id = %blueprint.id, name = %blueprint.name, "blueprint created");
		Ok(blueprint)
	}

	/// Get a blueprint by ID.
	#[tracing::instrument(skip(self), fields(blueprint_id = %id))]
	pub async fn get_blueprint_by_id(&self, id: &BlueprintId) -> Result<Option<Blueprint>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, provider, manifests, created_at, updated_at
			FROM blueprints
			WHERE id = $1
			"#,
		)
		.bind(id.as_uuid())
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| parse_blueprint_row(&r)))
	}

	/// Get a blueprint by its unique name.
	#[tracing::instrument(skip(self))]
	pub async fn get_blueprint_by_name(&self, name: &str) -> Result<Option<Blueprint>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, provider, manifests, created_at, updated_at
			FROM blueprints
			WHERE name = $1
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| parse_blueprint_row(&r)))
	}

	/// List all blueprints, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_blueprints(&self) -> Result<Vec<Blueprint>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, provider, manifests, created_at, updated_at
			FROM blueprints
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(parse_blueprint_row).collect())
	}

	/// Delete a blueprint.
	///
	/// # Returns
	/// `false` if no blueprint exists with this ID.
	///
	/// # Errors
	/// Returns `DbError::HasDependents` while tiers still reference it.
	#[tracing::instrument(skip(self), fields(blueprint_id = %id))]
	pub async fn delete_blueprint(&self, id: &BlueprintId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM blueprints WHERE id = $1")
			.bind(id.as_uuid())
			.execute(&self.pool)
			.await
			.map_err(delete_error)?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(blueprint_id = %id, "blueprint deleted");
		}
		Ok(deleted)
	}
}

fn parse_blueprint_row(row: &PgRow) -> Blueprint {
	Blueprint {
		id: BlueprintId::new(row.get("id")),
		name: row.get("name"),
		provider: row.get("provider"),
		manifests: row.get("manifests"),
		created_at: row.get("created_at"),
		updated_at: row.get("updated_at"),
	}
}
