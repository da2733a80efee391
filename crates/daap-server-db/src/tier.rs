// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tier repository for database operations.

use async_trait::async_trait;
use daap_server_auth::types::{BlueprintId, TierId};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{delete_error, write_error, DbError, EntityKind};
use crate::types::{DestructionStrategy, NewTier, Tier, TierUpdate};

#[async_trait]
pub trait TierStore: Send + Sync {
	async fn create_tier(&self, new: NewTier) -> Result<Tier, DbError>;
	async fn get_tier_by_id(&self, id: &TierId) -> Result<Option<Tier>, DbError>;
	async fn get_tier_by_name(&self, name: &str) -> Result<Option<Tier>, DbError>;
	async fn list_tiers(&self) -> Result<Vec<Tier>, DbError>;
	async fn update_tier(&self, id: &TierId, update: TierUpdate) -> Result<Tier, DbError>;
	async fn delete_tier(&self, id: &TierId) -> Result<bool, DbError>;
}

#[async_trait]
impl TierStore for TierRepository {
	async fn create_tier(&self, new: NewTier) -> Result<Tier, DbError> {
		self.create_tier(new).await
	}

	async fn get_tier_by_id(&self, id: &TierId) -> Result<Option<Tier>, DbError> {
		self.get_tier_by_id(id).await
	}

	async fn get_tier_by_name(&self, name: &str) -> Result<Option<Tier>, DbError> {
		self.get_tier_by_name(name).await
	}

	async fn list_tiers(&self) -> Result<Vec<Tier>, DbError> {
		self.list_tiers().await
	}

	async fn update_tier(&self, id: &TierId, update: TierUpdate) -> Result<Tier, DbError> {
		self.update_tier(id, update).await
	}

	async fn delete_tier(&self, id: &TierId) -> Result<bool, DbError> {
		self.delete_tier(id).await
	}
}

/// Repository for tier database operations.
#[derive(Clone)]
pub struct TierRepository {
	pool: PgPool,
}

impl TierRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// Create a new tier.
	///
	/// # Errors
	/// - `DbError::DuplicateName` when the name is taken
	/// - `DbError::InvalidReference` when `blueprint_id` does not exist
	#[tracing::instrument(skip(self, new), fields(name = %new.name))]
	pub async fn create_tier(&self, new: NewTier) -> Result<Tier, DbError> {
		let row = sqlx::query(
			r#"
			INSERT INTO tiers (id, name, description, blueprint_id, destruction_strategy, backup_enabled)
			VALUES ($1, $2, $3, $4, $5, $6)
			RETURNING id
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(&new.name)
		.bind(&new.description)
		.bind(new.blueprint_id.map(|b| b.into_inner()))
		.bind(new.destruction_strategy.as_str())
		.bind(new.backup_enabled)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Tier, e))?;

		let id = TierId::new(row.get("id"));
		tracing::debug!(tier_id = %id, name = %new.name, "tier created");
		self
			.get_tier_by_id(&id)
			.await?
			.ok_or(DbError::NotFound(EntityKind::Tier))
	}

	/// Get a tier by ID, with the blueprint name joined in.
	#[tracing::instrument(skip(self), fields(tier_id = %id))]
	pub async fn get_tier_by_id(&self, id: &TierId) -> Result<Option<Tier>, DbError> {
		let row = sqlx::query(&format!("{TIER_SELECT} WHERE t.id = $1"))
			.bind(id.as_uuid())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| parse_tier_row(&r)).transpose()
	}

	/// Get a tier by its unique name.
	#[tracing::instrument(skip(self))]
	pub async fn get_tier_by_name(&self, name: &str) -> Result<Option<Tier>, DbError> {
		let row = sqlx::query(&format!("{TIER_SELECT} WHERE t.name = $1"))
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| parse_tier_row(&r)).transpose()
	}

	/// List all tiers, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_tiers(&self) -> Result<Vec<Tier>, DbError> {
		let rows = sqlx::query(&format!("{TIER_SELECT} ORDER BY t.created_at ASC"))
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(parse_tier_row).collect()
	}

	/// Update mutable tier fields. Only supplied fields are written; the
	/// name is immutable.
	///
	/// # Errors
	/// `DbError::NotFound` when no tier exists with this ID.
	#[tracing::instrument(skip(self, update), fields(tier_id = %id))]
	pub async fn update_tier(&self, id: &TierId, update: TierUpdate) -> Result<Tier, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE tiers
			SET description = COALESCE($2, description),
			    destruction_strategy = COALESCE($3, destruction_strategy),
			    backup_enabled = COALESCE($4, backup_enabled),
			    updated_at = NOW()
			WHERE id = $1
			"#,
		)
		.bind(id.as_uuid())
		.bind(update.description.as_deref())
		.bind(update.destruction_strategy.map(|s| s.as_str()))
		.bind(update.backup_enabled)
		.execute(&self.pool)
		.await
		.map_err(|e| write_error(EntityKind::Tier, e))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(EntityKind::Tier));
		}

		self
			.get_tier_by_id(id)
			.await?
			.ok_or(DbError::NotFound(EntityKind::Tier))
	}

	/// Delete a tier.
	///
	/// # Returns
	/// `false` if no tier exists with this ID.
	///
	/// # Errors
	/// Returns `DbError::HasDependents` while *active* (non-soft-deleted)
	/// databases still reference the tier. Soft-deleted rows do not block
	/// deletion; their `tier_id` is nulled by the SET NULL foreign key.
	#[tracing::instrument(skip(self), fields(tier_id = %id))]
	pub async fn delete_tier(&self, id: &TierId) -> Result<bool, DbError> {
		let row = sqlx::query(
			"SELECT COUNT(*) AS count FROM databases WHERE tier_id = $1 AND deleted_at IS NULL",
		)
		.bind(id.as_uuid())
		.fetch_one(&self.pool)
		.await?;
		let active_refs: i64 = row.get("count");

		if active_refs > 0 {
			return Err(DbError::HasDependents {
				entity: EntityKind::Tier,
				dependents: EntityKind::Database,
			});
		}

		let result = sqlx::query("DELETE FROM tiers WHERE id = $1")
			.bind(id.as_uuid())
			.execute(&self.pool)
			.await
			.map_err(delete_error)?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::info!(tier_id = %id, "tier deleted");
		}
		Ok(deleted)
	}
}

const TIER_SELECT: &str = r#"
	SELECT t.id, t.name, t.description, t.blueprint_id, t.destruction_strategy,
	       t.backup_enabled, t.created_at, t.updated_at, b.name AS blueprint_name
	FROM tiers t
	LEFT JOIN blueprints b ON b.id = t.blueprint_id
"#;

fn parse_tier_row(row: &PgRow) -> Result<Tier, DbError> {
	let strategy_str: String = row.get("destruction_strategy");
	let destruction_strategy: DestructionStrategy = strategy_str
		.parse()
		.map_err(|e: String| DbError::Internal(e))?;

	Ok(Tier {
		id: TierId::new(row.get("id")),
		name: row.get("name"),
		description: row.get("description"),
		blueprint_id: row.get::<Option<Uuid>, _>("blueprint_id").map(BlueprintId::new),
		destruction_strategy,
		backup_enabled: row.get("backup_enabled"),
		created_at: row.get("created_at"),
		updated_at: row.get("updated_at"),
		blueprint_name: row.get("blueprint_name"),
	})
}
