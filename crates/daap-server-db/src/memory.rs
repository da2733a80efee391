// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory store with the same contract as the Postgres repositories.
//!
//! Service, route, and reconciler tests run against this implementation;
//! it mirrors every store invariant the schema enforces (active-only name
//! uniqueness, referential checks, restricted deletes, the superuser
//! singleton, soft-delete semantics) so the contract tests below double as
//! the store's specification.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use daap_server_auth::types::{BlueprintId, DatabaseId, TeamId, TierId, UserId};
use daap_server_auth::{Team, User};

use crate::blueprint::BlueprintStore;
use crate::database::DatabaseStore;
use crate::error::{DbError, EntityKind};
use crate::team::TeamStore;
use crate::tier::TierStore;
use crate::types::{
	Blueprint, ConnectionInfo, Database, DatabaseFilter, DatabaseStatus, DatabaseUpdate,
	NewBlueprint, NewDatabase, NewTeam, NewTier, NewUser, Pagination, Tier, TierUpdate,
};
use crate::user::{RevokeOutcome, UserStore};

#[derive(Default)]
struct MemoryInner {
	teams: Vec<Team>,
	users: Vec<User>,
	blueprints: Vec<Blueprint>,
	tiers: Vec<Tier>,
	databases: Vec<Database>,
}

/// In-memory store; cheap to clone, shared behind an `Arc`.
#[derive(Clone, Default)]
pub struct MemoryStore {
	inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl MemoryInner {
	fn hydrate_tier(&self, tier: &Tier) -> Tier {
		let mut tier = tier.clone();
		tier.blueprint_name = tier.blueprint_id.and_then(|bid| {
			self
				.blueprints
				.iter()
				.find(|b| b.id == bid)
				.map(|b| b.name.clone())
		});
		tier
	}

	fn hydrate_database(&self, db: &Database) -> Database {
		let mut db = db.clone();
		db.owner_team_name = self
			.teams
			.iter()
			.find(|t| t.id == db.owner_team_id)
			.map(|t| t.name.clone());
		let tier = db
			.tier_id
			.and_then(|tid| self.tiers.iter().find(|t| t.id == tid));
		db.tier_name = tier.map(|t| t.name.clone());
		let blueprint = tier
			.and_then(|t| t.blueprint_id)
			.and_then(|bid| self.blueprints.iter().find(|b| b.id == bid));
		db.blueprint_name = blueprint.map(|b| b.name.clone());
		db.provider_name = blueprint.map(|b| b.provider.clone());
		db
	}
}

#[async_trait]
impl TeamStore for MemoryStore {
	async fn create_team(&self, new: NewTeam) -> Result<Team, DbError> {
		let mut inner = self.inner.write().await;
		if inner.teams.iter().any(|t| t.name == new.name) {
			return Err(DbError::DuplicateName(EntityKind::Team));
		}
		let now = Utc::now();
		let team = Team {
			id: TeamId::generate(),
			name: new.name,
			role: new.role,
			created_at: now,
			updated_at: now,
		};
		inner.teams.push(team.clone());
		Ok(team)
	}

	async fn get_team_by_id(&self, id: &TeamId) -> Result<Option<Team>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.teams.iter().find(|t| t.id == *id).cloned())
	}

	async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.teams.iter().find(|t| t.name == name).cloned())
	}

	async fn list_teams(&self) -> Result<Vec<Team>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.teams.clone())
	}

	async fn delete_team(&self, id: &TeamId) -> Result<bool, DbError> {
		let mut inner = self.inner.write().await;
		if inner
			.users
			.iter()
			.any(|u| u.team_id == Some(*id) && u.revoked_at.is_none())
		{
			return Err(DbError::HasDependents {
				entity: EntityKind::Team,
				dependents: EntityKind::User,
			});
		}
		if inner.databases.iter().any(|d| d.owner_team_id == *id) {
			return Err(DbError::HasDependents {
				entity: EntityKind::Team,
				dependents: EntityKind::Database,
			});
		}
		let before = inner.teams.len();
		inner.teams.retain(|t| t.id != *id);
		let deleted = inner.teams.len() < before;
		if deleted {
			// SET NULL semantics for revoked users of the deleted team.
			for user in inner.users.iter_mut().filter(|u| u.team_id == Some(*id)) {
				user.team_id = None;
			}
		}
		Ok(deleted)
	}
}

#[async_trait]
impl UserStore for MemoryStore {
	async fn create_user(&self, new: NewUser) -> Result<User, DbError> {
		let mut inner = self.inner.write().await;
		if new.is_superuser && inner.users.iter().any(|u| u.is_superuser) {
			return Err(DbError::SuperuserExists);
		}
		if let Some(team_id) = new.team_id {
			if !inner.teams.iter().any(|t| t.id == team_id) {
				return Err(DbError::InvalidReference(EntityKind::User));
			}
		}
		let now = Utc::now();
		let user = User {
			id: UserId::generate(),
			name: new.name,
			team_id: new.team_id,
			is_superuser: new.is_superuser,
			api_key_prefix: new.api_key_prefix,
			api_key_hash: new.api_key_hash,
			revoked_at: None,
			created_at: now,
			updated_at: now,
		};
		inner.users.push(user.clone());
		Ok(user)
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.users.iter().find(|u| u.id == *id).cloned())
	}

	async fn list_users(&self) -> Result<Vec<User>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.users.clone())
	}

	async fn find_by_prefix(&self, prefix: &str) -> Result<Vec<User>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner
			.users
			.iter()
			.filter(|u| u.api_key_prefix == prefix && u.revoked_at.is_none())
			.cloned()
			.collect())
	}

	async fn revoke_user(&self, id: &UserId) -> Result<RevokeOutcome, DbError> {
		let mut inner = self.inner.write().await;
		let user = inner
			.users
			.iter_mut()
			.find(|u| u.id == *id)
			.ok_or(DbError::NotFound(EntityKind::User))?;
		if user.revoked_at.is_some() {
			return Ok(RevokeOutcome::AlreadyRevoked);
		}
		let now = Utc::now();
		user.revoked_at = Some(now);
		user.updated_at = now;
		Ok(RevokeOutcome::Revoked)
	}

	async fn count_users(&self) -> Result<i64, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.users.len() as i64)
	}
}

#[async_trait]
impl BlueprintStore for MemoryStore {
	async fn create_blueprint(&self, new: NewBlueprint) -> Result<Blueprint, DbError> {
		let mut inner = self.inner.write().await;
		if inner.blueprints.iter().any(|b| b.name == new.name) {
			return Err(DbError::DuplicateName(EntityKind::Blueprint));
		}
		let now = Utc::now();
		let blueprint = Blueprint {
			id: BlueprintId::generate(),
			name: new.name,
			provider: new.provider,
			manifests: new.manifests,
			created_at: now,
			updated_at: now,
		};
		inner.blueprints.push(blueprint.clone());
		Ok(blueprint)
	}

	async fn get_blueprint_by_id(&self, id: &BlueprintId) -> Result<Option<Blueprint>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.blueprints.iter().find(|b| b.id == *id).cloned())
	}

	async fn get_blueprint_by_name(&self, name: &str) -> Result<Option<Blueprint>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.blueprints.iter().find(|b| b.name == name).cloned())
	}

	async fn list_blueprints(&self) -> Result<Vec<Blueprint>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.blueprints.clone())
	}

	async fn delete_blueprint(&self, id: &BlueprintId) -> Result<bool, DbError> {
		let mut inner = self.inner.write().await;
		if inner.tiers.iter().any(|t| t.blueprint_id == Some(*id)) {
			return Err(DbError::HasDependents {
				entity: EntityKind::Blueprint,
				dependents: EntityKind::Tier,
			});
		}
		let before = inner.blueprints.len();
		inner.blueprints.retain(|b| b.id != *id);
		Ok(inner.blueprints.len() < before)
	}
}

#[async_trait]
impl TierStore for MemoryStore {
	async fn create_tier(&self, new: NewTier) -> Result<Tier, DbError> {
		let mut inner = self.inner.write().await;
		if inner.tiers.iter().any(|t| t.name == new.name) {
			return Err(DbError::DuplicateName(EntityKind::Tier));
		}
		if let Some(blueprint_id) = new.blueprint_id {
			if !inner.blueprints.iter().any(|b| b.id == blueprint_id) {
				return Err(DbError::InvalidReference(EntityKind::Tier));
			}
		}
		let now = Utc::now();
		let tier = Tier {
			id: TierId::generate(),
			name: new.name,
			description: new.description,
			blueprint_id: new.blueprint_id,
			destruction_strategy: new.destruction_strategy,
			backup_enabled: new.backup_enabled,
			created_at: now,
			updated_at: now,
			blueprint_name: None,
		};
		inner.tiers.push(tier.clone());
		Ok(inner.hydrate_tier(&tier))
	}

	async fn get_tier_by_id(&self, id: &TierId) -> Result<Option<Tier>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner
			.tiers
			.iter()
			.find(|t| t.id == *id)
			.map(|t| inner.hydrate_tier(t)))
	}

	async fn get_tier_by_name(&self, name: &str) -> Result<Option<Tier>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner
			.tiers
			.iter()
			.find(|t| t.name == name)
			.map(|t| inner.hydrate_tier(t)))
	}

	async fn list_tiers(&self) -> Result<Vec<Tier>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner.tiers.iter().map(|t| inner.hydrate_tier(t)).collect())
	}

	async fn update_tier(&self, id: &TierId, update: TierUpdate) -> Result<Tier, DbError> {
		let mut inner = self.inner.write().await;
		let tier = inner
			.tiers
			.iter_mut()
			.find(|t| t.id == *id)
			.ok_or(DbError::NotFound(EntityKind::Tier))?;
		if let Some(description) = update.description {
			tier.description = description;
		}
		if let Some(strategy) = update.destruction_strategy {
			tier.destruction_strategy = strategy;
		}
		if let Some(backup_enabled) = update.backup_enabled {
			tier.backup_enabled = backup_enabled;
		}
		tier.updated_at = Utc::now();
		let tier = tier.clone();
		Ok(inner.hydrate_tier(&tier))
	}

	async fn delete_tier(&self, id: &TierId) -> Result<bool, DbError> {
		let mut inner = self.inner.write().await;
		if inner
			.databases
			.iter()
			.any(|d| d.tier_id == Some(*id) && d.deleted_at.is_none())
		{
			return Err(DbError::HasDependents {
				entity: EntityKind::Tier,
				dependents: EntityKind::Database,
			});
		}
		let before = inner.tiers.len();
		inner.tiers.retain(|t| t.id != *id);
		let deleted = inner.tiers.len() < before;
		if deleted {
			// SET NULL semantics for soft-deleted databases of the tier.
			for db in inner.databases.iter_mut().filter(|d| d.tier_id == Some(*id)) {
				db.tier_id = None;
			}
		}
		Ok(deleted)
	}
}

#[async_trait]
impl DatabaseStore for MemoryStore {
	async fn create_database(&self, new: NewDatabase) -> Result<Database, DbError> {
		let mut inner = self.inner.write().await;
		if inner
			.databases
			.iter()
			.any(|d| d.name == new.name && d.deleted_at.is_none())
		{
			return Err(DbError::DuplicateName(EntityKind::Database));
		}
		if !inner.teams.iter().any(|t| t.id == new.owner_team_id) {
			return Err(DbError::InvalidReference(EntityKind::Database));
		}
		if let Some(tier_id) = new.tier_id {
			if !inner.tiers.iter().any(|t| t.id == tier_id) {
				return Err(DbError::InvalidReference(EntityKind::Database));
			}
		}
		let now = Utc::now();
		let db = Database {
			id: DatabaseId::generate(),
			name: new.name,
			owner_team_id: new.owner_team_id,
			tier_id: new.tier_id,
			purpose: new.purpose,
			namespace: new.namespace,
			status: DatabaseStatus::Provisioning,
			host: None,
			port: None,
			secret_name: None,
			created_at: now,
			updated_at: now,
			deleted_at: None,
			owner_team_name: None,
			tier_name: None,
			blueprint_name: None,
			provider_name: None,
		};
		inner.databases.push(db.clone());
		Ok(inner.hydrate_database(&db))
	}

	async fn get_database(&self, id: &DatabaseId) -> Result<Option<Database>, DbError> {
		let inner = self.inner.read().await;
		Ok(inner
			.databases
			.iter()
			.find(|d| d.id == *id && d.deleted_at.is_none())
			.map(|d| inner.hydrate_database(d)))
	}

	async fn list_databases(
		&self,
		filter: &DatabaseFilter,
		page: &Pagination,
	) -> Result<(Vec<Database>, i64), DbError> {
		let inner = self.inner.read().await;
		let name_needle = filter.name.as_ref().map(|n| n.to_lowercase());
		let mut matched: Vec<&Database> = inner
			.databases
			.iter()
			.filter(|d| d.deleted_at.is_none())
			.filter(|d| {
				filter
					.owner_team_id
					.map(|team| d.owner_team_id == team)
					.unwrap_or(true)
			})
			.filter(|d| filter.status.map(|s| d.status == s).unwrap_or(true))
			.filter(|d| {
				name_needle
					.as_ref()
					.map(|n| d.name.to_lowercase().contains(n))
					.unwrap_or(true)
			})
			.collect();
		// Newest first; insertion order breaks creation-time ties.
		matched.reverse();

		let total = matched.len() as i64;
		let start = (page.offset() as usize).min(matched.len());
		let end = (start + page.limit as usize).min(matched.len());
		let databases = matched[start..end]
			.iter()
			.map(|d| inner.hydrate_database(d))
			.collect();
		Ok((databases, total))
	}

	async fn update_database(
		&self,
		id: &DatabaseId,
		update: DatabaseUpdate,
	) -> Result<Database, DbError> {
		let mut inner = self.inner.write().await;
		if let Some(owner_team_id) = update.owner_team_id {
			if !inner.teams.iter().any(|t| t.id == owner_team_id) {
				return Err(DbError::InvalidReference(EntityKind::Database));
			}
		}
		let db = inner
			.databases
			.iter_mut()
			.find(|d| d.id == *id && d.deleted_at.is_none())
			.ok_or(DbError::NotFound(EntityKind::Database))?;
		if let Some(owner_team_id) = update.owner_team_id {
			db.owner_team_id = owner_team_id;
		}
		if let Some(purpose) = update.purpose {
			db.purpose = purpose;
		}
		db.updated_at = Utc::now();
		let db = db.clone();
		Ok(inner.hydrate_database(&db))
	}

	async fn update_status(
		&self,
		id: &DatabaseId,
		status: DatabaseStatus,
		connection: Option<&ConnectionInfo>,
	) -> Result<bool, DbError> {
		let mut inner = self.inner.write().await;
		let Some(db) = inner
			.databases
			.iter_mut()
			.find(|d| d.id == *id && d.deleted_at.is_none())
		else {
			return Ok(false);
		};
		db.status = status;
		if let Some(connection) = connection {
			db.host = Some(connection.host.clone());
			db.port = Some(connection.port);
			db.secret_name = Some(connection.secret_name.clone());
		}
		db.updated_at = Utc::now();
		Ok(true)
	}

	async fn soft_delete_database(&self, id: &DatabaseId) -> Result<bool, DbError> {
		let mut inner = self.inner.write().await;
		let Some(db) = inner
			.databases
			.iter_mut()
			.find(|d| d.id == *id && d.deleted_at.is_none())
		else {
			return Ok(false);
		};
		let now = Utc::now();
		db.deleted_at = Some(now);
		db.status = DatabaseStatus::Deleted;
		db.updated_at = now;
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::DestructionStrategy;
	use daap_server_auth::TeamRole;

	fn new_team(name: &str, role: TeamRole) -> NewTeam {
		NewTeam {
			name: name.to_string(),
			role,
		}
	}

	fn new_user(name: &str, team_id: Option<TeamId>) -> NewUser {
		NewUser {
			name: name.to_string(),
			team_id,
			is_superuser: false,
			api_key_prefix: "daap_abc".to_string(),
			api_key_hash: "$argon2id$test".to_string(),
		}
	}

	fn new_superuser() -> NewUser {
		NewUser {
			name: "superuser".to_string(),
			team_id: None,
			is_superuser: true,
			api_key_prefix: "daap_xyz".to_string(),
			api_key_hash: "$argon2id$test".to_string(),
		}
	}

	fn new_database(name: &str, owner: TeamId, tier: Option<TierId>) -> NewDatabase {
		NewDatabase {
			name: name.to_string(),
			owner_team_id: owner,
			tier_id: tier,
			purpose: "testing".to_string(),
			namespace: "default".to_string(),
		}
	}

	async fn store_with_team(role: TeamRole) -> (MemoryStore, Team) {
		let store = MemoryStore::new();
		let team = store.create_team(new_team("alpha", role)).await.unwrap();
		(store, team)
	}

	mod teams {
		use super::*;

		#[tokio::test]
		async fn create_then_get_round_trips() {
			let (store, team) = store_with_team(TeamRole::Platform).await;
			let fetched = store.get_team_by_id(&team.id).await.unwrap().unwrap();
			assert_eq!(fetched, team);
			let by_name = store.get_team_by_name("alpha").await.unwrap().unwrap();
			assert_eq!(by_name.id, team.id);
		}

		#[tokio::test]
		async fn duplicate_name_is_rejected() {
			let (store, _) = store_with_team(TeamRole::Platform).await;
			let err = store
				.create_team(new_team("alpha", TeamRole::Product))
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::DuplicateName(EntityKind::Team)));
		}

		#[tokio::test]
		async fn delete_is_blocked_by_active_users_until_revoked() {
			let (store, team) = store_with_team(TeamRole::Platform).await;
			let user = store.create_user(new_user("alice", Some(team.id))).await.unwrap();

			let err = store.delete_team(&team.id).await.unwrap_err();
			assert!(matches!(
				err,
				DbError::HasDependents {
					entity: EntityKind::Team,
					dependents: EntityKind::User,
				}
			));

			store.revoke_user(&user.id).await.unwrap();
			assert!(store.delete_team(&team.id).await.unwrap());

			// SET NULL detached the revoked user from the deleted team.
			let revoked = store.get_user_by_id(&user.id).await.unwrap().unwrap();
			assert_eq!(revoked.team_id, None);
		}

		#[tokio::test]
		async fn delete_is_blocked_by_owned_databases() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();
			let err = store.delete_team(&team.id).await.unwrap_err();
			assert!(matches!(
				err,
				DbError::HasDependents {
					entity: EntityKind::Team,
					dependents: EntityKind::Database,
				}
			));
		}

		#[tokio::test]
		async fn delete_missing_team_returns_false() {
			let store = MemoryStore::new();
			assert!(!store.delete_team(&TeamId::generate()).await.unwrap());
		}
	}

	mod users {
		use super::*;

		#[tokio::test]
		async fn create_requires_an_existing_team() {
			let store = MemoryStore::new();
			let err = store
				.create_user(new_user("alice", Some(TeamId::generate())))
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::InvalidReference(EntityKind::User)));
		}

		#[tokio::test]
		async fn at_most_one_superuser_exists() {
			let store = MemoryStore::new();
			store.create_user(new_superuser()).await.unwrap();
			let err = store.create_user(new_superuser()).await.unwrap_err();
			assert!(matches!(err, DbError::SuperuserExists));
		}

		#[tokio::test]
		async fn prefix_lookup_skips_revoked_users() {
			let (store, team) = store_with_team(TeamRole::Platform).await;
			let user = store.create_user(new_user("alice", Some(team.id))).await.unwrap();

			let candidates = store.find_by_prefix("daap_abc").await.unwrap();
			assert_eq!(candidates.len(), 1);

			store.revoke_user(&user.id).await.unwrap();
			let candidates = store.find_by_prefix("daap_abc").await.unwrap();
			assert!(candidates.is_empty());
		}

		#[tokio::test]
		async fn second_revocation_is_distinguishable_and_stable() {
			let (store, team) = store_with_team(TeamRole::Platform).await;
			let user = store.create_user(new_user("alice", Some(team.id))).await.unwrap();

			assert_eq!(
				store.revoke_user(&user.id).await.unwrap(),
				RevokeOutcome::Revoked
			);
			let first = store
				.get_user_by_id(&user.id)
				.await
				.unwrap()
				.unwrap()
				.revoked_at;

			assert_eq!(
				store.revoke_user(&user.id).await.unwrap(),
				RevokeOutcome::AlreadyRevoked
			);
			let second = store
				.get_user_by_id(&user.id)
				.await
				.unwrap()
				.unwrap()
				.revoked_at;
			assert_eq!(first, second, "revoked_at must not advance");
		}

		#[tokio::test]
		async fn revoking_an_unknown_user_is_not_found() {
			let store = MemoryStore::new();
			let err = store.revoke_user(&UserId::generate()).await.unwrap_err();
			assert!(matches!(err, DbError::NotFound(EntityKind::User)));
		}
	}

	mod blueprints_and_tiers {
		use super::*;

		fn new_blueprint(name: &str) -> NewBlueprint {
			NewBlueprint {
				name: name.to_string(),
				provider: "cnpg".to_string(),
				manifests: "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\n".to_string(),
			}
		}

		fn new_tier(name: &str, blueprint_id: Option<BlueprintId>) -> NewTier {
			NewTier {
				name: name.to_string(),
				description: "general purpose".to_string(),
				blueprint_id,
				destruction_strategy: DestructionStrategy::Archive,
				backup_enabled: true,
			}
		}

		#[tokio::test]
		async fn blueprint_delete_is_blocked_by_referencing_tiers() {
			let store = MemoryStore::new();
			let blueprint = store.create_blueprint(new_blueprint("cnpg-std")).await.unwrap();
			let tier = store
				.create_tier(new_tier("standard", Some(blueprint.id)))
				.await
				.unwrap();
			assert_eq!(tier.blueprint_name.as_deref(), Some("cnpg-std"));

			let err = store.delete_blueprint(&blueprint.id).await.unwrap_err();
			assert!(matches!(
				err,
				DbError::HasDependents {
					entity: EntityKind::Blueprint,
					dependents: EntityKind::Tier,
				}
			));

			assert!(store.delete_tier(&tier.id).await.unwrap());
			assert!(store.delete_blueprint(&blueprint.id).await.unwrap());
		}

		#[tokio::test]
		async fn tier_requires_an_existing_blueprint() {
			let store = MemoryStore::new();
			let err = store
				.create_tier(new_tier("standard", Some(BlueprintId::generate())))
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::InvalidReference(EntityKind::Tier)));
		}

		#[tokio::test]
		async fn tier_update_touches_only_supplied_fields() {
			let store = MemoryStore::new();
			let tier = store.create_tier(new_tier("standard", None)).await.unwrap();

			let updated = store
				.update_tier(
					&tier.id,
					TierUpdate {
						description: Some("premium".to_string()),
						..Default::default()
					},
				)
				.await
				.unwrap();
			assert_eq!(updated.description, "premium");
			assert_eq!(updated.destruction_strategy, tier.destruction_strategy);
			assert_eq!(updated.backup_enabled, tier.backup_enabled);
		}

		#[tokio::test]
		async fn tier_delete_is_blocked_only_by_active_databases() {
			let store = MemoryStore::new();
			let team = store
				.create_team(super::new_team("alpha", TeamRole::Product))
				.await
				.unwrap();
			let tier = store.create_tier(new_tier("standard", None)).await.unwrap();
			let db = store
				.create_database(super::new_database("orders", team.id, Some(tier.id)))
				.await
				.unwrap();

			let err = store.delete_tier(&tier.id).await.unwrap_err();
			assert!(matches!(
				err,
				DbError::HasDependents {
					entity: EntityKind::Tier,
					dependents: EntityKind::Database,
				}
			));

			store.soft_delete_database(&db.id).await.unwrap();
			assert!(store.delete_tier(&tier.id).await.unwrap());
		}
	}

	mod databases {
		use super::*;

		#[tokio::test]
		async fn active_names_are_unique_and_reusable_after_delete() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			let db = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();

			let err = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::DuplicateName(EntityKind::Database)));

			store.soft_delete_database(&db.id).await.unwrap();
			let reused = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();
			assert_ne!(reused.id, db.id);
		}

		#[tokio::test]
		async fn create_requires_an_existing_owner_team() {
			let store = MemoryStore::new();
			let err = store
				.create_database(new_database("orders", TeamId::generate(), None))
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::InvalidReference(EntityKind::Database)));
		}

		#[tokio::test]
		async fn get_excludes_soft_deleted_rows() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			let db = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();
			assert!(store.get_database(&db.id).await.unwrap().is_some());

			assert!(store.soft_delete_database(&db.id).await.unwrap());
			assert!(store.get_database(&db.id).await.unwrap().is_none());
		}

		#[tokio::test]
		async fn second_soft_delete_reports_the_row_gone() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			let db = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();
			assert!(store.soft_delete_database(&db.id).await.unwrap());
			assert!(!store.soft_delete_database(&db.id).await.unwrap());
		}

		#[tokio::test]
		async fn list_filters_conjunctively_and_orders_newest_first() {
			let (store, alpha) = store_with_team(TeamRole::Product).await;
			let beta = store
				.create_team(new_team("beta", TeamRole::Product))
				.await
				.unwrap();
			store
				.create_database(new_database("orders", alpha.id, None))
				.await
				.unwrap();
			store
				.create_database(new_database("orders-eu", alpha.id, None))
				.await
				.unwrap();
			store
				.create_database(new_database("billing", beta.id, None))
				.await
				.unwrap();

			let (all, total) = store
				.list_databases(&DatabaseFilter::default(), &Pagination::default())
				.await
				.unwrap();
			assert_eq!(total, 3);
			assert_eq!(
				all.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
				vec!["billing", "orders-eu", "orders"]
			);

			let (alpha_orders, total) = store
				.list_databases(
					&DatabaseFilter {
						owner_team_id: Some(alpha.id),
						name: Some("ORD".to_string()),
						..Default::default()
					},
					&Pagination::default(),
				)
				.await
				.unwrap();
			assert_eq!(total, 2);
			assert!(alpha_orders.iter().all(|d| d.owner_team_id == alpha.id));
		}

		#[tokio::test]
		async fn list_paginates_with_total_count() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			for i in 0..5 {
				store
					.create_database(new_database(&format!("db-{i}"), team.id, None))
					.await
					.unwrap();
			}

			let (page, total) = store
				.list_databases(
					&DatabaseFilter::default(),
					&Pagination::normalized(Some(2), Some(2)),
				)
				.await
				.unwrap();
			assert_eq!(total, 5);
			assert_eq!(
				page.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
				vec!["db-2", "db-1"]
			);
		}

		#[tokio::test]
		async fn update_rejects_soft_deleted_rows() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			let db = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();
			store.soft_delete_database(&db.id).await.unwrap();

			let err = store
				.update_database(
					&db.id,
					DatabaseUpdate {
						purpose: Some("changed".to_string()),
						..Default::default()
					},
				)
				.await
				.unwrap_err();
			assert!(matches!(err, DbError::NotFound(EntityKind::Database)));
		}

		#[tokio::test]
		async fn update_status_writes_connection_only_when_supplied() {
			let (store, team) = store_with_team(TeamRole::Product).await;
			let db = store
				.create_database(new_database("orders", team.id, None))
				.await
				.unwrap();

			let connection = ConnectionInfo {
				host: "daap-orders-pooler.default.svc.cluster.local".to_string(),
				port: 5432,
				secret_name: "daap-orders-app".to_string(),
			};
			assert!(store
				.update_status(&db.id, DatabaseStatus::Ready, Some(&connection))
				.await
				.unwrap());

			let ready = store.get_database(&db.id).await.unwrap().unwrap();
			assert_eq!(ready.status, DatabaseStatus::Ready);
			assert_eq!(ready.host.as_deref(), Some(connection.host.as_str()));
			assert_eq!(ready.port, Some(5432));

			// Drift to error leaves the last known connection in place.
			assert!(store
				.update_status(&db.id, DatabaseStatus::Error, None)
				.await
				.unwrap());
			let errored = store.get_database(&db.id).await.unwrap().unwrap();
			assert_eq!(errored.status, DatabaseStatus::Error);
			assert_eq!(errored.host.as_deref(), Some(connection.host.as_str()));
		}

		#[tokio::test]
		async fn joined_names_are_populated_on_reads() {
			let store = MemoryStore::new();
			let team = store
				.create_team(new_team("alpha", TeamRole::Product))
				.await
				.unwrap();
			let blueprint = store
				.create_blueprint(NewBlueprint {
					name: "cnpg-std".to_string(),
					provider: "cnpg".to_string(),
					manifests: String::new(),
				})
				.await
				.unwrap();
			let tier = store
				.create_tier(NewTier {
					name: "standard".to_string(),
					description: String::new(),
					blueprint_id: Some(blueprint.id),
					destruction_strategy: DestructionStrategy::Freeze,
					backup_enabled: false,
				})
				.await
				.unwrap();
			let db = store
				.create_database(new_database("orders", team.id, Some(tier.id)))
				.await
				.unwrap();

			assert_eq!(db.owner_team_name.as_deref(), Some("alpha"));
			assert_eq!(db.tier_name.as_deref(), Some("standard"));
			assert_eq!(db.blueprint_name.as_deref(), Some("cnpg-std"));
			assert_eq!(db.provider_name.as_deref(), Some("cnpg"));
		}
	}
}
