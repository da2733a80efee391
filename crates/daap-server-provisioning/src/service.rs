// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use daap_server_auth::authorize::{can_touch_database, scoped_owner_filter};
use daap_server_auth::types::{DatabaseId, Identity};
use daap_server_blueprint::render_manifests;
use daap_server_db::{
	Database, DatabaseFilter, DatabaseUpdate, DbError, NewDatabase, Pagination, Stores,
};
use daap_server_provider::{registry, ProviderDatabase};
use tracing::{debug, instrument, warn};

use crate::error::{ProvisionError, Result};

/// Validated input for creating a database.
#[derive(Debug, Clone)]
pub struct CreateDatabase {
	pub name: String,
	pub purpose: String,
	/// Tier referenced by its product-visible name.
	pub tier_name: Option<String>,
	/// Explicit owner; honored for platform callers only.
	pub owner_team_id: Option<daap_server_auth::TeamId>,
}

/// Service for the managed-database lifecycle.
#[derive(Clone)]
pub struct DatabaseProvisioningService {
	stores: Stores,
	namespace: String,
}

impl DatabaseProvisioningService {
	/// Create a new provisioning service.
	///
	/// `namespace` is where every managed database's resources live.
	pub fn new(stores: Stores, namespace: impl Into<String>) -> Self {
		Self {
			stores,
			namespace: namespace.into(),
		}
	}

	/// Create a database record and hand its rendered blueprint to the
	/// provider.
	///
	/// The record is born `provisioning`. Product callers always own what
	/// they create; platform callers may create on another team's behalf.
	/// A provider or render failure after the insert is logged and left for
	/// the reconciler; the caller still gets the created record.
	#[instrument(skip(self, identity, request), fields(name = %request.name, user = %identity.user_name))]
	pub async fn create(&self, identity: &Identity, request: CreateDatabase) -> Result<Database> {
		let owner_team_id = if identity.is_product() {
			identity.team_id
		} else {
			request.owner_team_id.or(identity.team_id)
		};
		let owner_team_id = owner_team_id.ok_or_else(|| {
			ProvisionError::Store(DbError::Internal(
				"caller has no team to own the database".to_string(),
			))
		})?;

		let tier = match &request.tier_name {
			Some(name) => Some(
				self
					.stores
					.tiers
					.get_tier_by_name(name)
					.await?
					.ok_or_else(|| ProvisionError::UnknownTier(name.clone()))?,
			),
			None => None,
		};

		let database = self
			.stores
			.databases
			.create_database(NewDatabase {
				name: request.name,
				owner_team_id,
				tier_id: tier.as_ref().map(|t| t.id),
				purpose: request.purpose,
				namespace: self.namespace.clone(),
			})
			.await?;

		self.apply_blueprint(&database).await;
		Ok(database)
	}

	/// Get an active database, ownership-scoped.
	#[instrument(skip(self, identity), fields(database_id = %id))]
	pub async fn get(&self, identity: &Identity, id: &DatabaseId) -> Result<Database> {
		let database = self
			.stores
			.databases
			.get_database(id)
			.await?
			.ok_or(ProvisionError::NotFound)?;
		if !can_touch_database(identity, database.owner_team_id) {
			return Err(ProvisionError::NotFound);
		}
		Ok(database)
	}

	/// List active databases, with product callers pinned to their own team.
	#[instrument(skip(self, identity, filter))]
	pub async fn list(
		&self,
		identity: &Identity,
		mut filter: DatabaseFilter,
		page: &Pagination,
	) -> Result<(Vec<Database>, i64)> {
		filter.owner_team_id = scoped_owner_filter(identity, filter.owner_team_id);
		Ok(self.stores.databases.list_databases(&filter, page).await?)
	}

	/// Update mutable fields, ownership-scoped.
	#[instrument(skip(self, identity, update), fields(database_id = %id))]
	pub async fn update(
		&self,
		identity: &Identity,
		id: &DatabaseId,
		update: DatabaseUpdate,
	) -> Result<Database> {
		self.get(identity, id).await?;
		Ok(self.stores.databases.update_database(id, update).await?)
	}

	/// Tear down provider resources (best effort) and soft-delete the
	/// record.
	///
	/// Provider teardown is idempotent and makes progress past individual
	/// failures, so a teardown error never blocks the soft delete.
	#[instrument(skip(self, identity), fields(database_id = %id))]
	pub async fn delete(&self, identity: &Identity, id: &DatabaseId) -> Result<()> {
		let database = self.get(identity, id).await?;

		if let Some(provider) = database
			.provider_name
			.as_deref()
			.and_then(registry::get)
		{
			let provider_database = ProviderDatabase::for_database(&database);
			if let Err(e) = provider.delete(&provider_database).await {
				warn!(database_id = %id, error = %e, "provider teardown failed; record is deleted regardless");
			}
		}

		if !self.stores.databases.soft_delete_database(id).await? {
			return Err(ProvisionError::NotFound);
		}
		Ok(())
	}

	/// Render the database's blueprint and hand it to the provider.
	///
	/// Best effort by design: the row stays `provisioning` on any failure
	/// here and the reconciler observes the truth later.
	async fn apply_blueprint(&self, database: &Database) {
		let (Some(blueprint_name), Some(provider_name)) =
			(&database.blueprint_name, &database.provider_name)
		else {
			debug!(database_id = %database.id, "no blueprint attached; nothing to apply");
			return;
		};

		let Some(provider) = registry::get(provider_name) else {
			warn!(database_id = %database.id, provider = %provider_name, "provider not registered; skipping apply");
			return;
		};

		let blueprint = match self.stores.blueprints.get_blueprint_by_name(blueprint_name).await {
			Ok(Some(blueprint)) => blueprint,
			Ok(None) => {
				warn!(database_id = %database.id, blueprint = %blueprint_name, "blueprint vanished before apply");
				return;
			}
			Err(e) => {
				warn!(database_id = %database.id, error = %e, "failed to load blueprint for apply");
				return;
			}
		};

		let provider_database = ProviderDatabase::for_database(database);
		let rendered = match render_manifests(&blueprint.manifests, &provider_database) {
			Ok(rendered) => rendered,
			Err(e) => {
				warn!(database_id = %database.id, error = %e, "blueprint failed to render");
				return;
			}
		};

		match provider.apply(&provider_database, &rendered).await {
			Ok(()) => debug!(database_id = %database.id, "blueprint applied"),
			Err(e) => {
				warn!(database_id = %database.id, error = %e, "provider apply failed; reconciler will converge");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use daap_server_auth::{TeamId, TeamRole, UserId};
	use daap_server_db::{DestructionStrategy, NewBlueprint, NewTeam, NewTier};
	use daap_server_provider::{HealthResult, HealthStatus, Provider, ProviderError};
	use std::sync::{Arc, Mutex};

	/// Records applies and deletes for assertions.
	#[derive(Default)]
	struct RecordingProvider {
		applied: Mutex<Vec<(String, String)>>,
		deleted: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl Provider for RecordingProvider {
		async fn apply(
			&self,
			database: &ProviderDatabase,
			manifests: &str,
		) -> std::result::Result<(), ProviderError> {
			self
				.applied
				.lock()
				.unwrap()
				.push((database.name.clone(), manifests.to_string()));
			Ok(())
		}

		async fn delete(&self, database: &ProviderDatabase) -> std::result::Result<(), ProviderError> {
			self.deleted.lock().unwrap().push(database.name.clone());
			Ok(())
		}

		async fn check_health(
			&self,
			_database: &ProviderDatabase,
		) -> std::result::Result<HealthResult, ProviderError> {
			Ok(HealthResult::status_only(HealthStatus::Provisioning))
		}
	}

	struct Fixture {
		stores: Stores,
		service: DatabaseProvisioningService,
		provider: Arc<RecordingProvider>,
		provider_name: String,
	}

	async fn fixture() -> Fixture {
		let stores = Stores::memory();
		let service = DatabaseProvisioningService::new(stores.clone(), "default");
		let provider = Arc::new(RecordingProvider::default());
		// The registry is process-global; a unique name keeps tests apart.
		let provider_name = format!("recording-{}", uuid::Uuid::new_v4());
		registry::register(&provider_name, provider.clone());
		Fixture {
			stores,
			service,
			provider,
			provider_name,
		}
	}

	async fn team(stores: &Stores, name: &str, role: TeamRole) -> TeamId {
		stores
			.teams
			.create_team(NewTeam {
				name: name.to_string(),
				role,
			})
			.await
			.unwrap()
			.id
	}

	fn member(team_id: TeamId, role: TeamRole) -> Identity {
		Identity::member(UserId::generate(), "caller", team_id, "team", role)
	}

	async fn tier_with_blueprint(fixture: &Fixture) -> String {
		let blueprint = fixture
			.stores
			.blueprints
			.create_blueprint(NewBlueprint {
				name: "cnpg-std".to_string(),
				provider: fixture.provider_name.clone(),
				manifests:
					"apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ .ClusterName }}\n"
						.to_string(),
			})
			.await
			.unwrap();
		fixture
			.stores
			.tiers
			.create_tier(NewTier {
				name: "standard".to_string(),
				description: String::new(),
				blueprint_id: Some(blueprint.id),
				destruction_strategy: DestructionStrategy::Archive,
				backup_enabled: true,
			})
			.await
			.unwrap();
		"standard".to_string()
	}

	fn create_request(name: &str, tier_name: Option<String>) -> CreateDatabase {
		CreateDatabase {
			name: name.to_string(),
			purpose: "orders storage".to_string(),
			tier_name,
			owner_team_id: None,
		}
	}

	#[tokio::test]
	async fn create_renders_and_applies_the_blueprint() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;
		let tier_name = tier_with_blueprint(&fixture).await;

		let database = fixture
			.service
			.create(&member(alpha, TeamRole::Product), create_request("orders", Some(tier_name)))
			.await
			.unwrap();

		assert_eq!(database.status, daap_server_db::DatabaseStatus::Provisioning);
		assert_eq!(database.namespace, "default");

		let applied = fixture.provider.applied.lock().unwrap();
		assert_eq!(applied.len(), 1);
		assert_eq!(applied[0].0, "orders");
		assert!(applied[0].1.contains("name: daap-orders"));
	}

	#[tokio::test]
	async fn create_without_tier_skips_the_provider() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;

		fixture
			.service
			.create(&member(alpha, TeamRole::Product), create_request("orders", None))
			.await
			.unwrap();

		assert!(fixture.provider.applied.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn create_rejects_unknown_tier_names() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;

		let err = fixture
			.service
			.create(
				&member(alpha, TeamRole::Product),
				create_request("orders", Some("nonexistent".to_string())),
			)
			.await
			.unwrap_err();
		assert!(matches!(err, ProvisionError::UnknownTier(name) if name == "nonexistent"));
	}

	#[tokio::test]
	async fn product_callers_own_what_they_create() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;
		let beta = team(&fixture.stores, "beta", TeamRole::Product).await;

		let mut request = create_request("orders", None);
		request.owner_team_id = Some(beta);
		let database = fixture
			.service
			.create(&member(alpha, TeamRole::Product), request)
			.await
			.unwrap();
		assert_eq!(database.owner_team_id, alpha);
	}

	#[tokio::test]
	async fn platform_callers_may_create_for_another_team() {
		let fixture = fixture().await;
		let ops = team(&fixture.stores, "ops", TeamRole::Platform).await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;

		let mut request = create_request("orders", None);
		request.owner_team_id = Some(alpha);
		let database = fixture
			.service
			.create(&member(ops, TeamRole::Platform), request)
			.await
			.unwrap();
		assert_eq!(database.owner_team_id, alpha);
	}

	#[tokio::test]
	async fn foreign_databases_are_not_found_for_product_callers() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;
		let beta = team(&fixture.stores, "beta", TeamRole::Product).await;

		let db = fixture
			.service
			.create(&member(beta, TeamRole::Product), create_request("theirs", None))
			.await
			.unwrap();

		let caller = member(alpha, TeamRole::Product);
		assert!(matches!(
			fixture.service.get(&caller, &db.id).await.unwrap_err(),
			ProvisionError::NotFound
		));
		assert!(matches!(
			fixture
				.service
				.update(&caller, &db.id, DatabaseUpdate::default())
				.await
				.unwrap_err(),
			ProvisionError::NotFound
		));
		assert!(matches!(
			fixture.service.delete(&caller, &db.id).await.unwrap_err(),
			ProvisionError::NotFound
		));
	}

	#[tokio::test]
	async fn product_lists_are_pinned_to_the_caller_team() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;
		let beta = team(&fixture.stores, "beta", TeamRole::Product).await;

		fixture
			.service
			.create(&member(alpha, TeamRole::Product), create_request("db1", None))
			.await
			.unwrap();
		fixture
			.service
			.create(&member(beta, TeamRole::Product), create_request("db2", None))
			.await
			.unwrap();

		// Even an explicit filter for the other team is overridden.
		let (rows, total) = fixture
			.service
			.list(
				&member(alpha, TeamRole::Product),
				DatabaseFilter {
					owner_team_id: Some(beta),
					..Default::default()
				},
				&Pagination::default(),
			)
			.await
			.unwrap();
		assert_eq!(total, 1);
		assert_eq!(rows[0].name, "db1");
	}

	#[tokio::test]
	async fn delete_tears_down_and_soft_deletes() {
		let fixture = fixture().await;
		let alpha = team(&fixture.stores, "alpha", TeamRole::Product).await;
		let tier_name = tier_with_blueprint(&fixture).await;
		let caller = member(alpha, TeamRole::Product);

		let db = fixture
			.service
			.create(&caller, create_request("orders", Some(tier_name)))
			.await
			.unwrap();

		fixture.service.delete(&caller, &db.id).await.unwrap();
		assert_eq!(
			fixture.provider.deleted.lock().unwrap().as_slice(),
			&["orders".to_string()]
		);

		// The record is gone from the caller's perspective.
		assert!(matches!(
			fixture.service.get(&caller, &db.id).await.unwrap_err(),
			ProvisionError::NotFound
		));
		// And a repeat delete reports it gone.
		assert!(matches!(
			fixture.service.delete(&caller, &db.id).await.unwrap_err(),
			ProvisionError::NotFound
		));
	}
}
