// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background reconciliation of persisted database status against observed
//! provider health.
//!
//! A single worker wakes on a fixed interval and walks each watched status
//! bucket (`provisioning`, `ready`, `error`); terminal `deleted` is never
//! scanned and `deleting` is the provider's to resolve. Every bucket uses
//! the same convergence path, so recovery (`error → ready`) and drift
//! (`ready → error`) fall out of the same comparison as the initial
//! `provisioning → ready` transition.
//!
//! Failure semantics: a provider error during a health check logs and
//! leaves that database in its current status; a store error aborts at most
//! the current status bucket. The loop always proceeds to the next tick.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use daap_server_db::{
	ConnectionInfo, Database, DatabaseFilter, DatabaseStatus, DbError, Pagination, Stores,
};
use daap_server_provider::{registry, HealthResult, HealthStatus, ProviderDatabase};

/// Page size per status bucket per tick.
const RECONCILE_PAGE_LIMIT: i64 = 100;

/// The reconciliation loop.
pub struct Reconciler {
	stores: Stores,
	interval: Duration,
}

impl Reconciler {
	pub fn new(stores: Stores, interval: Duration) -> Self {
		Self { stores, interval }
	}

	/// Run until the shutdown channel fires.
	///
	/// Cancellation is observed between databases: the in-flight health
	/// check finishes, then the loop exits.
	pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
		let mut ticker = tokio::time::interval(self.interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		info!(interval_secs = self.interval.as_secs(), "reconciler started");

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					self.tick().await;
				}
				_ = shutdown.recv() => {
					info!("reconciler shutting down");
					break;
				}
			}
		}
	}

	/// One pass over every watched status bucket.
	#[instrument(skip(self))]
	pub async fn tick(&self) {
		for status in DatabaseStatus::watched() {
			if let Err(e) = self.reconcile_bucket(*status).await {
				warn!(status = %status, error = %e, "status bucket aborted; continuing with next");
			}
		}
	}

	async fn reconcile_bucket(&self, status: DatabaseStatus) -> Result<(), DbError> {
		let filter = DatabaseFilter {
			status: Some(status),
			..Default::default()
		};
		let page = Pagination {
			page: 1,
			limit: RECONCILE_PAGE_LIMIT,
		};
		let (databases, _) = self.stores.databases.list_databases(&filter, &page).await?;

		for database in databases {
			if let Err(e) = self.reconcile_database(&database).await {
				warn!(database_id = %database.id, error = %e, "failed to update database; moving on");
			}
		}
		Ok(())
	}

	async fn reconcile_database(&self, database: &Database) -> Result<(), DbError> {
		let Some(provider_name) = database.provider_name.as_deref() else {
			debug!(database_id = %database.id, "no provider chain; skipping");
			return Ok(());
		};
		let Some(provider) = registry::get(provider_name) else {
			debug!(database_id = %database.id, provider = %provider_name, "provider not registered; skipping");
			return Ok(());
		};

		let provider_database = ProviderDatabase::for_database(database);
		let observed = match provider.check_health(&provider_database).await {
			Ok(observed) => observed,
			Err(e) => {
				// The database stays in its current status; next tick retries.
				warn!(database_id = %database.id, error = %e, "health check failed");
				return Ok(());
			}
		};

		if let Some((status, connection)) = transition(database.status, &observed) {
			self
				.stores
				.databases
				.update_status(&database.id, status, connection.as_ref())
				.await?;
			info!(database_id = %database.id, from = %database.status, to = %status, "database transitioned");
		}
		Ok(())
	}
}

/// Compute the write (if any) for an observed health result.
///
/// No write means the tick is a no-op for this database, which is what
/// makes consecutive ticks against an unchanged orchestrator idempotent.
fn transition(
	persisted: DatabaseStatus,
	observed: &HealthResult,
) -> Option<(DatabaseStatus, Option<ConnectionInfo>)> {
	match observed.status {
		HealthStatus::Ready if persisted != DatabaseStatus::Ready => {
			let connection = match (&observed.host, observed.port, &observed.secret_name) {
				(Some(host), Some(port), Some(secret_name)) => Some(ConnectionInfo {
					host: host.clone(),
					port,
					secret_name: secret_name.clone(),
				}),
				_ => None,
			};
			Some((DatabaseStatus::Ready, connection))
		}
		HealthStatus::Error if persisted != DatabaseStatus::Error => {
			// Connection fields are left untouched on the way down.
			Some((DatabaseStatus::Error, None))
		}
		_ => None,
	}
}
