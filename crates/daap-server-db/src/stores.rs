// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The store bundle handed to services and handlers.

use sqlx::postgres::PgPool;
use std::sync::Arc;

use crate::blueprint::{BlueprintRepository, BlueprintStore};
use crate::database::{DatabaseRepository, DatabaseStore};
use crate::memory::MemoryStore;
use crate::team::{TeamRepository, TeamStore};
use crate::tier::{TierRepository, TierStore};
use crate::user::{UserRepository, UserStore};

/// One handle per entity store.
///
/// Everything above the store layer consumes this bundle, so services and
/// handlers are oblivious to whether Postgres repositories or the in-memory
/// store back them.
#[derive(Clone)]
pub struct Stores {
	pub teams: Arc<dyn TeamStore>,
	pub users: Arc<dyn UserStore>,
	pub blueprints: Arc<dyn BlueprintStore>,
	pub tiers: Arc<dyn TierStore>,
	pub databases: Arc<dyn DatabaseStore>,
}

impl Stores {
	/// Postgres-backed stores sharing one pool.
	pub fn postgres(pool: PgPool) -> Self {
		Self {
			teams: Arc::new(TeamRepository::new(pool.clone())),
			users: Arc::new(UserRepository::new(pool.clone())),
			blueprints: Arc::new(BlueprintRepository::new(pool.clone())),
			tiers: Arc::new(TierRepository::new(pool.clone())),
			databases: Arc::new(DatabaseRepository::new(pool)),
		}
	}

	/// In-memory stores over a shared state, for tests.
	pub fn memory() -> Self {
		Self::from_memory(MemoryStore::new())
	}

	/// Wrap an existing in-memory store, keeping a handle to its state.
	pub fn from_memory(store: MemoryStore) -> Self {
		Self {
			teams: Arc::new(store.clone()),
			users: Arc::new(store.clone()),
			blueprints: Arc::new(store.clone()),
			tiers: Arc::new(store.clone()),
			databases: Arc::new(store),
		}
	}
}
