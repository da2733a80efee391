// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Metadata store for the daap control plane.
//!
//! The relational store is the authoritative record of every managed
//! database; provider resources are derived state. This crate provides:
//!
//! - Typed store errors classified from structured driver error data
//!   ([`error`])
//! - Per-entity store traits with Postgres repositories ([`team`], [`user`],
//!   [`blueprint`], [`tier`], [`database`])
//! - An in-memory implementation of all store traits for tests ([`memory`])
//! - Pool construction and embedded migrations ([`pool`])
//!
//! Write-side timestamps are set by the database server (`NOW()`), not the
//! process, so replica clock skew never shows up in rows.

pub mod blueprint;
pub mod database;
pub mod error;
pub mod memory;
pub mod pool;
pub mod stores;
pub mod team;
pub mod tier;
pub mod types;
pub mod user;

pub use blueprint::{BlueprintRepository, BlueprintStore};
pub use database::{DatabaseRepository, DatabaseStore};
pub use error::{DbError, EntityKind};
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use stores::Stores;
pub use team::{TeamRepository, TeamStore};
pub use tier::{TierRepository, TierStore};
pub use types::{
	Blueprint, ConnectionInfo, Database, DatabaseFilter, DatabaseStatus, DatabaseUpdate,
	DestructionStrategy, NewBlueprint, NewDatabase, NewTeam, NewTier, NewUser, Pagination, Tier,
	TierUpdate,
};
pub use user::{RevokeOutcome, UserRepository, UserStore};
