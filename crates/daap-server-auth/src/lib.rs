// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types, API key handling, and authorization gates.
//!
//! This crate defines the foundational auth building blocks used across the
//! daap control plane:
//!
//! - **ID newtypes and role enums** ([`types`])
//! - **Domain structs** for teams and users ([`team`], [`user`])
//! - **API key lifecycle**: generation, prefix extraction, argon2 hashing
//!   and verification ([`api_key`])
//! - **Authorization gates**: superuser/role checks and product-team
//!   ownership scoping ([`authorize`])
//!
//! Persistence lives in `daap-server-db`; this crate is storage-free.

pub mod api_key;
mod argon2_config;
pub mod authorize;
pub mod team;
pub mod types;
pub mod user;

pub use api_key::{generate_api_key, hash_api_key, key_prefix, verify_api_key, GeneratedKey};
pub use authorize::{require_role, require_superuser, AuthzError};
pub use team::Team;
pub use types::{BlueprintId, DatabaseId, Identity, TeamId, TeamRole, TierId, UserId};
pub use user::User;
