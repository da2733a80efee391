// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request/response types for the daap HTTP API.
//!
//! Every response travels in the `{data, error, meta}` envelope defined in
//! [`envelope`]; the per-resource modules define the request payloads and
//! the `data` shapes. Enumerated fields (roles, statuses, strategies)
//! serialize as their stable snake_case strings.

pub mod blueprints;
pub mod databases;
pub mod envelope;
pub mod health;
pub mod teams;
pub mod tiers;
pub mod users;

pub use envelope::{ApiErrorBody, Envelope, FieldError, Meta};

pub use blueprints::{BlueprintResponse, CreateBlueprintRequest};
pub use databases::{
	CreateDatabaseRequest, DatabaseListQuery, DatabaseResponse, UpdateDatabaseRequest,
};
pub use health::{ComponentHealth, HealthResponse};
pub use teams::{CreateTeamRequest, TeamResponse};
pub use tiers::{CreateTierRequest, TierResponse, TierSummaryResponse, UpdateTierRequest};
pub use users::{CreateUserRequest, CreateUserResponse, UserResponse};
