// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Team domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TeamId, TeamRole};

/// A named group of users with a platform or product role.
///
/// Team names are globally unique. A team cannot be deleted while any user
/// references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
	pub id: TeamId,
	pub name: String,
	pub role: TeamRole,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}
