// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health endpoint types.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentHealth {
	/// `"healthy"`, `"degraded"`, or `"unhealthy"`.
	pub status: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl ComponentHealth {
	pub fn healthy() -> Self {
		Self {
			status: "healthy".to_string(),
			message: None,
		}
	}

	pub fn degraded(message: impl Into<String>) -> Self {
		Self {
			status: "degraded".to_string(),
			message: Some(message.into()),
		}
	}

	pub fn unhealthy(message: impl Into<String>) -> Self {
		Self {
			status: "unhealthy".to_string(),
			message: Some(message.into()),
		}
	}
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
	pub status: String,
	pub version: String,
	pub database: ComponentHealth,
	pub orchestrator: ComponentHealth,
	/// Registered provider names, sorted.
	pub providers: Vec<String>,
}
