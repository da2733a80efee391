// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Phase mapping for CloudNativePG cluster status.

use daap_server_provider::{HealthResult, HealthStatus, ProviderDatabase};

/// Phase reported by a fully healthy cluster.
pub(crate) const HEALTHY_PHASE: &str = "Cluster in healthy state";

/// Phases that mean the cluster has failed.
pub(crate) const FAILURE_PHASES: &[&str] = &[
	"Failed",
	"Error",
	"Cluster in unhealthy state",
	"Failed to create primary",
	"Failed to reconcile",
];

/// Map a cluster phase onto the observed health status.
///
/// Unknown phases are treated as provisioning: the operator grows phases
/// over releases, and a database must never be prematurely marked failed.
pub(crate) fn classify_phase(phase: &str) -> HealthStatus {
	if phase == HEALTHY_PHASE {
		HealthStatus::Ready
	} else if FAILURE_PHASES.contains(&phase) {
		HealthStatus::Error
	} else {
		HealthStatus::Provisioning
	}
}

/// The health result for a ready cluster, with synthesized connection info.
pub(crate) fn ready_result(database: &ProviderDatabase) -> HealthResult {
	HealthResult {
		status: HealthStatus::Ready,
		host: Some(format!(
			"{}.{}.svc.cluster.local",
			database.pooler_name, database.namespace
		)),
		port: Some(5432),
		secret_name: Some(format!("{}-app", database.cluster_name)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn database() -> ProviderDatabase {
		ProviderDatabase {
			id: String::new(),
			name: "orders".to_string(),
			namespace: "default".to_string(),
			cluster_name: "daap-orders".to_string(),
			pooler_name: "daap-orders-pooler".to_string(),
			owner_team: String::new(),
			owner_team_id: String::new(),
			tier: String::new(),
			tier_id: String::new(),
			blueprint: String::new(),
			provider: "cnpg".to_string(),
		}
	}

	#[test]
	fn healthy_phase_is_ready() {
		assert_eq!(classify_phase("Cluster in healthy state"), HealthStatus::Ready);
	}

	#[test]
	fn failure_phases_are_errors() {
		for phase in FAILURE_PHASES {
			assert_eq!(classify_phase(phase), HealthStatus::Error, "phase: {phase}");
		}
	}

	#[test]
	fn transient_phases_are_provisioning() {
		assert_eq!(
			classify_phase("Setting up primary"),
			HealthStatus::Provisioning
		);
		assert_eq!(classify_phase("Creating primary"), HealthStatus::Provisioning);
	}

	#[test]
	fn unknown_phases_default_to_provisioning() {
		assert_eq!(
			classify_phase("Waiting for the instances to become active"),
			HealthStatus::Provisioning
		);
		assert_eq!(classify_phase(""), HealthStatus::Provisioning);
	}

	#[test]
	fn ready_result_synthesizes_connection_details() {
		let result = ready_result(&database());
		assert_eq!(
			result.host.as_deref(),
			Some("daap-orders-pooler.default.svc.cluster.local")
		);
		assert_eq!(result.port, Some(5432));
		assert_eq!(result.secret_name.as_deref(), Some("daap-orders-app"));
	}
}
