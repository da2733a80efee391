// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, one per concern.

use crate::error::ConfigError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
	pub port: u16,
}

impl HttpConfig {
	pub(crate) fn resolve(port: Option<String>) -> Result<Self, ConfigError> {
		let port = match port {
			Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
				var: "PORT",
				reason: e.to_string(),
			})?,
			None => 8080,
		};
		Ok(Self { port })
	}
}

/// Database connectivity configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
}

impl DatabaseConfig {
	pub(crate) fn resolve(url: Option<String>) -> Result<Self, ConfigError> {
		match url.filter(|u| !u.is_empty()) {
			Some(url) => Ok(Self { url }),
			None => Err(ConfigError::MissingRequired("DATABASE_URL")),
		}
	}
}

/// Logging configuration; the level is a tracing env-filter directive.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	pub level: String,
}

impl LoggingConfig {
	pub(crate) fn resolve(level: Option<String>) -> Self {
		Self {
			level: level
				.filter(|l| !l.is_empty())
				.unwrap_or_else(|| "info".to_string()),
		}
	}
}

/// Orchestrator access configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
	/// Explicit kubeconfig path. `None` means in-cluster or default
	/// discovery.
	pub kubeconfig_path: Option<String>,
	/// Namespace managed databases are provisioned into.
	pub namespace: String,
}

impl OrchestratorConfig {
	pub(crate) fn resolve(kubeconfig_path: Option<String>, namespace: Option<String>) -> Self {
		Self {
			kubeconfig_path: kubeconfig_path.filter(|p| !p.is_empty()),
			namespace: namespace
				.filter(|n| !n.is_empty())
				.unwrap_or_else(|| "default".to_string()),
		}
	}
}

/// Reconciler loop configuration.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
	pub interval_secs: u64,
}

impl ReconcilerConfig {
	pub(crate) fn resolve(interval_secs: Option<String>) -> Result<Self, ConfigError> {
		let interval_secs = match interval_secs {
			Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
				var: "RECONCILE_INTERVAL_SECS",
				reason: e.to_string(),
			})?,
			None => 30,
		};
		Ok(Self { interval_secs })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_kubeconfig_means_default_discovery() {
		let config = OrchestratorConfig::resolve(Some(String::new()), None);
		assert!(config.kubeconfig_path.is_none());
	}

	#[test]
	fn empty_log_level_falls_back_to_info() {
		assert_eq!(LoggingConfig::resolve(Some(String::new())).level, "info");
	}

	#[test]
	fn empty_database_url_counts_as_missing() {
		assert!(DatabaseConfig::resolve(Some(String::new())).is_err());
	}
}
