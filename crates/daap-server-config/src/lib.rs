// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment-derived configuration for the daap server.
//!
//! The deployment contract is a small set of environment variables:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORT` | `8080` | HTTP listen port |
//! | `LOG_LEVEL` | `info` | tracing env-filter directive |
//! | `DATABASE_URL` | required | Postgres connection string |
//! | `KUBECONFIG_PATH` | empty | kubeconfig file; empty means in-cluster/default discovery |
//! | `NAMESPACE` | `default` | namespace managed databases live in |
//! | `VERSION` | crate version | reported by `/health` |
//! | `RECONCILE_INTERVAL_SECS` | `30` | reconciler tick interval |
//!
//! Missing required values or malformed numerics fail startup with a typed
//! [`ConfigError`]; nothing is silently defaulted besides the documented
//! defaults.

pub mod error;
pub mod sections;

pub use error::ConfigError;
pub use sections::{
	DatabaseConfig, HttpConfig, LoggingConfig, OrchestratorConfig, ReconcilerConfig,
};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub orchestrator: OrchestratorConfig,
	pub reconciler: ReconcilerConfig,
	/// Version string reported by the health endpoint.
	pub version: String,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("0.0.0.0:{}", self.http.port)
	}
}

/// Load configuration from process environment variables.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	resolve(|key| std::env::var(key).ok())
}

/// Resolve configuration from an arbitrary variable source.
///
/// Extracted from [`load_config`] so tests can inject values without
/// mutating process-global environment state.
pub fn resolve(get: impl Fn(&str) -> Option<String>) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: HttpConfig::resolve(get("PORT"))?,
		database: DatabaseConfig::resolve(get("DATABASE_URL"))?,
		logging: LoggingConfig::resolve(get("LOG_LEVEL")),
		orchestrator: OrchestratorConfig::resolve(get("KUBECONFIG_PATH"), get("NAMESPACE")),
		reconciler: ReconcilerConfig::resolve(get("RECONCILE_INTERVAL_SECS"))?,
		version: get("VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
	};
	tracing::debug!(port = config.http.port, namespace = %config.orchestrator.namespace, "configuration resolved");
	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| map.get(key).cloned()
	}

	#[test]
	fn minimal_environment_resolves_with_defaults() {
		let config = resolve(source(&[("DATABASE_URL", "postgres://daap@localhost/daap")])).unwrap();
		assert_eq!(config.http.port, 8080);
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.orchestrator.namespace, "default");
		assert!(config.orchestrator.kubeconfig_path.is_none());
		assert_eq!(config.reconciler.interval_secs, 30);
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn missing_database_url_fails_startup() {
		let err = resolve(source(&[])).unwrap_err();
		assert!(matches!(err, ConfigError::MissingRequired("DATABASE_URL")));
	}

	#[test]
	fn explicit_values_override_defaults() {
		let config = resolve(source(&[
			("DATABASE_URL", "postgres://daap@db/daap"),
			("PORT", "9090"),
			("LOG_LEVEL", "debug"),
			("KUBECONFIG_PATH", "/etc/daap/kubeconfig"),
			("NAMESPACE", "databases"),
			("VERSION", "1.2.3"),
			("RECONCILE_INTERVAL_SECS", "5"),
		]))
		.unwrap();
		assert_eq!(config.http.port, 9090);
		assert_eq!(config.logging.level, "debug");
		assert_eq!(
			config.orchestrator.kubeconfig_path.as_deref(),
			Some("/etc/daap/kubeconfig")
		);
		assert_eq!(config.orchestrator.namespace, "databases");
		assert_eq!(config.version, "1.2.3");
		assert_eq!(config.reconciler.interval_secs, 5);
	}

	#[test]
	fn malformed_numerics_fail_startup() {
		let err = resolve(source(&[
			("DATABASE_URL", "postgres://daap@db/daap"),
			("PORT", "not-a-port"),
		]))
		.unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { var: "PORT", .. }));

		let err = resolve(source(&[
			("DATABASE_URL", "postgres://daap@db/daap"),
			("RECONCILE_INTERVAL_SECS", "soon"),
		]))
		.unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidValue {
				var: "RECONCILE_INTERVAL_SECS",
				..
			}
		));
	}
}
