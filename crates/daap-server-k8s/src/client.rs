// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use kube::Client;
use tracing::debug;

use crate::error::K8sError;

/// Create a Kubernetes client.
///
/// Without an explicit path this auto-discovers cluster configuration:
/// 1. In-cluster service account (when running in Kubernetes)
/// 2. `KUBECONFIG` environment variable
/// 3. `~/.kube/config`
///
/// With a path, the kubeconfig file at that location is used.
pub async fn create_client(kubeconfig_path: Option<&str>) -> Result<Client, K8sError> {
	let client = match kubeconfig_path {
		None => Client::try_default().await?,
		Some(path) => {
			let kubeconfig =
				Kubeconfig::read_from(path).map_err(|e| K8sError::Config(e.to_string()))?;
			let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
				.await
				.map_err(|e| K8sError::Config(e.to_string()))?;
			Client::try_from(config)?
		}
	};
	debug!("kubernetes client initialized");
	Ok(client)
}
