// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum K8sError {
	#[error("kubernetes API error: {0}")]
	Kube(#[from] kube::Error),

	#[error("kubeconfig error: {0}")]
	Config(String),

	#[error("invalid manifest document: {0}")]
	InvalidManifest(String),
}
