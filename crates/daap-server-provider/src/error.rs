// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("provider {0} is not registered")]
	NotRegistered(String),

	#[error("invalid manifest document: {0}")]
	InvalidManifest(String),

	#[error("failed to apply manifests: {0}")]
	Apply(String),

	#[error("failed to delete resources: {0}")]
	Delete(String),

	#[error("health check failed: {0}")]
	Health(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
