// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("required environment variable {0} is not set")]
	MissingRequired(&'static str),

	#[error("environment variable {var} is invalid: {reason}")]
	InvalidValue { var: &'static str, reason: String },
}
