// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use daap_server_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
	/// Absent, soft-deleted, or owned by another team. Ownership mismatches
	/// surface exactly like absence so foreign resources cannot be probed.
	#[error("database not found")]
	NotFound,

	/// The request named a tier that does not exist.
	#[error("unknown tier: {0}")]
	UnknownTier(String),

	#[error(transparent)]
	Store(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
