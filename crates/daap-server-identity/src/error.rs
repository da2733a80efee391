// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use daap_server_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	/// The presented key does not resolve to an active identity. A hash
	/// mismatch and a prefix miss are deliberately indistinguishable.
	#[error("invalid API key")]
	InvalidKey,

	#[error(transparent)]
	Store(#[from] DbError),
}
