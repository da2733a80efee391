// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::DbError;

/// Create a PgPool with common settings.
///
/// # Arguments
/// * `database_url` - Postgres connection string (e.g., "postgres://daap@localhost/daap")
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<PgPool, DbError> {
	let pool = PgPoolOptions::new()
		.max_connections(10)
		.acquire_timeout(Duration::from_secs(5))
		.connect(database_url)
		.await
		.map_err(|e| DbError::Internal(format!("Failed to connect to database: {e}")))?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Run the embedded schema migrations.
///
/// Migrations are ordered up/down SQL pairs under `migrations/`; the server
/// applies them at startup before accepting requests.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
	sqlx::migrate!("./migrations")
		.run(pool)
		.await
		.map_err(|e| DbError::Internal(format!("Migration failed: {e}")))?;

	tracing::info!("database migrations applied");
	Ok(())
}
