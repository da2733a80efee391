// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-time superuser bootstrap.

use daap_server_auth::api_key::generate_api_key;
use daap_server_db::{DbError, NewUser, Stores};
use tracing::{info, instrument};

/// Name of the bootstrap identity.
pub const SUPERUSER_NAME: &str = "superuser";

/// Create the superuser if, and only if, no users exist yet.
///
/// Returns the raw API key exactly once, on the run that created the user;
/// the caller logs it. Every later run (and the loser of a concurrent race,
/// which the superuser singleton index decides) gets `None` and changes
/// nothing. Idempotent across restarts.
#[instrument(skip(stores))]
pub async fn bootstrap_superuser(stores: &Stores) -> Result<Option<String>, DbError> {
	if stores.users.count_users().await? > 0 {
		return Ok(None);
	}

	let key = generate_api_key();
	match stores
		.users
		.create_user(NewUser {
			name: SUPERUSER_NAME.to_string(),
			team_id: None,
			is_superuser: true,
			api_key_prefix: key.prefix,
			api_key_hash: key.hash,
		})
		.await
	{
		Ok(user) => {
			info!(user_id = %user.id, "superuser bootstrapped");
			Ok(Some(key.raw))
		}
		Err(DbError::SuperuserExists) => Ok(None),
		Err(e) => Err(e),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Authenticator;

	#[tokio::test]
	async fn fresh_store_creates_the_superuser_once() {
		let stores = Stores::memory();

		let raw = bootstrap_superuser(&stores).await.unwrap();
		let raw = raw.expect("first bootstrap returns the raw key");

		let identity = Authenticator::new(stores.clone())
			.authenticate(&raw)
			.await
			.unwrap();
		assert!(identity.is_superuser);
		assert!(identity.team_id.is_none());

		// Second start: no new user, empty result.
		assert!(bootstrap_superuser(&stores).await.unwrap().is_none());
		assert_eq!(stores.users.count_users().await.unwrap(), 1);
	}
}
