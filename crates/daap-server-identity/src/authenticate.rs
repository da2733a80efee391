// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raw key → identity resolution.

use daap_server_auth::api_key::{key_prefix, verify_api_key};
use daap_server_auth::{Identity, User};
use daap_server_db::{DbError, Stores};
use tracing::instrument;

use crate::error::AuthError;

/// Resolves raw API keys to request identities.
#[derive(Clone)]
pub struct Authenticator {
	stores: Stores,
}

impl Authenticator {
	pub fn new(stores: Stores) -> Self {
		Self { stores }
	}

	/// Authenticate a raw API key.
	///
	/// Candidates come from the prefix index (non-revoked users only); each
	/// candidate's argon2 hash is verified in constant time. The first match
	/// wins. Every non-match path returns the same [`AuthError::InvalidKey`]
	/// so callers cannot distinguish a prefix miss from a hash miss.
	#[instrument(skip_all)]
	pub async fn authenticate(&self, raw_key: &str) -> Result<Identity, AuthError> {
		let Some(prefix) = key_prefix(raw_key) else {
			return Err(AuthError::InvalidKey);
		};

		let candidates = self.stores.users.find_by_prefix(prefix).await?;
		for user in candidates {
			if verify_api_key(raw_key, &user.api_key_hash) {
				return self.assemble(user).await;
			}
		}
		Err(AuthError::InvalidKey)
	}

	/// Assemble the identity, loading team details only when the user has a
	/// team.
	async fn assemble(&self, user: User) -> Result<Identity, AuthError> {
		if user.is_superuser {
			return Ok(Identity::superuser(user.id, user.name));
		}

		// An active non-superuser always has a team; a row without one is
		// corrupt and must not authenticate.
		let team_id = user.team_id.ok_or_else(|| {
			AuthError::Store(DbError::Internal(format!(
				"active user {} has no team",
				user.id
			)))
		})?;
		let team = self
			.stores
			.teams
			.get_team_by_id(&team_id)
			.await?
			.ok_or_else(|| {
				AuthError::Store(DbError::Internal(format!(
					"user {} references missing team {team_id}",
					user.id
				)))
			})?;

		Ok(Identity::member(
			user.id, user.name, team.id, team.name, team.role,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use daap_server_auth::api_key::generate_api_key;
	use daap_server_auth::TeamRole;
	use daap_server_db::{NewTeam, NewUser};

	async fn stores_with_user(role: TeamRole) -> (Stores, String, daap_server_auth::UserId) {
		let stores = Stores::memory();
		let team = stores
			.teams
			.create_team(NewTeam {
				name: "ops".to_string(),
				role,
			})
			.await
			.unwrap();
		let key = generate_api_key();
		let user = stores
			.users
			.create_user(NewUser {
				name: "alice".to_string(),
				team_id: Some(team.id),
				is_superuser: false,
				api_key_prefix: key.prefix.clone(),
				api_key_hash: key.hash.clone(),
			})
			.await
			.unwrap();
		(stores, key.raw, user.id)
	}

	#[tokio::test]
	async fn authenticates_a_member_with_team_details() {
		let (stores, raw, user_id) = stores_with_user(TeamRole::Platform).await;
		let authenticator = Authenticator::new(stores);

		let identity = authenticator.authenticate(&raw).await.unwrap();
		assert_eq!(identity.user_id, user_id);
		assert_eq!(identity.team_name.as_deref(), Some("ops"));
		assert_eq!(identity.role, Some(TeamRole::Platform));
		assert!(!identity.is_superuser);
	}

	#[tokio::test]
	async fn short_keys_are_invalid() {
		let (stores, _, _) = stores_with_user(TeamRole::Platform).await;
		let authenticator = Authenticator::new(stores);

		let err = authenticator.authenticate("daap_x").await.unwrap_err();
		assert!(matches!(err, AuthError::InvalidKey));
	}

	#[tokio::test]
	async fn wrong_key_with_matching_prefix_is_invalid() {
		let (stores, raw, _) = stores_with_user(TeamRole::Platform).await;
		let authenticator = Authenticator::new(stores);

		// Same 8-char prefix, different remainder.
		let mut forged = raw[..8].to_string();
		forged.push_str("forged-remainder-that-does-not-match");
		let err = authenticator.authenticate(&forged).await.unwrap_err();
		assert!(matches!(err, AuthError::InvalidKey));
	}

	#[tokio::test]
	async fn identity_is_stable_until_revocation() {
		let (stores, raw, user_id) = stores_with_user(TeamRole::Product).await;
		let authenticator = Authenticator::new(stores.clone());

		let first = authenticator.authenticate(&raw).await.unwrap();
		let second = authenticator.authenticate(&raw).await.unwrap();
		assert_eq!(first, second);

		stores.users.revoke_user(&user_id).await.unwrap();
		let err = authenticator.authenticate(&raw).await.unwrap_err();
		assert!(matches!(err, AuthError::InvalidKey));
	}
}
