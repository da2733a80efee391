// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-level authorization gates.
//!
//! Two orthogonal checks are applied against a resolved [`Identity`]:
//!
//! - **Role membership**: [`require_superuser`] for administrative
//!   endpoints, [`require_role`] for business endpoints. The superuser is an
//!   administrative identity, not a product consumer; it never passes the
//!   role gate.
//! - **Ownership scoping**: product-team callers only see their own
//!   databases. List filters are narrowed with [`scoped_owner_filter`];
//!   point operations consult [`can_touch_database`] and convert a mismatch
//!   into Not Found (never Forbidden) so that foreign resources cannot be
//!   probed into existence.

use crate::types::{Identity, TeamId, TeamRole};

/// Authorization failure: the identity is valid but not allowed here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
	#[error("superuser access required")]
	SuperuserRequired,

	#[error("caller role is not permitted on this endpoint")]
	RoleNotAllowed,
}

/// Require the administrative superuser.
pub fn require_superuser(identity: &Identity) -> Result<(), AuthzError> {
	if identity.is_superuser {
		Ok(())
	} else {
		Err(AuthzError::SuperuserRequired)
	}
}

/// Require a non-superuser caller whose team role is one of `roles`.
///
/// The superuser is rejected here by design: business endpoints belong to
/// teams, not to the bootstrap identity.
pub fn require_role(identity: &Identity, roles: &[TeamRole]) -> Result<(), AuthzError> {
	if identity.is_superuser {
		return Err(AuthzError::RoleNotAllowed);
	}
	match identity.role {
		Some(role) if roles.contains(&role) => Ok(()),
		_ => Err(AuthzError::RoleNotAllowed),
	}
}

/// Narrow an owner-team list filter to what the caller may see.
///
/// Product callers are pinned to their own team regardless of the requested
/// filter; the narrower constraint silently wins. Everyone else keeps the
/// filter they asked for.
pub fn scoped_owner_filter(identity: &Identity, requested: Option<TeamId>) -> Option<TeamId> {
	if identity.is_product() {
		identity.team_id
	} else {
		requested
	}
}

/// Whether the caller may address a database owned by `owner_team_id`.
///
/// A `false` result must surface as Not Found.
pub fn can_touch_database(identity: &Identity, owner_team_id: TeamId) -> bool {
	if identity.is_product() {
		identity.team_id == Some(owner_team_id)
	} else {
		true
	}
}
