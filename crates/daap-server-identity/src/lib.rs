// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API key authentication and the one-time superuser bootstrap.
//!
//! [`Authenticator`] resolves a raw `X-API-Key` value to an [`Identity`]:
//! prefix-indexed candidate lookup, constant-time hash verification, then
//! identity assembly with the team loaded only when the user has one.
//! [`bootstrap_superuser`] creates the administrative identity exactly once
//! per installation.

pub mod authenticate;
pub mod bootstrap;
pub mod error;

pub use authenticate::Authenticator;
pub use bootstrap::{bootstrap_superuser, SUPERUSER_NAME};
pub use error::AuthError;
