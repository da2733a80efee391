// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP control plane for daap.
//!
//! Routes, the response envelope, request middleware, and validation live
//! here; domain behavior lives in the service crates this one composes.

pub mod api;
pub mod api_response;
pub mod auth_middleware;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod validation;
pub mod version;

#[cfg(test)]
mod tests;

pub use api::{create_app_state, create_router, AppState};
