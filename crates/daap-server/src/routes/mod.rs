// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers, one module per resource.

pub mod blueprints;
pub mod databases;
pub mod docs;
pub mod health;
pub mod teams;
pub mod tiers;
pub mod users;
