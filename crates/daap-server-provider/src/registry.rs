// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-global registry of named providers.
//!
//! Populated once at startup and treated as immutable afterwards; lookups
//! are cheap reads. Registering the same name twice replaces the earlier
//! provider, which only matters in tests.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::Provider;

type ProviderMap = BTreeMap<String, Arc<dyn Provider>>;

static REGISTRY: OnceLock<RwLock<ProviderMap>> = OnceLock::new();

fn registry() -> &'static RwLock<ProviderMap> {
	REGISTRY.get_or_init(|| RwLock::new(BTreeMap::new()))
}

/// Register a provider under a name.
pub fn register(name: impl Into<String>, provider: Arc<dyn Provider>) {
	registry()
		.write()
		.unwrap_or_else(PoisonError::into_inner)
		.insert(name.into(), provider);
}

/// Look up a provider by name.
pub fn get(name: &str) -> Option<Arc<dyn Provider>> {
	registry()
		.read()
		.unwrap_or_else(PoisonError::into_inner)
		.get(name)
		.cloned()
}

/// Whether a provider is registered under this name.
pub fn has(name: &str) -> bool {
	registry()
		.read()
		.unwrap_or_else(PoisonError::into_inner)
		.contains_key(name)
}

/// Sorted names of all registered providers.
pub fn names() -> Vec<String> {
	registry()
		.read()
		.unwrap_or_else(PoisonError::into_inner)
		.keys()
		.cloned()
		.collect()
}
