// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixed table of resource kinds this provider manages.
//!
//! Apply infers the target API from a document's `(apiVersion, kind)` pair;
//! delete sweeps every kind in the table by label. Kinds outside the table
//! are rejected at apply time rather than guessed at.

use kube::api::ApiResource;

pub(crate) const CNPG_API_VERSION: &str = "postgresql.cnpg.io/v1";
pub(crate) const CNPG_GROUP: &str = "postgresql.cnpg.io";
pub(crate) const CNPG_VERSION: &str = "v1";

pub(crate) struct KnownKind {
	pub api_version: &'static str,
	pub group: &'static str,
	pub version: &'static str,
	pub kind: &'static str,
	pub plural: &'static str,
}

pub(crate) const KNOWN_KINDS: &[KnownKind] = &[
	KnownKind {
		api_version: CNPG_API_VERSION,
		group: CNPG_GROUP,
		version: CNPG_VERSION,
		kind: "Cluster",
		plural: "clusters",
	},
	KnownKind {
		api_version: CNPG_API_VERSION,
		group: CNPG_GROUP,
		version: CNPG_VERSION,
		kind: "Pooler",
		plural: "poolers",
	},
	KnownKind {
		api_version: CNPG_API_VERSION,
		group: CNPG_GROUP,
		version: CNPG_VERSION,
		kind: "ScheduledBackup",
		plural: "scheduledbackups",
	},
	KnownKind {
		api_version: "v1",
		group: "",
		version: "v1",
		kind: "ConfigMap",
		plural: "configmaps",
	},
	KnownKind {
		api_version: "v1",
		group: "",
		version: "v1",
		kind: "Secret",
		plural: "secrets",
	},
	KnownKind {
		api_version: "v1",
		group: "",
		version: "v1",
		kind: "Service",
		plural: "services",
	},
];

impl KnownKind {
	pub(crate) fn api_resource(&self) -> ApiResource {
		ApiResource {
			group: self.group.to_string(),
			version: self.version.to_string(),
			api_version: self.api_version.to_string(),
			kind: self.kind.to_string(),
			plural: self.plural.to_string(),
		}
	}
}

/// Look up a known kind by `(apiVersion, kind)`.
pub(crate) fn lookup(api_version: &str, kind: &str) -> Option<&'static KnownKind> {
	KNOWN_KINDS
		.iter()
		.find(|k| k.api_version == api_version && k.kind == kind)
}

/// The primary cluster kind health checks read.
pub(crate) fn cluster_kind() -> &'static KnownKind {
	lookup(CNPG_API_VERSION, "Cluster").expect("Cluster is always in the kind table")
}
