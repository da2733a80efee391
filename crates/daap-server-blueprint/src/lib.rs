// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Blueprint manifest template engine.
//!
//! Blueprints are multi-document YAML texts with embedded Go template
//! placeholders (`{{ .Name }}`). The engine has two jobs:
//!
//! - [`validate_manifests`] at blueprint creation: the template must parse,
//!   and every document that parses as structured YAML must carry
//!   `apiVersion`, `kind`, and `metadata.name`. Documents whose placeholders
//!   occupy structural positions fail the YAML parse and skip the
//!   structural checks; the provider validates them after rendering.
//! - [`render_manifests`] at apply time: bind the fixed variable set from a
//!   [`ProviderDatabase`] and produce the rendered multi-document text.
//!   Referencing anything outside the fixed set is an error.
//!
//! Semantic validation of the embedded resource types is the provider's
//! responsibility, not the engine's.

pub mod error;

use std::collections::HashMap;

use daap_server_provider::ProviderDatabase;
use gtmpl::Value;

pub use error::BlueprintError;

/// Split a multi-document text on separator lines.
///
/// A line consisting solely of `---` divides documents; documents that are
/// empty or whitespace-only are discarded.
pub fn split_documents(text: &str) -> Vec<String> {
	let mut documents = Vec::new();
	let mut current = String::new();
	for line in text.lines() {
		if line.trim() == "---" {
			if !current.trim().is_empty() {
				documents.push(current.clone());
			}
			current.clear();
		} else {
			current.push_str(line);
			current.push('\n');
		}
	}
	if !current.trim().is_empty() {
		documents.push(current);
	}
	documents
}

/// Validate a blueprint's manifests at creation time.
///
/// # Errors
/// - [`BlueprintError::InvalidTemplate`] when the Go template fails to parse
/// - [`BlueprintError::MissingField`] when a structurally parseable document
///   lacks `apiVersion`, `kind`, or `metadata.name`
pub fn validate_manifests(manifests: &str) -> Result<(), BlueprintError> {
	let mut template = gtmpl::Template::default();
	template
		.parse(manifests)
		.map_err(|e| BlueprintError::InvalidTemplate(e.to_string()))?;

	for (index, document) in split_documents(manifests).iter().enumerate() {
		// Placeholders in structural positions make the YAML unparseable;
		// such documents are checked by the provider after rendering.
		let Ok(value) = serde_yaml::from_str::<serde_yaml::Value>(document) else {
			continue;
		};
		let serde_yaml::Value::Mapping(mapping) = value else {
			continue;
		};

		for field in ["apiVersion", "kind"] {
			if !has_scalar(&mapping, field) {
				return Err(BlueprintError::MissingField {
					document: index + 1,
					field,
				});
			}
		}

		let metadata_name = mapping
			.get(&serde_yaml::Value::from("metadata"))
			.and_then(|m| m.as_mapping())
			.map(|m| has_scalar(m, "name"))
			.unwrap_or(false);
		if !metadata_name {
			return Err(BlueprintError::MissingField {
				document: index + 1,
				field: "metadata.name",
			});
		}
	}

	Ok(())
}

/// Render a blueprint's manifests under a database's variable binding.
///
/// # Errors
/// Returns [`BlueprintError::Render`] when the template fails to evaluate,
/// including references to variables outside the fixed binding set.
pub fn render_manifests(
	manifests: &str,
	database: &ProviderDatabase,
) -> Result<String, BlueprintError> {
	let rendered = gtmpl::template(manifests, binding(database))
		.map_err(|e| BlueprintError::Render(e.to_string()))?;

	// Go templates print missing lookups as "<no value>" rather than
	// failing; an undefined variable must surface as an error either way.
	if rendered.contains("<no value>") {
		return Err(BlueprintError::Render(
			"template references an undefined variable".to_string(),
		));
	}

	Ok(rendered)
}

/// The fixed variable set a blueprint may reference.
fn binding(database: &ProviderDatabase) -> Value {
	let mut map: HashMap<String, Value> = HashMap::new();
	map.insert("ID".to_string(), Value::from(database.id.clone()));
	map.insert("Name".to_string(), Value::from(database.name.clone()));
	map.insert(
		"Namespace".to_string(),
		Value::from(database.namespace.clone()),
	);
	map.insert(
		"ClusterName".to_string(),
		Value::from(database.cluster_name.clone()),
	);
	map.insert(
		"PoolerName".to_string(),
		Value::from(database.pooler_name.clone()),
	);
	map.insert(
		"OwnerTeam".to_string(),
		Value::from(database.owner_team.clone()),
	);
	map.insert(
		"OwnerTeamID".to_string(),
		Value::from(database.owner_team_id.clone()),
	);
	map.insert("Tier".to_string(), Value::from(database.tier.clone()));
	map.insert("TierID".to_string(), Value::from(database.tier_id.clone()));
	map.insert(
		"Blueprint".to_string(),
		Value::from(database.blueprint.clone()),
	);
	map.insert(
		"Provider".to_string(),
		Value::from(database.provider.clone()),
	);
	Value::Object(map)
}

fn has_scalar(mapping: &serde_yaml::Mapping, field: &str) -> bool {
	match mapping.get(&serde_yaml::Value::from(field)) {
		Some(serde_yaml::Value::String(s)) => !s.is_empty(),
		Some(serde_yaml::Value::Null) | None => false,
		Some(_) => true,
	}
}
