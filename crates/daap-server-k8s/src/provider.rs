// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The CloudNativePG provider implementation.
//!
//! - **Apply** is create-or-update with optimistic concurrency: create each
//!   document, and on conflict copy the live resource's version token onto
//!   the desired object and replace it.
//! - **Delete** sweeps every known kind by the `database-name` label and
//!   keeps going past individual failures; missing resources never fail it.
//! - **Health** reads the Cluster resource's `status.phase`; an absent
//!   cluster counts as still provisioning.

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::Client;
use tracing::{debug, instrument, warn};

use daap_server_blueprint::split_documents;
use daap_server_provider::{HealthResult, HealthStatus, Provider, ProviderDatabase, ProviderError};

use crate::error::K8sError;
use crate::health::{classify_phase, ready_result};
use crate::kinds::{cluster_kind, lookup, KnownKind};

/// Name this provider registers under.
pub const PROVIDER_NAME: &str = "cnpg";

/// Label marking resources as owned by the control plane.
const MANAGED_BY_LABEL: &str = "managed-by";
const MANAGED_BY_VALUE: &str = "daap";

/// Label tying a resource to its database; delete selects on it.
const DATABASE_NAME_LABEL: &str = "database-name";

/// Kubernetes-backed provider for CloudNativePG resources.
///
/// The underlying client is concurrency-safe, so one provider instance
/// serves all request handlers and the reconciler.
pub struct CnpgProvider {
	client: Client,
}

impl CnpgProvider {
	pub fn new(client: Client) -> Self {
		Self { client }
	}

	fn api_for(&self, namespace: &str, kind: &KnownKind) -> Api<DynamicObject> {
		Api::namespaced_with(self.client.clone(), namespace, &kind.api_resource())
	}

	#[instrument(skip(self, object), fields(namespace = %database.namespace))]
	async fn apply_object(
		&self,
		database: &ProviderDatabase,
		mut object: DynamicObject,
	) -> Result<(), K8sError> {
		let types = object
			.types
			.clone()
			.ok_or_else(|| K8sError::InvalidManifest("document has no apiVersion/kind".into()))?;
		let kind = lookup(&types.api_version, &types.kind).ok_or_else(|| {
			K8sError::InvalidManifest(format!(
				"unsupported resource kind {}/{}",
				types.api_version, types.kind
			))
		})?;
		let name = object
			.metadata
			.name
			.clone()
			.ok_or_else(|| K8sError::InvalidManifest("document has no metadata.name".into()))?;

		inject_labels(&mut object, &database.name);

		let api = self.api_for(&database.namespace, kind);
		match api.create(&PostParams::default(), &object).await {
			Ok(_) => {
				debug!(kind = %types.kind, name = %name, "resource created");
				Ok(())
			}
			Err(kube::Error::Api(ae)) if ae.code == 409 => {
				let live = api.get(&name).await?;
				object.metadata.resource_version = live.metadata.resource_version;
				api.replace(&name, &PostParams::default(), &object).await?;
				debug!(kind = %types.kind, name = %name, "resource updated");
				Ok(())
			}
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl Provider for CnpgProvider {
	#[instrument(skip(self, manifests), fields(database = %database.name, namespace = %database.namespace))]
	async fn apply(
		&self,
		database: &ProviderDatabase,
		manifests: &str,
	) -> Result<(), ProviderError> {
		for document in split_documents(manifests) {
			let object = parse_document(&document)
				.map_err(|e| ProviderError::InvalidManifest(e.to_string()))?;
			self
				.apply_object(database, object)
				.await
				.map_err(|e| match e {
					K8sError::InvalidManifest(msg) => ProviderError::InvalidManifest(msg),
					other => ProviderError::Apply(other.to_string()),
				})?;
		}
		Ok(())
	}

	#[instrument(skip(self), fields(database = %database.name, namespace = %database.namespace))]
	async fn delete(&self, database: &ProviderDatabase) -> Result<(), ProviderError> {
		let selector = format!("{DATABASE_NAME_LABEL}={}", database.name);
		let params = ListParams::default().labels(&selector);

		for kind in crate::kinds::KNOWN_KINDS {
			let api = self.api_for(&database.namespace, kind);
			let list = match api.list(&params).await {
				Ok(list) => list,
				Err(e) => {
					warn!(kind = %kind.kind, error = %e, "failed to list resources for delete; continuing");
					continue;
				}
			};

			for item in list.items {
				let Some(name) = item.metadata.name else {
					continue;
				};
				match api.delete(&name, &DeleteParams::default()).await {
					Ok(_) => debug!(kind = %kind.kind, name = %name, "resource deleted"),
					Err(kube::Error::Api(ae)) if ae.code == 404 => {}
					Err(e) => {
						warn!(kind = %kind.kind, name = %name, error = %e, "failed to delete resource; continuing");
					}
				}
			}
		}
		Ok(())
	}

	#[instrument(skip(self), fields(database = %database.name, cluster = %database.cluster_name))]
	async fn check_health(
		&self,
		database: &ProviderDatabase,
	) -> Result<HealthResult, ProviderError> {
		let api = self.api_for(&database.namespace, cluster_kind());
		let cluster = api
			.get_opt(&database.cluster_name)
			.await
			.map_err(|e| ProviderError::Health(e.to_string()))?;

		let Some(cluster) = cluster else {
			// Not created yet (or apply never landed); the reconciler treats
			// absence as still provisioning, never as failure.
			return Ok(HealthResult::status_only(HealthStatus::Provisioning));
		};

		let phase = cluster.data["status"]["phase"].as_str().unwrap_or("");
		let result = match classify_phase(phase) {
			HealthStatus::Ready => ready_result(database),
			status => HealthResult::status_only(status),
		};
		debug!(phase = %phase, status = ?result.status, "cluster health observed");
		Ok(result)
	}
}

/// Parse one rendered YAML document into a dynamic object.
///
/// Goes through a JSON value first: `DynamicObject` flattens its unknown
/// fields, which the YAML deserializer cannot feed directly.
fn parse_document(document: &str) -> Result<DynamicObject, K8sError> {
	let value: serde_json::Value =
		serde_yaml::from_str(document).map_err(|e| K8sError::InvalidManifest(e.to_string()))?;
	serde_json::from_value(value).map_err(|e| K8sError::InvalidManifest(e.to_string()))
}

/// Inject ownership labels, preserving user-supplied ones.
fn inject_labels(object: &mut DynamicObject, database_name: &str) {
	let labels = object.metadata.labels.get_or_insert_with(Default::default);
	labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
	labels.insert(DATABASE_NAME_LABEL.to_string(), database_name.to_string());
}
