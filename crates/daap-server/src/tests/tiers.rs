// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tier handlers: projections, immutability, restricted deletion.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::helper::{create_team, create_user, error_code, send, setup_app, TestApp};

async fn create_tier(app: &TestApp, name: &str) -> String {
	let (status, body) = send(
		app,
		Method::POST,
		"/tiers",
		Some(&app.superuser_key),
		Some(json!({
			"name": name,
			"description": "general purpose",
			"destructionStrategy": "archive",
			"backupEnabled": true,
		})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "create_tier failed: {body}");
	body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn product_reads_see_only_the_summary_projection() {
	let app = setup_app().await;
	let tier_id = create_tier(&app, "standard").await;

	let team_id = create_team(&app, "alpha", "product").await;
	let (_, product_key) = create_user(&app, "a", &team_id).await;

	let (status, body) = send(
		&app,
		Method::GET,
		&format!("/tiers/{tier_id}"),
		Some(&product_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let data = &body["data"];
	assert_eq!(data["name"], "standard");
	assert_eq!(data["description"], "general purpose");
	assert!(
		data.get("destructionStrategy").is_none(),
		"product view must not leak infrastructure fields: {data}"
	);
	assert!(data.get("blueprintName").is_none());
}

#[tokio::test]
async fn platform_reads_see_the_full_tier() {
	let app = setup_app().await;
	create_tier(&app, "standard").await;

	let team_id = create_team(&app, "ops", "platform").await;
	let (_, platform_key) = create_user(&app, "p", &team_id).await;

	let (status, body) = send(&app, Method::GET, "/tiers", Some(&platform_key), None).await;
	assert_eq!(status, StatusCode::OK);
	let data = &body["data"][0];
	assert_eq!(data["destructionStrategy"], "archive");
	assert_eq!(data["backupEnabled"], true);
}

#[tokio::test]
async fn tier_names_are_immutable() {
	let app = setup_app().await;
	let tier_id = create_tier(&app, "standard").await;

	let (status, body) = send(
		&app,
		Method::PATCH,
		&format!("/tiers/{tier_id}"),
		Some(&app.superuser_key),
		Some(json!({"name": "premium"})),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(error_code(&body), "IMMUTABLE_FIELD");
}

#[tokio::test]
async fn mutable_tier_fields_update_in_place() {
	let app = setup_app().await;
	let tier_id = create_tier(&app, "standard").await;

	let (status, body) = send(
		&app,
		Method::PATCH,
		&format!("/tiers/{tier_id}"),
		Some(&app.superuser_key),
		Some(json!({"description": "now premium", "destructionStrategy": "freeze"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["description"], "now premium");
	assert_eq!(body["data"]["destructionStrategy"], "freeze");
	assert_eq!(body["data"]["backupEnabled"], true);
}

#[tokio::test]
async fn tier_deletion_is_blocked_by_active_databases() {
	let app = setup_app().await;
	let tier_id = create_tier(&app, "standard").await;

	let team_id = create_team(&app, "alpha", "product").await;
	let (_, product_key) = create_user(&app, "a", &team_id).await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/databases",
		Some(&product_key),
		Some(json!({"name": "orders", "tierName": "standard"})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let db_id = body["data"]["id"].as_str().unwrap().to_string();

	let (status, body) = send(
		&app,
		Method::DELETE,
		&format!("/tiers/{tier_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_code(&body), "TIER_HAS_DATABASES");

	// Soft-deleting the database frees the tier.
	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/databases/{db_id}"),
		Some(&product_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/tiers/{tier_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}
