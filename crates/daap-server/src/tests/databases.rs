// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ownership scoping and database lifecycle through the HTTP surface.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::helper::{create_team, create_user, error_code, send, setup_app, TestApp};

/// Two product teams, one user each.
async fn two_tenants(app: &TestApp) -> (String, String) {
	let alpha = create_team(app, "alpha", "product").await;
	let beta = create_team(app, "beta", "product").await;
	let (_, a_key) = create_user(app, "a", &alpha).await;
	let (_, b_key) = create_user(app, "b", &beta).await;
	(a_key, b_key)
}

async fn create_database(app: &TestApp, key: &str, name: &str) -> String {
	let (status, body) = send(
		app,
		Method::POST,
		"/databases",
		Some(key),
		Some(json!({"name": name, "purpose": "testing"})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED, "create_database failed: {body}");
	body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn product_teams_only_see_their_own_databases() {
	let app = setup_app().await;
	let (a_key, b_key) = two_tenants(&app).await;

	create_database(&app, &a_key, "db1").await;
	let db2 = create_database(&app, &b_key, "db2").await;

	// a's list contains only db1.
	let (status, body) = send(&app, Method::GET, "/databases", Some(&a_key), None).await;
	assert_eq!(status, StatusCode::OK);
	let data = body["data"].as_array().unwrap();
	assert_eq!(data.len(), 1);
	assert_eq!(data[0]["name"], "db1");
	assert_eq!(body["meta"]["total"], 1);

	// Point operations against db2 read as absent, never forbidden.
	for method in [Method::GET, Method::DELETE] {
		let (status, body) = send(
			&app,
			method,
			&format!("/databases/{db2}"),
			Some(&a_key),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(error_code(&body), "NOT_FOUND");
	}
	let (status, _) = send(
		&app,
		Method::PATCH,
		&format!("/databases/{db2}"),
		Some(&a_key),
		Some(json!({"purpose": "mine now"})),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// db2 is untouched for its owner.
	let (status, body) = send(
		&app,
		Method::GET,
		&format!("/databases/{db2}"),
		Some(&b_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["purpose"], "testing");
}

#[tokio::test]
async fn a_foreign_owner_filter_is_silently_narrowed() {
	let app = setup_app().await;
	let (a_key, b_key) = two_tenants(&app).await;
	create_database(&app, &a_key, "db1").await;
	let db2 = create_database(&app, &b_key, "db2").await;

	// Find beta's team id through b's own view.
	let (_, body) = send(
		&app,
		Method::GET,
		&format!("/databases/{db2}"),
		Some(&b_key),
		None,
	)
	.await;
	let beta_team = body["data"]["ownerTeamId"].as_str().unwrap().to_string();

	let (status, body) = send(
		&app,
		Method::GET,
		&format!("/databases?ownerTeamId={beta_team}"),
		Some(&a_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let data = body["data"].as_array().unwrap();
	assert_eq!(data.len(), 1, "the narrower constraint wins");
	assert_eq!(data[0]["name"], "db1");
}

#[tokio::test]
async fn the_superuser_is_not_a_product_consumer() {
	let app = setup_app().await;

	let (status, body) = send(
		&app,
		Method::GET,
		"/databases",
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn database_names_are_unique_while_active_and_reusable_after_delete() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;

	let db1 = create_database(&app, &a_key, "orders").await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/databases",
		Some(&a_key),
		Some(json!({"name": "orders"})),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_code(&body), "DUPLICATE_NAME");

	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/databases/{db1}"),
		Some(&a_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	// Name is free again; a repeat delete of the old row is gone.
	create_database(&app, &a_key, "orders").await;
	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/databases/{db1}"),
		Some(&a_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn databases_are_born_provisioning_with_derived_names() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/databases",
		Some(&a_key),
		Some(json!({"name": "orders", "purpose": "order storage"})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	let data = &body["data"];
	assert_eq!(data["status"], "provisioning");
	assert_eq!(data["clusterName"], "daap-orders");
	assert_eq!(data["poolerName"], "daap-orders-pooler");
	assert_eq!(data["namespace"], "default");
	assert_eq!(data["ownerTeamName"], "alpha");
	assert!(data["host"].is_null());
}

#[tokio::test]
async fn malformed_database_names_are_rejected() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;

	for name in ["Orders", "or--ders", "-orders", "ab"] {
		let (status, body) = send(
			&app,
			Method::POST,
			"/databases",
			Some(&a_key),
			Some(json!({"name": name})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "name {name:?}: {body}");
		assert_eq!(error_code(&body), "VALIDATION_ERROR");
	}
}

#[tokio::test]
async fn unknown_tier_names_are_semantically_rejected() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/databases",
		Some(&a_key),
		Some(json!({"name": "orders", "tierName": "gold"})),
	)
	.await;
	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(error_code(&body), "VALIDATION_ERROR");
	assert_eq!(body["error"]["details"][0]["field"], "tierName");
}

#[tokio::test]
async fn list_filters_compose_with_pagination() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;

	for i in 0..3 {
		create_database(&app, &a_key, &format!("orders-{i}")).await;
	}
	create_database(&app, &a_key, "billing").await;

	let (status, body) = send(
		&app,
		Method::GET,
		"/databases?name=ORDERS&page=2&limit=2",
		Some(&a_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["meta"]["total"], 3);
	assert_eq!(body["meta"]["page"], 2);
	assert_eq!(body["meta"]["limit"], 2);
	let data = body["data"].as_array().unwrap();
	assert_eq!(data.len(), 1);
	assert_eq!(data[0]["name"], "orders-0");
}

#[tokio::test]
async fn update_touches_only_mutable_fields() {
	let app = setup_app().await;
	let (a_key, _) = two_tenants(&app).await;
	let db = create_database(&app, &a_key, "orders").await;

	let (status, body) = send(
		&app,
		Method::PATCH,
		&format!("/databases/{db}"),
		Some(&a_key),
		Some(json!({"purpose": "billing instead"})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["data"]["purpose"], "billing instead");
	assert_eq!(body["data"]["status"], "provisioning");
}
