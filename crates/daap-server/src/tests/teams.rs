// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Team and user lifecycle through the HTTP surface.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::helper::{create_team, create_user, error_code, send, setup_app};

#[tokio::test]
async fn team_and_user_lifecycle() {
	let app = setup_app().await;

	// Superuser creates a platform team and a member.
	let team_id = create_team(&app, "ops", "platform").await;
	let (user_id, user_key) = create_user(&app, "alice", &team_id).await;

	// The new key authenticates with the team's role attached: a platform
	// member may list databases, which the superuser may not.
	let (status, _) = send(&app, Method::GET, "/databases", Some(&user_key), None).await;
	assert_eq!(status, StatusCode::OK);

	// The team cannot be deleted while alice is active.
	let (status, body) = send(
		&app,
		Method::DELETE,
		&format!("/teams/{team_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_code(&body), "TEAM_HAS_USERS");

	// Revoke alice (soft), then the team goes away.
	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/users/{user_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	// Her key stops working immediately.
	let (status, _) = send(&app, Method::GET, "/databases", Some(&user_key), None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, _) = send(
		&app,
		Method::DELETE,
		&format!("/teams/{team_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_team_names_conflict() {
	let app = setup_app().await;
	create_team(&app, "ops", "platform").await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/teams",
		Some(&app.superuser_key),
		Some(json!({"name": "ops", "role": "product"})),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_code(&body), "DUPLICATE_NAME");
}

#[tokio::test]
async fn team_names_are_trimmed_before_storage() {
	let app = setup_app().await;
	create_team(&app, "ops", "platform").await;

	// "  ops  " trims to "ops" and conflicts.
	let (status, body) = send(
		&app,
		Method::POST,
		"/teams",
		Some(&app.superuser_key),
		Some(json!({"name": "  ops  ", "role": "platform"})),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(error_code(&body), "DUPLICATE_NAME");
}

#[tokio::test]
async fn bad_role_is_a_validation_error() {
	let app = setup_app().await;
	let (status, body) = send(
		&app,
		Method::POST,
		"/teams",
		Some(&app.superuser_key),
		Some(json!({"name": "ops", "role": "admin"})),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(error_code(&body), "VALIDATION_ERROR");
	assert_eq!(body["error"]["details"][0]["field"], "role");
}

#[tokio::test]
async fn validation_failures_are_batched() {
	let app = setup_app().await;
	let (status, body) = send(
		&app,
		Method::POST,
		"/teams",
		Some(&app.superuser_key),
		Some(json!({"name": "   ", "role": "admin"})),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let details = body["error"]["details"].as_array().unwrap();
	assert_eq!(details.len(), 2, "both failures reported: {details:?}");
}

#[tokio::test]
async fn the_superuser_cannot_be_revoked() {
	let app = setup_app().await;

	let (_, body) = send(&app, Method::GET, "/users", Some(&app.superuser_key), None).await;
	let superuser_id = body["data"][0]["id"].as_str().unwrap().to_string();

	let (status, body) = send(
		&app,
		Method::DELETE,
		&format!("/users/{superuser_id}"),
		Some(&app.superuser_key),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn revoking_twice_is_idempotent() {
	let app = setup_app().await;
	let team_id = create_team(&app, "ops", "platform").await;
	let (user_id, _) = create_user(&app, "alice", &team_id).await;

	for _ in 0..2 {
		let (status, _) = send(
			&app,
			Method::DELETE,
			&format!("/users/{user_id}"),
			Some(&app.superuser_key),
			None,
		)
		.await;
		assert_eq!(status, StatusCode::NO_CONTENT);
	}
}

#[tokio::test]
async fn non_superusers_cannot_manage_teams() {
	let app = setup_app().await;
	let team_id = create_team(&app, "ops", "platform").await;
	let (_, user_key) = create_user(&app, "alice", &team_id).await;

	let (status, body) = send(
		&app,
		Method::POST,
		"/teams",
		Some(&user_key),
		Some(json!({"name": "rogue", "role": "platform"})),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(error_code(&body), "FORBIDDEN");
}
