// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! daap control plane server binary.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use daap_server::{create_app_state, create_router, version};
use daap_server_reconciler::Reconciler;

/// daap - Database-as-a-Service control plane.
#[derive(Parser, Debug)]
#[command(name = "daap-server", about = "daap control plane server", version)]
struct Args {
	/// Subcommands for daap-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = daap_server_config::load_config()?;

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.init();

	tracing::info!(
		port = config.http.port,
		namespace = %config.orchestrator.namespace,
		"starting daap-server"
	);

	// Create database pool and run migrations
	let pool = daap_server_db::create_pool(&config.database.url).await?;
	daap_server_db::run_migrations(&pool).await?;
	let stores = daap_server_db::Stores::postgres(pool);

	// Register the built-in provider. A missing orchestrator degrades the
	// server (no provisioning, /health reports it) rather than failing
	// startup.
	match daap_server_k8s::create_client(config.orchestrator.kubeconfig_path.as_deref()).await {
		Ok(client) => {
			daap_server_provider::registry::register(
				daap_server_k8s::PROVIDER_NAME,
				Arc::new(daap_server_k8s::CnpgProvider::new(client)),
			);
			tracing::info!(provider = daap_server_k8s::PROVIDER_NAME, "provider registered");
		}
		Err(e) => {
			tracing::error!(error = %e, "orchestrator client unavailable; continuing without the cnpg provider");
		}
	}

	// One-time superuser bootstrap; the raw key is logged exactly once.
	if let Some(raw_key) = daap_server_identity::bootstrap_superuser(&stores).await? {
		tracing::info!(api_key = %raw_key, "superuser created; this key will not be shown again");
	}

	// Start the reconciliation loop
	let (shutdown_tx, _) = broadcast::channel(1);
	let reconciler = Reconciler::new(
		stores.clone(),
		Duration::from_secs(config.reconciler.interval_secs),
	);
	let reconciler_handle = tokio::spawn(reconciler.run(shutdown_tx.subscribe()));

	let state = create_app_state(
		stores,
		config.orchestrator.namespace.clone(),
		config.version.clone(),
	);
	let app = create_router(state);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received shutdown signal");
		}
	}

	let _ = shutdown_tx.send(());
	let _ = reconciler_handle.await;

	tracing::info!("server shutdown complete");
	Ok(())
}
