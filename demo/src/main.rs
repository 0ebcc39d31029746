//! Tab backend demo
//!
//! Serves `GET /api/me` behind [`ClientAuthLayer`]. Requests need the Teams
//! routing headers and a bearer token issued for the configured app:
//!
//! ```text
//! ENTRA_TENANT_ID=<tenant> ENTRA_CLIENT_ID=<app id> cargo run -p entra-auth-demo
//!
//! curl localhost:3978/api/me \
//!     -H 'Authorization: Bearer <token>' \
//!     -H 'X-Teams-App-Session-Id: <session>' \
//!     -H 'X-Teams-Page-Id: <page>'
//! ```
//!
//! Without settings the server still starts, but every `/api` request is
//! answered with `401`.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::{Extension, Json, Router, routing::get};
use clap::Parser;
use entra_auth::tower::ClientAuthLayer;
use entra_auth::{AuthSettings, ClientAuthContext, EntraTokenValidator};
use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "entra-auth-demo", about = "Tab backend protected by Entra ID tokens")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "DEMO_BIND", default_value = "127.0.0.1:3978")]
    bind: SocketAddr,

    /// Settings file (TOML, YAML or JSON); ENTRA_* variables override it
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,entra_auth=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => AuthSettings::from_file(path),
        None => AuthSettings::from_env(),
    };

    let auth = match settings {
        Ok(settings) => {
            let validator = EntraTokenValidator::from_settings(&settings)
                .context("failed to build token validator")?;
            info!(
                tenant_id = %settings.tenant_id,
                client_id = %settings.client_id,
                "Client auth configured"
            );
            ClientAuthLayer::new(validator)
        }
        Err(e) => {
            warn!(error = %e, "Auth settings unavailable; rejecting all /api requests");
            ClientAuthLayer::unconfigured()
        }
    };

    let api = Router::new().route("/me", get(me)).layer(auth);
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind to {}", cli.bind))?;
    info!("Listening on http://{}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn me(Extension(ctx): Extension<ClientAuthContext>) -> Json<Value> {
    Json(json!({
        "userId": ctx.user_id,
        "tenantId": ctx.tenant_id,
        "appId": ctx.app_id,
        "pageId": ctx.page_id,
        "appSessionId": ctx.app_session_id,
        "teamId": ctx.team_id,
        "channelId": ctx.channel_id,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
