//! HTTP server startup.
//!
//! [`serve`] opens the database, wires the configured integrations into an
//! [`AppState`], and runs the axum router until ctrl-c.

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::TouchConfig;
use crate::db;

/// CORS policy from the configured origins. `*` (or nothing) allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}

/// The full application: API routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    api::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the JSON API over HTTP.
pub async fn serve(config: TouchConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    if config.payment.test_mode() {
        tracing::warn!("razorpay key id not configured; payments run in test mode");
    }
    if config.llm.api_key.is_empty() {
        tracing::warn!("llm api key not configured; AI endpoints will return 503");
    }

    let state = AppState::from_config(conn, config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Touch API listening at http://{bind_addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
