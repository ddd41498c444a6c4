// rest/mod.rs — Public REST API server.
//
// Axum HTTP server bound to the configured address (local only by default).
//
// Endpoints:
//   GET    /api/health
//   GET    /api/issues/{project}   (query params are exact-match filters)
//   POST   /api/issues/{project}
//   PUT    /api/issues/{project}
//   DELETE /api/issues/{project}

pub mod routes;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(routes::health::health))
        // Issues
        .route(
            "/api/issues/{project}",
            get(routes::issues::list_issues)
                .post(routes::issues::create_issue)
                .put(routes::issues::update_issue)
                .delete(routes::issues::delete_issue),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
