//! Axum server setup and router construction.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::post;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{self, AppState};

/// Build the full axum router.
///
/// The router serves `POST /api/push` (fan-out) and answers CORS preflight
/// with 204; non-POST methods on the endpoint get 405 from the method
/// router.
pub fn build_router(state: AppState) -> Router {
    // Permissive CORS: the relay is called directly from browser pages.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/push", post(api::send_push).options(api::preflight))
        .with_state(state)
        .layer(cors)
}

/// Bind, start serving on a Tokio task, and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> Result<SocketAddr, String> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("failed to read bound address: {e}"))?;

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!("relay server stopped: {err}");
        }
    });

    Ok(addr)
}
