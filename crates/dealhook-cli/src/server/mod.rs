//! Webhook HTTP surface.

mod handlers;
pub mod payload;

use anyhow::{Context as _, Result};
use axum::routing::get;
use axum::Router;
use dealhook_bitrix::{CrmGateway, Enricher};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared by every request; read-only.
pub struct AppState<G> {
    pub enricher: Arc<Enricher<G>>,
    pub dataset_version: Arc<str>,
}

impl<G> AppState<G> {
    pub fn new(enricher: Arc<Enricher<G>>, dataset_version: &str) -> Self {
        Self {
            enricher,
            dataset_version: Arc::from(dataset_version),
        }
    }
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            enricher: Arc::clone(&self.enricher),
            dataset_version: Arc::clone(&self.dataset_version),
        }
    }
}

pub fn router<G>(state: AppState<G>) -> Router
where
    G: CrmGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health::<G>))
        .route(
            "/",
            get(handlers::webhook::<G>).post(handlers::webhook::<G>),
        )
        .route(
            "/webhook",
            get(handlers::webhook::<G>).post(handlers::webhook::<G>),
        )
        .layer(TraceLayer::new_for_http().make_span_with(
            |req: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
            },
        ))
        .with_state(state)
}

pub async fn run<G>(listen: SocketAddr, state: AppState<G>) -> Result<()>
where
    G: CrmGateway + Send + Sync + 'static,
{
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("bind {}", listen))?;
    info!(
        address = %listen,
        version = env!("CARGO_PKG_VERSION"),
        dataset = %state.dataset_version,
        "dealhook listening"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "serve webhook")?;
    info!("dealhook stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
