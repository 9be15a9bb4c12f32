//! Obesity Server - inference API and form UI
//!
//! `api` serves the trained model as JSON over HTTP. `web` renders an HTML
//! form that collects the features and forwards them to the API.

pub mod api;
pub mod web;

pub use api::{ApiState, PredictionResponse};
pub use web::WebState;

/// Bind `addr` and serve `app` until the process is stopped.
pub(crate) async fn serve_router(addr: &str, app: axum::Router, what: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    log::info!("{} listening on {}", what, listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
