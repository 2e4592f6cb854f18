//! # Webhook Server
//!
//! This module defines the `WebhookServer`, an `axum`-based web server that
//! receives event webhooks and hands each one to the [`App`].
//!
//! The route answers `200 OK` with an empty body once every alert channel
//! has finished, whatever their individual outcomes. Bodies that are not a
//! JSON object are rejected with `400 Bad Request`.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::{app::App, event::EventEnvelope};

/// Builds the router serving the webhook route configured for `app`.
pub fn router(app: Arc<App>) -> Router {
    let path = app.config().server.webhook_path.clone();
    Router::new()
        .route(&path, post(receive_event))
        .with_state(app)
}

async fn receive_event(State(app): State<Arc<App>>, body: String) -> StatusCode {
    let event = match EventEnvelope::from_json(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Rejected webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    let summary = app.handle_event(event).await;
    debug!(?summary, "Webhook handled");
    StatusCode::OK
}

/// A server that receives event webhooks.
pub struct WebhookServer {
    listener: TcpListener,
    app: Arc<App>,
    shutdown_rx: watch::Receiver<bool>,
}

impl WebhookServer {
    /// Creates a new `WebhookServer` but does not spawn it.
    ///
    /// # Arguments
    ///
    /// * `listener` - A `TcpListener` that has already been bound to an address.
    /// * `app` - The alert pipeline each event is handed to.
    /// * `shutdown_rx` - A watch channel receiver for graceful shutdown.
    pub fn new(listener: TcpListener, app: Arc<App>, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            listener,
            app,
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal is received.
    ///
    /// In-flight requests are allowed to finish their dispatch.
    pub fn run(self) -> impl Future<Output = ()> {
        let WebhookServer {
            listener,
            app,
            mut shutdown_rx,
        } = self;
        let router = router(app);

        async move {
            if let Ok(addr) = listener.local_addr() {
                info!(%addr, "Webhook server listening");
            }
            let shutdown = async move {
                shutdown_rx.changed().await.ok();
                trace!("Webhook server received shutdown signal.");
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Webhook server error: {}", e);
            }
            trace!("Webhook server task finished.");
        }
    }
}
