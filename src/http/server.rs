//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ingest route
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until shutdown
//! - Bound the graceful drain of in-flight requests by a deadline

use std::future::IntoFuture;
use std::time::Duration;

use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

use crate::http::ingest::ingest;
use crate::http::request::with_request_tracing;
use crate::lifecycle::Shutdown;
use crate::net::ListenerError;
use crate::writer::WriterHandle;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub writer: WriterHandle,
    pub max_body_bytes: usize,
}

/// HTTP server for the logger.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let router = Router::new().route("/log", post(ingest)).with_state(state);
        with_request_tracing(router)
    }

    /// A handle to the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then stop accepting and
    /// give in-flight requests up to `drain_timeout` to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
        drain_timeout: Duration,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Serve)?;
        tracing::info!(address = %addr, "HTTP server starting");

        let graceful = shutdown.triggered_owned();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(graceful)
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result.map_err(ListenerError::Serve)?,
            _ = shutdown.triggered() => {
                tracing::info!(
                    timeout_secs = drain_timeout.as_secs_f64(),
                    "HTTP server draining"
                );
                match tokio::time::timeout(drain_timeout, &mut serve).await {
                    Ok(result) => result.map_err(ListenerError::Serve)?,
                    Err(_) => return Err(ListenerError::ShutdownTimeout(drain_timeout)),
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
