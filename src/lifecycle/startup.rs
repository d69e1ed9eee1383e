//! Startup orchestration and the shutdown barrier.
//!
//! # Responsibilities
//! - Bind the listener before anything else runs
//! - Start the writer and the HTTP server concurrently
//! - Hold both completion handles and wait on them together
//!
//! # Design Decisions
//! - Fail fast: a bind failure is returned before any task is spawned
//! - The writer gets a dedicated blocking-pool thread; sink I/O is
//!   synchronous and must not stall request tasks
//! - A listener failure still lets the writer close the file before the
//!   error is reported

use std::net::SocketAddr;

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

use crate::config::AppConfig;
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError};
use crate::sink::{RotatingFile, Sink};
use crate::writer::{self, RotationTrigger, WriterReport};

/// Fatal lifecycle conditions.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("{component} task failed: {source}")]
    Task {
        component: &'static str,
        source: JoinError,
    },
}

/// A running logger: listener and writer, plus the handles that drive them.
pub struct Service {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    rotation: RotationTrigger,
    listener: JoinHandle<Result<(), ListenerError>>,
    writer: JoinHandle<WriterReport>,
}

/// Start the logger writing to the configured rotating file.
pub async fn start(config: &AppConfig, shutdown: Shutdown) -> Result<Service, LifecycleError> {
    start_with_sink(config, RotatingFile::new(&config.sink), shutdown).await
}

/// Start the logger writing to `sink`.
pub async fn start_with_sink<S: Sink>(
    config: &AppConfig,
    sink: S,
    shutdown: Shutdown,
) -> Result<Service, LifecycleError> {
    let listener = net::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr().map_err(ListenerError::Serve)?;

    let (writer, handle, rotation) = writer::channel(sink, &config.writer, shutdown.clone());
    let runtime = Handle::current();
    let writer = tokio::task::spawn_blocking(move || runtime.block_on(writer.run()));

    let server = HttpServer::new(AppState {
        writer: handle,
        max_body_bytes: config.listener.max_body_bytes,
    });
    let listener = tokio::spawn(server.run(
        listener,
        shutdown.clone(),
        config.listener.shutdown_timeout(),
    ));

    Ok(Service {
        local_addr,
        shutdown,
        rotation,
        listener,
        writer,
    })
}

impl Service {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for requesting rotations (wired to SIGHUP by the binary).
    pub fn rotation(&self) -> RotationTrigger {
        self.rotation.clone()
    }

    /// Wait until both the listener and the writer have stopped.
    ///
    /// Returns the writer's counters on a clean stop. A listener failure
    /// (serve error or drain timeout) fires shutdown so the writer still
    /// closes the file, and is reported once the writer is done.
    pub async fn wait(self) -> Result<WriterReport, LifecycleError> {
        let listener = match self.listener.await {
            Ok(result) => result.map_err(LifecycleError::from),
            Err(source) => Err(LifecycleError::Task {
                component: "listener",
                source,
            }),
        };
        if let Err(e) = &listener {
            tracing::error!(error = %e, "Listener stopped abnormally");
            self.shutdown.trigger();
        }

        let report = self.writer.await.map_err(|source| LifecycleError::Task {
            component: "writer",
            source,
        })?;

        listener?;
        Ok(report)
    }
}
