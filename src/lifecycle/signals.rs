//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, rotation)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered with [`register`] before the service starts, so
//!   a registration failure is a startup failure and no signal arriving
//!   during startup falls through to the default action
//! - SIGHUP rotates the log file, it never shuts down
//! - Termination and reload run on separate tasks; a full rotation queue
//!   never delays shutdown

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::writer::RotationTrigger;

/// Registered but not yet observed signal streams.
///
/// Signals delivered between [`register`] and [`Signals::spawn`] are held and
/// acted on once the observers start.
#[derive(Debug)]
pub struct Signals(imp::Streams);

/// Take over the termination and reload signals for this process.
pub fn register() -> std::io::Result<Signals> {
    imp::Streams::register().map(Signals)
}

impl Signals {
    /// Start observing: termination fires `shutdown`, reload requests a
    /// rotation.
    pub fn spawn(
        self,
        shutdown: Shutdown,
        rotation: RotationTrigger,
    ) -> (JoinHandle<()>, JoinHandle<()>) {
        self.0.spawn(shutdown, rotation)
    }
}

/// Anything that yields reload notifications; `None` means no more will come.
pub trait ReloadSource: Send {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send;
}

#[cfg(unix)]
impl ReloadSource for tokio::signal::unix::Signal {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send {
        tokio::signal::unix::Signal::recv(self)
    }
}

impl ReloadSource for mpsc::UnboundedReceiver<()> {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send {
        mpsc::UnboundedReceiver::recv(self)
    }
}

/// Forward reload notifications to the writer until shutdown.
pub async fn forward_reloads<R: ReloadSource>(
    mut source: R,
    rotation: RotationTrigger,
    shutdown: Shutdown,
) {
    loop {
        tokio::select! {
            _ = shutdown.triggered() => break,
            received = source.recv() => {
                if received.is_none() {
                    break;
                }
                tracing::info!("Reload signal received, rotating log file");
                if rotation.request().await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(unix)]
mod imp {
    use tokio::signal::unix::{signal, Signal, SignalKind};
    use tokio::task::JoinHandle;

    use super::forward_reloads;
    use crate::lifecycle::Shutdown;
    use crate::writer::RotationTrigger;

    #[derive(Debug)]
    pub(super) struct Streams {
        sigterm: Signal,
        sigint: Signal,
        sighup: Signal,
    }

    impl Streams {
        pub(super) fn register() -> std::io::Result<Self> {
            Ok(Self {
                sigterm: signal(SignalKind::terminate())?,
                sigint: signal(SignalKind::interrupt())?,
                sighup: signal(SignalKind::hangup())?,
            })
        }

        pub(super) fn spawn(
            self,
            shutdown: Shutdown,
            rotation: RotationTrigger,
        ) -> (JoinHandle<()>, JoinHandle<()>) {
            let Self {
                mut sigterm,
                mut sigint,
                sighup,
            } = self;

            let terminate = tokio::spawn({
                let shutdown = shutdown.clone();
                async move {
                    tokio::select! {
                        _ = sigterm.recv() => {
                            tracing::info!(signal = "SIGTERM", "Shutdown signal received");
                        }
                        _ = sigint.recv() => {
                            tracing::info!(signal = "SIGINT", "Shutdown signal received");
                        }
                        _ = shutdown.triggered() => return,
                    }
                    shutdown.trigger();
                }
            });
            let reload = tokio::spawn(forward_reloads(sighup, rotation, shutdown));
            (terminate, reload)
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use tokio::task::JoinHandle;

    use crate::lifecycle::Shutdown;
    use crate::writer::RotationTrigger;

    #[derive(Debug)]
    pub(super) struct Streams;

    impl Streams {
        pub(super) fn register() -> std::io::Result<Self> {
            Ok(Self)
        }

        /// No reload signal on this platform; rotation is size-driven only.
        pub(super) fn spawn(
            self,
            shutdown: Shutdown,
            _rotation: RotationTrigger,
        ) -> (JoinHandle<()>, JoinHandle<()>) {
            let terminate = tokio::spawn(async move {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => match res {
                        Ok(()) => tracing::info!(signal = "ctrl-c", "Shutdown signal received"),
                        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
                    },
                    _ = shutdown.triggered() => return,
                }
                shutdown.trigger();
            });
            (terminate, tokio::spawn(async {}))
        }
    }
}
