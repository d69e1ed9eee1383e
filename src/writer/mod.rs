//! Ingestion-to-disk pipeline.
//!
//! # Data Flow
//! ```text
//! Request handler ──submit()──┐
//!                             ├──▶ event queue ──▶ WriterLoop ──▶ Sink
//! Reload signal ──request()───┘                       ▲
//!                                                     │
//! Shutdown ───────────────────────────────────────────┘
//! ```
//!
//! # Writer States
//! ```text
//! Running ──shutdown──▶ Draining (close sink) ──▶ Stopped
//! ```
//!
//! # Design Decisions
//! - The writer task is the only owner of the sink; no locks
//! - Messages and rotations share one queue so their relative order is the
//!   order they were queued
//! - A handler finishes only once the writer has taken its message
//! - Write and rotate failures never stop the loop

pub mod handoff;
pub mod message;
pub mod rotation;
pub mod worker;

use tokio::sync::mpsc;

use crate::config::WriterConfig;
use crate::lifecycle::Shutdown;
use crate::sink::Sink;

pub use handoff::{HandoffError, WriterHandle};
pub use message::Message;
pub use rotation::{RotationClosed, RotationTrigger};
pub use worker::{WriterLoop, WriterReport};

/// One unit of work for the writer.
#[derive(Debug)]
pub(crate) enum Event {
    Message(handoff::Envelope),
    Rotate,
}

/// Build a writer over `sink` and the handles that feed it.
pub fn channel<S: Sink>(
    sink: S,
    config: &WriterConfig,
    shutdown: Shutdown,
) -> (WriterLoop<S>, WriterHandle, RotationTrigger) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let writer = WriterLoop::new(sink, rx, shutdown.clone(), config.failure_policy);
    (writer, WriterHandle::new(tx.clone(), shutdown), RotationTrigger::new(tx))
}
