//! Rotation requests.
//!
//! Requests share the writer's bounded event queue with messages, so a
//! rotation lands exactly between the messages queued before and after it.
//! When the queue is full the caller waits for the writer to catch up;
//! requests are never dropped.

use tokio::sync::mpsc;

use crate::writer::Event;

/// The writer has stopped and no longer takes rotation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("writer stopped, rotation not queued")]
pub struct RotationClosed;

/// Cloneable sender of "rotate now" events.
#[derive(Debug, Clone)]
pub struct RotationTrigger {
    tx: mpsc::Sender<Event>,
}

impl RotationTrigger {
    pub(crate) fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    /// Queue one rotation, waiting for room if the queue is full.
    pub async fn request(&self) -> Result<(), RotationClosed> {
        self.tx.send(Event::Rotate).await.map_err(|_| RotationClosed)
    }
}
