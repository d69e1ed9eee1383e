//! Producer side of the handler → writer hand-off.
//!
//! A submission only succeeds once the writer has dequeued the envelope and
//! answered on its oneshot. That gives rendezvous semantics over the bounded
//! event queue: a handler completes only after the writer has taken its
//! message, and a stalled writer stalls handlers instead of growing a queue.

use std::io;

use tokio::sync::{mpsc, oneshot};

use crate::lifecycle::Shutdown;
use crate::writer::{Event, Message};

/// Writer's answer to one envelope.
pub(crate) type Ack = io::Result<()>;

/// A message travelling to the writer together with its acknowledgement slot.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) message: Message,
    pub(crate) ack: oneshot::Sender<Ack>,
}

/// Why a message was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    /// Shutdown fired or the writer stopped before taking the message.
    #[error("writer unavailable")]
    Unavailable,
    /// The writer took the message but the sink rejected it.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Cloneable handle used by request handlers to pass messages to the writer.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Event>,
    shutdown: Shutdown,
}

impl WriterHandle {
    pub(crate) fn new(tx: mpsc::Sender<Event>, shutdown: Shutdown) -> Self {
        Self { tx, shutdown }
    }

    /// Hand `message` to the writer, waiting until it has been accepted.
    ///
    /// Never blocks past shutdown: once the shutdown signal fires, pending
    /// and new submissions fail with [`HandoffError::Unavailable`].
    pub async fn submit(&self, message: Message) -> Result<(), HandoffError> {
        let (ack, accepted) = oneshot::channel();
        let envelope = Envelope { message, ack };

        tokio::select! {
            biased;
            _ = self.shutdown.triggered() => return Err(HandoffError::Unavailable),
            sent = self.tx.send(Event::Message(envelope)) => sent.map_err(|_| HandoffError::Unavailable)?,
        }

        // The writer drops unanswered envelopes when it exits, so this
        // resolves even if shutdown wins the race from here on.
        match accepted.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HandoffError::WriteFailed(e)),
            Err(_) => Err(HandoffError::Unavailable),
        }
    }
}
