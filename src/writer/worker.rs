//! The single consumer that owns the sink.

use tokio::sync::mpsc;

use crate::config::FailurePolicy;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::sink::Sink;
use crate::writer::handoff::Envelope;
use crate::writer::Event;

/// Counters returned when the writer stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterReport {
    pub written: u64,
    pub write_failures: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
}

/// Serializes every write, rotation and the final close onto one task.
pub struct WriterLoop<S> {
    sink: S,
    events: mpsc::Receiver<Event>,
    shutdown: Shutdown,
    policy: FailurePolicy,
    report: WriterReport,
}

impl<S: Sink> WriterLoop<S> {
    pub(crate) fn new(
        sink: S,
        events: mpsc::Receiver<Event>,
        shutdown: Shutdown,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            sink,
            events,
            shutdown,
            policy,
            report: WriterReport::default(),
        }
    }

    /// Process events until shutdown, then close the sink.
    ///
    /// Messages and rotations are handled in the order they were queued.
    /// Shutdown is checked before every event and is the only way out; a
    /// queue with no senders left just goes quiet.
    pub async fn run(mut self) -> WriterReport {
        tracing::info!(policy = ?self.policy, "Writer started");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                Some(event) = self.events.recv() => match event {
                    Event::Message(envelope) => self.on_message(envelope),
                    Event::Rotate => self.on_rotate(),
                },
            }
        }

        tracing::debug!("Writer draining");
        // Envelopes still queued are dropped with the receiver; their
        // handlers see the writer as unavailable.
        self.events.close();
        if let Err(e) = self.sink.close() {
            tracing::error!(error = %e, "Failed to close log file");
        }

        tracing::info!(
            written = self.report.written,
            write_failures = self.report.write_failures,
            rotations = self.report.rotations,
            "Writer stopped"
        );
        self.report
    }

    fn on_message(&mut self, envelope: Envelope) {
        let Envelope { message, ack } = envelope;

        match self.policy {
            FailurePolicy::BestEffort => {
                // Accepted: the handler may respond before the bytes land.
                let _ = ack.send(Ok(()));
                let _ = self.write(message.as_bytes());
            }
            FailurePolicy::Acknowledge => {
                let result = self.write(message.as_bytes());
                let _ = ack.send(result);
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self.sink.write(bytes) {
            Ok(()) => {
                self.report.written += 1;
                metrics::record_write(true);
                Ok(())
            }
            Err(e) => {
                self.report.write_failures += 1;
                metrics::record_write(false);
                tracing::warn!(error = %e, bytes = bytes.len(), "Failed to write message");
                Err(e)
            }
        }
    }

    fn on_rotate(&mut self) {
        match self.sink.rotate() {
            Ok(()) => {
                self.report.rotations += 1;
                metrics::record_rotation(true);
                tracing::info!("Log file rotated");
            }
            Err(e) => {
                self.report.rotation_failures += 1;
                metrics::record_rotation(false);
                tracing::warn!(error = %e, "Failed to rotate log file");
            }
        }
    }
}
