//! Metrics collection and exposition.
//!
//! # Metrics
//! - `alert_logger_requests_total` (counter): ingest requests by status
//! - `alert_logger_messages_written_total` (counter): records appended
//! - `alert_logger_write_failures_total` (counter): records the sink rejected
//! - `alert_logger_rotations_total` (counter): rotations by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter, serving scrapes on `addr`.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(status: u16) {
    counter!("alert_logger_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_write(ok: bool) {
    if ok {
        counter!("alert_logger_messages_written_total").increment(1);
    } else {
        counter!("alert_logger_write_failures_total").increment(1);
    }
}

pub fn record_rotation(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("alert_logger_rotations_total", "result" => result).increment(1);
}
