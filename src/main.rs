//! Alert Logger
//!
//! Accepts JSON alerts over HTTP and appends each one, compacted to a single
//! line, to a rotating log file.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /log
//!     ─────────────▶ ┌──────────┐   hand-off   ┌──────────┐        ┌───────────────┐
//!                    │  http    │─────────────▶│  writer  │───────▶│ rotating file │
//!     ◀───────────── │  ingest  │◀── accepted ─│   loop   │        │     sink      │
//!     200/400/500    └──────────┘              └──────────┘        └───────────────┘
//!                         ▲                       ▲    ▲
//!                         │ drain                 │    │ rotate
//!                    ┌────┴───────────────────────┴┐   │
//!     SIGTERM/SIGINT │         lifecycle           │ SIGHUP
//!     ──────────────▶│  shutdown + completion wait │───┘
//!                    └─────────────────────────────┘
//! ```

use clap::Parser;

use alert_logger::config::Cli;
use alert_logger::lifecycle::{self, signals, Shutdown};
use alert_logger::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().resolve()?;

    observability::logging::init(&config.observability);

    tracing::info!("alert-logger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        output = %config.sink.path.display(),
        max_backups = config.sink.max_backups,
        failure_policy = ?config.writer.failure_policy,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        observability::metrics::init_metrics(addr.parse()?)?;
    }

    let signals = signals::register().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to install signal handlers");
    })?;

    let shutdown = Shutdown::new();
    let service = lifecycle::start(&config, shutdown.clone()).await?;
    signals.spawn(shutdown, service.rotation());

    tracing::info!(address = %service.local_addr(), "Accepting alerts on POST /log");

    let report = service.wait().await.inspect_err(|e| {
        tracing::error!(error = %e, "Service stopped abnormally");
    })?;

    tracing::info!(
        written = report.written,
        write_failures = report.write_failures,
        rotations = report.rotations,
        "Shutdown complete"
    );
    Ok(())
}
