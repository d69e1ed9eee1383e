//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Register signals → Bind listener → Start writer + HTTP server → Service
//!         → Attach signal observers
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Shutdown::trigger
//!         → HTTP server stops accepting, drains (bounded)
//!         → Writer closes the sink
//!     Service::wait returns once both have stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Rotate the log file
//! ```
//!
//! # Design Decisions
//! - One shutdown handle, passed explicitly; no global state
//! - Shutdown has timeout: a listener that cannot drain is fatal

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, start_with_sink, LifecycleError, Service};
