//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful drain with deadline)
//!     → request.rs (request ID, trace span)
//!     → ingest.rs (read body, compact JSON, hand off to writer)
//!     → status code only, empty body
//! ```

pub mod ingest;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
