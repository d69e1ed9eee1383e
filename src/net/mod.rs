//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (parse, bind, report local address)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Binding happens before any task starts, so a bad address is a
//!   startup failure rather than a background error

pub mod listener;

pub use listener::{bind, ListenerError};
