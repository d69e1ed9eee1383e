//! Durable destinations for accepted records.
//!
//! # Data Flow
//! ```text
//! Writer loop (sole owner)
//!     → Sink::write   (append one record)
//!     → Sink::rotate  (reload signal or size limit)
//!     → Sink::close   (shutdown)
//! ```
//!
//! # Design Decisions
//! - Sinks are synchronous and `&mut self`: exactly one task owns a sink, so
//!   no locking is needed
//! - The retention/naming scheme belongs to the sink, not to its caller

pub mod rotating;

use std::io;

pub use rotating::RotatingFile;

/// A rotation-capable byte destination.
pub trait Sink: Send + 'static {
    /// Append `buf` in full.
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Close the current destination and start a fresh one.
    fn rotate(&mut self) -> io::Result<()>;

    /// Flush and release the destination.
    fn close(&mut self) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write(buf)
    }

    fn rotate(&mut self) -> io::Result<()> {
        (**self).rotate()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
