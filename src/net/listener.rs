//! TCP listener binding and listener failure modes.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    /// The serve loop failed outside of a graceful shutdown.
    #[error("Server failed: {0}")]
    Serve(#[source] std::io::Error),
    /// In-flight requests outlived the drain deadline.
    #[error("In-flight requests did not finish within {0:?} of shutdown")]
    ShutdownTimeout(Duration),
}

/// Bind a TCP listener to `address` (e.g. "0.0.0.0:8080").
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let bind_error = |source| ListenerError::Bind {
        address: address.to_string(),
        source,
    };

    let addr: SocketAddr = address
        .parse()
        .map_err(|e| bind_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn address_in_use_is_bind_error() {
        let first = bind("127.0.0.1:0").await.unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let err = bind(&taken).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { ref address, .. } if *address == taken));
    }

    #[tokio::test]
    async fn unparsable_address_is_bind_error() {
        let err = bind("not-an-address").await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
