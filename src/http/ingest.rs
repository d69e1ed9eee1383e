//! `POST /log`: accept one JSON document and queue it for the log file.

use axum::body::{self, Body};
use axum::extract::State;
use axum::http::StatusCode;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::writer::{HandoffError, Message};

/// Why an ingest request failed.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read request body: {0}")]
    Read(#[source] axum::Error),
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            IngestError::Read(_) | IngestError::Handoff(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Handler for `POST /log`. Responds with a bare status code.
pub async fn ingest(State(state): State<AppState>, body: Body) -> StatusCode {
    let status = match accept(&state, body).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::warn!(error = %e, "Rejected log message");
            } else {
                tracing::debug!(error = %e, "Rejected log message");
            }
            status
        }
    };
    metrics::record_request(status.as_u16());
    status
}

async fn accept(state: &AppState, body: Body) -> Result<(), IngestError> {
    let bytes = body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(IngestError::Read)?;
    let message = Message::compact(&bytes).map_err(IngestError::InvalidJson)?;
    state.writer.submit(message).await?;
    Ok(())
}
