//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, queue capacity >= 1)
//! - Check that addresses parse before anything binds them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}': not a socket address")]
    InvalidAddress { field: &'static str, value: String },
    #[error("sink path must name a file")]
    InvalidSinkPath,
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Check an already-deserialized configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "observability.metrics_address",
                value: addr.clone(),
            });
        }
    }

    if config.sink.path.file_name().is_none() {
        errors.push(ValidationError::InvalidSinkPath);
    }
    if config.sink.max_size_mb == 0 {
        errors.push(ValidationError::Zero { field: "sink.max_size_mb" });
    }
    if config.listener.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.shutdown_timeout_secs" });
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_body_bytes" });
    }
    if config.writer.queue_capacity == 0 {
        errors.push(ValidationError::Zero { field: "writer.queue_capacity" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
