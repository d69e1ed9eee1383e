//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the logger.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the alert logger.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Rotating file sink settings.
    pub sink: SinkConfig,

    /// Writer loop settings.
    pub writer: WriterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// How long in-flight requests get to finish once shutdown starts.
    pub shutdown_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            shutdown_timeout_secs: 5,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Rotating file sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Path of the active log file.
    pub path: PathBuf,

    /// Number of rotated files to retain.
    pub max_backups: usize,

    /// Size in megabytes after which the active file is rotated.
    pub max_size_mb: u64,
}

impl SinkConfig {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logs/alerts.log"),
            max_backups: 3,
            max_size_mb: 100,
        }
    }
}

/// What the writer does with a failed sink write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Acknowledge on accept; write failures are logged and dropped.
    #[default]
    BestEffort,
    /// Acknowledge after the write; failures are reported to the request.
    Acknowledge,
}

/// Writer loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Depth of the writer's event queue. Messages and rotation requests
    /// share it; a rotation request waits when it is full.
    pub queue_capacity: usize,

    /// Handling of sink write failures.
    pub failure_policy: FailurePolicy,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            failure_policy: FailurePolicy::BestEffort,
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Diagnostic log format.
    pub log_format: LogFormat,

    /// Prometheus exporter bind address. Metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_address: None,
        }
    }
}
