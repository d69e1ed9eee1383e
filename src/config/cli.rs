//! Command line and environment overrides.
//!
//! Every flag is optional and only replaces the value it names; anything left
//! unset falls through to the config file and then to the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{AppConfig, FailurePolicy, LogFormat};
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "alert-logger")]
#[command(about = "Accepts JSON alerts over HTTP and appends them to a rotating log file", long_about = None)]
pub struct Cli {
    /// Optional TOML config file.
    #[arg(long, env = "ALERT_LOGGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the HTTP listener binds.
    #[arg(long, env = "LISTEN_ADDRESS")]
    pub listen_address: Option<String>,

    /// Path of the active log file.
    #[arg(long, env = "LOG_OUTPUT_PATH")]
    pub log_output_path: Option<PathBuf>,

    /// Rotated files to keep.
    #[arg(long, env = "LOG_MAX_BACKUPS")]
    pub max_backups: Option<usize>,

    /// Rotate once the active file reaches this many megabytes.
    #[arg(long, env = "LOG_MAX_SIZE_MB")]
    pub max_size_mb: Option<u64>,

    /// Seconds in-flight requests get to finish during shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: Option<u64>,

    /// Largest accepted request body.
    #[arg(long, env = "MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Depth of the writer event queue.
    #[arg(long, env = "WRITER_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    #[arg(long, value_enum, env = "WRITE_FAILURE_POLICY")]
    pub write_failure_policy: Option<FailurePolicy>,

    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, value_enum, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Prometheus exporter address.
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Build the final validated configuration.
    pub fn resolve(self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut AppConfig) {
        if let Some(v) = self.listen_address {
            config.listener.bind_address = v;
        }
        if let Some(v) = self.log_output_path {
            config.sink.path = v;
        }
        if let Some(v) = self.max_backups {
            config.sink.max_backups = v;
        }
        if let Some(v) = self.max_size_mb {
            config.sink.max_size_mb = v;
        }
        if let Some(v) = self.shutdown_timeout_secs {
            config.listener.shutdown_timeout_secs = v;
        }
        if let Some(v) = self.max_body_bytes {
            config.listener.max_body_bytes = v;
        }
        if let Some(v) = self.queue_capacity {
            config.writer.queue_capacity = v;
        }
        if let Some(v) = self.write_failure_policy {
            config.writer.failure_policy = v;
        }
        if let Some(v) = self.log_level {
            config.observability.log_level = v;
        }
        if let Some(v) = self.log_format {
            config.observability.log_format = v;
        }
        if self.metrics_address.is_some() {
            config.observability.metrics_address = self.metrics_address;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"127.0.0.1:9000\"\nshutdown_timeout_secs = 9"
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            listen_address: Some("127.0.0.1:9100".into()),
            write_failure_policy: Some(FailurePolicy::Acknowledge),
            ..Cli::default()
        };
        let config = cli.resolve().unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
        assert_eq!(config.listener.shutdown_timeout_secs, 9);
        assert_eq!(config.writer.failure_policy, FailurePolicy::Acknowledge);
    }

    #[test]
    fn parses_flag_values() {
        let cli = Cli::try_parse_from([
            "alert-logger",
            "--log-output-path",
            "/tmp/alerts.log",
            "--write-failure-policy",
            "acknowledge",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_output_path, Some(PathBuf::from("/tmp/alerts.log")));
        assert_eq!(cli.write_failure_policy, Some(FailurePolicy::Acknowledge));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let cli = Cli {
            shutdown_timeout_secs: Some(0),
            ..Cli::default()
        };
        assert!(matches!(cli.resolve(), Err(ConfigError::Validation(_))));
    }
}
