//! Tracing subscriber setup.
//!
//! The supervisor and every child-process worker install the same kind of
//! subscriber, built from a [`LoggerConfig`]. `RUST_LOG` takes precedence over
//! the configured level.

use submitter_types::{LogFormat, LoggerConfig};
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
	#[error("Invalid log filter '{directive}': {reason}")]
	Filter { directive: String, reason: String },
	#[error("Failed to install log subscriber: {0}")]
	Init(String),
}

/// Applies the command-line level, if any, on top of the configured logger.
pub fn effective_logger(configured: LoggerConfig, cli_level: Option<&str>) -> LoggerConfig {
	match cli_level {
		Some(level) => LoggerConfig {
			level: level.to_string(),
			..configured
		},
		None => configured,
	}
}

/// Installs the global subscriber.
pub fn init(config: &LoggerConfig) -> Result<(), LoggingError> {
	let env_filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter {
			directive: config.level.clone(),
			reason: e.to_string(),
		})?,
	};

	let builder = fmt().with_env_filter(env_filter).with_target(true);
	let result = match config.format {
		LogFormat::Pretty => builder.pretty().try_init(),
		LogFormat::Compact => builder.compact().try_init(),
		LogFormat::Json => builder.json().try_init(),
	};
	result.map_err(|e| LoggingError::Init(e.to_string()))
}
