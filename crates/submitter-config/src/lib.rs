//! Configuration module for the transaction submitter supervisor.
//!
//! This module provides the raw configuration tree as it appears in TOML,
//! the loader that assembles it from one or more files, and the resolver
//! that turns it into one immutable parameter set per chain.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["chains.toml", "adapters.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)
//!
//! ## Environment Variables
//!
//! `${VAR}` and `${VAR:-default}` are substituted before parsing, which is the
//! intended way to supply `relayer_private_key`.

mod loader;
pub mod resolver;

#[cfg(any(test, feature = "testing"))]
pub mod builders {
	pub mod config;
}

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use submitter_types::{deserialize_chain_keyed, ChainId, LoggerConfig, SecretString};
use thiserror::Error;

pub use resolver::{resolve_global_config, resolve_worker_config, ResolveError};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only, the error's Display dumps the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Relayer-wide configuration consumed by the submitter supervisor.
///
/// Every section is optional. Missing submitter parameters are filled in by
/// [`resolve_global_config`], never rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Log level and format, propagated into every worker.
	#[serde(default)]
	pub logging: LoggerConfig,
	/// Process-wide submitter defaults.
	#[serde(default)]
	pub submitter: SubmitterSection,
	/// How workers are isolated and which pipeline they run.
	#[serde(default)]
	pub worker: WorkerSection,
	/// Chains to submit on, in configuration order.
	#[serde(default)]
	pub chains: Vec<ChainConfig>,
	/// Bridge adapters supplying incentives contracts, in registration order.
	#[serde(default)]
	pub adapters: Vec<AdapterConfig>,
}

/// The `[submitter]` section. All fields are optional; unknown keys are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitterSection {
	/// Global kill-switch. Accepts booleans and falsy-equivalents (`0`, `""`, `"false"`).
	#[serde(default, deserialize_with = "deserialize_flag")]
	pub enabled: Option<bool>,
	pub new_orders_delay_ms: Option<u64>,
	pub retry_interval_ms: Option<u64>,
	pub processing_interval_ms: Option<u64>,
	pub max_tries: Option<u32>,
	pub max_pending_transactions: Option<u32>,
	pub transaction_timeout_ms: Option<u64>,
	pub gas_limit_buffer: Option<BTreeMap<String, u64>>,
}

/// The `[chains.submitter]` override. Absent fields inherit the global value,
/// except the gas strategy knobs which have no global counterpart. Unknown
/// keys are rejected so that a typo cannot silently fall back to the global
/// value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainSubmitterOverride {
	pub new_orders_delay_ms: Option<u64>,
	pub retry_interval_ms: Option<u64>,
	pub processing_interval_ms: Option<u64>,
	pub max_tries: Option<u32>,
	pub max_pending_transactions: Option<u32>,
	pub transaction_timeout_ms: Option<u64>,
	pub gas_limit_buffer: Option<BTreeMap<String, u64>>,
	#[serde(default, deserialize_with = "deserialize_wei")]
	pub max_fee_per_gas: Option<u128>,
	pub max_priority_fee_adjustment_factor: Option<f64>,
	#[serde(default, deserialize_with = "deserialize_wei")]
	pub max_allowed_priority_fee_per_gas: Option<u128>,
	pub gas_price_adjustment_factor: Option<f64>,
	#[serde(default, deserialize_with = "deserialize_wei")]
	pub max_allowed_gas_price: Option<u128>,
}

/// One `[[chains]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	pub chain_id: ChainId,
	/// RPC endpoint of the chain.
	pub rpc: String,
	/// Signing credential of the relayer on this chain.
	pub relayer_private_key: SecretString,
	#[serde(default)]
	pub submitter: ChainSubmitterOverride,
}

/// How each worker is isolated from the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
	/// In-process tokio task, fed a serialized copy of its configuration.
	#[default]
	Task,
	/// Child OS process running the `worker` subcommand of this binary.
	Process,
}

/// The `[worker]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkerSection {
	#[serde(default)]
	pub isolation: IsolationMode,
	/// Name of the submission pipeline implementation.
	#[serde(default = "default_pipeline")]
	pub pipeline: String,
}

impl Default for WorkerSection {
	fn default() -> Self {
		Self {
			isolation: IsolationMode::default(),
			pipeline: default_pipeline(),
		}
	}
}

fn default_pipeline() -> String {
	"standby".to_string()
}

/// One `[[adapters]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdapterConfig {
	/// Adapter name, used as key in the resolved incentives map.
	pub name: String,
	/// Adapter implementation. Defaults to `static`.
	#[serde(default = "default_adapter_kind")]
	pub kind: String,
	/// Incentives contract address per chain id.
	#[serde(default, deserialize_with = "deserialize_chain_keyed")]
	pub incentives: HashMap<ChainId, String>,
}

fn default_adapter_kind() -> String {
	"static".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
}

/// Deserializes an optional on/off flag. Zero in any numeric form, `""`,
/// `"0"`, `"false"`, `"no"` and `"off"` are false.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
	D: Deserializer<'de>,
{
	let flag = Option::<Flag>::deserialize(deserializer).map_err(|_| {
		serde::de::Error::custom(
			"invalid value for `enabled`: expected a boolean, a number or a string \
			(false, 0, 0.0, \"\", \"0\", \"false\", \"no\" and \"off\" disable the submitter)",
		)
	})?;
	Ok(flag.map(|flag| match flag {
		Flag::Bool(value) => value,
		Flag::Integer(value) => value != 0,
		Flag::Float(value) => value != 0.0 && !value.is_nan(),
		Flag::Text(value) => {
			let value = value.trim().to_ascii_lowercase();
			let numeric_zero = value.parse::<f64>().is_ok_and(|number| number == 0.0);
			!(numeric_zero || matches!(value.as_str(), "" | "false" | "no" | "off"))
		},
	}))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Wei {
	Integer(u64),
	Text(String),
}

/// Deserializes an optional wei amount given either as an integer or, for
/// values beyond the TOML integer range, as a decimal string.
fn deserialize_wei<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Wei>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Wei::Integer(value)) => Ok(Some(u128::from(value))),
		Some(Wei::Text(value)) => value
			.trim()
			.parse::<u128>()
			.map(Some)
			.map_err(|e| serde::de::Error::custom(format!("Invalid wei amount '{}': {}", value, e))),
	}
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(name.as_str()) {
			Ok(value) => value,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last..whole.start()]);
		result.push_str(&value);
		last = whole.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		loader::ConfigLoader::new(base_dir).load(file_name).await
	}

	/// Validates the configuration.
	///
	/// Submitter parameters are never validated here: any missing value
	/// resolves to its default. Only structural problems that would make a
	/// chain or adapter ambiguous are rejected.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut chain_ids = HashSet::new();
		for chain in &self.chains {
			if chain.chain_id == 0 {
				return Err(ConfigError::Validation("chain_id cannot be 0".into()));
			}
			if !chain_ids.insert(chain.chain_id) {
				return Err(ConfigError::Validation(format!(
					"Chain {} is configured more than once",
					chain.chain_id
				)));
			}
			if chain.rpc.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Chain {} must have an rpc endpoint",
					chain.chain_id
				)));
			}
			if chain.relayer_private_key.is_blank() {
				return Err(ConfigError::Validation(format!(
					"Chain {} must have a relayer_private_key",
					chain.chain_id
				)));
			}
		}

		let mut adapter_names = HashSet::new();
		for adapter in &self.adapters {
			if adapter.name.trim().is_empty() {
				return Err(ConfigError::Validation(
					"Adapter name cannot be empty".into(),
				));
			}
			if !adapter_names.insert(adapter.name.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Adapter '{}' is configured more than once",
					adapter.name
				)));
			}
		}

		if self.worker.pipeline.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Worker pipeline cannot be empty".into(),
			));
		}

		Ok(())
	}

	/// Parses and validates an already interpolated TOML table.
	pub(crate) fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
		let config: Config = toml::Value::Table(table).try_into()?;
		config.validate()?;
		Ok(config)
	}
}

/// Parses a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
