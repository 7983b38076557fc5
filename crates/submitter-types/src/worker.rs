//! The resolved per-chain worker configuration.
//!
//! A [`ResolvedWorkerConfig`] is built once per chain at startup and handed to
//! exactly one worker. It crosses the supervisor/worker boundary as a JSON
//! payload with camelCase keys; field names and optionality are the wire
//! contract with the worker.

use crate::secret_string::serialize_exposed;
use crate::utils::duration_ms;
use crate::{Address, ChainId, GasLimitBuffer, SecretString};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Compact,
	Json,
}

/// Logger settings propagated from the supervisor into every worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
	/// Filter directive, e.g. `info` or `submitter_worker=debug`.
	#[serde(default = "default_log_level")]
	pub level: String,
	#[serde(default)]
	pub format: LogFormat,
}

fn default_log_level() -> String {
	"info".to_string()
}

impl Default for LoggerConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			format: LogFormat::default(),
		}
	}
}

/// Fully merged, immutable parameter set for one chain's worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWorkerConfig {
	pub chain_id: ChainId,
	pub rpc: String,
	#[serde(serialize_with = "serialize_exposed")]
	pub relayer_private_key: SecretString,
	/// Incentives contract per adapter name, in adapter registration order.
	pub incentives_addresses: IndexMap<String, Address>,
	#[serde(with = "duration_ms")]
	pub new_orders_delay: Duration,
	#[serde(with = "duration_ms")]
	pub retry_interval: Duration,
	#[serde(with = "duration_ms")]
	pub processing_interval: Duration,
	pub max_tries: u32,
	pub max_pending_transactions: u32,
	#[serde(with = "duration_ms")]
	pub transaction_timeout: Duration,
	pub gas_limit_buffer: GasLimitBuffer,
	// Chain-level gas strategy knobs. These have no global fallback.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<u128>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_adjustment_factor: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_allowed_priority_fee_per_gas: Option<u128>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price_adjustment_factor: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_allowed_gas_price: Option<u128>,
	pub logger: LoggerConfig,
}

impl ResolvedWorkerConfig {
	/// Serializes the configuration into the worker payload.
	pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec(self)
	}

	/// Rebuilds a configuration from a worker payload.
	pub fn from_payload(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(bytes)
	}
}
