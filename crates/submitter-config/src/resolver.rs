//! Configuration resolver.
//!
//! Turns the raw `[submitter]` section and each `[[chains]]` entry into one
//! fully populated [`ResolvedWorkerConfig`] per chain. Scalars follow
//! `chain ?? global`; the gas-limit buffer is merged key by key on top of the
//! global map; the gas strategy knobs are taken from the chain only.

use crate::{ChainConfig, SubmitterSection};
use indexmap::IndexMap;
use std::time::Duration;
use submitter_types::submitter::{
	DEFAULT_ENABLED, DEFAULT_MAX_PENDING_TRANSACTIONS, DEFAULT_MAX_TRIES,
	DEFAULT_NEW_ORDERS_DELAY, DEFAULT_PROCESSING_INTERVAL, DEFAULT_RETRY_INTERVAL,
	DEFAULT_TRANSACTION_TIMEOUT,
};
use submitter_types::{
	AdapterError, ChainId, GasLimitBuffer, GlobalSubmitterConfig, IncentivesAddressSource,
	LoggerConfig, ResolvedWorkerConfig,
};
use thiserror::Error;

/// A chain's incentives address could not be resolved.
#[derive(Debug, Error)]
#[error("Failed to resolve incentives address of adapter '{adapter}' on chain {chain_id}: {source}")]
pub struct ResolveError {
	pub chain_id: ChainId,
	pub adapter: String,
	pub source: AdapterError,
}

/// Resolves the process-wide defaults. Total over any input: every missing
/// field falls back to its documented default.
pub fn resolve_global_config(raw: &SubmitterSection) -> GlobalSubmitterConfig {
	let gas_limit_buffer = raw
		.gas_limit_buffer
		.clone()
		.map(GasLimitBuffer::new)
		.unwrap_or_default()
		.with_default();

	GlobalSubmitterConfig {
		enabled: raw.enabled.unwrap_or(DEFAULT_ENABLED),
		new_orders_delay: millis_or(raw.new_orders_delay_ms, DEFAULT_NEW_ORDERS_DELAY),
		retry_interval: millis_or(raw.retry_interval_ms, DEFAULT_RETRY_INTERVAL),
		processing_interval: millis_or(raw.processing_interval_ms, DEFAULT_PROCESSING_INTERVAL),
		max_tries: raw.max_tries.unwrap_or(DEFAULT_MAX_TRIES),
		max_pending_transactions: raw
			.max_pending_transactions
			.unwrap_or(DEFAULT_MAX_PENDING_TRANSACTIONS),
		transaction_timeout: millis_or(raw.transaction_timeout_ms, DEFAULT_TRANSACTION_TIMEOUT),
		gas_limit_buffer,
	}
}

/// Resolves one chain's worker configuration.
///
/// The address source is asked once per registered adapter. A lookup failure
/// aborts this chain only; the caller decides whether to carry on with the
/// remaining chains.
pub fn resolve_worker_config(
	chain: &ChainConfig,
	global: &GlobalSubmitterConfig,
	incentives: &dyn IncentivesAddressSource,
	logger: &LoggerConfig,
) -> Result<ResolvedWorkerConfig, ResolveError> {
	let overrides = &chain.submitter;

	let mut incentives_addresses = IndexMap::new();
	for adapter in incentives.adapter_names() {
		let address = incentives
			.incentives_address(&adapter, chain.chain_id)
			.map_err(|source| ResolveError {
				chain_id: chain.chain_id,
				adapter: adapter.clone(),
				source,
			})?;
		incentives_addresses.insert(adapter, address);
	}

	let gas_limit_buffer = match &overrides.gas_limit_buffer {
		Some(chain_buffer) => global.gas_limit_buffer.merged_with(chain_buffer),
		None => global.gas_limit_buffer.clone(),
	};

	Ok(ResolvedWorkerConfig {
		chain_id: chain.chain_id,
		rpc: chain.rpc.clone(),
		relayer_private_key: chain.relayer_private_key.clone(),
		incentives_addresses,
		new_orders_delay: millis_or(overrides.new_orders_delay_ms, global.new_orders_delay),
		retry_interval: millis_or(overrides.retry_interval_ms, global.retry_interval),
		processing_interval: millis_or(overrides.processing_interval_ms, global.processing_interval),
		max_tries: overrides.max_tries.unwrap_or(global.max_tries),
		max_pending_transactions: overrides
			.max_pending_transactions
			.unwrap_or(global.max_pending_transactions),
		transaction_timeout: millis_or(overrides.transaction_timeout_ms, global.transaction_timeout),
		gas_limit_buffer,
		max_fee_per_gas: overrides.max_fee_per_gas,
		max_priority_fee_adjustment_factor: overrides.max_priority_fee_adjustment_factor,
		max_allowed_priority_fee_per_gas: overrides.max_allowed_priority_fee_per_gas,
		gas_price_adjustment_factor: overrides.gas_price_adjustment_factor,
		max_allowed_gas_price: overrides.max_allowed_gas_price,
		logger: logger.clone(),
	})
}

fn millis_or(value: Option<u64>, fallback: Duration) -> Duration {
	value.map(Duration::from_millis).unwrap_or(fallback)
}
