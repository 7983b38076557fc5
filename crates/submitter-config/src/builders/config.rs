//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for supervisor tests.

use crate::{
	AdapterConfig, ChainConfig, ChainSubmitterOverride, Config, IsolationMode, SubmitterSection,
	WorkerSection,
};
use std::collections::HashMap;
use submitter_types::{ChainId, LoggerConfig, SecretString};

/// Builder for creating `Config` instances with a fluent API.
///
/// Starts from an empty relayer: no chains, no adapters, submitter enabled,
/// in-process workers running the standby pipeline.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
	logging: LoggerConfig,
	submitter: SubmitterSection,
	worker: WorkerSection,
	chains: Vec<ChainConfig>,
	adapters: Vec<AdapterConfig>,
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with default values suitable for testing.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the global kill-switch.
	pub fn enabled(mut self, enabled: bool) -> Self {
		self.submitter.enabled = Some(enabled);
		self
	}

	/// Sets the worker isolation mode.
	pub fn isolation(mut self, isolation: IsolationMode) -> Self {
		self.worker.isolation = isolation;
		self
	}

	/// Sets the submission pipeline implementation.
	pub fn pipeline(mut self, pipeline: impl Into<String>) -> Self {
		self.worker.pipeline = pipeline.into();
		self
	}

	/// Adds a chain with a local RPC endpoint and no overrides.
	pub fn chain(self, chain_id: ChainId) -> Self {
		self.chain_with(chain_id, ChainSubmitterOverride::default())
	}

	/// Adds a chain with the given submitter override.
	pub fn chain_with(mut self, chain_id: ChainId, submitter: ChainSubmitterOverride) -> Self {
		self.chains.push(ChainConfig {
			chain_id,
			rpc: format!("http://localhost:{}", 8545 + chain_id),
			relayer_private_key: SecretString::from(
				"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
			),
			submitter,
		});
		self
	}

	/// Adds a static adapter deployed at the given address on each chain.
	pub fn adapter(mut self, name: impl Into<String>, deployments: &[(ChainId, &str)]) -> Self {
		let incentives: HashMap<ChainId, String> = deployments
			.iter()
			.map(|(chain_id, address)| (*chain_id, address.to_string()))
			.collect();
		self.adapters.push(AdapterConfig {
			name: name.into(),
			kind: "static".to_string(),
			incentives,
		});
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			logging: self.logging,
			submitter: self.submitter,
			worker: self.worker,
			chains: self.chains,
			adapters: self.adapters,
		}
	}
}
