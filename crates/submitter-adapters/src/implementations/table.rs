//! Configuration-backed bridge adapter.
//!
//! Reads the incentives contract of each chain straight from the
//! `[adapters.incentives]` table. Addresses are parsed once when the adapter
//! is built, so a typo surfaces at startup rather than when a chain resolves.

use crate::{AdapterFactory, AdapterRegistry, BridgeAdapter};
use std::collections::HashMap;
use std::str::FromStr;
use submitter_config::AdapterConfig;
use submitter_types::{Address, AdapterError, ChainId, ImplementationRegistry};

/// Adapter with a fixed address table.
#[derive(Debug, Clone)]
pub struct TableAdapter {
	name: String,
	deployments: HashMap<ChainId, Address>,
}

impl TableAdapter {
	pub fn new(name: impl Into<String>, deployments: HashMap<ChainId, Address>) -> Self {
		Self {
			name: name.into(),
			deployments,
		}
	}
}

impl BridgeAdapter for TableAdapter {
	fn name(&self) -> &str {
		&self.name
	}

	fn get_incentives_address(&self, chain_id: ChainId) -> Result<Address, AdapterError> {
		self.deployments
			.get(&chain_id)
			.copied()
			.ok_or_else(|| AdapterError::NotDeployed {
				adapter: self.name.clone(),
				chain_id,
			})
	}
}

/// Factory function to create a table adapter from configuration.
///
/// Configuration parameters:
/// - `incentives`: chain id to contract address, hex encoded
pub fn create_adapter(config: &AdapterConfig) -> Result<Box<dyn BridgeAdapter>, AdapterError> {
	let mut deployments = HashMap::with_capacity(config.incentives.len());
	for (chain_id, raw) in &config.incentives {
		let address = Address::from_str(raw.trim()).map_err(|e| {
			AdapterError::InvalidAddress(format!(
				"adapter '{}' on chain {}: '{}' ({})",
				config.name, chain_id, raw, e
			))
		})?;
		deployments.insert(*chain_id, address);
	}

	Ok(Box::new(TableAdapter::new(config.name.clone(), deployments)))
}

/// Registry for the table adapter implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = AdapterFactory;

	fn factory() -> Self::Factory {
		create_adapter
	}
}

impl AdapterRegistry for Registry {}
