//! Bridge adapter module for the transaction submitter.
//!
//! A bridge adapter knows where its incentives contract is deployed on each
//! chain. The submitter does not talk to the contracts itself; it only needs
//! the address per (adapter, chain) pair so that it can hand it to the
//! chain's worker. Adapters are registered in configuration order, and that
//! order is preserved all the way into the worker payload.

use std::collections::HashMap;
use submitter_config::AdapterConfig;
use submitter_types::{
	Address, AdapterError, ChainId, ImplementationRegistry, IncentivesAddressSource,
};

/// Re-export implementations
pub mod implementations {
	pub mod table;
}

/// Trait defining the interface for bridge adapters.
///
/// This trait must be implemented by any adapter that wants to supply
/// incentives contracts to the submitter.
pub trait BridgeAdapter: Send + Sync {
	/// Name of the adapter, used as key in the resolved incentives map.
	fn name(&self) -> &str;

	/// Returns the incentives contract of this adapter on the given chain.
	///
	/// Fails with [`AdapterError::NotDeployed`] when the adapter does not
	/// operate on that chain.
	fn get_incentives_address(&self, chain_id: ChainId) -> Result<Address, AdapterError>;
}

/// Type alias for adapter factory functions.
///
/// This is the function signature that all adapter implementations must provide
/// to create instances of their adapter from an `[[adapters]]` entry.
pub type AdapterFactory = fn(&AdapterConfig) -> Result<Box<dyn BridgeAdapter>, AdapterError>;

/// Registry trait for adapter implementations.
pub trait AdapterRegistry: ImplementationRegistry<Factory = AdapterFactory> {}

/// Get all registered adapter implementations.
///
/// Returns a vector of (kind, factory) tuples for all available adapter implementations.
/// This is used by the factory registry to automatically register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AdapterFactory)> {
	use implementations::table;

	vec![(table::Registry::NAME, table::Registry::factory())]
}

/// Ordered collection of bridge adapters.
///
/// Serves as the [`IncentivesAddressSource`] of the configuration resolver.
pub struct AdapterService {
	/// Adapters in registration order.
	adapters: Vec<Box<dyn BridgeAdapter>>,
}

impl AdapterService {
	/// Creates a new AdapterService. The order of `adapters` is the
	/// registration order.
	pub fn new(adapters: Vec<Box<dyn BridgeAdapter>>) -> Self {
		Self { adapters }
	}

	/// Builds one adapter per configuration entry, in order, using the
	/// factory registered for the entry's kind.
	pub fn from_configs(
		configs: &[AdapterConfig],
		factories: &HashMap<String, AdapterFactory>,
	) -> Result<Self, AdapterError> {
		let mut adapters = Vec::with_capacity(configs.len());
		for config in configs {
			let factory = factories
				.get(&config.kind)
				.ok_or_else(|| AdapterError::UnknownKind(config.kind.clone()))?;
			let adapter = factory(config)?;
			tracing::info!(
				component = "adapters",
				adapter = %config.name,
				implementation = %config.kind,
				chains = config.incentives.len(),
				"Loaded"
			);
			adapters.push(adapter);
		}
		Ok(Self::new(adapters))
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

impl IncentivesAddressSource for AdapterService {
	fn adapter_names(&self) -> Vec<String> {
		self.adapters.iter().map(|a| a.name().to_string()).collect()
	}

	fn incentives_address(
		&self,
		adapter: &str,
		chain_id: ChainId,
	) -> Result<Address, AdapterError> {
		self.adapters
			.iter()
			.find(|a| a.name() == adapter)
			.ok_or_else(|| AdapterError::UnknownAdapter(adapter.to_string()))?
			.get_incentives_address(chain_id)
	}
}
