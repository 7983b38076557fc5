//! Incentive-contract address lookup.
//!
//! Bridge adapters know where their incentives contract lives on each chain.
//! The configuration resolver only needs the ordered set of adapter names and
//! a per-(adapter, chain) lookup, which is what [`IncentivesAddressSource`] exposes.

use crate::{Address, ChainId};
use thiserror::Error;

/// Errors that can occur while looking up or building bridge adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
	/// The adapter has no incentives contract deployed on the requested chain.
	#[error("Adapter '{adapter}' has no incentives contract on chain {chain_id}")]
	NotDeployed { adapter: String, chain_id: ChainId },
	/// No adapter with the given name is registered.
	#[error("Unknown adapter: {0}")]
	UnknownAdapter(String),
	/// An address in the adapter configuration could not be parsed.
	#[error("Invalid address: {0}")]
	InvalidAddress(String),
	/// The adapter kind named in configuration has no factory.
	#[error("Unknown adapter kind: {0}")]
	UnknownKind(String),
}

/// Source of incentive-contract addresses per (adapter, chain) pair.
pub trait IncentivesAddressSource: Send + Sync {
	/// Names of all registered adapters, in registration order.
	fn adapter_names(&self) -> Vec<String>;

	/// Looks up the incentives contract of `adapter` on `chain_id`.
	fn incentives_address(&self, adapter: &str, chain_id: ChainId)
		-> Result<Address, AdapterError>;
}
