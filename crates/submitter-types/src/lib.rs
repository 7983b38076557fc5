//! Common types for the transaction submitter supervisor.
//!
//! This crate holds the data model shared by the configuration resolver,
//! the bridge adapters, the worker boundary and the supervisor itself, so
//! that every crate agrees on the shape of a resolved worker configuration.

/// Chain identity types and helpers.
pub mod chain;
/// Incentive-address lookup seam and adapter errors.
pub mod incentives;
/// Name-to-factory registration for pluggable implementations.
pub mod registry;
/// Secret string type for signing credentials.
pub mod secret_string;
/// Global submitter parameters and gas-limit buffers.
pub mod submitter;
/// Serde helpers shared by config and wire types.
pub mod utils;
/// The resolved per-chain worker configuration and logger settings.
pub mod worker;

pub use alloy_primitives::Address;
pub use chain::{deserialize_chain_keyed, ChainId};
pub use incentives::{AdapterError, IncentivesAddressSource};
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use submitter::{GasLimitBuffer, GlobalSubmitterConfig, DEFAULT_GAS_LIMIT_BUFFER_KEY};
pub use worker::{LogFormat, LoggerConfig, ResolvedWorkerConfig};
