//! Chain identity types.
//!
//! TOML tables cannot be keyed by integers, so chain-keyed maps arrive with
//! string keys and are converted here.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Numeric identifier of a blockchain network.
pub type ChainId = u64;

/// Deserializes a table keyed by chain id strings into a map keyed by [`ChainId`].
///
/// # Errors
///
/// Returns a deserialization error if a key cannot be parsed as a u64.
pub fn deserialize_chain_keyed<'de, D, V>(deserializer: D) -> Result<HashMap<ChainId, V>, D::Error>
where
	D: Deserializer<'de>,
	V: Deserialize<'de>,
{
	let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::with_capacity(string_map.len());

	for (key, value) in string_map {
		let chain_id = key
			.parse::<ChainId>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}

	Ok(result)
}
