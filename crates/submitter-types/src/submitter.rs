//! Process-wide submitter parameters.
//!
//! [`GlobalSubmitterConfig`] is resolved once at startup from the `[submitter]`
//! section and never changes afterwards. Every chain inherits from it unless
//! its own override sets a field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Key that is always present in a resolved gas-limit buffer.
pub const DEFAULT_GAS_LIMIT_BUFFER_KEY: &str = "default";

pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_NEW_ORDERS_DELAY: Duration = Duration::from_millis(0);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(2_000);
pub const DEFAULT_PROCESSING_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_TRIES: u32 = 3;
pub const DEFAULT_MAX_PENDING_TRANSACTIONS: u32 = 1_000;
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_millis(600_000);

/// Per-key safety margin added to estimated gas limits.
///
/// Keys are transaction kinds (e.g. `erc20`); `"default"` applies to any kind
/// without its own entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GasLimitBuffer(BTreeMap<String, u64>);

impl GasLimitBuffer {
	pub fn new(entries: BTreeMap<String, u64>) -> Self {
		Self(entries)
	}

	/// Inserts `"default" = 0` unless a default entry already exists.
	pub fn with_default(mut self) -> Self {
		self.0
			.entry(DEFAULT_GAS_LIMIT_BUFFER_KEY.to_string())
			.or_insert(0);
		self
	}

	/// Returns a copy of `self` with every entry of `overrides` written on top.
	///
	/// Keys only in `self` are kept, keys only in `overrides` are added and
	/// conflicting keys take the override value.
	pub fn merged_with(&self, overrides: &BTreeMap<String, u64>) -> Self {
		let mut merged = self.0.clone();
		for (key, value) in overrides {
			merged.insert(key.clone(), *value);
		}
		Self(merged)
	}

	pub fn get(&self, key: &str) -> Option<u64> {
		self.0.get(key).copied()
	}

	pub fn entries(&self) -> &BTreeMap<String, u64> {
		&self.0
	}
}

impl<K: Into<String>> FromIterator<(K, u64)> for GasLimitBuffer {
	fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

/// Process-wide submitter defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSubmitterConfig {
	/// Global kill-switch: when false no worker is started.
	pub enabled: bool,
	pub new_orders_delay: Duration,
	pub retry_interval: Duration,
	pub processing_interval: Duration,
	pub max_tries: u32,
	pub max_pending_transactions: u32,
	pub transaction_timeout: Duration,
	/// Always contains [`DEFAULT_GAS_LIMIT_BUFFER_KEY`].
	pub gas_limit_buffer: GasLimitBuffer,
}

impl Default for GlobalSubmitterConfig {
	fn default() -> Self {
		Self {
			enabled: DEFAULT_ENABLED,
			new_orders_delay: DEFAULT_NEW_ORDERS_DELAY,
			retry_interval: DEFAULT_RETRY_INTERVAL,
			processing_interval: DEFAULT_PROCESSING_INTERVAL,
			max_tries: DEFAULT_MAX_TRIES,
			max_pending_transactions: DEFAULT_MAX_PENDING_TRANSACTIONS,
			transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
			gas_limit_buffer: GasLimitBuffer::default().with_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_default_inserts_zero() {
		let buffer = GasLimitBuffer::default().with_default();
		assert_eq!(buffer.entries().len(), 1);
		assert_eq!(buffer.get("default"), Some(0));
	}

	#[test]
	fn test_with_default_keeps_existing_value() {
		let buffer: GasLimitBuffer = [("default", 7u64)].into_iter().collect();
		assert_eq!(buffer.with_default().get("default"), Some(7));
	}

	#[test]
	fn test_merge_overrides_keywise() {
		let global: GasLimitBuffer = [("default", 0u64), ("erc20", 5)].into_iter().collect();
		let overrides: BTreeMap<String, u64> =
			[("erc20".to_string(), 10u64), ("nft".to_string(), 3)].into();

		let merged = global.merged_with(&overrides);
		let expected: GasLimitBuffer = [("default", 0u64), ("erc20", 10), ("nft", 3)]
			.into_iter()
			.collect();
		assert_eq!(merged, expected);
		// merging the same overrides again changes nothing
		assert_eq!(merged.merged_with(&overrides), expected);
	}
}
