//! (De)serializes a [`Duration`] as an integer number of milliseconds.
//!
//! Use with `#[serde(with = "submitter_types::utils::duration_ms")]`.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let millis = u64::try_from(duration.as_millis()).map_err(serde::ser::Error::custom)?;
	serializer.serialize_u64(millis)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	let millis = u64::deserialize(deserializer)?;
	Ok(Duration::from_millis(millis))
}
