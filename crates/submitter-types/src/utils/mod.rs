//! Serde helpers shared by configuration and wire types.

pub mod duration_ms;
