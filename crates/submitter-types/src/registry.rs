//! Registry trait for self-registering implementations.
//!
//! Bridge adapters and submission pipelines are picked by name from
//! configuration. Every implementation module provides a `Registry` struct
//! implementing [`ImplementationRegistry`] so that its configuration name and
//! factory function are declared in one place.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example `"static"` for `[[adapters]] kind = "static"` or
	/// `"standby"` for `[worker] pipeline = "standby"`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
