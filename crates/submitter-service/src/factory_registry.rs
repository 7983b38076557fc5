//! Dynamic factory registry for submitter implementations.
//!
//! This module provides a centralized registry for all factory functions,
//! allowing adapters and pipelines to be picked by name from configuration.

use std::collections::HashMap;
use std::sync::OnceLock;
use submitter_adapters::AdapterFactory;
use submitter_config::Config;
use submitter_core::{SubmitterSupervisor, SupervisorBuilder, SupervisorFactories};
use submitter_types::LoggerConfig;
use submitter_worker::PipelineFactory;

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub adapters: HashMap<String, AdapterFactory>,
	pub pipelines: HashMap<String, PipelineFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			adapters: HashMap::new(),
			pipelines: HashMap::new(),
		}
	}

	/// Register an adapter implementation
	pub fn register_adapter(&mut self, name: impl Into<String>, factory: AdapterFactory) {
		self.adapters.insert(name.into(), factory);
	}

	/// Register a pipeline implementation
	pub fn register_pipeline(&mut self, name: impl Into<String>, factory: PipelineFactory) {
		self.pipelines.insert(name.into(), factory);
	}

	/// Looks up a pipeline by name.
	pub fn pipeline(&self, name: &str) -> Result<PipelineFactory, String> {
		self.pipelines
			.get(name)
			.copied()
			.ok_or_else(|| unknown("pipeline", name, self.pipelines.keys()))
	}
}

// Global registry instance
static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Initialize the global registry with all available implementations
pub fn initialize_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		// Auto-register all adapter implementations
		for (name, factory) in submitter_adapters::get_all_implementations() {
			tracing::debug!("Registering adapter implementation: {}", name);
			registry.register_adapter(name, factory);
		}

		// Auto-register all pipeline implementations
		for (name, factory) in submitter_worker::get_all_implementations() {
			tracing::debug!("Registering pipeline implementation: {}", name);
			registry.register_pipeline(name, factory);
		}

		registry
	})
}

/// Get the global factory registry
pub fn get_registry() -> &'static FactoryRegistry {
	initialize_registry()
}

fn unknown<'a>(kind: &str, name: &str, available: impl Iterator<Item = &'a String>) -> String {
	let mut available: Vec<&str> = available.map(String::as_str).collect();
	available.sort_unstable();
	format!(
		"Unknown {} implementation '{}'. Available: [{}]",
		kind,
		name,
		available.join(", ")
	)
}

/// Selects the factories the configuration refers to, failing on any name
/// the registry does not know.
pub fn factories_for(
	registry: &FactoryRegistry,
	config: &Config,
) -> Result<SupervisorFactories, String> {
	let mut factories = SupervisorFactories::default();

	for adapter in &config.adapters {
		let factory = registry
			.adapters
			.get(&adapter.kind)
			.ok_or_else(|| unknown("adapter", &adapter.kind, registry.adapters.keys()))?;
		factories
			.adapter_factories
			.insert(adapter.kind.clone(), *factory);
	}

	let pipeline = &config.worker.pipeline;
	factories
		.pipeline_factories
		.insert(pipeline.clone(), registry.pipeline(pipeline)?);

	Ok(factories)
}

/// Build the supervisor using the registry and config
pub async fn build_supervisor_from_config(
	config: Config,
	logger: LoggerConfig,
) -> Result<SubmitterSupervisor, Box<dyn std::error::Error>> {
	let factories = factories_for(get_registry(), &config)?;
	let supervisor = SupervisorBuilder::new(config)
		.with_logger(logger)
		.build(&factories)
		.await?;
	Ok(supervisor)
}

#[cfg(test)]
mod tests {
	use super::*;
	use submitter_config::builders::config::ConfigBuilder;

	#[test]
	fn test_registry_contains_bundled_implementations() {
		let registry = get_registry();
		assert!(registry.adapters.contains_key("static"));
		assert!(registry.pipelines.contains_key("standby"));
		assert!(registry.pipeline("standby").is_ok());
	}

	#[test]
	fn test_factories_for_unknown_adapter_kind() {
		let mut config = ConfigBuilder::new().adapter("across", &[]).build();
		config.adapters[0].kind = "onchain".into();

		let err = factories_for(get_registry(), &config).err().unwrap();
		assert_eq!(
			err,
			"Unknown adapter implementation 'onchain'. Available: [static]"
		);
	}

	#[test]
	fn test_factories_for_unknown_pipeline() {
		let config = ConfigBuilder::new().pipeline("mempool").build();
		let err = factories_for(get_registry(), &config).err().unwrap();
		assert!(err.contains("Unknown pipeline implementation 'mempool'"));
	}

	#[test]
	fn test_factories_for_selects_configured() {
		let config = ConfigBuilder::new().adapter("across", &[]).build();
		let factories = factories_for(get_registry(), &config).unwrap();
		assert_eq!(factories.adapter_factories.len(), 1);
		assert!(factories.pipeline_factories.contains_key("standby"));
	}

	#[tokio::test]
	async fn test_build_supervisor_from_config() {
		let config = ConfigBuilder::new().chain(31337).build();
		let logger = config.logging.clone();

		let mut supervisor = build_supervisor_from_config(config, logger).await.unwrap();
		assert_eq!(supervisor.running_chains(), vec![31337]);
		supervisor.shutdown().await;
	}
}
