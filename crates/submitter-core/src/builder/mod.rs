//! Builder pattern for constructing the submitter supervisor.
//!
//! Composes a SubmitterSupervisor from the configuration and the registered
//! factories: bridge adapters are built from `[[adapters]]`, the worker
//! launcher is chosen by `[worker] isolation` and runs the pipeline named by
//! `[worker] pipeline`.

use crate::{SubmitterSupervisor, SupervisorError};
use std::collections::HashMap;
use std::sync::Arc;
use submitter_adapters::{AdapterFactory, AdapterService};
use submitter_config::{Config, IsolationMode};
use submitter_types::LoggerConfig;
use submitter_worker::{PipelineFactory, ProcessLauncher, TaskLauncher, WorkerLauncher};

/// Container for all factory functions needed to build a supervisor.
#[derive(Clone, Default)]
pub struct SupervisorFactories {
	/// Adapter factories keyed by adapter kind.
	pub adapter_factories: HashMap<String, AdapterFactory>,
	/// Pipeline factories keyed by pipeline name.
	pub pipeline_factories: HashMap<String, PipelineFactory>,
}

/// Builder for constructing a SubmitterSupervisor with pluggable implementations.
pub struct SupervisorBuilder {
	config: Config,
	logger: Option<LoggerConfig>,
}

impl SupervisorBuilder {
	/// Creates a new SupervisorBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			logger: None,
		}
	}

	/// Overrides the logger configuration propagated to workers. Defaults to
	/// the `[logging]` section.
	pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
		self.logger = Some(logger);
		self
	}

	/// Builds the adapters and launcher, then initializes the supervisor.
	///
	/// Errors here are global: an unknown pipeline or adapter kind stops the
	/// whole submitter. Per-chain problems are handled by initialization and
	/// only skip the affected chain.
	pub async fn build(
		self,
		factories: &SupervisorFactories,
	) -> Result<SubmitterSupervisor, SupervisorError> {
		let adapters =
			AdapterService::from_configs(&self.config.adapters, &factories.adapter_factories)
				.map_err(|e| {
					tracing::error!(component = "adapters", error = %e, "Failed to create adapters");
					SupervisorError::Setup(format!("Failed to create adapters: {}", e))
				})?;

		let launcher = self.create_launcher(factories)?;
		tracing::info!(
			component = "worker",
			implementation = %self.config.worker.pipeline,
			isolation = launcher.isolation(),
			"Loaded"
		);

		let logger = self
			.logger
			.clone()
			.unwrap_or_else(|| self.config.logging.clone());

		let mut supervisor = SubmitterSupervisor::new(launcher);
		supervisor
			.initialize(&self.config, &adapters, &logger)
			.await?;
		Ok(supervisor)
	}

	fn create_launcher(
		&self,
		factories: &SupervisorFactories,
	) -> Result<Arc<dyn WorkerLauncher>, SupervisorError> {
		let pipeline = &self.config.worker.pipeline;
		let factory = factories.pipeline_factories.get(pipeline).ok_or_else(|| {
			let mut available: Vec<_> = factories.pipeline_factories.keys().cloned().collect();
			available.sort();
			SupervisorError::Config(format!(
				"Unknown pipeline implementation '{}'. Available: [{}]",
				pipeline,
				available.join(", ")
			))
		})?;

		match self.config.worker.isolation {
			IsolationMode::Task => Ok(Arc::new(TaskLauncher::new(*factory))),
			IsolationMode::Process => {
				let launcher = ProcessLauncher::current_exe(["--pipeline", pipeline.as_str()])
					.map_err(|e| SupervisorError::Setup(e.to_string()))?;
				Ok(Arc::new(launcher))
			},
		}
	}
}
