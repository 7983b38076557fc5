//! Standby submission pipeline.
//!
//! Keeps a chain's execution context alive without submitting anything. It
//! ticks on the configured processing interval and stays up until the
//! worker is torn down. Useful to bring up the supervisor before a real
//! pipeline is registered, and as the default in tests.

use crate::{PipelineFactory, PipelineRegistry, SubmissionPipeline, WorkerError};
use async_trait::async_trait;
use std::time::Duration;
use submitter_types::{ImplementationRegistry, ResolvedWorkerConfig};
use tokio::time::MissedTickBehavior;

/// Smallest tick period; a zero interval would spin.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Pipeline that idles on its chain.
pub struct StandbyPipeline {
	config: ResolvedWorkerConfig,
}

impl StandbyPipeline {
	pub fn new(config: ResolvedWorkerConfig) -> Self {
		Self { config }
	}
}

#[async_trait]
impl SubmissionPipeline for StandbyPipeline {
	async fn run(self: Box<Self>) -> Result<(), WorkerError> {
		let config = self.config;
		tracing::info!(
			rpc = %config.rpc,
			adapters = ?config.incentives_addresses.keys().collect::<Vec<_>>(),
			processing_interval_ms = config.processing_interval.as_millis() as u64,
			"Worker on standby"
		);

		let mut ticker = tokio::time::interval(config.processing_interval.max(MIN_TICK));
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let mut ticks: u64 = 0;
		loop {
			ticker.tick().await;
			ticks += 1;
			tracing::trace!(ticks, "Standby tick");
		}
	}
}

/// Factory function to create a standby pipeline.
pub fn create_pipeline(
	config: ResolvedWorkerConfig,
) -> Result<Box<dyn SubmissionPipeline>, WorkerError> {
	Ok(Box::new(StandbyPipeline::new(config)))
}

/// Registry for the standby pipeline implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "standby";
	type Factory = PipelineFactory;

	fn factory() -> Self::Factory {
		create_pipeline
	}
}

impl PipelineRegistry for Registry {}
