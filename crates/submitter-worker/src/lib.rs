//! Worker boundary of the transaction submitter.
//!
//! Every chain is served by one worker running a submission pipeline. The
//! supervisor never shares memory with a worker: it serializes the chain's
//! [`ResolvedWorkerConfig`] once, hands the bytes to a [`WorkerLauncher`] and
//! from then on only observes how the worker terminates.
//!
//! Two launchers are provided. [`TaskLauncher`] runs the pipeline on a tokio
//! task inside the supervisor process; [`ProcessLauncher`] starts a child
//! process and writes the payload to its stdin.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use submitter_types::{ImplementationRegistry, ResolvedWorkerConfig};
use thiserror::Error;
use tracing::Instrument;

/// Re-export implementations
pub mod implementations {
	pub mod process;
	pub mod standby;
	pub mod task;
}

pub use implementations::process::ProcessLauncher;
pub use implementations::task::TaskLauncher;

/// Errors that can occur while starting or running a worker.
#[derive(Debug, Error)]
pub enum WorkerError {
	/// The configuration payload could not be encoded or decoded.
	#[error("Payload error: {0}")]
	Payload(String),
	/// The worker could not be started.
	#[error("Spawn error: {0}")]
	Spawn(String),
	/// The submission pipeline failed.
	#[error("Pipeline error: {0}")]
	Pipeline(String),
}

/// The transaction-submission pipeline run by a worker.
///
/// Implementations own their chain's configuration and run until they fail or
/// decide to stop. Returning `Ok` is a clean exit.
#[async_trait]
pub trait SubmissionPipeline: Send {
	async fn run(self: Box<Self>) -> Result<(), WorkerError>;
}

/// Type alias for pipeline factory functions.
///
/// The factory receives the worker's own copy of its configuration.
pub type PipelineFactory =
	fn(ResolvedWorkerConfig) -> Result<Box<dyn SubmissionPipeline>, WorkerError>;

/// Registry trait for pipeline implementations.
pub trait PipelineRegistry: ImplementationRegistry<Factory = PipelineFactory> {}

/// Get all registered pipeline implementations.
pub fn get_all_implementations() -> Vec<(&'static str, PipelineFactory)> {
	use implementations::standby;

	vec![(standby::Registry::NAME, standby::Registry::factory())]
}

/// How a worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerTermination {
	/// The worker stopped on its own. `code` is the exit code when one is
	/// known.
	Exited { code: Option<i32> },
	/// The worker crashed or failed.
	Errored { error: String },
}

impl fmt::Display for WorkerTermination {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WorkerTermination::Exited { code: Some(code) } => {
				write!(f, "exited with code {}", code)
			},
			WorkerTermination::Exited { code: None } => write!(f, "exited"),
			WorkerTermination::Errored { error } => write!(f, "errored: {}", error),
		}
	}
}

/// A started worker.
pub struct RunningWorker {
	/// OS process id, for process isolation.
	pub pid: Option<u32>,
	/// Resolves once the worker has terminated. Dropping it tears the
	/// worker down.
	pub termination: BoxFuture<'static, WorkerTermination>,
}

impl fmt::Debug for RunningWorker {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RunningWorker")
			.field("pid", &self.pid)
			.finish_non_exhaustive()
	}
}

/// Starts workers from serialized configuration payloads.
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
	/// Short name of the isolation mode, used in logs.
	fn isolation(&self) -> &'static str;

	/// Starts one worker. The payload is moved into the worker and never
	/// shared with the caller again.
	async fn launch(&self, payload: Vec<u8>) -> Result<RunningWorker, WorkerError>;
}

/// Worker-side entry point: decodes the payload and runs the pipeline.
pub async fn run_worker(payload: &[u8], factory: PipelineFactory) -> Result<(), WorkerError> {
	let config = ResolvedWorkerConfig::from_payload(payload)
		.map_err(|e| WorkerError::Payload(e.to_string()))?;
	run_pipeline(config, factory).await
}

/// Builds the pipeline for an already decoded configuration and runs it
/// inside a span carrying the chain id.
pub async fn run_pipeline(
	config: ResolvedWorkerConfig,
	factory: PipelineFactory,
) -> Result<(), WorkerError> {
	let span = tracing::info_span!("submitter", chain_id = config.chain_id);
	async move {
		tracing::debug!(
			adapters = config.incentives_addresses.len(),
			max_tries = config.max_tries,
			"Starting submission pipeline"
		);
		let pipeline = factory(config)?;
		pipeline.run().await
	}
	.instrument(span)
	.await
}

#[cfg(test)]
pub(crate) mod test_support {
	use std::time::Duration;
	use submitter_types::{ChainId, GasLimitBuffer, LoggerConfig, ResolvedWorkerConfig};

	pub fn sample_config(chain_id: ChainId) -> ResolvedWorkerConfig {
		ResolvedWorkerConfig {
			chain_id,
			rpc: "http://localhost:8545".to_string(),
			relayer_private_key: "0x01".into(),
			incentives_addresses: Default::default(),
			new_orders_delay: Duration::ZERO,
			retry_interval: Duration::from_millis(2_000),
			processing_interval: Duration::from_millis(5),
			max_tries: 3,
			max_pending_transactions: 1_000,
			transaction_timeout: Duration::from_millis(600_000),
			gas_limit_buffer: GasLimitBuffer::default().with_default(),
			max_fee_per_gas: None,
			max_priority_fee_adjustment_factor: None,
			max_allowed_priority_fee_per_gas: None,
			gas_price_adjustment_factor: None,
			max_allowed_gas_price: None,
			logger: LoggerConfig::default(),
		}
	}
}
