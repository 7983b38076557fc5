//! Core supervisor for the transaction submitter.
//!
//! This module owns the lifecycle of the per-chain workers. At startup it
//! resolves one configuration per chain, launches an isolated worker for each
//! and then watches them. A worker that stops, for whatever reason, is
//! reported as fatal and never restarted: resubmitting blindly risks stuck or
//! duplicate transactions, so an operator has to step in.

use thiserror::Error;

pub mod builder;
pub mod monitoring;
pub mod supervisor;

pub use builder::{SupervisorBuilder, SupervisorFactories};
pub use monitoring::{WorkerEvent, WorkerMonitor};
pub use supervisor::{SubmitterSupervisor, WorkerState};

/// Errors that can occur while building or running the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
	/// Error related to configuration issues.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Error setting up adapters, launchers or the supervisor itself.
	#[error("Setup error: {0}")]
	Setup(String),
	/// Every started worker has terminated.
	#[error("All submitter workers have terminated")]
	AllWorkersTerminated,
}
