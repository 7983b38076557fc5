//! The submitter supervisor.
//!
//! Owns the registry of workers, one per chain, and their states. Nothing
//! else holds a reference to the registry; status is read through the
//! supervisor's accessors.

use crate::monitoring::WorkerEvent;
use crate::SupervisorError;
use indexmap::IndexMap;
use std::sync::Arc;
use submitter_types::ChainId;
use submitter_worker::{WorkerLauncher, WorkerTermination};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod lifecycle;

/// Lifecycle state of one chain's worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
	NotStarted,
	Running,
	/// The worker failed. Terminal.
	Errored(String),
	/// The worker stopped, with its exit code when known. Terminal.
	Exited(Option<i32>),
	/// Torn down by a supervisor shutdown. Terminal, not a fault.
	Stopped,
}

impl WorkerState {
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			WorkerState::Errored(_) | WorkerState::Exited(_) | WorkerState::Stopped
		)
	}
}

/// Registry entry for one chain.
#[derive(Debug)]
struct WorkerHandle {
	state: WorkerState,
	observer: Option<JoinHandle<()>>,
}

impl WorkerHandle {
	fn new() -> Self {
		Self {
			state: WorkerState::NotStarted,
			observer: None,
		}
	}

	/// Marks the worker as running under the given observer.
	fn start(&mut self, observer: JoinHandle<()>) {
		self.state = WorkerState::Running;
		self.observer = Some(observer);
	}

	/// Applies a termination. Returns false if the worker was not running,
	/// in which case the state is left as is.
	fn terminate(&mut self, termination: &WorkerTermination) -> bool {
		if self.state != WorkerState::Running {
			return false;
		}
		self.state = match termination {
			WorkerTermination::Exited { code } => WorkerState::Exited(*code),
			WorkerTermination::Errored { error } => WorkerState::Errored(error.clone()),
		};
		true
	}
}

/// Starts and watches one isolated worker per configured chain.
pub struct SubmitterSupervisor {
	launcher: Arc<dyn WorkerLauncher>,
	/// `None` until initialized; then whether the kill-switch allowed
	/// workers to start.
	enabled: Option<bool>,
	/// Workers keyed by chain id, in configuration order.
	workers: IndexMap<ChainId, WorkerHandle>,
	/// Handed to observers during initialization, then dropped so the
	/// channel closes once the last observer finishes.
	events_tx: Option<mpsc::UnboundedSender<WorkerEvent>>,
	events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl SubmitterSupervisor {
	pub fn new(launcher: Arc<dyn WorkerLauncher>) -> Self {
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		Self {
			launcher,
			enabled: None,
			workers: IndexMap::new(),
			events_tx: Some(events_tx),
			events_rx,
		}
	}

	/// Whether initialization ran with the submitter enabled.
	pub fn is_enabled(&self) -> bool {
		self.enabled.unwrap_or(false)
	}

	/// State of a chain's worker, `None` for chains that were skipped or
	/// never configured.
	pub fn state(&self, chain_id: ChainId) -> Option<&WorkerState> {
		self.workers.get(&chain_id).map(|handle| &handle.state)
	}

	/// States of all registered workers, in configuration order.
	pub fn states(&self) -> Vec<(ChainId, WorkerState)> {
		self.workers
			.iter()
			.map(|(chain_id, handle)| (*chain_id, handle.state.clone()))
			.collect()
	}

	/// Chains whose worker is still running.
	pub fn running_chains(&self) -> Vec<ChainId> {
		self.workers
			.iter()
			.filter(|(_, handle)| handle.state == WorkerState::Running)
			.map(|(chain_id, _)| *chain_id)
			.collect()
	}

	/// Waits for the next worker termination and records it.
	///
	/// The affected chain moves to its terminal state and one fatal log event
	/// is emitted for it. Returns `None` once no observer is left.
	pub async fn next_event(&mut self) -> Option<WorkerEvent> {
		let event = self.events_rx.recv().await?;

		let applied = self
			.workers
			.get_mut(&event.chain_id)
			.map(|handle| handle.terminate(&event.termination))
			.unwrap_or(false);

		if applied {
			match &event.termination {
				WorkerTermination::Exited { code } => {
					tracing::error!(
						fatal = true,
						chain_id = event.chain_id,
						exit_code = ?code,
						"Submitter worker exited, submissions on this chain are down"
					);
				},
				WorkerTermination::Errored { error } => {
					tracing::error!(
						fatal = true,
						chain_id = event.chain_id,
						error = %error,
						"Submitter worker errored, submissions on this chain are down"
					);
				},
			}
		}

		Some(event)
	}

	/// Watches the workers until a shutdown signal arrives.
	///
	/// Returns `Err(AllWorkersTerminated)` when the last running worker has
	/// terminated; with nothing to supervise it returns `Ok` immediately.
	pub async fn run(&mut self) -> Result<(), SupervisorError> {
		if !self.is_enabled() {
			return Ok(());
		}
		if self.running_chains().is_empty() {
			tracing::warn!("No submitter workers running");
			return Ok(());
		}

		loop {
			tokio::select! {
				event = self.next_event() => {
					if event.is_none() || self.running_chains().is_empty() {
						tracing::error!(fatal = true, "All submitter workers have terminated");
						return Err(SupervisorError::AllWorkersTerminated);
					}
				}

				// Shutdown signal
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Shutdown signal received");
					break;
				}
			}
		}

		self.shutdown().await;
		Ok(())
	}
}

#[cfg(test)]
mod tests;
