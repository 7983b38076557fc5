//! Worker termination monitoring.
//!
//! Spawns one observer per worker. The observer owns the worker's
//! termination future, so aborting the observer also tears the worker down.

use submitter_types::ChainId;
use submitter_worker::{RunningWorker, WorkerTermination};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A worker has terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerEvent {
	pub chain_id: ChainId,
	pub termination: WorkerTermination,
}

pub struct WorkerMonitor {
	events: mpsc::UnboundedSender<WorkerEvent>,
}

impl WorkerMonitor {
	pub fn new(events: mpsc::UnboundedSender<WorkerEvent>) -> Self {
		Self { events }
	}

	/// Starts observing a worker. Exactly one event is sent when it
	/// terminates; none if the observer is aborted first.
	pub fn watch(&self, chain_id: ChainId, worker: RunningWorker) -> JoinHandle<()> {
		let events = self.events.clone();
		tokio::spawn(async move {
			let termination = worker.termination.await;
			tracing::debug!(chain_id, termination = %termination, "Worker terminated");
			if events
				.send(WorkerEvent {
					chain_id,
					termination,
				})
				.is_err()
			{
				tracing::warn!(chain_id, "Supervisor stopped listening for worker events");
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::future;
	use std::time::Duration;

	fn worker(termination: WorkerTermination) -> RunningWorker {
		RunningWorker {
			pid: None,
			termination: Box::pin(future::ready(termination)),
		}
	}

	#[tokio::test]
	async fn test_single_event_per_worker() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let monitor = WorkerMonitor::new(tx);

		monitor
			.watch(10, worker(WorkerTermination::Exited { code: Some(1) }))
			.await
			.unwrap();
		drop(monitor);

		assert_eq!(
			rx.recv().await,
			Some(WorkerEvent {
				chain_id: 10,
				termination: WorkerTermination::Exited { code: Some(1) },
			})
		);
		assert_eq!(rx.recv().await, None);
	}

	#[tokio::test]
	async fn test_aborted_observer_sends_nothing() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let monitor = WorkerMonitor::new(tx);

		let observer = monitor.watch(
			1,
			RunningWorker {
				pid: None,
				termination: Box::pin(future::pending()),
			},
		);
		drop(monitor);

		tokio::time::sleep(Duration::from_millis(10)).await;
		observer.abort();
		assert!(observer.await.unwrap_err().is_cancelled());
		assert_eq!(rx.recv().await, None);
	}
}
