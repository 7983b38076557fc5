//! In-process worker isolation.
//!
//! Each worker is a tokio task that decodes its own copy of the payload. A
//! panic inside the pipeline is caught by the runtime and reported as an
//! errored termination; it never unwinds into the supervisor.

use crate::{
	run_worker, PipelineFactory, RunningWorker, WorkerError, WorkerLauncher, WorkerTermination,
};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use tokio::task::{JoinError, JoinHandle};

/// Launches workers as tokio tasks.
pub struct TaskLauncher {
	factory: PipelineFactory,
}

impl TaskLauncher {
	pub fn new(factory: PipelineFactory) -> Self {
		Self { factory }
	}
}

/// Aborts the task when dropped.
struct AbortOnDrop(JoinHandle<Result<(), WorkerError>>);

impl Drop for AbortOnDrop {
	fn drop(&mut self) {
		self.0.abort();
	}
}

#[async_trait]
impl WorkerLauncher for TaskLauncher {
	fn isolation(&self) -> &'static str {
		"task"
	}

	async fn launch(&self, payload: Vec<u8>) -> Result<RunningWorker, WorkerError> {
		let factory = self.factory;
		let handle = tokio::spawn(async move { run_worker(&payload, factory).await });
		let mut guard = AbortOnDrop(handle);

		let termination = async move {
			match (&mut guard.0).await {
				Ok(Ok(())) => WorkerTermination::Exited { code: Some(0) },
				Ok(Err(e)) => WorkerTermination::Errored {
					error: e.to_string(),
				},
				Err(e) => WorkerTermination::Errored {
					error: describe_join_error(e),
				},
			}
		}
		.boxed();

		Ok(RunningWorker {
			pid: None,
			termination,
		})
	}
}

fn describe_join_error(error: JoinError) -> String {
	if error.is_panic() {
		format!("worker panicked: {}", panic_message(error.into_panic()))
	} else {
		"worker task was cancelled".to_string()
	}
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
