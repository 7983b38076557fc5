//! Child-process worker isolation.
//!
//! Each worker is a separate OS process, by default this binary's hidden
//! `worker` subcommand. The payload is written to the child's stdin, which
//! is then closed; the child decodes it and runs its pipeline. The exit
//! status is the only thing read back.

use crate::{RunningWorker, WorkerError, WorkerLauncher, WorkerTermination};
use async_trait::async_trait;
use futures::FutureExt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Name of the subcommand a worker child is started with.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Launches workers as child processes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
	program: PathBuf,
	args: Vec<String>,
}

impl ProcessLauncher {
	/// Launcher for an arbitrary program that reads a payload on stdin.
	pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			program: program.into(),
			args: args.into_iter().map(Into::into).collect(),
		}
	}

	/// Launcher re-running the current executable as a worker, with `args`
	/// passed after the worker subcommand.
	pub fn current_exe<I, S>(args: I) -> Result<Self, WorkerError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let program = std::env::current_exe()
			.map_err(|e| WorkerError::Spawn(format!("Cannot locate current executable: {}", e)))?;
		let args = std::iter::once(WORKER_SUBCOMMAND.to_string())
			.chain(args.into_iter().map(Into::into));
		Ok(Self::new(program, args))
	}
}

#[async_trait]
impl WorkerLauncher for ProcessLauncher {
	fn isolation(&self) -> &'static str {
		"process"
	}

	async fn launch(&self, payload: Vec<u8>) -> Result<RunningWorker, WorkerError> {
		let mut child = Command::new(&self.program)
			.args(&self.args)
			.stdin(Stdio::piped())
			.stdout(Stdio::inherit())
			.stderr(Stdio::inherit())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| {
				WorkerError::Spawn(format!(
					"Failed to start {}: {}",
					self.program.display(),
					e
				))
			})?;

		let mut stdin = child
			.stdin
			.take()
			.ok_or_else(|| WorkerError::Spawn("Worker stdin is not piped".into()))?;
		stdin
			.write_all(&payload)
			.await
			.map_err(|e| WorkerError::Spawn(format!("Failed to deliver payload: {}", e)))?;
		drop(stdin);

		let pid = child.id();
		let termination = async move {
			match child.wait().await {
				Ok(status) => match status.code() {
					Some(code) => WorkerTermination::Exited { code: Some(code) },
					None => WorkerTermination::Errored {
						error: format!("worker process {}", status),
					},
				},
				Err(e) => WorkerTermination::Errored {
					error: format!("failed to wait for worker process: {}", e),
				},
			}
		}
		.boxed();

		Ok(RunningWorker { pid, termination })
	}
}
