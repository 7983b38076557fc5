//! Lifecycle management for the submitter supervisor.
//!
//! Handles the one-time start of all workers and their teardown.

use super::{SubmitterSupervisor, WorkerHandle, WorkerState};
use crate::monitoring::WorkerMonitor;
use crate::SupervisorError;
use submitter_config::{resolve_global_config, resolve_worker_config, Config};
use submitter_types::{IncentivesAddressSource, LoggerConfig};

impl SubmitterSupervisor {
	/// Resolves every chain's configuration and starts its worker.
	///
	/// Chains are set up one at a time in configuration order. A chain whose
	/// configuration cannot be resolved, or whose worker cannot be launched,
	/// is logged and skipped; the others still start. With the submitter
	/// disabled nothing is started and this returns `Ok`.
	pub async fn initialize(
		&mut self,
		config: &Config,
		adapters: &dyn IncentivesAddressSource,
		logger: &LoggerConfig,
	) -> Result<(), SupervisorError> {
		let events_tx = self
			.events_tx
			.take()
			.ok_or_else(|| SupervisorError::Setup("Supervisor is already initialized".into()))?;

		let global = resolve_global_config(&config.submitter);
		self.enabled = Some(global.enabled);
		if !global.enabled {
			tracing::info!(
				chains = config.chains.len(),
				"Submitter disabled, no workers started"
			);
			return Ok(());
		}

		tracing::info!(
			chains = config.chains.len(),
			adapters = adapters.adapter_names().len(),
			isolation = self.launcher.isolation(),
			"Initializing submitter supervisor"
		);

		let monitor = WorkerMonitor::new(events_tx);
		for chain in &config.chains {
			let chain_id = chain.chain_id;
			if self.workers.contains_key(&chain_id) {
				tracing::error!(chain_id, "Chain configured more than once, skipping duplicate");
				continue;
			}

			let resolved = match resolve_worker_config(chain, &global, adapters, logger) {
				Ok(resolved) => resolved,
				Err(e) => {
					tracing::error!(
						chain_id,
						adapter = %e.adapter,
						error = %e,
						"Failed to resolve worker configuration, skipping chain"
					);
					continue;
				},
			};

			let payload = match resolved.to_payload() {
				Ok(payload) => payload,
				Err(e) => {
					tracing::error!(
						chain_id,
						error = %e,
						"Failed to encode worker configuration, skipping chain"
					);
					continue;
				},
			};

			self.workers.insert(chain_id, WorkerHandle::new());
			match self.launcher.launch(payload).await {
				Ok(worker) => {
					tracing::info!(
						chain_id,
						pid = ?worker.pid,
						incentives = resolved.incentives_addresses.len(),
						"Submitter worker started"
					);
					let observer = monitor.watch(chain_id, worker);
					if let Some(handle) = self.workers.get_mut(&chain_id) {
						handle.start(observer);
					}
				},
				Err(e) => {
					self.workers.shift_remove(&chain_id);
					tracing::error!(
						chain_id,
						error = %e,
						"Failed to launch submitter worker, skipping chain"
					);
				},
			}
		}

		tracing::info!(
			started = self.workers.len(),
			configured = config.chains.len(),
			"Submitter supervisor initialized"
		);
		Ok(())
	}

	/// Stops observing all workers and tears them down.
	///
	/// Running workers move to [`WorkerState::Stopped`]; a worker stopped here
	/// is not a fault and is not reported as one. Workers that had already
	/// terminated keep their state.
	pub async fn shutdown(&mut self) {
		let mut stopped = 0usize;
		for (chain_id, handle) in self.workers.iter_mut() {
			let Some(observer) = handle.observer.take() else {
				continue;
			};
			observer.abort();
			if let Err(e) = observer.await {
				if !e.is_cancelled() {
					tracing::warn!(chain_id, error = %e, "Worker observer failed");
				}
			}
			if handle.state == WorkerState::Running {
				handle.state = WorkerState::Stopped;
				stopped += 1;
			}
		}
		tracing::info!(workers = stopped, "Submitter supervisor stopped");
	}
}

impl Drop for SubmitterSupervisor {
	fn drop(&mut self) {
		for handle in self.workers.values() {
			if let Some(observer) = &handle.observer {
				observer.abort();
			}
		}
	}
}
