use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use submitter_adapters::implementations::table::create_adapter;
use submitter_adapters::AdapterService;
use submitter_config::builders::config::ConfigBuilder;
use submitter_config::{AdapterConfig, ChainSubmitterOverride, Config};
use submitter_types::{Address, LoggerConfig, ResolvedWorkerConfig};
use submitter_worker::{
	RunningWorker, SubmissionPipeline, TaskLauncher, WorkerError, WorkerLauncher,
};
use tracing_test::traced_test;

/// Pipeline whose behaviour is chosen by chain id: chain 2 fails, chain 4
/// exits cleanly, every other chain runs until torn down.
struct Scripted(ResolvedWorkerConfig);

#[async_trait]
impl SubmissionPipeline for Scripted {
	async fn run(self: Box<Self>) -> Result<(), WorkerError> {
		match self.0.chain_id {
			2 => {
				tokio::time::sleep(Duration::from_millis(10)).await;
				Err(WorkerError::Pipeline("rpc connection refused".into()))
			},
			4 => {
				tokio::time::sleep(Duration::from_millis(10)).await;
				Ok(())
			},
			_ => {
				std::future::pending::<()>().await;
				Ok(())
			},
		}
	}
}

fn scripted(config: ResolvedWorkerConfig) -> Result<Box<dyn SubmissionPipeline>, WorkerError> {
	Ok(Box::new(Scripted(config)))
}

fn task_supervisor() -> SubmitterSupervisor {
	SubmitterSupervisor::new(Arc::new(TaskLauncher::new(scripted)))
}

struct CountDrop(Arc<AtomicUsize>);

impl Drop for CountDrop {
	fn drop(&mut self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

/// Launcher that records the decoded payloads and keeps every worker
/// pending until it is torn down.
#[derive(Default)]
struct RecordingLauncher {
	launched: Mutex<Vec<ResolvedWorkerConfig>>,
	torn_down: Arc<AtomicUsize>,
	refuse_chain: Option<ChainId>,
}

#[async_trait]
impl WorkerLauncher for RecordingLauncher {
	fn isolation(&self) -> &'static str {
		"recording"
	}

	async fn launch(&self, payload: Vec<u8>) -> Result<RunningWorker, WorkerError> {
		let config = ResolvedWorkerConfig::from_payload(&payload)
			.map_err(|e| WorkerError::Payload(e.to_string()))?;
		if self.refuse_chain == Some(config.chain_id) {
			return Err(WorkerError::Spawn("no capacity".into()));
		}
		self.launched.lock().unwrap().push(config);

		let guard = CountDrop(self.torn_down.clone());
		Ok(RunningWorker {
			pid: None,
			termination: Box::pin(async move {
				let _guard = guard;
				std::future::pending::<WorkerTermination>().await
			}),
		})
	}
}

fn no_adapters() -> AdapterService {
	AdapterService::new(Vec::new())
}

fn table_adapter(name: &str, deployments: &[(ChainId, &str)]) -> AdapterService {
	let config = AdapterConfig {
		name: name.to_string(),
		kind: "static".to_string(),
		incentives: deployments
			.iter()
			.map(|(chain_id, address)| (*chain_id, address.to_string()))
			.collect(),
	};
	AdapterService::new(vec![create_adapter(&config).unwrap()])
}

fn fatal_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
	lines
		.iter()
		.copied()
		.filter(|line| line.contains("fatal=true"))
		.collect()
}

#[tokio::test]
#[traced_test]
async fn test_worker_fault_is_isolated() {
	let config = ConfigBuilder::new().chain(1).chain(2).chain(3).build();
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();
	assert_eq!(supervisor.running_chains(), vec![1, 2, 3]);

	let event = supervisor.next_event().await.unwrap();
	assert_eq!(event.chain_id, 2);
	assert_eq!(
		supervisor.state(2),
		Some(&WorkerState::Errored(
			"Pipeline error: rpc connection refused".into()
		))
	);
	assert_eq!(supervisor.state(1), Some(&WorkerState::Running));
	assert_eq!(supervisor.state(3), Some(&WorkerState::Running));
	assert_eq!(supervisor.running_chains(), vec![1, 3]);

	logs_assert(|lines: &[&str]| {
		let fatal = fatal_lines(lines);
		if fatal.len() != 1 {
			return Err(format!("expected one fatal log, got {}", fatal.len()));
		}
		if !fatal[0].contains("chain_id=2") || !fatal[0].contains("rpc connection refused") {
			return Err(format!("fatal log lacks chain context: {}", fatal[0]));
		}
		Ok(())
	});

	supervisor.shutdown().await;
}

#[tokio::test]
#[traced_test]
async fn test_worker_exit_is_fatal() {
	let config = ConfigBuilder::new().chain(1).chain(4).build();
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	let event = supervisor.next_event().await.unwrap();
	assert_eq!(event.chain_id, 4);
	assert_eq!(supervisor.state(4), Some(&WorkerState::Exited(Some(0))));
	assert!(supervisor.state(4).unwrap().is_terminal());
	assert_eq!(supervisor.state(1), Some(&WorkerState::Running));

	logs_assert(|lines: &[&str]| {
		let fatal = fatal_lines(lines);
		match fatal.as_slice() {
			[line] if line.contains("chain_id=4") && line.contains("exit_code=Some(0)") => Ok(()),
			other => Err(format!("unexpected fatal logs: {:?}", other)),
		}
	});

	supervisor.shutdown().await;
}

#[tokio::test]
#[traced_test]
async fn test_disabled_starts_nothing() {
	let launcher = Arc::new(RecordingLauncher::default());
	let config = ConfigBuilder::new().enabled(false).chain(1).chain(2).build();
	let mut supervisor = SubmitterSupervisor::new(launcher.clone());

	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	assert!(!supervisor.is_enabled());
	assert!(supervisor.states().is_empty());
	assert!(launcher.launched.lock().unwrap().is_empty());
	assert!(logs_contain("Submitter disabled"));
	supervisor.run().await.unwrap();
}

#[tokio::test]
async fn test_falsy_enabled_starts_nothing() {
	for raw in ["0", "\"\"", "\"false\""] {
		let config: Config = format!(
			"[submitter]\nenabled = {}\n\n[[chains]]\nchain_id = 1\nrpc = \"http://a\"\nrelayer_private_key = \"0x01\"\n",
			raw
		)
		.parse()
		.unwrap();
		let launcher = Arc::new(RecordingLauncher::default());
		let mut supervisor = SubmitterSupervisor::new(launcher.clone());

		supervisor
			.initialize(&config, &no_adapters(), &LoggerConfig::default())
			.await
			.unwrap();

		assert!(!supervisor.is_enabled(), "input: {}", raw);
		assert!(launcher.launched.lock().unwrap().is_empty());
	}
}

#[tokio::test]
#[traced_test]
async fn test_missing_incentive_address_skips_chain() {
	let launcher = Arc::new(RecordingLauncher::default());
	let adapters = table_adapter(
		"across",
		&[
			(1, "0x1111111111111111111111111111111111111111"),
			(3, "0x3333333333333333333333333333333333333333"),
		],
	);
	let config = ConfigBuilder::new().chain(1).chain(2).chain(3).build();
	let mut supervisor = SubmitterSupervisor::new(launcher.clone());

	supervisor
		.initialize(&config, &adapters, &LoggerConfig::default())
		.await
		.unwrap();

	assert_eq!(supervisor.running_chains(), vec![1, 3]);
	assert_eq!(supervisor.state(2), None);
	assert!(logs_contain("Failed to resolve worker configuration"));
	// a skipped chain is a setup failure, not a worker fault
	assert!(!logs_contain("fatal=true"));

	let launched = launcher.launched.lock().unwrap();
	assert_eq!(launched.len(), 2);
	assert_eq!(
		launched[1].incentives_addresses.get("across"),
		Some(&Address::repeat_byte(0x33))
	);
}

#[tokio::test]
async fn test_payload_carries_resolved_config() {
	let launcher = Arc::new(RecordingLauncher::default());
	let logger = LoggerConfig {
		level: "debug".into(),
		..Default::default()
	};
	let config = ConfigBuilder::new()
		.chain_with(
			10,
			ChainSubmitterOverride {
				max_tries: Some(5),
				max_fee_per_gas: Some(42),
				..Default::default()
			},
		)
		.chain(137)
		.build();
	let mut supervisor = SubmitterSupervisor::new(launcher.clone());

	supervisor
		.initialize(&config, &no_adapters(), &logger)
		.await
		.unwrap();

	let launched = launcher.launched.lock().unwrap();
	let chain_ids: Vec<ChainId> = launched.iter().map(|c| c.chain_id).collect();
	assert_eq!(chain_ids, vec![10, 137]);
	assert_eq!(launched[0].max_tries, 5);
	assert_eq!(launched[0].max_fee_per_gas, Some(42));
	assert_eq!(launched[1].max_tries, 3);
	assert_eq!(launched[1].max_fee_per_gas, None);
	assert_eq!(launched[0].logger.level, "debug");
	assert_eq!(
		launched[0].relayer_private_key,
		config.chains[0].relayer_private_key
	);
}

#[tokio::test]
#[traced_test]
async fn test_launch_failure_skips_chain() {
	let launcher = Arc::new(RecordingLauncher {
		refuse_chain: Some(2),
		..Default::default()
	});
	let config = ConfigBuilder::new().chain(1).chain(2).chain(3).build();
	let mut supervisor = SubmitterSupervisor::new(launcher);

	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	assert_eq!(supervisor.running_chains(), vec![1, 3]);
	assert_eq!(supervisor.state(2), None);
	assert_eq!(
		supervisor.states(),
		vec![(1, WorkerState::Running), (3, WorkerState::Running)]
	);
	assert!(logs_contain("Failed to launch submitter worker"));
}

#[test]
fn test_handle_starts_not_started() {
	let mut handle = WorkerHandle::new();
	assert_eq!(handle.state, WorkerState::NotStarted);
	assert!(!handle.state.is_terminal());

	// a termination before the worker runs is not a transition
	assert!(!handle.terminate(&WorkerTermination::Exited { code: Some(1) }));
	assert_eq!(handle.state, WorkerState::NotStarted);
}

#[tokio::test]
async fn test_handle_transitions_once() {
	let mut handle = WorkerHandle::new();
	handle.start(tokio::spawn(std::future::pending::<()>()));
	assert_eq!(handle.state, WorkerState::Running);

	assert!(handle.terminate(&WorkerTermination::Errored {
		error: "boom".into()
	}));
	assert_eq!(handle.state, WorkerState::Errored("boom".into()));
	assert!(!handle.terminate(&WorkerTermination::Exited { code: Some(0) }));
	assert_eq!(handle.state, WorkerState::Errored("boom".into()));

	if let Some(observer) = handle.observer.take() {
		observer.abort();
	}
}

#[tokio::test]
#[traced_test]
async fn test_duplicate_chain_skipped() {
	let launcher = Arc::new(RecordingLauncher::default());
	let config = ConfigBuilder::new().chain(1).chain(1).build();
	let mut supervisor = SubmitterSupervisor::new(launcher.clone());

	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	assert_eq!(supervisor.states(), vec![(1, WorkerState::Running)]);
	assert_eq!(launcher.launched.lock().unwrap().len(), 1);
	assert!(logs_contain("Chain configured more than once"));
}

#[tokio::test]
async fn test_initialize_twice_rejected() {
	let mut supervisor = SubmitterSupervisor::new(Arc::new(RecordingLauncher::default()));
	let config = ConfigBuilder::new().build();

	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();
	let result = supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await;
	assert!(matches!(result, Err(SupervisorError::Setup(_))));
}

#[tokio::test]
#[traced_test]
async fn test_run_fails_once_all_workers_terminated() {
	let config = ConfigBuilder::new().chain(2).chain(4).build();
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	let result = supervisor.run().await;
	assert!(matches!(result, Err(SupervisorError::AllWorkersTerminated)));
	assert!(supervisor.running_chains().is_empty());
	assert!(supervisor.state(2).unwrap().is_terminal());
	assert!(supervisor.state(4).unwrap().is_terminal());

	logs_assert(|lines: &[&str]| {
		let per_chain = fatal_lines(lines)
			.into_iter()
			.filter(|line| line.contains("chain_id="))
			.count();
		if per_chain == 2 {
			Ok(())
		} else {
			Err(format!("expected one fatal log per chain, got {}", per_chain))
		}
	});
}

#[tokio::test]
async fn test_run_without_workers_returns() {
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(&ConfigBuilder::new().build(), &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	assert!(supervisor.is_enabled());
	supervisor.run().await.unwrap();
}

#[tokio::test]
async fn test_next_event_none_after_last_worker() {
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(
			&ConfigBuilder::new().chain(4).build(),
			&no_adapters(),
			&LoggerConfig::default(),
		)
		.await
		.unwrap();

	assert!(supervisor.next_event().await.is_some());
	assert!(supervisor.next_event().await.is_none());
}

#[tokio::test]
async fn test_shutdown_tears_down_workers() {
	let launcher = Arc::new(RecordingLauncher::default());
	let torn_down = launcher.torn_down.clone();
	let config = ConfigBuilder::new().chain(1).chain(2).chain(3).build();
	let mut supervisor = SubmitterSupervisor::new(launcher);

	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();
	assert_eq!(torn_down.load(Ordering::SeqCst), 0);

	supervisor.shutdown().await;
	assert_eq!(torn_down.load(Ordering::SeqCst), 3);
	assert!(supervisor.running_chains().is_empty());
	assert_eq!(
		supervisor.states(),
		vec![
			(1, WorkerState::Stopped),
			(2, WorkerState::Stopped),
			(3, WorkerState::Stopped)
		]
	);

	// a second shutdown finds nothing left to stop
	supervisor.shutdown().await;
	assert_eq!(torn_down.load(Ordering::SeqCst), 3);
}

#[tokio::test]
#[traced_test]
async fn test_shutdown_keeps_fault_states() {
	let config = ConfigBuilder::new().chain(1).chain(2).build();
	let mut supervisor = task_supervisor();
	supervisor
		.initialize(&config, &no_adapters(), &LoggerConfig::default())
		.await
		.unwrap();

	supervisor.next_event().await.unwrap();
	supervisor.shutdown().await;

	assert!(matches!(supervisor.state(2), Some(WorkerState::Errored(_))));
	assert_eq!(supervisor.state(1), Some(&WorkerState::Stopped));
	assert!(supervisor.state(1).unwrap().is_terminal());
	// shutting down is not reported as a fault
	logs_assert(|lines: &[&str]| match fatal_lines(lines).len() {
		1 => Ok(()),
		n => Err(format!("expected one fatal log, got {}", n)),
	});
}
