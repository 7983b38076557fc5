//! Main entry point for the transaction submitter.
//!
//! Without a subcommand (or with `run`) the binary loads the configuration,
//! starts one submitter worker per configured chain and supervises them until
//! interrupted or until every worker has stopped. The hidden `worker`
//! subcommand is what process-isolated workers are started with: it reads its
//! chain's configuration from stdin and runs the submission pipeline.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use submitter_config::Config;
use submitter_types::ResolvedWorkerConfig;
use tokio::io::{AsyncRead, AsyncReadExt};

mod factory_registry;
mod logging;

use factory_registry::{build_supervisor_from_config, get_registry};

/// Command-line arguments for the submitter service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error), overrides `[logging] level`
	#[arg(short, long)]
	log_level: Option<String>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
	/// Supervise one submitter worker per configured chain (default)
	Run,
	/// Run a single worker, reading its configuration from stdin
	#[command(hide = true)]
	Worker {
		/// Submission pipeline implementation
		#[arg(long, default_value = "standby")]
		pipeline: String,
	},
}

/// Main entry point for the submitter service.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	match args.command.unwrap_or(Command::Run) {
		Command::Run => run(args.config, args.log_level).await,
		Command::Worker { pipeline } => worker(&pipeline, args.log_level).await,
	}
}

async fn run(
	config_path: PathBuf,
	log_level: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
	let config = match Config::from_file(&config_path).await {
		Ok(config) => config,
		Err(e) => {
			// No subscriber exists yet, fall back to the command-line level
			let logger = logging::effective_logger(Default::default(), log_level.as_deref());
			logging::init(&logger)?;
			tracing::error!(path = %config_path.display(), error = %e, "Failed to load configuration");
			return Err(e.into());
		},
	};

	let logger = logging::effective_logger(config.logging.clone(), log_level.as_deref());
	logging::init(&logger)?;
	tracing::info!(
		path = %config_path.display(),
		chains = config.chains.len(),
		adapters = config.adapters.len(),
		"Loaded configuration"
	);

	let mut supervisor = build_supervisor_from_config(config, logger).await?;
	tracing::info!("Started submitter");

	supervisor.run().await?;
	tracing::info!("Stopped submitter");
	Ok(())
}

async fn worker(pipeline: &str, log_level: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
	let config = read_payload(tokio::io::stdin()).await?;

	let logger = logging::effective_logger(config.logger.clone(), log_level.as_deref());
	logging::init(&logger)?;

	run_worker_pipeline(pipeline, config).await
}

/// Reads the whole payload and decodes the worker's own configuration.
async fn read_payload(
	mut input: impl AsyncRead + Unpin,
) -> Result<ResolvedWorkerConfig, Box<dyn std::error::Error>> {
	let mut payload = Vec::new();
	input.read_to_end(&mut payload).await?;
	Ok(ResolvedWorkerConfig::from_payload(&payload)?)
}

async fn run_worker_pipeline(
	pipeline: &str,
	config: ResolvedWorkerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
	let chain_id = config.chain_id;
	let factory = get_registry().pipeline(pipeline)?;
	if let Err(e) = submitter_worker::run_pipeline(config, factory).await {
		tracing::error!(chain_id, error = %e, "Submitter worker failed");
		return Err(e.into());
	}
	Ok(())
}
