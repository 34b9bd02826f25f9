//! CLI entry point: loads a benchmark, runs one Oneshot search, and reports the outcome.

use std::fs;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap::ValueEnum;
use oneshot::benchmark::load_benchmark;
use oneshot::benchmark::Benchmark;
use oneshot::cancellation::CancellationToken;
use oneshot::dot::transducer_to_dot;
use oneshot::error::Error;
use oneshot::oneshot::search;
use oneshot::oneshot::SearchOutcome;
use oneshot::oneshot::SearchStrategy;
use oneshot::step_game::GeneratorKind;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GeneratorArg {
	BufferedBfs,
	SimpleDfs,
	CachedDfs,
}

impl From<GeneratorArg> for GeneratorKind {
	fn from(arg: GeneratorArg) -> Self {
		match arg {
			GeneratorArg::BufferedBfs => GeneratorKind::BufferedBfs,
			GeneratorArg::SimpleDfs => GeneratorKind::SimpleDfs,
			GeneratorArg::CachedDfs => GeneratorKind::CachedDfs,
		}
	}
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
	Dfs,
	Bfs,
	MinDisprove,
}

impl From<StrategyArg> for SearchStrategy {
	fn from(arg: StrategyArg) -> Self {
		match arg {
			StrategyArg::Dfs => SearchStrategy::Dfs,
			StrategyArg::Bfs => SearchStrategy::Bfs,
			StrategyArg::MinDisprove => SearchStrategy::MinSigmaDisprove,
		}
	}
}

/// Safety verifier for Regular Transition Systems: runs one Oneshot search against a JSON
/// benchmark and property, then reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "oneshot")]
struct CliArgs {
	/// Path to the JSON benchmark file.
	#[arg(long)]
	benchmark: String,

	/// Name of the property (inside the benchmark's `properties` map) to check.
	#[arg(long)]
	property: String,

	/// Successor-column generator implementation.
	#[arg(long, value_enum, default_value = "cached-dfs")]
	generator: GeneratorArg,

	/// Joint-state search strategy.
	#[arg(long, value_enum, default_value = "dfs")]
	strategy: StrategyArg,

	/// Trade completeness for speed by deduplicating expansions on a coarser fingerprint.
	#[arg(long, default_value_t = false)]
	ignore_ambiguous: bool,

	/// Wall-clock timeout in seconds.
	#[arg(long, default_value_t = 20 * 60)]
	timeout: u64,

	/// Write a DOT rendering of I×B to this path before searching.
	#[arg(long)]
	dump_dot: Option<String>,
}

fn run() -> anyhow::Result<SearchOutcome> {
	let args: CliArgs = CliArgs::parse();

	let json: String =
		fs::read_to_string(&args.benchmark).with_context(|| format!("reading benchmark file {:?}", args.benchmark))?;
	let benchmark: Benchmark = load_benchmark(&json).map_err(anyhow_from_library_error)?;
	let ixb = benchmark.pairing(&args.property).map_err(anyhow_from_library_error)?;

	if let Some(dump_path) = &args.dump_dot {
		let dot: String = transducer_to_dot(&benchmark.codec, "ixb", &ixb);
		fs::write(dump_path, dot).with_context(|| format!("writing dot dump to {dump_path:?}"))?;
	}

	let cancellation: CancellationToken = CancellationToken::new();
	let timer_cancellation: CancellationToken = cancellation.clone();
	let timeout: Duration = Duration::from_secs(args.timeout);
	let (done_tx, done_rx) = mpsc::channel::<()>();
	thread::spawn(move || {
		if done_rx.recv_timeout(timeout).is_err() {
			timer_cancellation.cancel();
		}
	});

	let outcome: SearchOutcome = search(
		&benchmark.codec,
		&ixb,
		&benchmark.transducer,
		args.strategy.into(),
		args.generator.into(),
		args.ignore_ambiguous,
		&cancellation,
	);
	let _ = done_tx.send(());

	Ok(outcome)
}

fn anyhow_from_library_error(error: Error) -> anyhow::Error {
	anyhow::anyhow!(error.to_string())
}

fn main() -> ExitCode {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	match run() {
		Ok(outcome) => {
			let counters = outcome.counters();
			match outcome {
				SearchOutcome::Found { witness, .. } => {
					println!("found: witness ixb_state=q{} column={}", witness.ixb_state, witness.column);
				}
				SearchOutcome::Exhausted { .. } => println!("exhausted: no witness"),
				SearchOutcome::TimedOut { .. } => println!("timed_out: no witness within the deadline"),
			}
			println!(
				"explored_states={} explored_transitions={} cache_hits={}",
				counters.explored_states, counters.explored_transitions, counters.cache_hits
			);
			ExitCode::SUCCESS
		}
		Err(err) => {
			eprintln!("error: {err:#}");
			ExitCode::FAILURE
		}
	}
}
