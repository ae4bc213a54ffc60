//! Headless brawl runner.
//!
//! Runs AI-vs-AI rounds without graphics. Reports go to stdout as JSON,
//! logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run a single round
//! cargo run -p brawl_headless -- run --seed 42 --p1-difficulty 0.8
//!
//! # Run a batch with custom tuning
//! cargo run -p brawl_headless -- --config tuning.ron batch --count 500
//!
//! # Verify determinism
//! cargo run -p brawl_headless -- verify --seed 12345 --runs 5
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brawl_core::config::BrawlConfig;
use brawl_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{run_match, MatchConfig, DEFAULT_STEP_MS},
    Result,
};

#[derive(Parser)]
#[command(name = "brawl_headless")]
#[command(about = "Headless AI-vs-AI round runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Round configuration (RON); defaults to the built-in tuning
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single round and print its report
    Run {
        /// Controller seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// P1 difficulty in [0, 1]
        #[arg(long, default_value = "0.5")]
        p1_difficulty: f32,

        /// P2 difficulty in [0, 1]
        #[arg(long, default_value = "0.5")]
        p2_difficulty: f32,

        /// Simulation step in milliseconds
        #[arg(long, default_value_t = DEFAULT_STEP_MS)]
        step_ms: u64,
    },

    /// Run a batch of rounds for balance testing
    Batch {
        /// Number of rounds to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Maximum parallel rounds (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// P1 difficulty in [0, 1]
        #[arg(long, default_value = "0.5")]
        p1_difficulty: f32,

        /// P2 difficulty in [0, 1]
        #[arg(long, default_value = "0.5")]
        p2_difficulty: f32,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the reports.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let round_config = match &cli.config {
        Some(path) => BrawlConfig::load(path)?,
        None => BrawlConfig::standard(),
    };

    match cli.command.unwrap_or(Commands::Run {
        seed: 0,
        p1_difficulty: 0.5,
        p2_difficulty: 0.5,
        step_ms: DEFAULT_STEP_MS,
    }) {
        Commands::Run {
            seed,
            p1_difficulty,
            p2_difficulty,
            step_ms,
        } => {
            let settings = MatchConfig {
                seed,
                p1_difficulty,
                p2_difficulty,
                step_ms,
            };
            let report = run_match(&round_config, &settings);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch {
            count,
            parallel,
            output,
            seed,
            p1_difficulty,
            p2_difficulty,
        } => cmd_batch(
            &round_config,
            BatchConfig {
                match_count: count,
                parallel,
                seed_start: seed,
                p1_difficulty,
                p2_difficulty,
                step_ms: DEFAULT_STEP_MS,
                output_dir: output,
            },
        ),
        Commands::Verify { seed, runs } => {
            let deterministic =
                verify_determinism(&round_config, &MatchConfig::with_seed(seed), runs)?;
            if deterministic {
                eprintln!("✓ Seed {seed} is deterministic over {runs} runs");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("✗ Seed {seed} diverged");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn cmd_batch(round_config: &BrawlConfig, config: BatchConfig) -> Result<ExitCode> {
    let output = config.output_dir.clone();
    let results = run_batch(config, round_config);

    let results_path = output.join("batch_results.json");
    results.save(&results_path)?;

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Rounds played: {}", summary.total_matches);
    eprintln!(
        "P1 wins: {} ({:.1}%)  P2 wins: {} ({:.1}%)  Draws: {}",
        summary.p1_wins,
        summary.p1_win_rate * 100.0,
        summary.p2_wins,
        summary.p2_win_rate * 100.0,
        summary.draws
    );
    eprintln!(
        "Knockouts: {}  Timeouts: {}",
        summary.knockouts, summary.timeouts
    );
    eprintln!(
        "Average round: {:.1}s  Average clashes: {:.1}  Average best combo: {:.1}",
        summary.avg_duration_ms / 1000.0,
        summary.avg_clashes,
        summary.avg_max_combo
    );
    eprintln!("Results: {}", results_path.display());
    Ok(ExitCode::SUCCESS)
}
