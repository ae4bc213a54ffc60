//! Batch round runner for balance testing.
//!
//! Runs many seeded rounds in parallel using rayon and aggregates their
//! reports.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use brawl_core::config::BrawlConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HeadlessError, Result};
use crate::metrics::{BatchSummary, MatchReport};
use crate::runner::{run_match, MatchConfig, DEFAULT_STEP_MS};

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of rounds to run.
    pub match_count: u32,
    /// Maximum parallel rounds (0 = use rayon default).
    pub parallel: u32,
    /// Starting seed; round `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// P1 controller difficulty.
    pub p1_difficulty: f32,
    /// P2 controller difficulty.
    pub p2_difficulty: f32,
    /// Simulation step in milliseconds.
    pub step_ms: u64,
    /// Output directory for results.
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            match_count: 100,
            parallel: 0,
            seed_start: 0,
            p1_difficulty: 0.5,
            p2_difficulty: 0.5,
            step_ms: DEFAULT_STEP_MS,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create a config for `match_count` rounds.
    pub fn new(match_count: u32) -> Self {
        Self {
            match_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set both controller difficulties.
    pub fn with_difficulties(mut self, p1: f32, p2: f32) -> Self {
        self.p1_difficulty = p1;
        self.p2_difficulty = p2;
        self
    }

    fn match_config(&self, index: u32) -> MatchConfig {
        MatchConfig {
            seed: self.seed_start.wrapping_add(u64::from(index)),
            p1_difficulty: self.p1_difficulty,
            p2_difficulty: self.p2_difficulty,
            step_ms: self.step_ms,
        }
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Round tuning used.
    pub round_config: BrawlConfig,
    /// Individual round reports, in seed order.
    pub matches: Vec<MatchReport>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HeadlessError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| HeadlessError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| HeadlessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Run a batch of rounds.
pub fn run_batch(config: BatchConfig, round_config: &BrawlConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        matches = config.match_count,
        seed_start = config.seed_start,
        p1_difficulty = config.p1_difficulty,
        p2_difficulty = config.p2_difficulty,
        "Starting batch run"
    );

    let run = || -> Vec<MatchReport> {
        (0..config.match_count)
            .into_par_iter()
            .map(|i| {
                let report = run_match(round_config, &config.match_config(i));
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    debug!("Progress: {}/{}", done, config.match_count);
                }
                report
            })
            .collect()
    };

    let matches = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "Could not build thread pool, using the global one");
                run()
            }
        }
    } else {
        run()
    };

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        round_config: *round_config,
        matches,
        summary,
        duration_seconds,
    }
}

/// Run the same seed `runs` times and check every report matches.
pub fn verify_determinism(round_config: &BrawlConfig, settings: &MatchConfig, runs: u32) -> Result<bool> {
    if runs == 0 {
        return Err(HeadlessError::Empty("verification needs at least one run"));
    }
    let first = run_match(round_config, settings);
    let identical = (1..runs).all(|_| run_match(round_config, settings) == first);
    if !identical {
        warn!(seed = settings.seed, "Runs diverged");
    }
    Ok(identical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_test_utils::fixtures::short_round_config;

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_difficulties(0.2, 0.8);

        assert_eq!(config.match_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.match_config(3).seed, 12348);
        assert_eq!(config.match_config(0).p2_difficulty, 0.8);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(BatchConfig::new(6).with_seed(40), &short_round_config(10));

        assert_eq!(results.matches.len(), 6);
        assert_eq!(results.summary.total_matches, 6);
        let seeds: Vec<u64> = results.matches.iter().map(|m| m.seed).collect();
        assert_eq!(seeds, (40..46).collect::<Vec<_>>());
        assert_eq!(
            results.summary.p1_wins + results.summary.p2_wins + results.summary.draws,
            6
        );
    }

    #[test]
    fn test_parallel_pool_matches_global_pool() {
        let config = short_round_config(8);
        let global = run_batch(BatchConfig::new(4), &config);
        let pooled = run_batch(
            BatchConfig {
                parallel: 2,
                ..BatchConfig::new(4)
            },
            &config,
        );
        assert_eq!(global.matches, pooled.matches);
    }

    #[test]
    fn test_verify_determinism() {
        let config = short_round_config(10);
        assert!(verify_determinism(&config, &MatchConfig::with_seed(9), 3).unwrap());
        assert!(matches!(
            verify_determinism(&config, &MatchConfig::with_seed(9), 0),
            Err(HeadlessError::Empty(_))
        ));
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(BatchConfig::new(3), &short_round_config(5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.matches, results.matches);
        assert_eq!(loaded.round_config.round_duration_secs, 5);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            BatchResults::load(Path::new("/no/such/results.json")),
            Err(HeadlessError::Io { .. })
        ));
    }
}
