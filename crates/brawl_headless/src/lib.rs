//! Headless round runner for AI testing and balance batches.
//!
//! Runs AI-vs-AI rounds of the combat core without rendering or input
//! devices. This enables:
//!
//! - **Balance testing**: Win rates and round lengths over many seeds
//! - **CI verification**: Determinism checks on seeded rounds
//! - **Tuning**: Load an alternative `BrawlConfig` from RON and compare
//!
//! # Example
//!
//! ```bash
//! # One round, JSON report on stdout
//! cargo run -p brawl_headless -- run --seed 7
//!
//! # 1000 rounds in parallel
//! cargo run -p brawl_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p brawl_headless -- verify --seed 12345 --runs 5
//! ```

pub mod batch;
pub mod error;
pub mod metrics;
pub mod runner;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use metrics::{BatchSummary, FighterMetrics, MatchReport, MetricsCollector};
pub use runner::{run_match, MatchConfig};
