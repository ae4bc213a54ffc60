//! Single-round runner: two seeded opponent controllers fight one round.

use brawl_core::config::BrawlConfig;
use brawl_core::controller::OpponentController;
use brawl_core::round::Round;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metrics::{MatchReport, MetricsCollector};

/// Default simulation step (roughly 60 Hz).
pub const DEFAULT_STEP_MS: u64 = 16;

/// Salt mixed into the P2 seed so the two controllers never share a stream.
const P2_SEED_SALT: u64 = 0xA5A5_5A5A_C3C3_3C3C;

/// Settings for one AI-vs-AI round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Seed both controllers are derived from.
    pub seed: u64,
    /// P1 controller difficulty in `[0, 1]`.
    pub p1_difficulty: f32,
    /// P2 controller difficulty in `[0, 1]`.
    pub p2_difficulty: f32,
    /// Simulation step in milliseconds.
    pub step_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            p1_difficulty: 0.5,
            p2_difficulty: 0.5,
            step_ms: DEFAULT_STEP_MS,
        }
    }
}

impl MatchConfig {
    /// Default settings with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Seeds for the P1 and P2 controllers.
    #[must_use]
    pub const fn controller_seeds(&self) -> (u64, u64) {
        (self.seed, self.seed ^ P2_SEED_SALT)
    }

    /// Build the round these settings describe.
    #[must_use]
    pub fn build_round(&self, config: &BrawlConfig) -> Round {
        let (s1, s2) = self.controller_seeds();
        Round::new(
            *config,
            Box::new(OpponentController::from_config(config, self.p1_difficulty, s1)),
            Box::new(OpponentController::from_config(config, self.p2_difficulty, s2)),
        )
    }
}

/// Run one round to its outcome and collect metrics.
pub fn run_match(config: &BrawlConfig, settings: &MatchConfig) -> MatchReport {
    let mut round = settings.build_round(config);
    let mut collector = MetricsCollector::new();
    let step = settings.step_ms.max(1);

    debug!(seed = settings.seed, "Match starting");

    let mut now = 0;
    let outcome = loop {
        let events = round.tick(now);
        collector.record(events.tick, &events.combat);
        if let Some(outcome) = events.outcome {
            break outcome;
        }
        now += step;
    };

    let report = collector.finish(
        settings.seed,
        (settings.p1_difficulty, settings.p2_difficulty),
        &outcome,
        round.tick_count(),
        round.state_hash(),
    );
    info!(
        seed = settings.seed,
        winner = ?report.winner,
        reason = ?report.reason,
        elapsed_ms = report.elapsed_ms,
        "Match finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_core::round::EndReason;
    use brawl_test_utils::fixtures::short_round_config;

    #[test]
    fn test_match_reaches_an_outcome() {
        let config = short_round_config(20);
        let report = run_match(&config, &MatchConfig::with_seed(3));

        assert!(report.elapsed_ms <= 20_000);
        assert!(report.ticks > 0);
        // Knockout blows report their full damage, overkill included.
        let dealt_to_p2 = report.p1.damage_dealt + report.p1.chip_dealt;
        let lost_by_p2 = config.fighter.max_hp - report.p2_hp;
        if report.reason == EndReason::Timeout {
            assert!(report.p1_hp > 0 && report.p2_hp > 0);
            assert_eq!(dealt_to_p2, lost_by_p2);
        } else {
            assert!(dealt_to_p2 >= lost_by_p2);
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = short_round_config(10);
        let settings = MatchConfig {
            seed: 77,
            p1_difficulty: 0.9,
            p2_difficulty: 0.2,
            step_ms: 16,
        };
        assert_eq!(run_match(&config, &settings), run_match(&config, &settings));
    }

    #[test]
    fn test_controller_seeds_differ() {
        let (a, b) = MatchConfig::with_seed(0).controller_seeds();
        assert_ne!(a, b);
    }
}
