//! Match metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches the combat events of one round and turns
//! them into a [`MatchReport`]; [`BatchSummary`] aggregates many reports.

use brawl_core::combatant::Side;
use brawl_core::events::CombatEvent;
use brawl_core::round::{EndReason, RoundOutcome};
use serde::{Deserialize, Serialize};

/// Per-side combat statistics for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterMetrics {
    /// Damage dealt by clean hits.
    pub damage_dealt: u32,
    /// Chip damage dealt into a block.
    pub chip_dealt: u32,
    /// Clean hits landed.
    pub hits_landed: u32,
    /// Hits that were blocked by the opponent.
    pub hits_blocked: u32,
    /// Clean hits that caught the opponent mid-attack.
    pub counter_hits: u32,
    /// Longest combo reached.
    pub max_combo: u32,
    /// Tick of the first clean hit.
    pub first_hit_tick: Option<u64>,
}

/// Complete metrics for a single round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Seed the controllers were derived from.
    pub seed: u64,
    /// P1 controller difficulty.
    pub p1_difficulty: f32,
    /// P2 controller difficulty.
    pub p2_difficulty: f32,
    /// Winner, `None` for a draw.
    pub winner: Option<Side>,
    /// How the round ended.
    pub reason: EndReason,
    /// Round length in simulation milliseconds.
    pub elapsed_ms: u64,
    /// Ticks run.
    pub ticks: u64,
    /// Final P1 hp.
    pub p1_hp: u32,
    /// Final P2 hp.
    pub p2_hp: u32,
    /// P1 statistics.
    pub p1: FighterMetrics,
    /// P2 statistics.
    pub p2: FighterMetrics,
    /// Attack clashes.
    pub clashes: u32,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

/// Accumulates combat events over a round.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    p1: FighterMetrics,
    p2: FighterMetrics,
    clashes: u32,
}

impl MetricsCollector {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn side_mut(&mut self, side: Side) -> &mut FighterMetrics {
        match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        }
    }

    /// Record the events of one tick.
    pub fn record(&mut self, tick: u64, events: &[CombatEvent]) {
        for event in events {
            match *event {
                CombatEvent::HitLanded {
                    attacker,
                    damage,
                    combo,
                    counter_hit,
                    ..
                } => {
                    let stats = self.side_mut(attacker);
                    stats.damage_dealt += damage;
                    stats.hits_landed += 1;
                    stats.max_combo = stats.max_combo.max(combo);
                    if counter_hit {
                        stats.counter_hits += 1;
                    }
                    stats.first_hit_tick.get_or_insert(tick);
                }
                CombatEvent::Blocked { attacker, chip, .. } => {
                    let stats = self.side_mut(attacker);
                    stats.chip_dealt += chip;
                    stats.hits_blocked += 1;
                }
                CombatEvent::Clash => self.clashes += 1,
                CombatEvent::Knockout { .. } | CombatEvent::ComboChanged { .. } => {}
            }
        }
    }

    /// Finish the report once the round has an outcome.
    #[must_use]
    pub fn finish(
        self,
        seed: u64,
        difficulties: (f32, f32),
        outcome: &RoundOutcome,
        ticks: u64,
        final_state_hash: u64,
    ) -> MatchReport {
        MatchReport {
            seed,
            p1_difficulty: difficulties.0,
            p2_difficulty: difficulties.1,
            winner: outcome.winner,
            reason: outcome.reason,
            elapsed_ms: outcome.elapsed_ms,
            ticks,
            p1_hp: outcome.p1_hp,
            p2_hp: outcome.p2_hp,
            p1: self.p1,
            p2: self.p2,
            clashes: self.clashes,
            final_state_hash,
        }
    }
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Rounds played.
    pub total_matches: u32,
    /// Rounds won by P1.
    pub p1_wins: u32,
    /// Rounds won by P2.
    pub p2_wins: u32,
    /// Drawn rounds.
    pub draws: u32,
    /// Rounds decided by knockout.
    pub knockouts: u32,
    /// Rounds decided by the countdown.
    pub timeouts: u32,
    /// P1 win rate in `[0, 1]`.
    pub p1_win_rate: f64,
    /// P2 win rate in `[0, 1]`.
    pub p2_win_rate: f64,
    /// Average round length in milliseconds.
    pub avg_duration_ms: f64,
    /// Shortest round.
    pub min_duration_ms: u64,
    /// Longest round.
    pub max_duration_ms: u64,
    /// Average clashes per round.
    pub avg_clashes: f64,
    /// Average longest combo per round, over both sides.
    pub avg_max_combo: f64,
}

impl BatchSummary {
    /// Compute summary from match reports.
    #[must_use]
    pub fn from_matches(matches: &[MatchReport]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_matches: matches.len() as u32,
            min_duration_ms: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut clash_sum = 0u64;
        let mut combo_sum = 0u64;

        for report in matches {
            match report.winner {
                Some(Side::P1) => summary.p1_wins += 1,
                Some(Side::P2) => summary.p2_wins += 1,
                None => summary.draws += 1,
            }
            match report.reason {
                EndReason::Knockout => summary.knockouts += 1,
                EndReason::Timeout => summary.timeouts += 1,
            }
            duration_sum += report.elapsed_ms;
            summary.min_duration_ms = summary.min_duration_ms.min(report.elapsed_ms);
            summary.max_duration_ms = summary.max_duration_ms.max(report.elapsed_ms);
            clash_sum += u64::from(report.clashes);
            combo_sum += u64::from(report.p1.max_combo.max(report.p2.max_combo));
        }

        let total = f64::from(summary.total_matches);
        summary.p1_win_rate = f64::from(summary.p1_wins) / total;
        summary.p2_win_rate = f64::from(summary.p2_wins) / total;
        summary.avg_duration_ms = duration_sum as f64 / total;
        summary.avg_clashes = clash_sum as f64 / total;
        summary.avg_max_combo = combo_sum as f64 / total;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_core::attack::AttackKind;

    fn outcome(winner: Option<Side>, reason: EndReason, elapsed_ms: u64) -> RoundOutcome {
        RoundOutcome {
            winner,
            reason,
            elapsed_ms,
            p1_hp: 50,
            p2_hp: 40,
        }
    }

    #[test]
    fn test_collector_counts_hits_blocks_and_clashes() {
        let mut collector = MetricsCollector::new();
        collector.record(
            3,
            &[
                CombatEvent::HitLanded {
                    attacker: Side::P1,
                    defender: Side::P2,
                    attack: Some(AttackKind::Kick),
                    damage: 14,
                    combo: 1,
                    counter_hit: false,
                },
                CombatEvent::ComboChanged {
                    side: Side::P1,
                    count: 1,
                },
            ],
        );
        collector.record(
            9,
            &[CombatEvent::HitLanded {
                attacker: Side::P1,
                defender: Side::P2,
                attack: Some(AttackKind::Jab),
                damage: 7,
                combo: 2,
                counter_hit: true,
            }],
        );
        collector.record(
            12,
            &[
                CombatEvent::Blocked {
                    attacker: Side::P2,
                    defender: Side::P1,
                    chip: 2,
                },
                CombatEvent::Clash,
            ],
        );

        let report = collector.finish(
            1,
            (0.5, 0.5),
            &outcome(Some(Side::P1), EndReason::Timeout, 1000),
            62,
            0,
        );
        assert_eq!(report.p1.damage_dealt, 21);
        assert_eq!(report.p1.hits_landed, 2);
        assert_eq!(report.p1.counter_hits, 1);
        assert_eq!(report.p1.max_combo, 2);
        assert_eq!(report.p1.first_hit_tick, Some(3));
        assert_eq!(report.p2.chip_dealt, 2);
        assert_eq!(report.p2.hits_blocked, 1);
        assert_eq!(report.p2.hits_landed, 0);
        assert_eq!(report.clashes, 1);
    }

    #[test]
    fn test_summary_rates() {
        let report = |winner, reason, elapsed| {
            MetricsCollector::new().finish(0, (0.5, 0.5), &outcome(winner, reason, elapsed), 0, 0)
        };
        let matches = vec![
            report(Some(Side::P1), EndReason::Knockout, 10_000),
            report(Some(Side::P1), EndReason::Knockout, 20_000),
            report(Some(Side::P2), EndReason::Timeout, 99_000),
            report(None, EndReason::Timeout, 99_000),
        ];
        let summary = BatchSummary::from_matches(&matches);

        assert_eq!(summary.total_matches, 4);
        assert_eq!((summary.p1_wins, summary.p2_wins, summary.draws), (2, 1, 1));
        assert_eq!((summary.knockouts, summary.timeouts), (2, 2));
        assert!((summary.p1_win_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.min_duration_ms, 10_000);
        assert_eq!(summary.max_duration_ms, 99_000);
        assert!((summary.avg_duration_ms - 57_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_matches(&[]), BatchSummary::default());
    }
}
