//! A single round: two combatants, their intent sources, the resolver and
//! the countdown.
//!
//! Each [`Round::tick`] runs the fixed order:
//! 1. Both intent sources decide from the pre-tick state.
//! 2. P1 updates, then P2.
//! 3. Overlapping bodies are pushed apart.
//! 4. The encounter resolver runs.
//! 5. Knockout and timeout are checked.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::combatant::{Combatant, Side};
use crate::config::BrawlConfig;
use crate::controller::IntentSource;
use crate::events::CombatEvent;
use crate::intent::Intent;
use crate::math::Fixed;
use crate::resolver::EncounterResolver;

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// A combatant reached zero hp.
    Knockout,
    /// The countdown ran out.
    Timeout,
}

/// Final result of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Winning side, `None` for a draw.
    pub winner: Option<Side>,
    /// How the round ended.
    pub reason: EndReason,
    /// Milliseconds since the round started.
    pub elapsed_ms: u64,
    /// P1 hp at the end.
    pub p1_hp: u32,
    /// P2 hp at the end.
    pub p2_hp: u32,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Tick index, starting at zero.
    pub tick: u64,
    /// Hits, blocks, clashes and knockouts.
    pub combat: Vec<CombatEvent>,
    /// Set on the tick the round ends.
    pub outcome: Option<RoundOutcome>,
}

/// One round between two combatants.
pub struct Round {
    config: BrawlConfig,
    p1: Combatant,
    p2: Combatant,
    p1_source: Box<dyn IntentSource>,
    p2_source: Box<dyn IntentSource>,
    resolver: EncounterResolver,
    tick: u64,
    started_at: Option<u64>,
    outcome: Option<RoundOutcome>,
}

impl std::fmt::Debug for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Round")
            .field("tick", &self.tick)
            .field("p1", &self.p1)
            .field("p2", &self.p2)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Round {
    /// Set up a round with both combatants at their spawn points.
    #[must_use]
    pub fn new(
        config: BrawlConfig,
        p1_source: Box<dyn IntentSource>,
        p2_source: Box<dyn IntentSource>,
    ) -> Self {
        Self {
            p1: Combatant::spawn(Side::P1, &config),
            p2: Combatant::spawn(Side::P2, &config),
            resolver: EncounterResolver::new(&config),
            config,
            p1_source,
            p2_source,
            tick: 0,
            started_at: None,
            outcome: None,
        }
    }

    /// Advance the round to simulation time `now` (ms).
    ///
    /// The first call starts the countdown. After the round has ended the
    /// combatants keep settling under physics but nothing else happens.
    pub fn tick(&mut self, now: u64) -> TickEvents {
        let tick = self.tick;
        self.tick += 1;

        if self.outcome.is_some() {
            self.p1.update(&Intent::IDLE, now);
            self.p2.update(&Intent::IDLE, now);
            self.resolver.release_due(&mut self.p1, &mut self.p2, now);
            return TickEvents {
                tick,
                ..TickEvents::default()
            };
        }

        let started_at = *self.started_at.get_or_insert(now);

        let p1_intent = self.p1_source.next_intent(&self.p1, &self.p2, now);
        let p2_intent = self.p2_source.next_intent(&self.p2, &self.p1, now);

        self.p1.update(&p1_intent, now);
        self.p2.update(&p2_intent, now);
        self.separate_bodies();

        let combat = self.resolver.update(&mut self.p1, &mut self.p2, now);
        let outcome = self.check_outcome(now.saturating_sub(started_at));
        if let Some(outcome) = outcome {
            info!(
                winner = ?outcome.winner,
                reason = ?outcome.reason,
                elapsed_ms = outcome.elapsed_ms,
                p1_hp = outcome.p1_hp,
                p2_hp = outcome.p2_hp,
                "Round over"
            );
            self.outcome = Some(outcome);
        }

        trace!(tick, hash = self.state_hash(), "Tick");
        TickEvents {
            tick,
            combat,
            outcome,
        }
    }

    /// Tick at a fixed step from `start` until the round ends.
    pub fn run_to_end(&mut self, start: u64, step_ms: u64) -> RoundOutcome {
        let step = step_ms.max(1);
        let mut now = start;
        loop {
            if let Some(outcome) = self.tick(now).outcome {
                return outcome;
            }
            if let Some(outcome) = self.outcome {
                return outcome;
            }
            now += step;
        }
    }

    fn separate_bodies(&mut self) {
        let overlap = self.p1.hurtbox().horizontal_overlap(&self.p2.hurtbox());
        if overlap <= Fixed::ZERO {
            return;
        }
        let (left, right) = if self.p1.position().x <= self.p2.position().x {
            (&mut self.p1, &mut self.p2)
        } else {
            (&mut self.p2, &mut self.p1)
        };
        let half = overlap / Fixed::from_num(2);
        left.shift_x(-half);
        right.shift_x(overlap - half);

        // One side is against a wall: the other takes the remainder.
        let rest = left.hurtbox().horizontal_overlap(&right.hurtbox());
        if rest > Fixed::ZERO {
            right.shift_x(rest);
            let rest = left.hurtbox().horizontal_overlap(&right.hurtbox());
            if rest > Fixed::ZERO {
                left.shift_x(-rest);
            }
        }
    }

    fn check_outcome(&self, elapsed_ms: u64) -> Option<RoundOutcome> {
        let (p1_ko, p2_ko) = (self.p1.is_ko(), self.p2.is_ko());
        let (winner, reason) = if p1_ko || p2_ko {
            let winner = match (p1_ko, p2_ko) {
                (true, false) => Some(Side::P2),
                (false, true) => Some(Side::P1),
                _ => None,
            };
            (winner, EndReason::Knockout)
        } else if elapsed_ms >= self.config.round_duration_ms() {
            let winner = match self.p1.hp().cmp(&self.p2.hp()) {
                std::cmp::Ordering::Greater => Some(Side::P1),
                std::cmp::Ordering::Less => Some(Side::P2),
                std::cmp::Ordering::Equal => None,
            };
            (winner, EndReason::Timeout)
        } else {
            return None;
        };

        Some(RoundOutcome {
            winner,
            reason,
            elapsed_ms,
            p1_hp: self.p1.hp(),
            p2_hp: self.p2.hp(),
        })
    }

    /// Restore the round-start state: full hp, spawn points, fresh sources,
    /// countdown stopped.
    pub fn reset(&mut self) {
        self.p1.reset();
        self.p2.reset();
        self.p1_source.reset();
        self.p2_source.reset();
        self.resolver.reset();
        self.tick = 0;
        self.started_at = None;
        self.outcome = None;
        info!("Round reset");
    }

    /// Player one.
    #[must_use]
    pub const fn p1(&self) -> &Combatant {
        &self.p1
    }

    /// Player two.
    #[must_use]
    pub const fn p2(&self) -> &Combatant {
        &self.p2
    }

    /// Combatant for a side.
    #[must_use]
    pub const fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::P1 => &self.p1,
            Side::P2 => &self.p2,
        }
    }

    /// Result, once the round has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    /// Whether the round has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BrawlConfig {
        &self.config
    }

    /// Milliseconds left on the countdown at `now`.
    #[must_use]
    pub fn remaining_ms(&self, now: u64) -> u64 {
        let duration = self.config.round_duration_ms();
        match self.started_at {
            Some(started) => duration.saturating_sub(now.saturating_sub(started)),
            None => duration,
        }
    }

    /// Whole seconds shown on the countdown at `now`, rounded up.
    #[must_use]
    pub fn remaining_secs(&self, now: u64) -> u64 {
        self.remaining_ms(now).div_ceil(1000)
    }

    /// Hash of the simulation-relevant state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.p1.hash_state(&mut hasher);
        self.p2.hash_state(&mut hasher);
        self.resolver.is_hit_stopped().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::AttackKind;
    use crate::controller::{ConstantIntent, ScriptedIntents};

    fn idle_round(config: BrawlConfig) -> Round {
        Round::new(
            config,
            Box::new(ConstantIntent::idle()),
            Box::new(ConstantIntent::idle()),
        )
    }

    #[test]
    fn test_timeout_draw_when_nobody_fights() {
        let mut config = BrawlConfig::standard();
        config.round_duration_secs = 2;
        let mut round = idle_round(config);

        let outcome = round.run_to_end(0, 16);
        assert_eq!(outcome.reason, EndReason::Timeout);
        assert_eq!(outcome.winner, None);
        assert!(outcome.elapsed_ms >= 2_000);
        assert!(round.is_over());
    }

    #[test]
    fn test_timeout_goes_to_higher_hp() {
        let mut config = BrawlConfig::standard();
        config.round_duration_secs = 3;
        config.stage.p2_spawn_x = 380;
        let script = ScriptedIntents::new()
            .at(0, Intent::attacking(AttackKind::Jab))
            .at(100, Intent::IDLE);
        let mut round = Round::new(config, Box::new(script), Box::new(ConstantIntent::idle()));

        let outcome = round.run_to_end(0, 16);
        assert_eq!(outcome.reason, EndReason::Timeout);
        assert_eq!(outcome.winner, Some(Side::P1));
        assert_eq!(outcome.p2_hp, 95);
    }

    #[test]
    fn test_knockout_ends_round() {
        let mut config = BrawlConfig::standard();
        config.fighter.max_hp = 10;
        config.stage.p2_spawn_x = 380;
        let mut round = Round::new(
            config,
            Box::new(ConstantIntent(Intent::attacking(AttackKind::Kick))),
            Box::new(ConstantIntent::idle()),
        );

        let outcome = round.run_to_end(0, 16);
        assert_eq!(outcome.reason, EndReason::Knockout);
        assert_eq!(outcome.winner, Some(Side::P1));
        assert_eq!(outcome.p2_hp, 0);

        // Ticks after the end report nothing new.
        let events = round.tick(outcome.elapsed_ms + 16);
        assert!(events.outcome.is_none());
        assert!(events.combat.is_empty());
    }

    #[test]
    fn test_bodies_do_not_pass_through() {
        let mut round = Round::new(
            BrawlConfig::standard(),
            Box::new(ConstantIntent(Intent::walking(1))),
            Box::new(ConstantIntent(Intent::walking(-1))),
        );
        let mut now = 0;
        for _ in 0..300 {
            round.tick(now);
            now += 16;
            let gap = round.p2().position().x - round.p1().position().x;
            assert!(gap >= Fixed::from_num(80), "gap {gap}");
        }
    }

    #[test]
    fn test_separation_respects_walls() {
        let mut config = BrawlConfig::standard();
        config.stage.p1_spawn_x = 1_150;
        config.stage.p2_spawn_x = 1_200;
        let mut round = Round::new(
            config,
            Box::new(ConstantIntent(Intent::walking(1))),
            Box::new(ConstantIntent::idle()),
        );
        let mut now = 0;
        for _ in 0..60 {
            round.tick(now);
            now += 16;
        }
        assert_eq!(round.p2().position().x, Fixed::from_num(1_240));
        assert!(round.p2().position().x - round.p1().position().x >= Fixed::from_num(80));
    }

    #[test]
    fn test_countdown() {
        let mut round = idle_round(BrawlConfig::standard());
        assert_eq!(round.remaining_secs(0), 99);
        round.tick(1_000);
        assert_eq!(round.remaining_ms(1_500), 98_500);
        assert_eq!(round.remaining_secs(1_500), 99);
        assert_eq!(round.remaining_secs(200_000), 0);
    }

    #[test]
    fn test_reset_restarts_round() {
        let mut config = BrawlConfig::standard();
        config.round_duration_secs = 1;
        let mut round = idle_round(config);
        let fresh = round.state_hash();
        round.run_to_end(0, 16);
        assert_ne!(round.state_hash(), fresh);

        round.reset();
        assert!(!round.is_over());
        assert_eq!(round.tick_count(), 0);
        assert_eq!(round.state_hash(), fresh);
    }
}
