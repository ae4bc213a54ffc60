//! Test fixtures and helpers.
//!
//! Pre-built fighter pairs and rounds for consistent testing, plus small
//! drivers that advance them at a fixed frame step.

use brawl_core::prelude::*;
use fixed::types::I32F32;

/// Frame step used by the drivers (roughly 60 Hz).
pub const FRAME_MS: u64 = 16;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Two grounded fighters facing each other, P1 at x = 400 and P2 `gap`
/// units to its right.
#[derive(Debug, Clone)]
pub struct FighterPair {
    /// Player one.
    pub p1: Combatant,
    /// Player two.
    pub p2: Combatant,
    /// Resolver shared by both.
    pub resolver: EncounterResolver,
    /// Simulation time of the next step.
    pub now: u64,
}

impl FighterPair {
    /// Fighters `gap` units apart under the standard configuration.
    #[must_use]
    pub fn at_distance(gap: i32) -> Self {
        Self::with_config(&BrawlConfig::standard(), gap)
    }

    /// Fighters `gap` units apart under `config`.
    #[must_use]
    pub fn with_config(config: &BrawlConfig, gap: i32) -> Self {
        let mut pair = Self {
            p1: Combatant::new(Side::P1, 400, config),
            p2: Combatant::new(Side::P2, 400 + gap, config),
            resolver: EncounterResolver::new(config),
            now: 0,
        };
        // Settle the facing and the first-frame clock.
        pair.step(&Intent::IDLE, &Intent::IDLE);
        pair
    }

    /// Advance one frame with the given intents; returns the combat events.
    pub fn step(&mut self, p1: &Intent, p2: &Intent) -> Vec<CombatEvent> {
        let now = self.now;
        self.p1.update(p1, now);
        self.p2.update(p2, now);
        let events = self.resolver.update(&mut self.p1, &mut self.p2, now);
        self.now += FRAME_MS;
        events
    }

    /// Advance `frames` frames holding the same intents; collects every event.
    pub fn hold(&mut self, p1: &Intent, p2: &Intent, frames: u32) -> Vec<CombatEvent> {
        (0..frames).flat_map(|_| self.step(p1, p2)).collect()
    }

    /// Advance with idle intents until `pred` holds or `max_frames` pass.
    /// Returns whether the predicate was met.
    pub fn idle_until<F>(&mut self, max_frames: u32, mut pred: F) -> bool
    where
        F: FnMut(&Self) -> bool,
    {
        for _ in 0..max_frames {
            if pred(self) {
                return true;
            }
            self.step(&Intent::IDLE, &Intent::IDLE);
        }
        pred(self)
    }

    /// Horizontal distance between the two fighters.
    #[must_use]
    pub fn distance(&self) -> I32F32 {
        (self.p2.position().x - self.p1.position().x).abs()
    }
}

/// A round driven by two AI controllers with the given seeds.
#[must_use]
pub fn ai_round(config: BrawlConfig, difficulty: f32, seeds: (u64, u64)) -> Round {
    let p1 = OpponentController::from_config(&config, difficulty, seeds.0);
    let p2 = OpponentController::from_config(&config, difficulty, seeds.1);
    Round::new(config, Box::new(p1), Box::new(p2))
}

/// A round where both sides stand still.
#[must_use]
pub fn idle_round(config: BrawlConfig) -> Round {
    Round::new(
        config,
        Box::new(ConstantIntent::idle()),
        Box::new(ConstantIntent::idle()),
    )
}

/// A round with P1 following a script and P2 holding a constant intent.
#[must_use]
pub fn scripted_round(config: BrawlConfig, p1: ScriptedIntents, p2: Intent) -> Round {
    Round::new(config, Box::new(p1), Box::new(ConstantIntent(p2)))
}

/// Configuration with a short countdown, for timeout tests.
#[must_use]
pub fn short_round_config(secs: u32) -> BrawlConfig {
    BrawlConfig {
        round_duration_secs: secs,
        ..BrawlConfig::standard()
    }
}

/// Tick a round `ticks` times at [`FRAME_MS`], starting at `start`.
/// Returns the time of the next tick.
pub fn run_ticks(round: &mut Round, start: u64, ticks: u64) -> u64 {
    let mut now = start;
    for _ in 0..ticks {
        round.tick(now);
        now += FRAME_MS;
    }
    now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_starts_facing_each_other() {
        let pair = FighterPair::at_distance(100);
        assert_eq!(pair.p1.facing(), Facing::Right);
        assert_eq!(pair.p2.facing(), Facing::Left);
        assert_eq!(pair.distance(), fixed(100));
        assert_eq!(pair.now, FRAME_MS);
    }

    #[test]
    fn test_idle_until_reports_timeout() {
        let mut pair = FighterPair::at_distance(300);
        assert!(!pair.idle_until(5, |p| p.p1.is_ko()));
        assert!(pair.idle_until(5, |p| p.p1.state() == FighterState::Idle));
    }

    #[test]
    fn test_short_round_config() {
        let config = short_round_config(3);
        assert_eq!(config.round_duration_ms(), 3000);
        assert!(config.validate().is_ok());
    }
}
