//! Computer-controlled opponent.
//!
//! Decisions come in two layers. The macro-state ([`MacroState`]) says what
//! the controller is trying to do for the next second or two; the
//! micro-policy for that state (see `tactics`) turns distance and the
//! opponent's state into one [`Intent`]. Decisions are throttled by a
//! reaction delay and the last intent is held in between.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rng::DecisionRng;
use super::tactics::Situation;
use super::IntentSource;
use crate::combatant::{Combatant, FighterState};
use crate::config::{AiTuning, StageConfig};
use crate::intent::Intent;

/// Long-lived intention of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroState {
    /// Hold spacing and look for openings.
    Neutral,
    /// Close in and attack.
    Aggressive,
    /// Keep away, block and counter.
    Defensive,
    /// Run a combo on a stunned opponent.
    Punish,
    /// Get out, escape the corner.
    Retreat,
}

/// Low own hp below which the controller turns cautious.
const LOW_HP_FRACTION: f32 = 0.3;
/// Opponent hp above which a low own hp forces caution.
const HEALTHY_OPPONENT_FRACTION: f32 = 0.5;
/// Hp lead that forces aggression.
const LEAD_FRACTION: f32 = 0.3;

/// AI opponent that drives a combatant through the same [`Intent`] a human
/// would produce.
#[derive(Debug, Clone)]
pub struct OpponentController {
    pub(super) tuning: AiTuning,
    pub(super) stage: StageConfig,
    pub(super) difficulty: f32,
    seed: u64,
    pub(super) rng: DecisionRng,
    pub(super) macro_state: MacroState,
    next_decision_at: u64,
    next_reaction_at: u64,
    pub(super) consecutive_attacks: u32,
    pub(super) punish_step: usize,
    last_opponent_state: Option<FighterState>,
    held: Intent,
}

impl OpponentController {
    /// Create a controller. `difficulty` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(tuning: AiTuning, stage: StageConfig, difficulty: f32, seed: u64) -> Self {
        Self {
            tuning,
            stage,
            difficulty: difficulty.clamp(0.0, 1.0),
            seed,
            rng: DecisionRng::new(seed),
            macro_state: MacroState::Neutral,
            next_decision_at: 0,
            next_reaction_at: 0,
            consecutive_attacks: 0,
            punish_step: 0,
            last_opponent_state: None,
            held: Intent::IDLE,
        }
    }

    /// Create a controller from round configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::BrawlConfig, difficulty: f32, seed: u64) -> Self {
        Self::new(config.ai, config.stage, difficulty, seed)
    }

    /// Current macro-state.
    #[must_use]
    pub const fn macro_state(&self) -> MacroState {
        self.macro_state
    }

    /// Difficulty scalar in `[0, 1]`.
    #[must_use]
    pub const fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// When the next fresh decision will be made.
    #[must_use]
    pub const fn next_reaction_at(&self) -> u64 {
        self.next_reaction_at
    }

    /// Re-evaluate the macro-state from both combatants' health and state.
    pub fn update_macro_state(&mut self, own: &Combatant, opponent: &Combatant, now: u64) {
        let own_hp = own.hp_fraction();
        let opponent_hp = opponent.hp_fraction();

        let next = if matches!(
            opponent.state(),
            FighterState::Hitstun | FighterState::Stunned
        ) {
            if self.macro_state != MacroState::Punish {
                self.consecutive_attacks = 0;
                self.punish_step = 0;
            }
            MacroState::Punish
        } else if own_hp < LOW_HP_FRACTION && opponent_hp > HEALTHY_OPPONENT_FRACTION {
            match self.macro_state {
                MacroState::Defensive | MacroState::Retreat => self.macro_state,
                _ if self.rng.chance(0.7) => MacroState::Defensive,
                _ => MacroState::Retreat,
            }
        } else if own_hp - opponent_hp > LEAD_FRACTION {
            MacroState::Aggressive
        } else if self.macro_state == MacroState::Punish {
            // Opponent recovered.
            MacroState::Neutral
        } else if now >= self.next_decision_at {
            let roll = self.rng.next_f32();
            self.next_decision_at = now
                + self
                    .rng
                    .range_inclusive(self.tuning.decision_min_ms, self.tuning.decision_max_ms);
            if roll < 0.4 {
                MacroState::Aggressive
            } else if roll < 0.6 {
                MacroState::Defensive
            } else {
                MacroState::Neutral
            }
        } else {
            self.macro_state
        };

        if next != self.macro_state {
            debug!(from = ?self.macro_state, to = ?next, at = now, "Macro state change");
            if next == MacroState::Aggressive {
                self.consecutive_attacks = 0;
            }
            self.macro_state = next;
        }
    }

    fn reaction_delay(&mut self) -> u64 {
        let base = self.tuning.reaction_base_ms as f32;
        let floor = self.tuning.reaction_floor_ms as f32;
        let scaled = base + (floor - base) * self.difficulty;
        let jitter = self.rng.range_inclusive(0, self.tuning.reaction_jitter_ms);
        scaled.max(0.0) as u64 + jitter
    }

    fn decide(&mut self, own: &Combatant, opponent: &Combatant, now: u64) -> Intent {
        if own.is_ko() || opponent.is_ko() {
            return Intent::IDLE;
        }

        let attack_just_ended = self
            .last_opponent_state
            .is_some_and(FighterState::is_attacking)
            && !opponent.state().is_attacking();
        self.last_opponent_state = Some(opponent.state());

        self.update_macro_state(own, opponent, now);

        let situation = Situation::observe(own, opponent, &self.stage, &self.tuning, attack_just_ended);
        let mut intent = match self.macro_state {
            MacroState::Aggressive => self.aggressive(&situation),
            MacroState::Defensive => self.defensive(&situation),
            MacroState::Punish => self.punish(&situation),
            MacroState::Retreat => self.retreat(&situation),
            MacroState::Neutral => self.neutral(&situation),
        };

        if situation.own_airborne {
            self.airborne_overlay(&situation, &mut intent);
        } else if situation.opponent_airborne {
            self.anti_air_overlay(&situation, &mut intent);
        }
        intent
    }
}

impl IntentSource for OpponentController {
    fn next_intent(&mut self, own: &Combatant, opponent: &Combatant, now_ms: u64) -> Intent {
        if now_ms < self.next_reaction_at {
            return self.held;
        }
        self.held = self.decide(own, opponent, now_ms);
        self.next_reaction_at = now_ms + self.reaction_delay();
        self.held
    }

    fn reset(&mut self) {
        *self = Self::new(self.tuning, self.stage, self.difficulty, self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use crate::config::BrawlConfig;
    use crate::math::Fixed;

    fn setup(p2_x: i32) -> (Combatant, Combatant, OpponentController) {
        let config = BrawlConfig::standard();
        let own = Combatant::new(Side::P2, p2_x, &config);
        let opponent = Combatant::new(Side::P1, 300, &config);
        let controller = OpponentController::from_config(&config, 0.5, 7);
        (own, opponent, controller)
    }

    #[test]
    fn test_holds_intent_until_reaction_deadline() {
        let (own, opponent, mut ai) = setup(900);
        let first = ai.next_intent(&own, &opponent, 0);
        let deadline = ai.next_reaction_at();
        assert!(deadline >= 165, "deadline {deadline}");
        assert!(deadline <= 165 + 150);
        for now in (1..deadline).step_by(16) {
            assert_eq!(ai.next_intent(&own, &opponent, now), first);
        }
    }

    #[test]
    fn test_punish_when_opponent_stunned() {
        let (own, mut opponent, mut ai) = setup(400);
        opponent.take_damage(10, 0, Fixed::ZERO, Fixed::ZERO);
        ai.update_macro_state(&own, &opponent, 0);
        assert_eq!(ai.macro_state(), MacroState::Punish);
        assert_eq!(ai.punish_step, 0);
    }

    #[test]
    fn test_punish_ends_when_opponent_recovers() {
        let (own, mut opponent, mut ai) = setup(400);
        opponent.take_damage(10, 0, Fixed::ZERO, Fixed::ZERO);
        ai.update_macro_state(&own, &opponent, 0);
        assert_eq!(ai.macro_state(), MacroState::Punish);

        let mut now = 0;
        while opponent.state() == FighterState::Hitstun {
            now += 16;
            opponent.update(&Intent::IDLE, now);
        }
        ai.update_macro_state(&own, &opponent, now);
        assert_eq!(ai.macro_state(), MacroState::Neutral);
    }

    #[test]
    fn test_low_health_turns_cautious() {
        let (mut own, opponent, mut ai) = setup(900);
        own.take_damage(80, 0, Fixed::ZERO, Fixed::ZERO);
        ai.update_macro_state(&own, &opponent, 0);
        assert!(matches!(
            ai.macro_state(),
            MacroState::Defensive | MacroState::Retreat
        ));
    }

    #[test]
    fn test_health_lead_turns_aggressive() {
        let (own, mut opponent, mut ai) = setup(900);
        opponent.take_damage(50, 0, Fixed::ZERO, Fixed::ZERO);
        let mut now = 0;
        while opponent.state() == FighterState::Hitstun {
            opponent.update(&Intent::IDLE, now);
            now += 16;
        }
        assert_eq!(opponent.hp(), 50);
        ai.update_macro_state(&own, &opponent, now);
        assert_eq!(ai.macro_state(), MacroState::Aggressive);
    }

    #[test]
    fn test_knocked_out_controller_stays_idle() {
        let (mut own, opponent, mut ai) = setup(900);
        own.take_damage(500, 0, Fixed::ZERO, Fixed::ZERO);
        assert_eq!(ai.next_intent(&own, &opponent, 0), Intent::IDLE);
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let (own, opponent, mut a) = setup(700);
        let mut b = a.clone();
        let mut now = 0;
        while now < 10_000 {
            assert_eq!(
                a.next_intent(&own, &opponent, now),
                b.next_intent(&own, &opponent, now)
            );
            now += 16;
        }
    }

    #[test]
    fn test_reset_replays_from_seed() {
        let (own, opponent, mut ai) = setup(700);
        let first: Vec<Intent> = (0..200)
            .map(|i| ai.next_intent(&own, &opponent, i * 16))
            .collect();
        ai.reset();
        let second: Vec<Intent> = (0..200)
            .map(|i| ai.next_intent(&own, &opponent, i * 16))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_difficulty_is_clamped() {
        let config = BrawlConfig::standard();
        assert_eq!(OpponentController::from_config(&config, 3.0, 1).difficulty(), 1.0);
        assert_eq!(OpponentController::from_config(&config, -1.0, 1).difficulty(), 0.0);
    }
}
