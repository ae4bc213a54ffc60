//! Micro-policies: one intent per decision, chosen by macro-state.
//!
//! Every policy reads a [`Situation`] snapshot. Probabilities that should
//! get sharper with difficulty are written as `base + span * difficulty`.

use super::opponent::{MacroState, OpponentController};
use crate::attack::AttackKind;
use crate::combatant::{Combatant, FighterState};
use crate::config::{AiTuning, StageConfig};
use crate::intent::Intent;

/// Punish string, in order.
pub(crate) const PUNISH_COMBO: [AttackKind; 4] = [
    AttackKind::Jab,
    AttackKind::Jab,
    AttackKind::Punch,
    AttackKind::Kick,
];

/// What the controller sees when it decides.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Situation {
    /// Horizontal distance between anchors.
    pub distance: i32,
    /// Direction toward the opponent: -1 or 1.
    pub toward: i32,
    /// How far the controlled fighter is above the opponent (positive = above).
    pub height_advantage: i32,
    /// Whether the controlled fighter is in the air.
    pub own_airborne: bool,
    /// Whether the controlled fighter can start an action.
    pub own_free: bool,
    /// Whether the opponent is in the air.
    pub opponent_airborne: bool,
    /// Whether the opponent is mid-attack.
    pub opponent_attacking: bool,
    /// Whether the opponent's attack ended since the last decision.
    pub opponent_attack_ended: bool,
    /// Whether the controlled fighter is close to a wall.
    pub cornered: bool,
}

impl Situation {
    pub(crate) fn observe(
        own: &Combatant,
        opponent: &Combatant,
        stage: &StageConfig,
        tuning: &AiTuning,
        opponent_attack_ended: bool,
    ) -> Self {
        let own_x: i32 = own.position().x.to_num();
        let opponent_x: i32 = opponent.position().x.to_num();
        let own_y: i32 = own.position().y.to_num();
        let opponent_y: i32 = opponent.position().y.to_num();
        let toward = if opponent_x < own_x {
            -1
        } else if opponent_x > own_x {
            1
        } else {
            own.facing().sign()
        };
        let cornered = own_x - stage.left_wall < tuning.wall_margin
            || stage.right_wall - own_x < tuning.wall_margin;
        let own_state = own.state();

        Self {
            distance: (opponent_x - own_x).abs(),
            toward,
            height_advantage: opponent_y - own_y,
            own_airborne: own.is_airborne(),
            own_free: !own_state.is_attacking()
                && !own_state.is_disabled()
                && own_state != FighterState::Landing,
            opponent_airborne: opponent.is_airborne(),
            opponent_attacking: opponent.state().is_attacking(),
            opponent_attack_ended,
            cornered,
        }
    }

    fn away(&self) -> i32 {
        -self.toward
    }
}

/// Walk in `direction` and press `kind`.
fn strike(direction: i32, kind: AttackKind) -> Intent {
    let mut intent = Intent::walking(direction);
    intent.press_attack(kind);
    intent
}

impl OpponentController {
    fn scaled(&self, base: f32, span: f32) -> f32 {
        base + span * self.difficulty
    }

    fn within(&self, distance: i32, factor_percent: i32) -> bool {
        distance * 100 <= self.tuning.optimal_range * factor_percent
    }

    /// Attack choice by distance band: jabs up close, kicks at the edge.
    pub(crate) fn select_attack(&mut self, distance: i32) -> AttackKind {
        let optimal = self.tuning.optimal_range;
        let (jab, punch) = if distance < optimal {
            (0.6, 0.3)
        } else if distance * 100 < optimal * 115 {
            (0.3, 0.4)
        } else {
            (0.1, 0.3)
        };
        let roll = self.rng.next_f32();
        if roll < jab {
            AttackKind::Jab
        } else if roll < jab + punch {
            AttackKind::Punch
        } else {
            AttackKind::Kick
        }
    }

    pub(crate) fn aggressive(&mut self, s: &Situation) -> Intent {
        if self.within(s.distance, 120) {
            if self.consecutive_attacks >= self.tuning.max_consecutive_attacks {
                self.consecutive_attacks = 0;
                return Intent::walking(s.away());
            }
            if !s.own_free {
                return Intent::IDLE;
            }
            self.consecutive_attacks += 1;
            let kind = self.select_attack(s.distance);
            return strike(s.toward, kind);
        }

        let mut intent = Intent::walking(s.toward);
        if self.within(s.distance, 300) && self.rng.chance(0.05) {
            intent.jump = true;
            intent.up = true;
        }
        intent
    }

    pub(crate) fn defensive(&mut self, s: &Situation) -> Intent {
        if s.opponent_attacking && s.distance < self.tuning.safe_range {
            if self.rng.chance(self.scaled(0.3, 0.6)) {
                return Intent::blocking();
            }
            if self.rng.chance(0.2) {
                return Intent::ducking();
            }
            return Intent::walking(s.away());
        }
        if s.opponent_attack_ended && s.own_free && self.within(s.distance, 120) {
            return strike(s.toward, AttackKind::Jab);
        }
        if s.distance < self.tuning.safe_range {
            return Intent::walking(s.away());
        }
        Intent::IDLE
    }

    pub(crate) fn punish(&mut self, s: &Situation) -> Intent {
        if !self.within(s.distance, 100) {
            return Intent::walking(s.toward);
        }
        if !s.own_free {
            return Intent::IDLE;
        }
        let kind = PUNISH_COMBO[self.punish_step.min(PUNISH_COMBO.len() - 1)];
        self.punish_step += 1;
        if self.punish_step >= PUNISH_COMBO.len() {
            self.punish_step = 0;
            self.macro_state = MacroState::Neutral;
        }
        strike(s.toward, kind)
    }

    pub(crate) fn retreat(&mut self, s: &Situation) -> Intent {
        if s.cornered {
            return Intent::blocking();
        }
        let mut intent = Intent::walking(s.away());
        if self.rng.chance(0.1) {
            intent.jump = true;
            intent.up = true;
        }
        intent
    }

    pub(crate) fn neutral(&mut self, s: &Situation) -> Intent {
        if s.opponent_attack_ended && s.own_free && self.within(s.distance, 150) {
            let kind = self.select_attack(s.distance);
            return strike(s.toward, kind);
        }

        let mut intent = if s.distance > self.tuning.spacing_max {
            Intent::walking(s.toward)
        } else if s.distance < self.tuning.spacing_min {
            Intent::walking(s.away())
        } else {
            let roll = self.rng.next_f32();
            if roll < 0.3 {
                Intent::walking(s.toward)
            } else if roll < 0.6 {
                Intent::walking(s.away())
            } else {
                Intent::IDLE
            }
        };

        if s.own_free
            && s.distance <= self.tuning.spacing_max
            && !self.within(s.distance, 120)
            && self.rng.chance(self.scaled(0.05, 0.1))
        {
            intent = strike(s.toward, AttackKind::Kick);
        } else if self.rng.chance(0.02) {
            intent.jump = true;
            intent.up = true;
        }
        intent
    }

    /// Air attacks when close, drift toward the opponent from above.
    pub(crate) fn airborne_overlay(&mut self, s: &Situation, intent: &mut Intent) {
        if s.height_advantage > 50 {
            intent.set_horizontal(s.toward);
        }
        if self.within(s.distance, 150) && self.rng.chance(self.scaled(0.3, 0.4)) {
            let kind = if self.rng.chance(0.5) {
                AttackKind::AirPunch
            } else {
                AttackKind::AirKick
            };
            intent.press_attack(kind);
        }
    }

    /// Punch an opponent jumping in.
    pub(crate) fn anti_air_overlay(&mut self, s: &Situation, intent: &mut Intent) {
        if s.own_free && self.within(s.distance, 200) && self.rng.chance(self.scaled(0.2, 0.6)) {
            *intent = strike(s.toward, AttackKind::Punch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use crate::config::BrawlConfig;

    fn controller(difficulty: f32) -> OpponentController {
        OpponentController::from_config(&BrawlConfig::standard(), difficulty, 11)
    }

    fn situation(distance: i32) -> Situation {
        Situation {
            distance,
            toward: -1,
            height_advantage: 0,
            own_airborne: false,
            own_free: true,
            opponent_airborne: false,
            opponent_attacking: false,
            opponent_attack_ended: false,
            cornered: false,
        }
    }

    #[test]
    fn test_select_attack_favors_jab_close_and_kick_far() {
        let mut ai = controller(0.5);
        let count = |ai: &mut OpponentController, d: i32, kind: AttackKind| {
            (0..2_000).filter(|_| ai.select_attack(d) == kind).count()
        };
        let close_jabs = count(&mut ai, 60, AttackKind::Jab);
        let far_jabs = count(&mut ai, 150, AttackKind::Jab);
        let far_kicks = count(&mut ai, 150, AttackKind::Kick);
        assert!(close_jabs > far_jabs);
        assert!(far_kicks > 1_000);
    }

    #[test]
    fn test_aggressive_approaches_then_attacks() {
        let mut ai = controller(0.5);
        let far = ai.aggressive(&situation(400));
        assert_eq!(far.horizontal(), -1);
        assert!(!far.any_attack());

        let close = ai.aggressive(&situation(90));
        assert!(close.any_attack());
        assert_eq!(close.horizontal(), -1);
    }

    #[test]
    fn test_aggressive_backs_off_after_cap() {
        let mut ai = controller(0.5);
        for _ in 0..3 {
            assert!(ai.aggressive(&situation(90)).any_attack());
        }
        let backoff = ai.aggressive(&situation(90));
        assert!(!backoff.any_attack());
        assert_eq!(backoff.horizontal(), 1);
    }

    #[test]
    fn test_punish_runs_the_combo_then_neutral() {
        let mut ai = controller(0.5);
        ai.macro_state = MacroState::Punish;
        let presses: Vec<Intent> = (0..4).map(|_| ai.punish(&situation(85))).collect();
        assert!(presses[0].jab && presses[1].jab);
        assert!(presses[2].punch);
        assert!(presses[3].kick);
        assert_eq!(ai.macro_state(), MacroState::Neutral);
    }

    #[test]
    fn test_punish_closes_distance_first() {
        let mut ai = controller(0.5);
        let intent = ai.punish(&situation(300));
        assert_eq!(intent.horizontal(), -1);
        assert!(!intent.any_attack());
        assert_eq!(ai.punish_step, 0);
    }

    #[test]
    fn test_retreat_blocks_when_cornered() {
        let mut ai = controller(0.5);
        let mut s = situation(100);
        s.cornered = true;
        assert_eq!(ai.retreat(&s), Intent::blocking());
        s.cornered = false;
        assert_eq!(ai.retreat(&s).horizontal(), 1);
    }

    #[test]
    fn test_defensive_blocks_often_at_high_difficulty() {
        let mut ai = controller(1.0);
        let mut s = situation(100);
        s.opponent_attacking = true;
        let blocks = (0..1_000).filter(|_| ai.defensive(&s).block).count();
        assert!(blocks > 700, "blocks = {blocks}");
    }

    #[test]
    fn test_neutral_keeps_spacing() {
        let mut ai = controller(0.0);
        let far = (0..100)
            .filter(|_| ai.neutral(&situation(400)).horizontal() == -1)
            .count();
        assert!(far > 90);
        let near = (0..100)
            .filter(|_| ai.neutral(&situation(60)).horizontal() == 1)
            .count();
        assert!(near > 90);
    }

    #[test]
    fn test_anti_air_punches() {
        let mut ai = controller(1.0);
        let mut s = situation(120);
        s.opponent_airborne = true;
        let punches = (0..200)
            .filter(|_| {
                let mut intent = Intent::IDLE;
                ai.anti_air_overlay(&s, &mut intent);
                intent.punch
            })
            .count();
        assert!(punches > 120, "punches = {punches}");
    }

    #[test]
    fn test_observe_reads_positions() {
        let config = BrawlConfig::standard();
        let own = Combatant::new(Side::P2, 1_250, &config);
        let opponent = Combatant::new(Side::P1, 300, &config);
        let s = Situation::observe(&own, &opponent, &config.stage, &config.ai, false);
        assert_eq!(s.toward, -1);
        assert_eq!(own.position().x.to_num::<i32>(), 1_240);
        assert_eq!(s.distance, 940);
        assert!(s.cornered);
        assert!(s.own_free);
    }
}
