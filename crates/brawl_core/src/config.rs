//! Tuning data for a round.
//!
//! All tunables live in one [`BrawlConfig`] that is handed to the
//! components at construction time. Values are integers (pixels, pixels per
//! second, milliseconds, percentages) so that RON files stay readable and
//! the simulation converts them to [`Fixed`](crate::math::Fixed) at use.
//!
//! # Example RON
//!
//! ```ron
//! BrawlConfig(
//!     round_duration_secs: 60,
//!     combat: CombatTuning(chip_damage_percent: 20, ..),
//! )
//! ```
//!
//! Missing sections fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::attack::AttackTable;
use crate::error::{BrawlError, Result};

/// Movement, physics and geometry for a single combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterTuning {
    /// Starting and maximum hit points.
    pub max_hp: u32,
    /// Grounded walk speed (px/s).
    pub move_speed: i32,
    /// Airborne speed as a percentage of ground speed.
    pub air_control_percent: u32,
    /// Fraction of the gap to the target air speed closed each tick.
    pub air_steer_percent: u32,
    /// Horizontal speed kept per tick while airborne without input.
    pub air_friction_percent: u32,
    /// First jump impulse (px/s, upward).
    pub jump_impulse: i32,
    /// Second jump impulse (px/s, upward).
    pub double_jump_impulse: i32,
    /// Gravity while rising (px/s²).
    pub rise_gravity: i32,
    /// Gravity while falling (px/s²).
    pub fall_gravity: i32,
    /// Gravity while holding duck in the air (px/s²).
    pub fast_fall_gravity: i32,
    /// Vertical speed band around the apex treated as the airborne phase.
    pub apex_band: i32,
    /// Hurtbox width.
    pub body_width: i32,
    /// Hurtbox height.
    pub body_height: i32,
    /// Attack hitbox width.
    pub hitbox_width: i32,
    /// Attack hitbox height.
    pub hitbox_height: i32,
    /// Horizontal distance from the anchor to the hitbox center, mirrored by facing.
    pub hitbox_offset_x: i32,
    /// Height of the hitbox center above the feet.
    pub hitbox_offset_y: i32,
    /// Minimum time between two attacks.
    pub attack_cooldown_ms: u64,
    /// Lockout after landing from a jump.
    pub landing_lockout_ms: u64,
    /// Longest elapsed time a single tick may integrate.
    pub max_step_ms: u64,
}

impl Default for FighterTuning {
    fn default() -> Self {
        Self {
            max_hp: 100,
            move_speed: 200,
            air_control_percent: 70,
            air_steer_percent: 10,
            air_friction_percent: 98,
            jump_impulse: 550,
            double_jump_impulse: 450,
            rise_gravity: 1000,
            fall_gravity: 1400,
            fast_fall_gravity: 2400,
            apex_band: 100,
            body_width: 80,
            body_height: 180,
            hitbox_width: 60,
            hitbox_height: 40,
            hitbox_offset_x: 50,
            hitbox_offset_y: 80,
            attack_cooldown_ms: 100,
            landing_lockout_ms: 200,
            max_step_ms: 50,
        }
    }
}

/// Hit resolution numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Share of damage a blocking combatant still takes.
    pub chip_damage_percent: u32,
    /// Horizontal pushback applied to a blocking combatant (px/s).
    pub block_pushback: i32,
    /// Damage multiplier against a defender caught mid-attack.
    pub counter_hit_percent: u32,
    /// Maximum gap between hits that still extends a combo.
    pub combo_window_ms: u64,
    /// Damage lost per combo hit after the first.
    pub combo_decay_percent: u32,
    /// Lowest combo damage multiplier.
    pub combo_floor_percent: u32,
    /// Invulnerability after taking a real hit.
    pub invincibility_ms: u64,
    /// Hitstun applied regardless of damage.
    pub hitstun_base_ms: u64,
    /// Extra hitstun per point of damage.
    pub hitstun_per_damage_ms: u64,
    /// A defender in hitstun can only be hit again inside this final window.
    pub hitstun_residual_ms: u64,
    /// Length of the shared motion freeze on impact.
    pub hit_stop_ms: u64,
    /// Share of the attacker's velocity restored after hit-stop.
    pub attacker_resume_percent: u32,
    /// Horizontal speed each combatant receives on a clash (px/s).
    pub clash_push: i32,
    /// Horizontal knockback multiplier on a knockout.
    pub ko_knockback_percent: u32,
    /// Upward launch speed on a knockout (px/s).
    pub ko_launch: i32,
    /// How long the chip-damage flash stays on.
    pub chip_flash_ms: u64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            chip_damage_percent: 15,
            block_pushback: 80,
            counter_hit_percent: 125,
            combo_window_ms: 800,
            combo_decay_percent: 10,
            combo_floor_percent: 50,
            invincibility_ms: 200,
            hitstun_base_ms: 150,
            hitstun_per_damage_ms: 10,
            hitstun_residual_ms: 50,
            hit_stop_ms: 60,
            attacker_resume_percent: 50,
            clash_push: 150,
            ko_knockback_percent: 150,
            ko_launch: 400,
            chip_flash_ms: 100,
        }
    }
}

/// Stage geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Y coordinate of the floor (feet rest here).
    pub floor_y: i32,
    /// X coordinate of the left wall.
    pub left_wall: i32,
    /// X coordinate of the right wall.
    pub right_wall: i32,
    /// Player one spawn x.
    pub p1_spawn_x: i32,
    /// Player two spawn x.
    pub p2_spawn_x: i32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            floor_y: 620,
            left_wall: 0,
            right_wall: 1280,
            p1_spawn_x: 300,
            p2_spawn_x: 980,
        }
    }
}

/// Opponent controller spacing and reaction numbers.
///
/// The difficulty scalar is not part of this table: it is chosen per
/// controller when a match is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Distance at which attacks connect reliably.
    pub optimal_range: i32,
    /// Distance the defensive policy tries to keep.
    pub safe_range: i32,
    /// Lower edge of the neutral spacing band.
    pub spacing_min: i32,
    /// Upper edge of the neutral spacing band.
    pub spacing_max: i32,
    /// Consecutive attacks before the aggressive policy backs off.
    pub max_consecutive_attacks: u32,
    /// Reaction delay at difficulty 0.
    pub reaction_base_ms: u64,
    /// Reaction delay at difficulty 1.
    pub reaction_floor_ms: u64,
    /// Random extra reaction delay.
    pub reaction_jitter_ms: u64,
    /// Shortest macro-state re-decision interval.
    pub decision_min_ms: u64,
    /// Longest macro-state re-decision interval.
    pub decision_max_ms: u64,
    /// Distance from a wall that counts as cornered.
    pub wall_margin: i32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            optimal_range: 90,
            safe_range: 200,
            spacing_min: 120,
            spacing_max: 180,
            max_consecutive_attacks: 3,
            reaction_base_ms: 250,
            reaction_floor_ms: 80,
            reaction_jitter_ms: 150,
            decision_min_ms: 1000,
            decision_max_ms: 3000,
            wall_margin: 80,
        }
    }
}

/// Complete tuning for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrawlConfig {
    /// Round length before a timeout decision.
    pub round_duration_secs: u32,
    /// Fighter movement and geometry.
    pub fighter: FighterTuning,
    /// Hit resolution numbers.
    pub combat: CombatTuning,
    /// Attack frame data.
    pub attacks: AttackTable,
    /// Stage bounds and spawns.
    pub stage: StageConfig,
    /// Opponent controller tuning.
    pub ai: AiTuning,
}

/// Default round length in seconds.
pub const DEFAULT_ROUND_SECS: u32 = 99;

impl Default for BrawlConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: DEFAULT_ROUND_SECS,
            fighter: FighterTuning::default(),
            combat: CombatTuning::default(),
            attacks: AttackTable::default(),
            stage: StageConfig::default(),
            ai: AiTuning::default(),
        }
    }
}

impl BrawlConfig {
    /// Default configuration with the standard round length.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Parse a configuration from RON text and validate it.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: BrawlConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| BrawlError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded brawl config");
        Ok(config)
    }

    /// Round length in milliseconds.
    #[must_use]
    pub const fn round_duration_ms(&self) -> u64 {
        self.round_duration_secs as u64 * 1000
    }

    /// Check that the values describe a playable round.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(BrawlError::InvalidConfig(msg));

        if self.round_duration_secs == 0 {
            return invalid("round_duration_secs must be at least 1".into());
        }
        if self.fighter.max_hp == 0 {
            return invalid("fighter.max_hp must be at least 1".into());
        }
        if self.fighter.body_width <= 0 || self.fighter.body_height <= 0 {
            return invalid("fighter body must have a positive size".into());
        }
        if self.fighter.max_step_ms == 0 {
            return invalid("fighter.max_step_ms must be at least 1".into());
        }
        if self.combat.combo_floor_percent > 100 {
            return invalid(format!(
                "combat.combo_floor_percent {} exceeds 100",
                self.combat.combo_floor_percent
            ));
        }
        if self.combat.chip_damage_percent > 100 {
            return invalid(format!(
                "combat.chip_damage_percent {} exceeds 100",
                self.combat.chip_damage_percent
            ));
        }
        if self.stage.left_wall >= self.stage.right_wall {
            return invalid("stage.left_wall must be left of stage.right_wall".into());
        }
        for (name, x) in [
            ("p1_spawn_x", self.stage.p1_spawn_x),
            ("p2_spawn_x", self.stage.p2_spawn_x),
        ] {
            if x <= self.stage.left_wall || x >= self.stage.right_wall {
                return invalid(format!("stage.{name} {x} lies outside the walls"));
            }
        }
        for kind in crate::attack::AttackKind::ALL {
            let profile = self.attacks.profile(kind);
            if profile.active_end_ms() > profile.recovery_ms {
                return invalid(format!(
                    "{} recovery_ms {} ends before its active window ({} ms)",
                    kind.name(),
                    profile.recovery_ms,
                    profile.active_end_ms()
                ));
            }
        }
        if self.ai.decision_min_ms > self.ai.decision_max_ms {
            return invalid("ai.decision_min_ms exceeds ai.decision_max_ms".into());
        }
        if self.ai.spacing_min > self.ai.spacing_max {
            return invalid("ai.spacing_min exceeds ai.spacing_max".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config_is_valid() {
        let config = BrawlConfig::standard();
        assert!(config.validate().is_ok());
        assert_eq!(config.round_duration_ms(), 99_000);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = BrawlConfig::from_ron_str(
            "(round_duration_secs: 30, combat: (chip_damage_percent: 20))",
        )
        .expect("valid config");

        assert_eq!(config.round_duration_secs, 30);
        assert_eq!(config.combat.chip_damage_percent, 20);
        assert_eq!(config.combat.counter_hit_percent, 125);
        assert_eq!(config.fighter, FighterTuning::default());
    }

    #[test]
    fn test_rejects_zero_duration() {
        let err = BrawlConfig::from_ron_str("(round_duration_secs: 0)").unwrap_err();
        assert!(matches!(err, BrawlError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_attack_timing() {
        let mut config = BrawlConfig::standard();
        config.attacks.kick.recovery_ms = 100;
        assert!(matches!(
            config.validate(),
            Err(BrawlError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_spawn_outside_walls() {
        let mut config = BrawlConfig::standard();
        config.stage.p2_spawn_x = 5000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = BrawlConfig::from_ron_str("(round_duration_secs: ").unwrap_err();
        assert!(matches!(err, BrawlError::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BrawlConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, BrawlError::ConfigRead { .. }));
    }
}
