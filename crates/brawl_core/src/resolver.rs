//! Encounter resolver: hitbox overlaps between the two combatants.
//!
//! Runs once per tick after both combatants have updated. It reads their
//! hitboxes and hurtboxes, applies damage, knockback and combo bookkeeping,
//! and drives the shared hit-stop freeze.
//!
//! # Resolution order
//!
//! 1. Release an expired hit-stop, or skip the tick while it lasts.
//! 2. Snapshot both attack flags and hitboxes.
//! 3. Clash: both attacking with overlapping live hitboxes. Replaces hit
//!    resolution for the tick.
//! 4. P1 hits P2, then P2 hits P1.

use tracing::{debug, info};

use crate::attack::{AttackKind, AttackTable};
use crate::combatant::{ceil_percent, Combatant, DamageOutcome, FighterState, Side};
use crate::config::{BrawlConfig, CombatTuning};
use crate::events::CombatEvent;
use crate::math::{percent, Fixed, Vec2Fixed};

/// Damage after counter-hit and combo scaling.
///
/// `ceil(base × counter × max(floor, 1 − decay × (combo_index − 1)))`, with
/// every factor an integer percentage.
#[must_use]
pub fn scaled_damage(base: u32, combo_index: u32, counter_hit: bool, tuning: &CombatTuning) -> u32 {
    let counter = if counter_hit {
        tuning.counter_hit_percent
    } else {
        100
    };
    let with_counter = u64::from(base) * u64::from(counter);
    let scale = u64::from(combo_scale_percent(combo_index, tuning));
    u32::try_from((with_counter * scale).div_ceil(10_000)).unwrap_or(u32::MAX)
}

/// Combo damage multiplier, as a percentage, for the given hit index.
#[must_use]
pub fn combo_scale_percent(combo_index: u32, tuning: &CombatTuning) -> u32 {
    let decay = tuning
        .combo_decay_percent
        .saturating_mul(combo_index.saturating_sub(1));
    100u32.saturating_sub(decay).max(tuning.combo_floor_percent)
}

/// Motion saved at the start of a hit-stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HitStop {
    release_at: u64,
    attacker: Side,
    p1_velocity: Vec2Fixed,
    p2_velocity: Vec2Fixed,
}

/// Resolves hits between the two combatants of a round.
#[derive(Debug, Clone)]
pub struct EncounterResolver {
    combat: CombatTuning,
    attacks: AttackTable,
    hit_stop: Option<HitStop>,
}

impl EncounterResolver {
    /// Create a resolver from round configuration.
    #[must_use]
    pub fn new(config: &BrawlConfig) -> Self {
        Self {
            combat: config.combat,
            attacks: config.attacks,
            hit_stop: None,
        }
    }

    /// Whether a hit-stop freeze is in progress.
    #[must_use]
    pub fn is_hit_stopped(&self) -> bool {
        self.hit_stop.is_some()
    }

    /// Drop any pending hit-stop without restoring motion (round reset).
    pub fn reset(&mut self) {
        self.hit_stop = None;
    }

    /// Resolve one tick of contact between `p1` and `p2`.
    pub fn update(&mut self, p1: &mut Combatant, p2: &mut Combatant, now: u64) -> Vec<CombatEvent> {
        let mut events = Vec::new();

        if self.release_due(p1, p2, now) {
            return events;
        }

        let p1_attacking = p1.state().is_attacking();
        let p2_attacking = p2.state().is_attacking();
        let p1_hitbox = p1.live_hitbox();
        let p2_hitbox = p2.live_hitbox();

        if let (true, true, Some(a), Some(b)) = (p1_attacking, p2_attacking, p1_hitbox, p2_hitbox) {
            if a.overlaps(&b) {
                self.clash(p1, p2);
                events.push(CombatEvent::Clash);
                return events;
            }
        }

        if p1_attacking {
            if let Some(hitbox) = p1.live_hitbox() {
                if hitbox.overlaps(&p2.hurtbox()) {
                    self.handle_hit(p1, p2, now, &mut events);
                }
            }
        }

        if self.hit_stop.is_some() {
            return events;
        }

        if p2.state().is_attacking() {
            if let Some(hitbox) = p2.live_hitbox() {
                if hitbox.overlaps(&p1.hurtbox()) {
                    self.handle_hit(p2, p1, now, &mut events);
                }
            }
        }

        events
    }

    /// Restore motion once the hit-stop deadline has passed.
    ///
    /// Returns whether a freeze is still in progress. The round keeps calling
    /// this after its outcome so a finishing blow's launch plays out.
    pub fn release_due(&mut self, p1: &mut Combatant, p2: &mut Combatant, now: u64) -> bool {
        match self.hit_stop {
            Some(stop) if now >= stop.release_at => {
                self.release(p1, p2, stop);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    fn release(&mut self, p1: &mut Combatant, p2: &mut Combatant, stop: HitStop) {
        let resume = percent(self.combat.attacker_resume_percent);
        let (v1, v2) = match stop.attacker {
            Side::P1 => (stop.p1_velocity.scale(resume), stop.p2_velocity),
            Side::P2 => (stop.p1_velocity, stop.p2_velocity.scale(resume)),
        };
        p1.release_motion(v1);
        p2.release_motion(v2);
        self.hit_stop = None;
        debug!(attacker = %stop.attacker, "Hit-stop released");
    }

    fn clash(&mut self, p1: &mut Combatant, p2: &mut Combatant) {
        let push = Fixed::from_num(self.combat.clash_push);
        // P1 goes left when the two stand on the same x.
        let p1_dir = if p1.position().x > p2.position().x {
            Fixed::ONE
        } else {
            -Fixed::ONE
        };
        p1.set_velocity_x(push * p1_dir);
        p2.set_velocity_x(-push * p1_dir);
        p1.disable_hitbox();
        p2.disable_hitbox();
        debug!(
            p1_attack = ?p1.last_attack(),
            p2_attack = ?p2.last_attack(),
            "Clash"
        );
    }

    fn handle_hit(
        &mut self,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        now: u64,
        events: &mut Vec<CombatEvent>,
    ) {
        if defender.is_ko() || defender.is_invincible() {
            return;
        }
        if defender.state() == FighterState::Hitstun
            && defender.hitstun_remaining_ms() > self.combat.hitstun_residual_ms
        {
            return;
        }

        let attack = attacker.last_attack();
        let profile = self.attacks.profile_or_default(attack);
        let counter_hit = defender.state().is_attacking();
        let combo_index = attacker.next_combo_index(now);
        let damage = scaled_damage(profile.damage, combo_index, counter_hit, &self.combat);

        let ax = attacker.position().x;
        let dx = defender.position().x;
        let direction = if ax < dx {
            1
        } else if ax > dx {
            -1
        } else {
            attacker.facing().sign()
        };
        let knockback_x = Fixed::from_num(profile.knockback_x * direction);
        let knockback_y = Fixed::from_num(profile.knockback_y);

        let outcome = defender.take_damage(damage, now, knockback_x, knockback_y);
        attacker.disable_hitbox();

        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Chipped(chip) => {
                events.push(CombatEvent::Blocked {
                    attacker: attacker.side(),
                    defender: defender.side(),
                    chip,
                });
            }
            DamageOutcome::Hit(dealt) => {
                record_hit(attacker, defender, attack, dealt, counter_hit, now, events);
            }
            DamageOutcome::Knockout { damage, blocked } => {
                if blocked {
                    events.push(CombatEvent::Blocked {
                        attacker: attacker.side(),
                        defender: defender.side(),
                        chip: damage,
                    });
                } else {
                    record_hit(attacker, defender, attack, damage, counter_hit, now, events);
                }
                events.push(CombatEvent::Knockout {
                    side: defender.side(),
                });
                info!(winner = %attacker.side(), loser = %defender.side(), at = now, "Knockout");
            }
        }

        if outcome.is_clean_hit() {
            self.start_hit_stop(attacker, defender, now);
        }
    }

    fn start_hit_stop(&mut self, attacker: &mut Combatant, defender: &mut Combatant, now: u64) {
        let attacker_velocity = attacker.freeze_motion();
        let defender_velocity = defender.freeze_motion();
        let (p1_velocity, p2_velocity) = match attacker.side() {
            Side::P1 => (attacker_velocity, defender_velocity),
            Side::P2 => (defender_velocity, attacker_velocity),
        };
        self.hit_stop = Some(HitStop {
            release_at: now + self.combat.hit_stop_ms,
            attacker: attacker.side(),
            p1_velocity,
            p2_velocity,
        });
    }
}

/// Combo bookkeeping and events for an unblocked hit.
fn record_hit(
    attacker: &mut Combatant,
    defender: &Combatant,
    attack: Option<AttackKind>,
    damage: u32,
    counter_hit: bool,
    now: u64,
    events: &mut Vec<CombatEvent>,
) {
    let combo = attacker.increment_combo(now);
    events.push(CombatEvent::HitLanded {
        attacker: attacker.side(),
        defender: defender.side(),
        attack,
        damage,
        combo,
        counter_hit,
    });
    events.push(CombatEvent::ComboChanged {
        side: attacker.side(),
        count: combo,
    });
    debug!(
        attacker = %attacker.side(),
        damage,
        combo,
        counter_hit,
        defender_hp = defender.hp(),
        "Hit landed"
    );
}

/// Chip damage a blocked hit of `damage` would deal.
#[must_use]
pub fn chip_damage(damage: u32, tuning: &CombatTuning) -> u32 {
    ceil_percent(damage, tuning.chip_damage_percent)
}
