//! Per-combatant state machine.
//!
//! A [`Combatant`] consumes one [`Intent`] per tick together with the
//! simulation clock and advances its own movement, jump, block, duck and
//! attack state. The only outside writers are the encounter resolver
//! (damage, combo, hit-stop freeze) and the round (body separation, reset).
//!
//! # Update order
//!
//! 1. Measure the elapsed time (clamped for physics only) and fire due
//!    deferred effects.
//! 2. Integrate the body unless frozen by hit-stop, then detect landing and
//!    track the jump phase.
//! 3. Hitstun countdown, KO/stun lockout, block, duck, hitbox placement,
//!    landing lockout, movement and jumps, attack dispatch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::attack::{AttackKind, AttackProfile, AttackTable};
use crate::body::{Body, StageBounds};
use crate::config::{BrawlConfig, CombatTuning, FighterTuning};
use crate::intent::Intent;
use crate::math::{lerp, millis_to_secs, percent, Aabb, Fixed, Vec2Fixed};
use crate::timers::{TimerEffect, TimerGuard, TimerQueue};

/// Which player slot a combatant occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player one, spawns on the left.
    P1,
    /// Player two, spawns on the right.
    P2,
}

impl Side {
    /// The other slot.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::P1 => write!(f, "P1"),
            Side::P2 => write!(f, "P2"),
        }
    }
}

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward negative x.
    Left,
    /// Facing toward positive x.
    Right,
}

impl Facing {
    /// -1 for left, 1 for right.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Top-level combatant state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterState {
    /// Standing still.
    Idle,
    /// Walking on the ground.
    Walk,
    /// Airborne without attacking.
    Jump,
    /// Grounded attack in progress.
    Attack,
    /// Airborne attack in progress.
    AirAttack,
    /// Reeling from a hit.
    Hitstun,
    /// Disabled without a countdown. Nothing in the core enters this state;
    /// it is reserved for round scripting.
    Stunned,
    /// Holding block on the ground.
    Block,
    /// Crouching on the ground.
    Duck,
    /// Short lockout after landing from a jump.
    Landing,
    /// Knocked out. Terminal for the round.
    Ko,
}

impl FighterState {
    /// Whether this state carries an attack.
    #[must_use]
    pub const fn is_attacking(self) -> bool {
        matches!(self, FighterState::Attack | FighterState::AirAttack)
    }

    /// Whether the combatant cannot act in this state.
    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(
            self,
            FighterState::Hitstun | FighterState::Stunned | FighterState::Ko
        )
    }
}

/// Sub-phase of a jump, for animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpPhase {
    /// Not jumping.
    None,
    /// Moving up fast.
    Rising,
    /// Near the apex.
    Airborne,
    /// Moving down fast.
    Falling,
    /// Touching down.
    Landing,
}

/// Tint marker for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flash {
    /// Took a real hit; cleared when hitstun ends.
    Hit,
    /// Took chip damage while blocking; cleared after a short delay.
    Chip,
    /// Knocked out; never cleared within the round.
    Knockout,
}

/// Result of [`Combatant::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageOutcome {
    /// Invincible or already knocked out; nothing changed.
    Ignored,
    /// Blocked; the value is the chip damage taken.
    Chipped(u32),
    /// Real hit; the value is the damage taken.
    Hit(u32),
    /// The damage brought hp to zero.
    Knockout {
        /// Damage taken by the finishing blow.
        damage: u32,
        /// Whether the finishing blow was chip damage through a block.
        blocked: bool,
    },
}

impl DamageOutcome {
    /// Whether the damage landed unblocked (triggers hit-stop).
    #[must_use]
    pub const fn is_clean_hit(self) -> bool {
        matches!(
            self,
            DamageOutcome::Hit(_) | DamageOutcome::Knockout { blocked: false, .. }
        )
    }
}

/// Attack hitbox: the area in front of the combatant plus its enable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hitbox {
    /// Current placement.
    pub area: Aabb,
    /// Whether the hitbox can hit this tick.
    pub enabled: bool,
}

/// One fighter in a round.
#[derive(Debug, Clone)]
pub struct Combatant {
    side: Side,
    spawn_x: Fixed,
    tuning: FighterTuning,
    combat: CombatTuning,
    attacks: AttackTable,
    bounds: StageBounds,

    hp: u32,
    body: Body,
    facing: Facing,
    state: FighterState,
    jump_phase: JumpPhase,
    can_double_jump: bool,
    has_double_jumped: bool,
    air_attack_used: bool,
    jump_held: bool,

    last_attack: Option<AttackKind>,
    last_attack_at: Option<u64>,
    blocking: bool,
    invincible: bool,
    invincible_until: u64,
    hitstun_remaining_ms: u64,
    knockback: Vec2Fixed,
    flash: Option<Flash>,

    combo_count: u32,
    last_hit_at: Option<u64>,

    hitbox: Hitbox,
    timers: TimerQueue,
    phase_serial: u32,
    frozen: bool,
    last_update_at: Option<u64>,
}

impl Combatant {
    /// Create a combatant standing at `spawn_x` with full hp.
    ///
    /// P1 starts facing right and P2 facing left.
    #[must_use]
    pub fn new(side: Side, spawn_x: i32, config: &BrawlConfig) -> Self {
        Self::fresh(
            side,
            Fixed::from_num(spawn_x),
            config.fighter,
            config.combat,
            config.attacks,
            StageBounds::from_config(&config.stage),
        )
    }

    /// Create the combatant for a side at the configured spawn point.
    #[must_use]
    pub fn spawn(side: Side, config: &BrawlConfig) -> Self {
        let x = match side {
            Side::P1 => config.stage.p1_spawn_x,
            Side::P2 => config.stage.p2_spawn_x,
        };
        Self::new(side, x, config)
    }

    /// Restore the round-start state at its spawn point.
    pub fn reset(&mut self) {
        *self = Self::fresh(
            self.side,
            self.spawn_x,
            self.tuning,
            self.combat,
            self.attacks,
            self.bounds,
        );
        debug!(side = %self.side, "Combatant reset");
    }

    fn fresh(
        side: Side,
        spawn_x: Fixed,
        tuning: FighterTuning,
        combat: CombatTuning,
        attacks: AttackTable,
        bounds: StageBounds,
    ) -> Self {
        let body = Body::standing(
            spawn_x,
            &bounds,
            Fixed::from_num(tuning.body_width),
            Fixed::from_num(tuning.body_height),
        );
        let facing = match side {
            Side::P1 => Facing::Right,
            Side::P2 => Facing::Left,
        };

        let mut combatant = Self {
            side,
            spawn_x,
            tuning,
            combat,
            attacks,
            bounds,
            hp: tuning.max_hp,
            body,
            facing,
            state: FighterState::Idle,
            jump_phase: JumpPhase::None,
            can_double_jump: false,
            has_double_jumped: false,
            air_attack_used: false,
            jump_held: false,
            last_attack: None,
            last_attack_at: None,
            blocking: false,
            invincible: false,
            invincible_until: 0,
            hitstun_remaining_ms: 0,
            knockback: Vec2Fixed::ZERO,
            flash: None,
            combo_count: 0,
            last_hit_at: None,
            hitbox: Hitbox {
                area: Aabb::default(),
                enabled: false,
            },
            timers: TimerQueue::new(),
            phase_serial: 0,
            frozen: false,
            last_update_at: None,
        };
        combatant.place_hitbox();
        combatant
    }

    // ------------------------------------------------------------------
    // Per-tick update
    // ------------------------------------------------------------------

    /// Advance one tick with the given intent at simulation time `now` (ms).
    pub fn update(&mut self, intent: &Intent, now: u64) {
        let elapsed_ms = self
            .last_update_at
            .map_or(0, |last| now.saturating_sub(last));
        // Only the physics step is clamped; windows track the clock.
        let dt_ms = elapsed_ms.min(self.tuning.max_step_ms);
        self.last_update_at = Some(now);

        let jump_pressed = intent.jump && !self.jump_held;
        self.jump_held = intent.jump;

        self.fire_timers(now);

        let was_airborne = !self.body.is_grounded();
        if !self.frozen {
            let gravity = self.gravity(intent);
            self.body
                .integrate(millis_to_secs(dt_ms), gravity, &self.bounds);
        }
        self.track_ground_contact(was_airborne, now);

        // 1. Hitstun countdown.
        if self.state == FighterState::Hitstun {
            self.hitstun_remaining_ms = self.hitstun_remaining_ms.saturating_sub(elapsed_ms);
            if self.hitstun_remaining_ms == 0 {
                self.set_state(FighterState::Idle);
                if self.flash == Some(Flash::Hit) {
                    self.flash = None;
                }
            }
            return;
        }

        // 2. No control while knocked out or stunned.
        if matches!(self.state, FighterState::Ko | FighterState::Stunned) {
            self.hitbox.enabled = false;
            return;
        }

        let grounded = self.body.is_grounded();

        // 3. Block.
        if intent.block
            && grounded
            && self.state != FighterState::Attack
        {
            self.blocking = true;
            if self.state != FighterState::Block {
                self.set_state(FighterState::Block);
                self.body.velocity.x = Fixed::ZERO;
            }
            self.hitbox.enabled = false;
            return;
        }
        self.blocking = false;

        // 4. Duck.
        if intent.duck
            && grounded
            && !matches!(self.state, FighterState::Attack | FighterState::Block)
        {
            if self.state != FighterState::Duck {
                self.set_state(FighterState::Duck);
                self.body.velocity.x = Fixed::ZERO;
            }
            self.hitbox.enabled = false;
            return;
        }

        // 5. Hitbox follows the anchor.
        self.place_hitbox();

        // 6. Landing lockout.
        if self.state == FighterState::Landing {
            self.body.velocity.x = Fixed::ZERO;
            return;
        }

        // 7. Movement and jumps.
        if !self.state.is_attacking() {
            self.apply_movement(intent, jump_pressed);
        }

        // 9. Attacks.
        self.dispatch_attack(intent, now);

        #[cfg(feature = "debug-validation")]
        self.check_invariants();
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        assert!(self.hp <= self.tuning.max_hp, "{} hp above max", self.side);
        assert_eq!(
            self.hp == 0,
            self.state == FighterState::Ko,
            "{} hp/KO mismatch",
            self.side
        );
        assert!(
            !self.hitbox.enabled || self.state.is_attacking(),
            "{} hitbox live in {:?}",
            self.side,
            self.state
        );
    }

    fn gravity(&self, intent: &Intent) -> Fixed {
        let vy = self.body.velocity.y;
        if intent.duck && vy > -Fixed::from_num(self.tuning.apex_band) && !self.body.is_grounded()
        {
            Fixed::from_num(self.tuning.fast_fall_gravity)
        } else if vy > Fixed::ZERO {
            Fixed::from_num(self.tuning.fall_gravity)
        } else {
            Fixed::from_num(self.tuning.rise_gravity)
        }
    }

    fn track_ground_contact(&mut self, was_airborne: bool, now: u64) {
        let airborne = !self.body.is_grounded();

        if was_airborne && !airborne {
            self.can_double_jump = false;
            self.has_double_jumped = false;
            self.air_attack_used = false;
            if matches!(self.state, FighterState::Jump | FighterState::AirAttack) {
                self.phase_serial = self.phase_serial.wrapping_add(1);
                self.set_state(FighterState::Landing);
                self.jump_phase = JumpPhase::Landing;
                self.timers.schedule(
                    now + self.tuning.landing_lockout_ms,
                    TimerGuard::Phase {
                        serial: self.phase_serial,
                        state: FighterState::Landing,
                    },
                    TimerEffect::EndLanding,
                );
            }
        }

        if airborne && matches!(self.state, FighterState::Idle | FighterState::Walk) {
            self.set_state(FighterState::Jump);
        }

        if self.state == FighterState::Ko && !airborne {
            self.body.velocity.x = Fixed::ZERO;
        }

        if airborne && self.state == FighterState::Jump {
            let vy = self.body.velocity.y;
            let band = Fixed::from_num(self.tuning.apex_band);
            self.jump_phase = if vy < -band {
                JumpPhase::Rising
            } else if vy < band {
                JumpPhase::Airborne
            } else {
                JumpPhase::Falling
            };
        } else if !airborne && self.state != FighterState::Landing {
            self.jump_phase = JumpPhase::None;
        }
    }

    fn apply_movement(&mut self, intent: &Intent, jump_pressed: bool) {
        let airborne = !self.body.is_grounded();
        let ground_speed = Fixed::from_num(self.tuning.move_speed);
        let speed = if airborne {
            ground_speed * percent(self.tuning.air_control_percent)
        } else {
            ground_speed
        };

        match intent.horizontal() {
            0 => {
                if airborne {
                    self.body.velocity.x *= percent(self.tuning.air_friction_percent);
                } else {
                    self.body.velocity.x = Fixed::ZERO;
                    self.set_state(FighterState::Idle);
                }
            }
            direction => {
                let target = speed * Fixed::from_num(direction);
                self.body.velocity.x = if airborne {
                    lerp(
                        self.body.velocity.x,
                        target,
                        percent(self.tuning.air_steer_percent),
                    )
                } else {
                    target
                };
                self.facing = if direction < 0 {
                    Facing::Left
                } else {
                    Facing::Right
                };
                if !airborne {
                    self.set_state(FighterState::Walk);
                }
            }
        }

        if intent.jump {
            if !airborne {
                self.body.velocity.y = -Fixed::from_num(self.tuning.jump_impulse);
                self.body.leave_ground();
                self.can_double_jump = true;
                self.has_double_jumped = false;
                self.jump_phase = JumpPhase::Rising;
                self.set_state(FighterState::Jump);
            } else if jump_pressed && self.can_double_jump && !self.has_double_jumped {
                self.body.velocity.y = -Fixed::from_num(self.tuning.double_jump_impulse);
                self.has_double_jumped = true;
                self.jump_phase = JumpPhase::Rising;
                debug!(side = %self.side, "Double jump");
            }
        }
    }

    fn dispatch_attack(&mut self, intent: &Intent, now: u64) {
        let off_cooldown = self
            .last_attack_at
            .map_or(true, |at| now.saturating_sub(at) > self.tuning.attack_cooldown_ms);
        if !off_cooldown {
            return;
        }

        if self.body.is_grounded() {
            if self.state == FighterState::Attack {
                return;
            }
            let kind = if intent.jab {
                Some(AttackKind::Jab)
            } else if intent.punch {
                Some(AttackKind::Punch)
            } else if intent.kick {
                Some(AttackKind::Kick)
            } else {
                None
            };
            if let Some(kind) = kind {
                self.perform_attack(kind, now);
            }
        } else if self.state != FighterState::AirAttack && !self.air_attack_used {
            if intent.punch {
                self.perform_air_attack(AttackKind::AirPunch, now);
            } else if intent.kick {
                self.perform_air_attack(AttackKind::AirKick, now);
            }
        }
    }

    // ------------------------------------------------------------------
    // Attacks
    // ------------------------------------------------------------------

    /// Start a grounded attack.
    ///
    /// Schedules the hitbox window and the return to idle. A later attack,
    /// hit or landing invalidates the pending effects of this one.
    pub fn perform_attack(&mut self, kind: AttackKind, now: u64) {
        let profile = *self.attacks.profile(kind);
        self.begin_attack(kind, FighterState::Attack, profile, now);
        self.body.velocity.x = Fixed::ZERO;
    }

    /// Start an airborne attack. Air attacks keep momentum.
    pub fn perform_air_attack(&mut self, kind: AttackKind, now: u64) {
        let profile = *self.attacks.profile(kind);
        self.begin_attack(kind, FighterState::AirAttack, profile, now);
        self.air_attack_used = true;
    }

    fn begin_attack(
        &mut self,
        kind: AttackKind,
        state: FighterState,
        profile: AttackProfile,
        now: u64,
    ) {
        self.phase_serial = self.phase_serial.wrapping_add(1);
        let serial = self.phase_serial;
        self.set_state(state);
        self.hitbox.enabled = false;
        self.last_attack = Some(kind);
        self.last_attack_at = Some(now);

        let phase = TimerGuard::Phase { serial, state };
        self.timers
            .schedule(now + profile.startup_ms, phase, TimerEffect::EnableHitbox);
        self.timers.schedule(
            now + profile.active_end_ms(),
            TimerGuard::Serial(serial),
            TimerEffect::DisableHitbox,
        );
        self.timers
            .schedule(now + profile.recovery_ms, phase, TimerEffect::EndAttack);

        debug!(side = %self.side, attack = kind.name(), at = now, "Attack started");
    }

    // ------------------------------------------------------------------
    // Deferred effects
    // ------------------------------------------------------------------

    fn fire_timers(&mut self, now: u64) {
        for entry in self.timers.drain_due(now) {
            if !self.guard_holds(entry.guard) {
                continue;
            }
            match entry.effect {
                TimerEffect::EnableHitbox => {
                    self.place_hitbox();
                    self.hitbox.enabled = true;
                }
                TimerEffect::DisableHitbox => self.hitbox.enabled = false,
                TimerEffect::EndAttack => {
                    let next = if self.body.is_grounded() {
                        FighterState::Idle
                    } else {
                        FighterState::Jump
                    };
                    self.set_state(next);
                }
                TimerEffect::EndLanding => {
                    self.set_state(FighterState::Idle);
                    self.jump_phase = JumpPhase::None;
                }
                TimerEffect::EndInvincibility => {
                    if entry.fires_at >= self.invincible_until {
                        self.invincible = false;
                    }
                }
                TimerEffect::ClearFlash => {
                    if self.flash == Some(Flash::Chip) {
                        self.flash = None;
                    }
                }
            }
        }
    }

    fn guard_holds(&self, guard: TimerGuard) -> bool {
        match guard {
            TimerGuard::Always => true,
            TimerGuard::Phase { serial, state } => {
                self.phase_serial == serial && self.state == state
            }
            TimerGuard::Serial(serial) => self.phase_serial == serial,
            TimerGuard::NotKnockedOut => self.state != FighterState::Ko,
        }
    }

    // ------------------------------------------------------------------
    // Damage and combos
    // ------------------------------------------------------------------

    /// Apply incoming damage.
    ///
    /// `knockback_x` carries the direction away from the attacker;
    /// `knockback_y` is applied as-is (negative launches upward).
    pub fn take_damage(
        &mut self,
        amount: u32,
        now: u64,
        knockback_x: Fixed,
        knockback_y: Fixed,
    ) -> DamageOutcome {
        if self.invincible || self.state == FighterState::Ko {
            return DamageOutcome::Ignored;
        }

        if self.blocking {
            let chip = ceil_percent(amount, self.combat.chip_damage_percent);
            self.hp = self.hp.saturating_sub(chip);
            let direction = if knockback_x > Fixed::ZERO { 1 } else { -1 };
            self.body.velocity.x = Fixed::from_num(direction * self.combat.block_pushback);
            if self.hp == 0 {
                self.knock_out(knockback_x);
                return DamageOutcome::Knockout {
                    damage: chip,
                    blocked: true,
                };
            }
            self.flash = Some(Flash::Chip);
            self.timers.schedule(
                now + self.combat.chip_flash_ms,
                TimerGuard::NotKnockedOut,
                TimerEffect::ClearFlash,
            );
            debug!(side = %self.side, chip, hp = self.hp, "Blocked");
            return DamageOutcome::Chipped(chip);
        }

        self.hp = self.hp.saturating_sub(amount);
        self.invincible = true;
        self.invincible_until = now + self.combat.invincibility_ms;
        self.timers.schedule(
            self.invincible_until,
            TimerGuard::Always,
            TimerEffect::EndInvincibility,
        );

        if self.hp == 0 {
            self.knock_out(knockback_x);
            return DamageOutcome::Knockout {
                damage: amount,
                blocked: false,
            };
        }

        let hitstun =
            self.combat.hitstun_base_ms + u64::from(amount) * self.combat.hitstun_per_damage_ms;
        self.apply_hitstun(hitstun, Vec2Fixed::new(knockback_x, knockback_y));
        debug!(side = %self.side, damage = amount, hp = self.hp, hitstun, "Hit taken");
        DamageOutcome::Hit(amount)
    }

    fn apply_hitstun(&mut self, duration_ms: u64, knockback: Vec2Fixed) {
        self.phase_serial = self.phase_serial.wrapping_add(1);
        self.set_state(FighterState::Hitstun);
        self.hitstun_remaining_ms = duration_ms;
        self.knockback = knockback;
        self.body.velocity = knockback;
        self.blocking = false;
        self.flash = Some(Flash::Hit);
    }

    fn knock_out(&mut self, knockback_x: Fixed) {
        self.phase_serial = self.phase_serial.wrapping_add(1);
        self.set_state(FighterState::Ko);
        self.blocking = false;
        self.hitstun_remaining_ms = 0;
        self.flash = Some(Flash::Knockout);
        self.knockback = Vec2Fixed::new(
            knockback_x * percent(self.combat.ko_knockback_percent),
            -Fixed::from_num(self.combat.ko_launch),
        );
        self.body.velocity = self.knockback;
        info!(side = %self.side, "Knocked out");
    }

    /// Combo index the next successful hit at `now` would reach.
    #[must_use]
    pub fn next_combo_index(&self, now: u64) -> u32 {
        match self.last_hit_at {
            Some(last) if now.saturating_sub(last) < self.combat.combo_window_ms => {
                self.combo_count.saturating_add(1)
            }
            _ => 1,
        }
    }

    /// Register a successful hit: extend the combo inside the window,
    /// otherwise start a new one. Returns the new count.
    pub fn increment_combo(&mut self, now: u64) -> u32 {
        self.combo_count = self.next_combo_index(now);
        self.last_hit_at = Some(now);
        self.combo_count
    }

    /// Turn the attack hitbox off (after a hit resolves or on a clash).
    pub fn disable_hitbox(&mut self) {
        self.hitbox.enabled = false;
    }

    // ------------------------------------------------------------------
    // Hit-stop and positioning
    // ------------------------------------------------------------------

    /// Freeze motion for hit-stop. Returns the velocity to restore later.
    pub fn freeze_motion(&mut self) -> Vec2Fixed {
        let velocity = self.body.velocity;
        self.body.velocity = Vec2Fixed::ZERO;
        self.frozen = true;
        velocity
    }

    /// End hit-stop and resume with the given velocity.
    ///
    /// A combatant knocked out while frozen keeps its launch velocity.
    pub fn release_motion(&mut self, velocity: Vec2Fixed) {
        self.frozen = false;
        self.body.velocity = velocity;
    }

    /// Set a horizontal velocity (clash push).
    pub fn set_velocity_x(&mut self, vx: Fixed) {
        self.body.velocity.x = vx;
    }

    /// Move horizontally inside the walls (body separation).
    pub fn shift_x(&mut self, dx: Fixed) {
        self.body.shift_x(dx, &self.bounds);
        self.place_hitbox();
    }

    fn place_hitbox(&mut self) {
        let offset_x = Fixed::from_num(self.tuning.hitbox_offset_x * self.facing.sign());
        let center = Vec2Fixed::new(
            self.body.position.x + offset_x,
            self.body.position.y - Fixed::from_num(self.tuning.hitbox_offset_y),
        );
        self.hitbox.area = Aabb::from_center(
            center,
            Fixed::from_num(self.tuning.hitbox_width),
            Fixed::from_num(self.tuning.hitbox_height),
        );
    }

    fn set_state(&mut self, next: FighterState) {
        if !next.is_attacking() {
            self.hitbox.enabled = false;
        }
        if self.state != next {
            trace!(side = %self.side, from = ?self.state, to = ?next, "State change");
            self.state = next;
        }
    }

    // ------------------------------------------------------------------
    // Read-only view
    // ------------------------------------------------------------------

    /// Player slot.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.tuning.max_hp
    }

    /// Hit points as a fraction of the maximum, for decisions and display.
    #[must_use]
    pub fn hp_fraction(&self) -> f32 {
        self.hp as f32 / self.tuning.max_hp.max(1) as f32
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FighterState {
        self.state
    }

    /// Whether the combatant is knocked out.
    #[must_use]
    pub fn is_ko(&self) -> bool {
        self.state == FighterState::Ko
    }

    /// Facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Feet anchor.
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.body.position
    }

    /// Velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2Fixed {
        self.body.velocity
    }

    /// Whether the feet are off the floor.
    #[must_use]
    pub const fn is_airborne(&self) -> bool {
        !self.body.is_grounded()
    }

    /// Jump sub-phase.
    #[must_use]
    pub const fn jump_phase(&self) -> JumpPhase {
        self.jump_phase
    }

    /// Most recent attack kind.
    #[must_use]
    pub const fn last_attack(&self) -> Option<AttackKind> {
        self.last_attack
    }

    /// Start time of the most recent attack.
    #[must_use]
    pub const fn last_attack_at(&self) -> Option<u64> {
        self.last_attack_at
    }

    /// Whether block is active this tick.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Whether post-hit invulnerability is active.
    #[must_use]
    pub const fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Remaining hitstun.
    #[must_use]
    pub const fn hitstun_remaining_ms(&self) -> u64 {
        self.hitstun_remaining_ms
    }

    /// Knockback most recently applied.
    #[must_use]
    pub const fn knockback(&self) -> Vec2Fixed {
        self.knockback
    }

    /// Consecutive successful hits.
    #[must_use]
    pub const fn combo_count(&self) -> u32 {
        self.combo_count
    }

    /// Whether a tint marker is showing.
    #[must_use]
    pub const fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Current tint marker.
    #[must_use]
    pub const fn flash(&self) -> Option<Flash> {
        self.flash
    }

    /// Whether a double jump is still available.
    #[must_use]
    pub const fn can_double_jump(&self) -> bool {
        self.can_double_jump && !self.has_double_jumped
    }

    /// Whether hit-stop is holding this combatant in place.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Hitbox placement and enable flag.
    #[must_use]
    pub const fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    /// Hitbox area when live.
    #[must_use]
    pub fn live_hitbox(&self) -> Option<Aabb> {
        self.hitbox.enabled.then_some(self.hitbox.area)
    }

    /// Body rectangle that attacks must overlap.
    #[must_use]
    pub fn hurtbox(&self) -> Aabb {
        self.body.hurtbox()
    }

    /// Number of scheduled effects still pending.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Attack table in use.
    #[must_use]
    pub const fn attacks(&self) -> &AttackTable {
        &self.attacks
    }

    /// Fold the simulation-relevant state into a hasher.
    pub fn hash_state<H: std::hash::Hasher>(&self, hasher: &mut H) {
        use std::hash::Hash;
        self.hp.hash(hasher);
        self.body.position.x.to_bits().hash(hasher);
        self.body.position.y.to_bits().hash(hasher);
        self.body.velocity.x.to_bits().hash(hasher);
        self.body.velocity.y.to_bits().hash(hasher);
        self.state.hash(hasher);
        self.facing.hash(hasher);
        self.combo_count.hash(hasher);
        self.hitbox.enabled.hash(hasher);
        self.invincible.hash(hasher);
        self.hitstun_remaining_ms.hash(hasher);
    }
}

/// `ceil(amount × pct / 100)` in integers.
pub(crate) fn ceil_percent(amount: u32, pct: u32) -> u32 {
    let scaled = u64::from(amount) * u64::from(pct);
    u32::try_from(scaled.div_ceil(100)).unwrap_or(u32::MAX)
}
