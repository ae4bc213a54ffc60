//! Per-frame input intent.
//!
//! An [`Intent`] is the already-decoded set of actions one combatant wants
//! to perform this frame. Human input and the opponent controller both
//! produce the same shape, so the combatant cannot tell them apart.

use serde::{Deserialize, Serialize};

use crate::attack::AttackKind;

/// Requested actions for one combatant for one tick.
///
/// The default value (everything `false`) means "no action".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    /// Move left.
    pub left: bool,
    /// Move right.
    pub right: bool,
    /// Up direction (mirrors `jump` for keyboard layouts).
    pub up: bool,
    /// Down direction (mirrors `duck` for keyboard layouts).
    pub down: bool,
    /// Jump.
    pub jump: bool,
    /// Punch button.
    pub punch: bool,
    /// Jab button.
    pub jab: bool,
    /// Kick button.
    pub kick: bool,
    /// Block.
    pub block: bool,
    /// Duck.
    pub duck: bool,
}

impl Intent {
    /// No action.
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
        jump: false,
        punch: false,
        jab: false,
        kick: false,
        block: false,
        duck: false,
    };

    /// Hold a horizontal direction. `direction < 0` is left, `> 0` is right.
    #[must_use]
    pub fn walking(direction: i32) -> Self {
        let mut intent = Self::IDLE;
        intent.set_horizontal(direction);
        intent
    }

    /// Press the button for a grounded attack kind.
    ///
    /// Aerial kinds map onto the buttons that trigger them in the air.
    #[must_use]
    pub fn attacking(kind: AttackKind) -> Self {
        let mut intent = Self::IDLE;
        intent.press_attack(kind);
        intent
    }

    /// Press jump.
    #[must_use]
    pub fn jumping() -> Self {
        Self {
            jump: true,
            up: true,
            ..Self::IDLE
        }
    }

    /// Hold block.
    #[must_use]
    pub fn blocking() -> Self {
        Self {
            block: true,
            ..Self::IDLE
        }
    }

    /// Hold duck.
    #[must_use]
    pub fn ducking() -> Self {
        Self {
            duck: true,
            down: true,
            ..Self::IDLE
        }
    }

    /// Replace the horizontal direction. Zero releases both directions.
    pub fn set_horizontal(&mut self, direction: i32) {
        self.left = direction < 0;
        self.right = direction > 0;
    }

    /// Release every attack button.
    pub fn clear_attacks(&mut self) {
        self.jab = false;
        self.punch = false;
        self.kick = false;
    }

    /// Press exactly one attack button, releasing the others.
    pub fn press_attack(&mut self, kind: AttackKind) {
        self.clear_attacks();
        match kind {
            AttackKind::Jab => self.jab = true,
            AttackKind::Punch | AttackKind::AirPunch => self.punch = true,
            AttackKind::Kick | AttackKind::AirKick => self.kick = true,
        }
    }

    /// Whether any attack button is held.
    #[must_use]
    pub const fn any_attack(&self) -> bool {
        self.jab || self.punch || self.kick
    }

    /// Horizontal direction: -1 left, 1 right, 0 none or both.
    #[must_use]
    pub const fn horizontal(&self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}
