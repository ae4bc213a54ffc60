//! Attack kinds and their frame data.
//!
//! Every attack runs through three phases measured from the moment it is
//! performed:
//! - Startup: wind-up, no hitbox
//! - Active: hitbox live
//! - Recovery: hitbox gone, the fighter stays locked until the recovery mark
//!
//! `recovery_ms` is measured from the start of the attack, so it always
//! covers startup and active as well.

use serde::{Deserialize, Serialize};

/// The attacks a combatant can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Fastest, weakest grounded attack.
    Jab,
    /// Mid-speed grounded attack.
    Punch,
    /// Slowest, strongest grounded attack.
    Kick,
    /// Airborne punch.
    AirPunch,
    /// Airborne kick.
    AirKick,
}

impl AttackKind {
    /// All attack kinds, grounded first.
    pub const ALL: [AttackKind; 5] = [
        AttackKind::Jab,
        AttackKind::Punch,
        AttackKind::Kick,
        AttackKind::AirPunch,
        AttackKind::AirKick,
    ];

    /// Whether this attack is performed in the air.
    #[must_use]
    pub const fn is_aerial(self) -> bool {
        matches!(self, AttackKind::AirPunch | AttackKind::AirKick)
    }

    /// Stable name used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AttackKind::Jab => "jab",
            AttackKind::Punch => "punch",
            AttackKind::Kick => "kick",
            AttackKind::AirPunch => "air_punch",
            AttackKind::AirKick => "air_kick",
        }
    }
}

/// Frame data and hit properties for one attack kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Base damage before counter-hit and combo scaling.
    pub damage: u32,
    /// Milliseconds before the hitbox turns on.
    pub startup_ms: u64,
    /// Milliseconds the hitbox stays on.
    pub active_ms: u64,
    /// Milliseconds from the start of the attack until the fighter is free again.
    pub recovery_ms: u64,
    /// Horizontal knockback speed, applied away from the attacker.
    pub knockback_x: i32,
    /// Vertical knockback speed (negative launches upward).
    pub knockback_y: i32,
}

impl AttackProfile {
    /// Milliseconds after the start at which the hitbox turns off.
    #[must_use]
    pub const fn active_end_ms(&self) -> u64 {
        self.startup_ms + self.active_ms
    }
}

impl Default for AttackProfile {
    /// Fallback used when a hit arrives without a recorded attack kind.
    fn default() -> Self {
        Self {
            damage: 10,
            startup_ms: 100,
            active_ms: 200,
            recovery_ms: 400,
            knockback_x: 200,
            knockback_y: -200,
        }
    }
}

/// Per-kind attack table.
///
/// # Example RON
///
/// ```ron
/// AttackTable(
///     jab: AttackProfile(damage: 5, startup_ms: 60, active_ms: 140,
///         recovery_ms: 250, knockback_x: 120, knockback_y: -60),
///     ...
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTable {
    /// Jab frame data.
    pub jab: AttackProfile,
    /// Punch frame data.
    pub punch: AttackProfile,
    /// Kick frame data.
    pub kick: AttackProfile,
    /// Air punch frame data.
    pub air_punch: AttackProfile,
    /// Air kick frame data.
    pub air_kick: AttackProfile,
}

impl AttackTable {
    /// Look up the profile for an attack kind.
    #[must_use]
    pub const fn profile(&self, kind: AttackKind) -> &AttackProfile {
        match kind {
            AttackKind::Jab => &self.jab,
            AttackKind::Punch => &self.punch,
            AttackKind::Kick => &self.kick,
            AttackKind::AirPunch => &self.air_punch,
            AttackKind::AirKick => &self.air_kick,
        }
    }

    /// Look up the profile for an optional attack kind, falling back to the
    /// default profile when no attack was recorded.
    #[must_use]
    pub fn profile_or_default(&self, kind: Option<AttackKind>) -> AttackProfile {
        kind.map_or_else(AttackProfile::default, |k| *self.profile(k))
    }
}

impl Default for AttackTable {
    fn default() -> Self {
        Self {
            jab: AttackProfile {
                damage: 5,
                startup_ms: 60,
                active_ms: 140,
                recovery_ms: 250,
                knockback_x: 120,
                knockback_y: -60,
            },
            punch: AttackProfile {
                damage: 8,
                startup_ms: 100,
                active_ms: 200,
                recovery_ms: 400,
                knockback_x: 200,
                knockback_y: -120,
            },
            kick: AttackProfile {
                damage: 14,
                startup_ms: 140,
                active_ms: 260,
                recovery_ms: 500,
                knockback_x: 300,
                knockback_y: -200,
            },
            air_punch: AttackProfile {
                damage: 7,
                startup_ms: 50,
                active_ms: 180,
                recovery_ms: 250,
                knockback_x: 150,
                knockback_y: -100,
            },
            air_kick: AttackProfile {
                damage: 10,
                startup_ms: 50,
                active_ms: 180,
                recovery_ms: 250,
                knockback_x: 250,
                knockback_y: -150,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jab_fastest_kick_strongest() {
        let table = AttackTable::default();
        let jab = table.profile(AttackKind::Jab);
        let punch = table.profile(AttackKind::Punch);
        let kick = table.profile(AttackKind::Kick);

        assert!(jab.startup_ms < punch.startup_ms);
        assert!(punch.startup_ms < kick.startup_ms);
        assert!(jab.damage < punch.damage);
        assert!(punch.damage < kick.damage);
    }

    #[test]
    fn test_recovery_covers_active_window() {
        let table = AttackTable::default();
        for kind in AttackKind::ALL {
            let profile = table.profile(kind);
            assert!(
                profile.active_end_ms() <= profile.recovery_ms,
                "{} hitbox outlives its recovery",
                kind.name()
            );
        }
    }

    #[test]
    fn test_aerial_kinds() {
        assert!(AttackKind::AirPunch.is_aerial());
        assert!(AttackKind::AirKick.is_aerial());
        assert!(!AttackKind::Jab.is_aerial());
        assert!(!AttackKind::Kick.is_aerial());
    }

    #[test]
    fn test_missing_kind_falls_back_to_default() {
        let table = AttackTable::default();
        assert_eq!(table.profile_or_default(None), AttackProfile::default());
        assert_eq!(table.profile_or_default(Some(AttackKind::Kick)).damage, 14);
    }
}
