//! Events emitted by the encounter resolver and the round.
//!
//! Audio, VFX and reporting consume these; the simulation never reads them
//! back.

use serde::{Deserialize, Serialize};

use crate::attack::AttackKind;
use crate::combatant::Side;

/// Something that happened during hit resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An unblocked attack connected.
    HitLanded {
        /// Side that attacked.
        attacker: Side,
        /// Side that was hit.
        defender: Side,
        /// Attack that connected, if one was recorded.
        attack: Option<AttackKind>,
        /// Damage dealt after scaling.
        damage: u32,
        /// Attacker's combo count after this hit.
        combo: u32,
        /// Whether the defender was caught mid-attack.
        counter_hit: bool,
    },
    /// An attack connected with a blocking defender.
    Blocked {
        /// Side that attacked.
        attacker: Side,
        /// Side that blocked.
        defender: Side,
        /// Chip damage taken.
        chip: u32,
    },
    /// Both attacks met; nobody took damage.
    Clash,
    /// A combatant was knocked out.
    Knockout {
        /// Side that was knocked out.
        side: Side,
    },
    /// A combatant's combo counter changed.
    ComboChanged {
        /// Side whose combo changed.
        side: Side,
        /// New count.
        count: u32,
    },
}
