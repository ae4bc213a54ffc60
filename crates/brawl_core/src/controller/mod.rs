//! Intent sources: anything that can drive a combatant.
//!
//! A human input decoder, the [`OpponentController`], a test script and an
//! idle dummy all implement [`IntentSource`]. A source sees both combatants
//! read-only and returns one [`Intent`] per tick.

mod opponent;
mod rng;
mod tactics;

pub use opponent::{MacroState, OpponentController};
pub use rng::DecisionRng;

use crate::combatant::Combatant;
use crate::intent::Intent;

/// Produces the intent for one combatant each tick.
pub trait IntentSource: Send {
    /// Decide the intent for `own` at simulation time `now_ms`.
    fn next_intent(&mut self, own: &Combatant, opponent: &Combatant, now_ms: u64) -> Intent;

    /// Return to the round-start state.
    fn reset(&mut self) {}
}

/// Holds the same intent forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantIntent(pub Intent);

impl ConstantIntent {
    /// A source that never does anything.
    #[must_use]
    pub const fn idle() -> Self {
        Self(Intent::IDLE)
    }
}

impl IntentSource for ConstantIntent {
    fn next_intent(&mut self, _own: &Combatant, _opponent: &Combatant, _now_ms: u64) -> Intent {
        self.0
    }
}

/// Timeline of intents keyed by simulation time.
///
/// Each entry takes over at its timestamp and holds until the next one.
/// Before the first entry the source is idle.
///
/// ```
/// use brawl_core::attack::AttackKind;
/// use brawl_core::controller::ScriptedIntents;
/// use brawl_core::intent::Intent;
///
/// let script = ScriptedIntents::new()
///     .at(0, Intent::walking(1))
///     .at(400, Intent::attacking(AttackKind::Jab))
///     .at(500, Intent::IDLE);
/// assert_eq!(script.intent_at(450), Intent::attacking(AttackKind::Jab));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedIntents {
    steps: Vec<(u64, Intent)>,
}

impl ScriptedIntents {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `intent` at `at_ms`. Entries may be added in any order.
    #[must_use]
    pub fn at(mut self, at_ms: u64, intent: Intent) -> Self {
        let index = self.steps.partition_point(|(t, _)| *t <= at_ms);
        self.steps.insert(index, (at_ms, intent));
        self
    }

    /// The intent in effect at `now_ms`.
    #[must_use]
    pub fn intent_at(&self, now_ms: u64) -> Intent {
        let index = self.steps.partition_point(|(t, _)| *t <= now_ms);
        index
            .checked_sub(1)
            .map_or(Intent::IDLE, |i| self.steps[i].1)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntentSource for ScriptedIntents {
    fn next_intent(&mut self, _own: &Combatant, _opponent: &Combatant, now_ms: u64) -> Intent {
        self.intent_at(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::AttackKind;

    #[test]
    fn test_script_holds_until_next_entry() {
        let script = ScriptedIntents::new()
            .at(500, Intent::blocking())
            .at(100, Intent::walking(-1));

        assert_eq!(script.intent_at(0), Intent::IDLE);
        assert_eq!(script.intent_at(100), Intent::walking(-1));
        assert_eq!(script.intent_at(499), Intent::walking(-1));
        assert_eq!(script.intent_at(10_000), Intent::blocking());
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_later_entry_at_same_time_wins() {
        let script = ScriptedIntents::new()
            .at(0, Intent::walking(1))
            .at(0, Intent::attacking(AttackKind::Kick));
        assert_eq!(script.intent_at(0), Intent::attacking(AttackKind::Kick));
    }

    #[test]
    fn test_constant_intent() {
        let config = crate::config::BrawlConfig::standard();
        let own = Combatant::spawn(crate::combatant::Side::P1, &config);
        let other = Combatant::spawn(crate::combatant::Side::P2, &config);
        let mut source = ConstantIntent::idle();
        assert_eq!(source.next_intent(&own, &other, 0), Intent::IDLE);
        let mut source = ConstantIntent(Intent::blocking());
        assert_eq!(source.next_intent(&own, &other, 99), Intent::blocking());
    }
}
