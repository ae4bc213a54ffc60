//! Deferred one-shot effects on the simulation clock.
//!
//! Attack phases, landing lockout, invincibility expiry and flash clearing
//! are not closures: they are tagged entries in a [`TimerQueue`] owned by the
//! combatant. The owner drains due entries at the start of its update and
//! checks each entry's [`TimerGuard`] against its current state. A guard
//! that no longer holds turns the entry into a silent no-op; that is the
//! only cancellation mechanism.

use crate::combatant::FighterState;

/// Condition checked when a scheduled effect comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerGuard {
    /// Always fires.
    Always,
    /// Fires only while the owner is still in the phase that scheduled it:
    /// same phase serial and same state.
    Phase {
        /// Phase serial captured at scheduling time.
        serial: u32,
        /// State the owner must still be in.
        state: FighterState,
    },
    /// Fires only while no newer phase has started, whatever the state.
    Serial(u32),
    /// Fires unless the owner has been knocked out.
    NotKnockedOut,
}

/// The state change a timer applies when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEffect {
    /// Turn the attack hitbox on (start of the active window).
    EnableHitbox,
    /// Turn the attack hitbox off (end of the active window).
    DisableHitbox,
    /// Leave the attack state (end of recovery).
    EndAttack,
    /// Leave the landing lockout.
    EndLanding,
    /// Drop post-hit invulnerability.
    EndInvincibility,
    /// Clear the hit/chip flash marker.
    ClearFlash,
}

/// One pending effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledEffect {
    /// Simulation time (ms) at which the effect comes due.
    pub fires_at: u64,
    /// Precondition re-checked at fire time.
    pub guard: TimerGuard,
    /// What to do.
    pub effect: TimerEffect,
}

/// Pending effects for one combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TimerQueue {
    entries: Vec<ScheduledEffect>,
}

impl TimerQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an effect.
    pub fn schedule(&mut self, fires_at: u64, guard: TimerGuard, effect: TimerEffect) {
        self.entries.push(ScheduledEffect {
            fires_at,
            guard,
            effect,
        });
    }

    /// Remove and return every entry due at or before `now`.
    ///
    /// Entries come back ordered by due time; entries due at the same time
    /// keep their scheduling order.
    pub fn drain_due(&mut self, now: u64) -> Vec<ScheduledEffect> {
        let mut due: Vec<ScheduledEffect> = Vec::new();
        self.entries.retain(|entry| {
            if entry.fires_at <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|entry| entry.fires_at);
        due
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
