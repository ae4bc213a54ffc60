//! # Brawl Core
//!
//! Deterministic combat core for a 2D fighting game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering, animation or audio
//! - No input device handling (only decoded [`intent::Intent`]s)
//! - No system randomness (controllers use a seeded generator)
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! This separation enables:
//! - Headless AI-vs-AI runs
//! - Determinism testing
//! - Replaying a round from its intents and timestamps
//!
//! ## Crate Structure
//!
//! - [`combatant`] - Per-fighter state machine
//! - [`resolver`] - Hit detection, damage, combos, hit-stop, clash
//! - [`controller`] - Intent sources, including the AI opponent
//! - [`round`] - One round: countdown, tick order, outcome
//! - [`config`] - RON-loadable tuning
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attack;
pub mod body;
pub mod combatant;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod intent;
pub mod math;
pub mod resolver;
pub mod round;
pub mod timers;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::attack::{AttackKind, AttackProfile, AttackTable};
    pub use crate::combatant::{
        Combatant, DamageOutcome, Facing, FighterState, Flash, JumpPhase, Side,
    };
    pub use crate::config::{AiTuning, BrawlConfig, CombatTuning, FighterTuning, StageConfig};
    pub use crate::controller::{
        ConstantIntent, IntentSource, MacroState, OpponentController, ScriptedIntents,
    };
    pub use crate::error::{BrawlError, Result};
    pub use crate::events::CombatEvent;
    pub use crate::intent::Intent;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::resolver::{scaled_damage, EncounterResolver};
    pub use crate::round::{EndReason, Round, RoundOutcome, TickEvents};
}
