//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a round produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and AI-vs-AI batch runs only mean something if the same seeds
//! and the same tick times give the same round. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: Positions and velocities use
//!   [`brawl_core::math::Fixed`]. The controller's probabilities are `f32`
//!   but only ever compared, never accumulated into simulation state.
//!
//! - **System randomness**: Controllers draw from a seeded
//!   `DecisionRng`, never from the OS.
//!
//! - **Wall-clock time**: The core only sees the `now` passed to `tick`.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Combatant and resolver determinism
//! 2. **Property tests**: Random intents still produce deterministic outputs
//! 3. **Integration tests**: Full AI-vs-AI rounds are reproducible
//! 4. **Parallel tests**: Running N rounds on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use brawl_core::round::Round;

use crate::fixtures::FRAME_MS;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic round).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Round is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// `step` receives the tick index so callers can derive simulation time.
///
/// # Example
///
/// ```
/// use brawl_core::config::BrawlConfig;
/// use brawl_test_utils::determinism::verify_determinism;
/// use brawl_test_utils::fixtures::ai_round;
///
/// let result = verify_determinism(
///     3,
///     200,
///     || ai_round(BrawlConfig::standard(), 0.5, (1, 2)),
///     |round, tick| {
///         round.tick(tick * 16);
///     },
///     |round| round.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for tick in 0..ticks {
            step(&mut state, tick);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a round twice from identical setup at [`FRAME_MS`] and compare the
/// final state hashes.
pub fn verify_round_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Round,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |round, tick| {
            round.tick(tick * FRAME_MS);
        },
        Round::state_hash,
    )
    .is_deterministic
}

/// Run `num_rounds` rounds on scoped threads and collect their final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_rounds<F>(setup_fn: F, num_rounds: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Round + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_rounds)
            .map(|_| {
                s.spawn(|| {
                    let mut round = setup_fn();
                    for tick in 0..num_ticks {
                        round.tick(tick * FRAME_MS);
                    }
                    round.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two rounds tick by tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the rounds stay identical, `Some(tick)` for the first tick
/// after which their hashes differ (0 means the setups already differ).
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Round,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let now = (tick - 1) * FRAME_MS;
        a.tick(now);
        b.tick(now);
        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based tests.
pub mod strategies {
    use brawl_core::attack::AttackKind;
    use brawl_core::intent::Intent;
    use proptest::prelude::*;

    /// Any attack kind.
    pub fn arb_attack_kind() -> impl Strategy<Value = AttackKind> {
        proptest::sample::select(AttackKind::ALL.to_vec())
    }

    /// Any combination of buttons, including contradictory ones.
    pub fn arb_intent() -> impl Strategy<Value = Intent> {
        (any::<[bool; 5]>(), any::<[bool; 5]>()).prop_map(|(a, b)| Intent {
            left: a[0],
            right: a[1],
            up: a[2],
            down: a[3],
            jump: a[4],
            punch: b[0],
            jab: b[1],
            kick: b[2],
            block: b[3],
            duck: b[4],
        })
    }

    /// Intents weighted toward what a player actually holds.
    pub fn arb_plausible_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            3 => Just(Intent::IDLE),
            3 => prop_oneof![Just(-1), Just(1)].prop_map(Intent::walking),
            2 => arb_attack_kind().prop_map(Intent::attacking),
            1 => Just(Intent::jumping()),
            1 => Just(Intent::blocking()),
            1 => Just(Intent::ducking()),
        ]
    }

    /// A sequence of intents, one per frame.
    pub fn arb_intent_sequence(max_len: usize) -> impl Strategy<Value = Vec<Intent>> {
        proptest::collection::vec(arb_plausible_intent(), 1..max_len)
    }

    /// Raw damage amounts, including zero and overkill.
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        0u32..300
    }

    /// Combo index as seen by the damage formula.
    pub fn arb_combo_index() -> impl Strategy<Value = u32> {
        1u32..40
    }

    /// Controller difficulty.
    pub fn arb_difficulty() -> impl Strategy<Value = f32> {
        0.0f32..=1.0
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{ai_round, idle_round};
    use brawl_core::config::BrawlConfig;
    use brawl_core::intent::Intent;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_counts_runs() {
        let result = verify_determinism(4, 10, || 0u64, |n, t| *n += t, |n| *n);
        assert_eq!(result.hashes, vec![45; 4]);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes(), vec![45]);
    }

    #[test]
    fn test_detects_divergent_state() {
        let counter = std::cell::Cell::new(0u64);
        let result = verify_determinism(
            2,
            1,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |_, _| {},
            |n| *n,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 2);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_panics_on_divergence() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            ticks: 1,
        }
        .assert_deterministic();
    }

    #[test]
    fn test_ai_round_is_deterministic() {
        assert!(verify_round_determinism(
            || ai_round(BrawlConfig::standard(), 0.7, (11, 12)),
            1500
        ));
    }

    #[test]
    fn test_parallel_rounds_match() {
        let result = run_parallel_rounds(|| ai_round(BrawlConfig::standard(), 0.4, (3, 4)), 4, 600);
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_no_divergence_for_idle_round() {
        assert_eq!(
            find_first_divergence(|| idle_round(BrawlConfig::standard()), 100),
            None
        );
    }

    #[test]
    fn test_divergence_found_for_different_setups() {
        let seed = std::cell::Cell::new(0u64);
        let tick = find_first_divergence(
            || {
                seed.set(seed.get() + 1);
                ai_round(BrawlConfig::standard(), 1.0, (seed.get(), 99))
            },
            3000,
        );
        assert!(tick.is_some());
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&Intent::IDLE), compute_hash(&Intent::IDLE));
        assert_ne!(compute_hash(&Intent::IDLE), compute_hash(&Intent::jumping()));
    }

    proptest! {
        #[test]
        fn prop_seeded_rounds_replay(seed in any::<u64>(), difficulty in arb_difficulty()) {
            let setup = || ai_round(BrawlConfig::standard(), difficulty, (seed, seed ^ 0xFF));
            prop_assert!(verify_round_determinism(setup, 300));
        }

        #[test]
        fn prop_plausible_intents_are_consistent(intent in arb_plausible_intent()) {
            prop_assert!(!(intent.left && intent.right));
        }
    }
}
