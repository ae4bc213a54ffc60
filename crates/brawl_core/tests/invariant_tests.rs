//! Property tests for combat invariants.
//!
//! Random intent streams for both fighters must never break hp bounds,
//! knockout bookkeeping, damage scaling or body separation.

use brawl_core::prelude::*;
use brawl_core::resolver::{chip_damage, combo_scale_percent};
use brawl_test_utils::determinism::strategies::{
    arb_combo_index, arb_damage, arb_intent, arb_intent_sequence,
};
use brawl_test_utils::fixtures::{fixed, FighterPair, FRAME_MS};
use proptest::prelude::*;

fn script(intents: &[Intent]) -> ScriptedIntents {
    intents
        .iter()
        .enumerate()
        .fold(ScriptedIntents::new(), |script, (i, intent)| {
            script.at(i as u64 * FRAME_MS, *intent)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hp_stays_bounded_and_ko_tracks_zero(
        gap in 80i32..200,
        p1 in arb_intent_sequence(240),
        p2 in arb_intent_sequence(240),
    ) {
        let mut pair = FighterPair::at_distance(gap);
        let (mut hp1, mut hp2) = (pair.p1.hp(), pair.p2.hp());

        for (a, b) in p1.iter().zip(p2.iter()) {
            let was_ko = (pair.p1.is_ko(), pair.p2.is_ko());
            pair.step(a, b);

            for (fighter, previous) in [(&pair.p1, hp1), (&pair.p2, hp2)] {
                prop_assert!(fighter.hp() <= fighter.max_hp());
                prop_assert!(fighter.hp() <= previous);
                prop_assert_eq!(fighter.hp() == 0, fighter.is_ko());
                if fighter.is_ko() {
                    prop_assert!(fighter.live_hitbox().is_none());
                }
            }
            prop_assert!(!was_ko.0 || pair.p1.is_ko());
            prop_assert!(!was_ko.1 || pair.p2.is_ko());
            hp1 = pair.p1.hp();
            hp2 = pair.p2.hp();
        }
    }

    #[test]
    fn live_hitbox_only_while_attacking(intents in arb_intent_sequence(200)) {
        let mut pair = FighterPair::at_distance(150);
        for intent in &intents {
            pair.step(intent, &Intent::IDLE);
            if pair.p1.live_hitbox().is_some() {
                prop_assert!(pair.p1.state().is_attacking());
            }
        }
    }

    #[test]
    fn invincible_fighter_ignores_damage(first in 1u32..300, second in arb_damage()) {
        let config = BrawlConfig::standard();
        let mut fighter = Combatant::new(Side::P2, 600, &config);
        fighter.update(&Intent::IDLE, 0);

        fighter.take_damage(first, 0, fixed(0), fixed(0));
        let hp = fighter.hp();
        prop_assert!(fighter.is_invincible() || fighter.is_ko());
        prop_assert_eq!(
            fighter.take_damage(second, 50, fixed(0), fixed(0)),
            DamageOutcome::Ignored
        );
        prop_assert_eq!(fighter.hp(), hp);
    }

    #[test]
    fn combo_scaling_never_increases_damage(base in 0u32..200, index in arb_combo_index()) {
        let tuning = BrawlConfig::standard().combat;
        let now = scaled_damage(base, index, false, &tuning);
        let next = scaled_damage(base, index + 1, false, &tuning);
        prop_assert!(next <= now);
        prop_assert!(now <= base);
        prop_assert!(combo_scale_percent(index, &tuning) >= tuning.combo_floor_percent);
        prop_assert!(now >= (base * tuning.combo_floor_percent).div_ceil(100));
        prop_assert!(scaled_damage(base, index, true, &tuning) >= now);
    }

    #[test]
    fn chip_is_bounded_by_damage(damage in arb_damage()) {
        let tuning = BrawlConfig::standard().combat;
        let chip = chip_damage(damage, &tuning);
        prop_assert!(chip <= damage);
        prop_assert_eq!(chip > 0, damage > 0);
    }

    #[test]
    fn combat_ignores_contradictory_buttons(intent in arb_intent()) {
        let mut pair = FighterPair::at_distance(120);
        pair.hold(&intent, &intent, 30);
        prop_assert!(pair.p1.hp() <= pair.p1.max_hp());
        prop_assert!(pair.p2.hp() <= pair.p2.max_hp());
    }

    #[test]
    fn bodies_never_overlap_or_leave_the_stage(
        p1 in arb_intent_sequence(300),
        p2 in arb_intent_sequence(300),
    ) {
        let mut config = BrawlConfig::standard();
        config.stage.p1_spawn_x = 500;
        config.stage.p2_spawn_x = 620;
        let left = fixed(config.stage.left_wall);
        let right = fixed(config.stage.right_wall);
        let mut round = Round::new(config, Box::new(script(&p1)), Box::new(script(&p2)));

        let ticks = p1.len().max(p2.len()) as u64;
        for tick in 0..ticks {
            if round.is_over() {
                break;
            }
            round.tick(tick * FRAME_MS);
            let (a, b) = (round.p1().hurtbox(), round.p2().hurtbox());
            prop_assert!(a.horizontal_overlap(&b) <= fixed(0));
            for hurtbox in [a, b] {
                prop_assert!(hurtbox.min_x() >= left);
                prop_assert!(hurtbox.max_x() <= right);
            }
        }
    }
}
