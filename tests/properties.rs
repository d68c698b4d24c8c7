//! Property-based tests for the stepping engine.
//!
//! Random universes are drawn from the seeded generator, so every failure is
//! reproducible from the shrunk seed.

use arrow_of_time::{RuleSet, Species, Universe};
use proptest::prelude::*;

fn model(carrier: bool) -> (RuleSet, &'static [Species]) {
    if carrier {
        (RuleSet::carrier(), &[Species::A, Species::B, Species::C])
    } else {
        (RuleSet::classic(), &[Species::A, Species::B])
    }
}

fn random_universe(w: i64, h: i64, n: usize, carrier: bool, seed: u64) -> Universe {
    let (rules, pool) = model(carrier);
    Universe::random(w, h, n, pool, rules, Some(seed)).expect("valid random universe")
}

fn nonzero_step() -> impl Strategy<Value = i64> {
    prop_oneof![-4i64..=-1, 1i64..=4]
}

// =============================================================================
// Reversibility
// =============================================================================

proptest! {
    /// step(k) then step(-k) restores the state whenever the first step
    /// reports itself exactly reversible.
    #[test]
    fn prop_round_trip_when_reversible(
        w in 1i64..=8,
        h in 1i64..=8,
        n in 0usize..24,
        carrier: bool,
        seed: u64,
        k in nonzero_step(),
    ) {
        let mut u = random_universe(w, h, n, carrier, seed);
        let before = u.particles().to_vec();

        let report = u.step(k);
        if report.is_exactly_reversible() {
            u.step(-k);
            prop_assert_eq!(u.particles(), &before[..]);
            prop_assert_eq!(u.time(), 0);
        }
    }

    /// A chain of reversible steps unwinds in reverse order.
    #[test]
    fn prop_chain_unwinds(
        w in 4i64..=16,
        h in 4i64..=16,
        n in 0usize..12,
        carrier: bool,
        seed: u64,
        steps in prop::collection::vec(nonzero_step(), 1..6),
    ) {
        let mut u = random_universe(w, h, n, carrier, seed);
        let before = u.particles().to_vec();

        let mut taken = Vec::new();
        for &k in &steps {
            if !u.step(k).is_exactly_reversible() {
                return Ok(());
            }
            taken.push(k);
        }
        for &k in taken.iter().rev() {
            u.step(-k);
        }
        prop_assert_eq!(u.particles(), &before[..]);
    }
}

// =============================================================================
// Invariants that hold for every step
// =============================================================================

proptest! {
    /// Positions stay on the grid, payloads match species, and the particle
    /// count changes exactly by what the report says was created or discarded.
    #[test]
    fn prop_step_invariants(
        w in 1i64..=6,
        h in 1i64..=6,
        n in 0usize..30,
        carrier: bool,
        seed: u64,
        steps in prop::collection::vec(nonzero_step(), 1..8),
    ) {
        let mut u = random_universe(w, h, n, carrier, seed);
        for &k in &steps {
            let len_before = u.len();
            let report = u.step(k);

            let created: usize = report.reactions.iter().map(|r| r.created).sum();
            let discarded = report.discarded().count();
            prop_assert_eq!(u.len() + discarded, len_before + created);

            for p in u.particles() {
                prop_assert!((0..w).contains(&p.position.x));
                prop_assert!((0..h).contains(&p.position.y));
                prop_assert!(p.validate().is_ok());
            }
        }
    }

    /// step(0) is the identity.
    #[test]
    fn prop_zero_step_identity(
        w in 1i64..=6,
        h in 1i64..=6,
        n in 0usize..20,
        carrier: bool,
        seed: u64,
    ) {
        let mut u = random_universe(w, h, n, carrier, seed);
        let before = u.particles().to_vec();
        prop_assert!(u.step(0).is_quiet());
        prop_assert!(u.step(0).is_quiet());
        prop_assert_eq!(u.particles(), &before[..]);
    }

    /// Stepping is deterministic: equal universes evolve identically.
    #[test]
    fn prop_deterministic(
        n in 0usize..20,
        carrier: bool,
        seed: u64,
        k in nonzero_step(),
    ) {
        let mut u1 = random_universe(5, 5, n, carrier, seed);
        let mut u2 = u1.clone();
        let r1 = u1.step(k);
        let r2 = u2.step(k);
        prop_assert_eq!(r1, r2);
        prop_assert_eq!(u1.particles(), u2.particles());
    }
}
