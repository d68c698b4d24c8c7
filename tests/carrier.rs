use arrow_of_time::error::Result;
use arrow_of_time::{Particle, RuleSet, Species, Universe, Vec2};

fn carrier_universe(ps: &[(i64, i64, i64, i64)]) -> Result<Universe> {
    let mut u = Universe::with_rules(10, 10, RuleSet::carrier())?;
    for &(x, y, vx, vy) in ps {
        u.add(Particle::plain(Species::A, Vec2::new(x, y), Vec2::new(vx, vy))?)?;
    }
    Ok(u)
}

/// Annihilation sends the pair off with swapped velocities and a carrier whose
/// velocity and payload together hold the incoming components; stepping back
/// rebuilds both A from the carrier.
#[test]
fn annihilation_smuggles_state_through_carrier() -> Result<()> {
    // Both reach (1, 2) after one step.
    let mut u = carrier_universe(&[(0, 0, 1, 2), (2, 9, -1, 3)])?;
    let before = u.particles().to_vec();

    let report = u.step(1);
    assert_eq!(report.count("annihilation"), 1);
    assert!(report.is_exactly_reversible());

    let ps = u.particles();
    assert_eq!(ps.len(), 3);
    assert_eq!(ps[0].species, Species::B);
    assert_eq!(ps[0].velocity, Vec2::new(-1, 3));
    assert_eq!(ps[1].species, Species::B);
    assert_eq!(ps[1].velocity, Vec2::new(1, 2));
    assert_eq!(ps[2].species, Species::C);
    assert_eq!(ps[2].position, Vec2::new(1, 2));
    assert_eq!(ps[2].velocity, Vec2::new(1, 3));
    assert_eq!(ps[2].payload, Some(Vec2::new(-1, 2)));

    let back = u.step(-1);
    assert_eq!(back.count("recombination"), 1);
    assert_eq!(u.particles(), &before[..]);
    Ok(())
}

/// The products separate and only meet again when time runs backwards.
#[test]
fn products_fly_apart_and_return() -> Result<()> {
    let mut u = carrier_universe(&[(0, 0, 1, 2), (2, 9, -1, 3)])?;
    let before = u.particles().to_vec();

    for _ in 0..6 {
        u.step(1);
    }
    assert_eq!(u.count(Species::C), 1);
    assert!(u
        .particles()
        .iter()
        .all(|p| p.species.carries_payload() == p.payload.is_some()));

    for _ in 0..6 {
        u.step(-1);
    }
    assert_eq!(u.particles(), &before[..]);
    Ok(())
}

/// Three A: one pair annihilates, the third stays, and all three come back.
#[test]
fn odd_group_in_carrier_model() -> Result<()> {
    let mut u = carrier_universe(&[(0, 0, 1, 0), (2, 0, -1, 0), (1, 1, 0, -1)])?;
    let before = u.particles().to_vec();

    let report = u.step(1);
    assert_eq!(report.count("annihilation"), 1);
    assert_eq!(u.count(Species::A), 1);
    assert_eq!(u.count(Species::B), 2);
    assert_eq!(u.count(Species::C), 1);
    assert_eq!(u.particles()[3].species, Species::A);

    u.step(-1);
    assert_eq!(u.particles(), &before[..]);
    Ok(())
}

/// Running backwards first creates the carrier ahead of the pair; the
/// forward step then consumes it again.
#[test]
fn backward_then_forward_in_carrier_model() -> Result<()> {
    let mut u = carrier_universe(&[(4, 4, 2, -1), (4, 4, -3, 5)])?;
    let before = u.particles().to_vec();

    u.step(-1);
    assert_eq!(u.particles()[0].species, Species::C);

    u.step(1);
    assert_eq!(u.particles(), &before[..]);
    Ok(())
}
