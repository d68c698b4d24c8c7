use crate::core::collide::{self, Resolution};
use crate::core::event::StepReport;
use crate::core::grid::{self, Grid};
use crate::core::particle::{Particle, Species, Vec2};
use crate::core::rule::RuleSet;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use tracing::debug;

/// A toroidal universe of particles that can be stepped forwards or backwards in time.
///
/// The particle sequence is ordered, and the order matters: it decides how
/// co-located particles are grouped and where created particles are placed.
/// Stepping by `s` and then by `-s` restores the sequence exactly unless the
/// forward step erased information (see [`StepReport::is_exactly_reversible`]).
#[derive(Debug, Clone)]
pub struct Universe {
    grid: Grid,
    rules: RuleSet,
    particles: Vec<Particle>,
    time_now: i128,
}

impl Universe {
    /// Create an empty universe using the classic two-species rules.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if `width` or `height` is not positive.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        Self::with_rules(width, height, RuleSet::classic())
    }

    /// Create an empty universe with a custom rule table.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if `width` or `height` is not positive.
    pub fn with_rules(width: i64, height: i64, rules: RuleSet) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(width, height)?,
            rules,
            particles: Vec::new(),
            time_now: 0,
        })
    }

    /// Create a universe of `num_particles` random particles.
    ///
    /// Species are drawn uniformly from `species`; positions cover the whole
    /// grid; velocity and payload components are drawn from `[0, width)` and
    /// `[0, height)`. The same `seed` always yields the same universe; `None`
    /// seeds from the thread RNG.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if `width` or `height` is not positive.
    /// - `Error::InvalidParam` if `species` is empty while `num_particles > 0`.
    pub fn random(
        width: i64,
        height: i64,
        num_particles: usize,
        species: &[Species],
        rules: RuleSet,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut u = Self::with_rules(width, height, rules)?;
        u.populate(num_particles, species, seed)?;
        Ok(u)
    }

    /// Append `num_particles` random particles (see [`Universe::random`]).
    pub fn populate(
        &mut self,
        num_particles: usize,
        species: &[Species],
        seed: Option<u64>,
    ) -> Result<()> {
        if num_particles > 0 && species.is_empty() {
            return Err(Error::InvalidParam(
                "species pool must not be empty".into(),
            ));
        }
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let (w, h) = (self.grid.width(), self.grid.height());
        self.particles.reserve(num_particles);
        for _ in 0..num_particles {
            let s = species[rng.random_range(0..species.len())];
            let position = Vec2::new(rng.random_range(0..w), rng.random_range(0..h));
            let velocity = Vec2::new(rng.random_range(0..w), rng.random_range(0..h));
            let payload = s
                .carries_payload()
                .then(|| Vec2::new(rng.random_range(0..w), rng.random_range(0..h)));
            self.particles.push(Particle::new(s, position, velocity, payload)?);
        }
        debug!(
            added = num_particles,
            total = self.particles.len(),
            "universe populated"
        );
        Ok(())
    }

    /// Append a particle, wrapping its position into the grid.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the payload does not match the species.
    pub fn add(&mut self, mut particle: Particle) -> Result<()> {
        particle.validate()?;
        particle.position = self.grid.wrap(particle.position);
        self.particles.push(particle);
        Ok(())
    }

    /// Advance time by `step` units (negative runs time backwards).
    ///
    /// Forward steps move every particle and then resolve collisions;
    /// backward steps resolve collisions first and then move, which exactly
    /// undoes the forward order. `step == 0` changes nothing.
    pub fn step(&mut self, step: i64) -> StepReport {
        if step == 0 {
            return StepReport::empty(0);
        }

        let Resolution {
            reactions,
            leftovers,
        } = if step > 0 {
            grid::advance(&self.grid, &mut self.particles, step);
            collide::resolve(&self.rules, &mut self.particles, step)
        } else {
            let res = collide::resolve(&self.rules, &mut self.particles, step);
            grid::advance(&self.grid, &mut self.particles, step);
            res
        };
        self.time_now += i128::from(step);

        let report = StepReport {
            step,
            reactions,
            leftovers,
        };
        debug!(
            step,
            time = self.time_now,
            particles = self.particles.len(),
            reactions = report.reactions.len(),
            discarded = report.discarded().count(),
            reversible = report.is_exactly_reversible(),
            "universe stepped"
        );
        report
    }

    /// Particles in sequence order.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles of the given species.
    pub fn count(&self, species: Species) -> usize {
        self.particles.iter().filter(|p| p.species == species).count()
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.grid.height()
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Signed sum of every step taken so far.
    ///
    /// Held as `i128` so any sequence of `i64` steps sums without overflow.
    #[inline]
    pub fn time(&self) -> i128 {
        self.time_now
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.particles.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_universe_is_empty() -> Result<()> {
        let u = Universe::new(10, 20)?;
        assert!(u.is_empty());
        assert_eq!((u.width(), u.height()), (10, 20));
        assert_eq!(u.time(), 0);
        Ok(())
    }

    #[test]
    fn invalid_dimensions_rejected() {
        for (w, h) in [(0, 5), (5, 0), (-3, 4), (4, -3)] {
            let err = Universe::new(w, h).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "{w}x{h}");
        }
    }

    #[test]
    fn add_wraps_position() -> Result<()> {
        let mut u = Universe::new(3, 4)?;
        u.add(Particle::plain(Species::A, Vec2::new(-1, 9), Vec2::ZERO)?)?;
        assert_eq!(u.particles()[0].position, Vec2::new(2, 1));
        Ok(())
    }

    #[test]
    fn add_rejects_tampered_particle() -> Result<()> {
        let mut u = Universe::new(3, 4)?;
        let mut p = Particle::plain(Species::A, Vec2::ZERO, Vec2::ZERO)?;
        p.species = Species::C;
        assert!(u.add(p).is_err());
        assert!(u.is_empty());
        Ok(())
    }

    #[test]
    fn random_is_reproducible_and_in_bounds() -> Result<()> {
        let pool = [Species::A, Species::B, Species::C];
        let u1 = Universe::random(7, 5, 200, &pool, RuleSet::carrier(), Some(1234))?;
        let u2 = Universe::random(7, 5, 200, &pool, RuleSet::carrier(), Some(1234))?;
        assert_eq!(u1.particles(), u2.particles());
        assert_eq!(u1.len(), 200);
        for p in u1.particles() {
            assert!((0..7).contains(&p.position.x) && (0..5).contains(&p.position.y));
            p.validate()?;
        }
        Ok(())
    }

    #[test]
    fn random_requires_species() {
        let err = Universe::random(5, 5, 3, &[], RuleSet::classic(), Some(1)).unwrap_err();
        assert!(err.to_string().contains("species pool"));
        assert!(Universe::random(5, 5, 0, &[], RuleSet::classic(), Some(1)).is_ok());
    }

    #[test]
    fn time_tracks_signed_steps() -> Result<()> {
        let mut u = Universe::new(4, 4)?;
        u.step(3);
        u.step(-1);
        u.step(0);
        assert_eq!(u.time(), 2);
        Ok(())
    }

    #[test]
    fn time_survives_extreme_steps() -> Result<()> {
        let mut u = Universe::new(4, 4)?;
        u.add(Particle::plain(Species::A, Vec2::new(1, 2), Vec2::new(3, -1))?)?;
        let before = u.particles().to_vec();

        u.step(i64::MAX);
        u.step(i64::MAX);
        assert_eq!(u.time(), 2 * i128::from(i64::MAX));
        u.step(1);
        u.step(-1);
        u.step(-i64::MAX);
        u.step(-i64::MAX);
        assert_eq!(u.time(), 0);
        assert_eq!(u.particles(), &before[..]);
        Ok(())
    }

    #[test]
    fn display_lists_species_and_positions() -> Result<()> {
        let mut u = Universe::new(10, 10)?;
        u.add(Particle::plain(Species::A, Vec2::new(1, 0), Vec2::ZERO)?)?;
        u.add(Particle::plain(Species::B, Vec2::new(3, 4), Vec2::ZERO)?)?;
        assert_eq!(u.to_string(), "A(1, 0), B(3, 4)");
        Ok(())
    }
}
