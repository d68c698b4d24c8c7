//! A universe model demonstrating the arrow of time.
//!
//! Particles live on a toroidal integer grid and move at constant velocity.
//! Co-located particles react according to a table of transmutation rules
//! engineered so that every step can be undone exactly: stepping forward by
//! `s` and then by `-s` restores the particle sequence bit-for-bit, unless a
//! rule deliberately erased information, in which case the step's
//! [`StepReport`] says so.
//!
//! ```
//! use arrow_of_time::{Particle, Species, Universe, Vec2};
//!
//! # fn main() -> arrow_of_time::error::Result<()> {
//! let mut u = Universe::new(10, 10)?;
//! u.add(Particle::plain(Species::A, Vec2::new(0, 0), Vec2::new(1, 0))?)?;
//! u.add(Particle::plain(Species::A, Vec2::new(2, 0), Vec2::new(-1, 0))?)?;
//! let before = u.particles().to_vec();
//!
//! let report = u.step(1);
//! assert_eq!(u.count(Species::B), 3);
//! assert!(report.is_exactly_reversible());
//!
//! u.step(-1);
//! assert_eq!(u.particles(), &before[..]);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{
    Grid, Leftover, Particle, Product, Reaction, Rule, RuleSet, Scan, Species, StepReport,
    Universe, Vec2,
};
