use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Integer 2D vector used for positions, velocities and payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vec2 {
    pub x: i64,
    pub y: i64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Vec2 {
    #[inline]
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Particle species.
///
/// `A` and `B` are plain species. `C` is the carrier: it always holds a
/// payload, which is how state survives an annihilation and is recovered on
/// the matching recombination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    A,
    B,
    C,
}

impl Species {
    /// Every species, in declaration order.
    pub const ALL: [Species; 3] = [Species::A, Species::B, Species::C];

    /// Whether particles of this species must carry a payload.
    #[inline]
    pub const fn carries_payload(self) -> bool {
        matches!(self, Species::C)
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
            Species::C => "C",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Species::A),
            "B" | "b" => Ok(Species::B),
            "C" | "c" => Ok(Species::C),
            other => Err(Error::InvalidParam(format!("unknown species '{other}'"))),
        }
    }
}

/// A single particle on the grid.
///
/// Fields:
/// - `species`: role tag; decides which rules can consume the particle
/// - `position`: grid cell, kept inside the universe's bounds
/// - `velocity`: cells travelled per unit step, constant between reactions
/// - `payload`: present exactly when `species.carries_payload()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Particle {
    pub species: Species,
    pub position: Vec2,
    pub velocity: Vec2,
    pub payload: Option<Vec2>,
}

impl Particle {
    /// Create a new particle after validating that payload presence matches the species.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if a carrier has no payload or a plain species has one.
    pub fn new(
        species: Species,
        position: Vec2,
        velocity: Vec2,
        payload: Option<Vec2>,
    ) -> Result<Self> {
        let p = Self {
            species,
            position,
            velocity,
            payload,
        };
        p.validate()?;
        Ok(p)
    }

    /// Create a payload-free particle.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `species` is a carrier.
    pub fn plain(species: Species, position: Vec2, velocity: Vec2) -> Result<Self> {
        Self::new(species, position, velocity, None)
    }

    /// Check the species/payload invariant.
    pub fn validate(&self) -> Result<()> {
        match (self.species.carries_payload(), self.payload.is_some()) {
            (true, false) => Err(Error::InvalidParam(format!(
                "species {} requires a payload",
                self.species
            ))),
            (false, true) => Err(Error::InvalidParam(format!(
                "species {} cannot carry a payload",
                self.species
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.species, self.position)
    }
}
