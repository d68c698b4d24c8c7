use crate::core::particle::{Particle, Vec2};
use crate::error::{Error, Result};

/// Toroidal integer grid: `[0, width) x [0, height)` with wraparound on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: i64,
    height: i64,
}

impl Grid {
    /// Create a grid after validating its dimensions.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if `width` or `height` is not positive.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        if width <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "width must be > 0, got {width}"
            )));
        }
        if height <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "height must be > 0, got {height}"
            )));
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.height
    }

    /// Reduce a position into the grid using floor-modulo on each axis.
    #[inline]
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.rem_euclid(self.width), p.y.rem_euclid(self.height))
    }

    /// Position reached from `from` after `step` units at `velocity`, wrapped.
    ///
    /// Computed in `i128` and reduced before narrowing, so large steps or
    /// velocities cannot overflow.
    #[inline]
    pub fn displace(&self, from: Vec2, velocity: Vec2, step: i64) -> Vec2 {
        Vec2::new(
            wrap_axis(from.x, velocity.x, step, self.width),
            wrap_axis(from.y, velocity.y, step, self.height),
        )
    }
}

/// Move every particle by `step * velocity`, wrapping into the grid.
///
/// `step` may be negative (time runs backwards) or zero (no-op).
pub fn advance(grid: &Grid, particles: &mut [Particle], step: i64) {
    if step == 0 {
        return;
    }
    for p in particles.iter_mut() {
        p.position = grid.displace(p.position, p.velocity, step);
    }
}

#[inline]
fn wrap_axis(x: i64, v: i64, step: i64, len: i64) -> i64 {
    let moved = i128::from(x) + i128::from(v) * i128::from(step);
    // The remainder lies in [0, len) and len is an i64, so the cast is lossless.
    moved.rem_euclid(i128::from(len)) as i64
}
