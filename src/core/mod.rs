#![allow(missing_docs)] // Doc comments live on the public items in each submodule

//! Core data structures and the stepping engine.
//!
//! - `particle`: species, particles and integer vectors
//! - `grid`: toroidal grid and the position integrator
//! - `rule`: declarative transmutation rules and built-in tables
//! - `collide`: per-cell collision resolution
//! - `event`: what a step did
//! - `sim`: the `Universe` that owns it all

pub mod collide;
pub mod event;
pub mod grid;
pub mod particle;
pub mod rule;
pub mod sim;

pub use event::{Leftover, Reaction, StepReport};
pub use grid::Grid;
pub use particle::{Particle, Species, Vec2};
pub use rule::{Product, Rule, RuleSet, Scan};
pub use sim::Universe;
