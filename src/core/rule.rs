//! Declarative transmutation rules and the built-in rule tables.
//!
//! A rule consumes a fixed-arity group of co-located particles matching its
//! input pattern and replaces it with a group matching its output pattern.
//! Output fields are a pure function of the consumed inputs. The engine in
//! [`crate::core::collide`] decides which groups match and where the outputs
//! land in the particle sequence.

use crate::core::particle::{Particle, Species, Vec2};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Candidate scan orientation within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Members are taken in sequence order.
    Forward,
    /// Members are taken in reverse sequence order.
    Reverse,
}

impl Scan {
    /// Orientation actually used for a step of the given sign.
    ///
    /// Running time backwards mirrors the scan, which pairs particles in the
    /// exact reverse of the order the forward step produced them in.
    #[inline]
    pub fn for_step(self, step: i64) -> Scan {
        if step >= 0 {
            self
        } else {
            self.flipped()
        }
    }

    #[inline]
    pub fn flipped(self) -> Scan {
        match self {
            Scan::Forward => Scan::Reverse,
            Scan::Reverse => Scan::Forward,
        }
    }
}

/// Kinematic fields of one rule output. The position is always the collision cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub velocity: Vec2,
    pub payload: Option<Vec2>,
}

impl Product {
    #[inline]
    pub const fn plain(velocity: Vec2) -> Self {
        Self {
            velocity,
            payload: None,
        }
    }

    #[inline]
    pub const fn carrying(velocity: Vec2, payload: Vec2) -> Self {
        Self {
            velocity,
            payload: Some(payload),
        }
    }
}

/// Output field derivation: consumed inputs (in pattern order) to products (in output order).
pub type Derive = fn(&[Particle]) -> Vec<Product>;

/// A single N-to-M transmutation rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub inputs: &'static [Species],
    pub outputs: &'static [Species],
    /// Scan orientation for positive steps.
    pub scan: Scan,
    /// Priority for positive steps; lower runs first.
    pub weight: i32,
    pub derive: Derive,
}

impl Rule {
    #[inline]
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Distinct input species with their multiplicity, in order of first appearance.
    pub fn input_counts(&self) -> Vec<(Species, usize)> {
        let mut counts: Vec<(Species, usize)> = Vec::new();
        for &s in self.inputs {
            match counts.iter_mut().find(|(t, _)| *t == s) {
                Some((_, n)) => *n += 1,
                None => counts.push((s, 1)),
            }
        }
        counts
    }

    fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "rule '{}' has no inputs",
                self.name
            )));
        }
        if self.outputs.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "rule '{}' has no outputs",
                self.name
            )));
        }

        // Probe the derivation with synthetic inputs to check its output shape.
        let probe: Vec<Particle> = self
            .inputs
            .iter()
            .map(|&species| Particle {
                species,
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
                payload: species.carries_payload().then_some(Vec2::ZERO),
            })
            .collect();
        let products = (self.derive)(&probe);
        if products.len() != self.outputs.len() {
            return Err(Error::InvalidConfiguration(format!(
                "rule '{}' derives {} products for {} outputs",
                self.name,
                products.len(),
                self.outputs.len()
            )));
        }
        for (k, (species, product)) in self.outputs.iter().zip(&products).enumerate() {
            if species.carries_payload() != product.payload.is_some() {
                return Err(Error::InvalidConfiguration(format!(
                    "rule '{}' output {} ({}) has mismatched payload",
                    self.name, k, species
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("scan", &self.scan)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Ordered, validated table of rules.
///
/// Rules are stored in positive-step priority order. A negative step walks
/// the same table back to front.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule table.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if the table is empty, names repeat,
    ///   weights are not strictly increasing, or a rule's derivation does not
    ///   match its output pattern.
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(Error::InvalidConfiguration(
                "rule table must contain at least one rule".into(),
            ));
        }
        let mut names = HashSet::new();
        for r in &rules {
            if !names.insert(r.name) {
                return Err(Error::InvalidConfiguration(format!(
                    "duplicate rule name '{}'",
                    r.name
                )));
            }
            r.validate()?;
        }
        if let Some(w) = rules.windows(2).find(|w| w[0].weight >= w[1].weight) {
            return Err(Error::InvalidConfiguration(format!(
                "rule weights must be strictly increasing ('{}' = {}, '{}' = {})",
                w[0].name, w[0].weight, w[1].name, w[1].weight
            )));
        }
        Ok(Self { rules })
    }

    /// Two-species model: pairs of A annihilate into three B; triples of B
    /// recombine into two A, discarding the third.
    pub fn classic() -> Self {
        Self {
            rules: CLASSIC.to_vec(),
        }
    }

    /// Three-species model: pairs of A annihilate into two B and a payload
    /// carrier C; a B pair with a carrier recombines into two A rebuilt from
    /// the carrier alone.
    pub fn carrier() -> Self {
        Self {
            rules: CARRIER.to_vec(),
        }
    }

    /// Rules in the order they apply for a step of the given sign.
    pub fn ordered(&self, step: i64) -> Box<dyn Iterator<Item = &Rule> + '_> {
        if step > 0 {
            Box::new(self.rules.iter())
        } else {
            Box::new(self.rules.iter().rev())
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::classic()
    }
}

// ============ Built-in tables ============

const CLASSIC: [Rule; 2] = [
    Rule {
        name: "pair_annihilation",
        inputs: &[Species::A, Species::A],
        outputs: &[Species::B, Species::B, Species::B],
        scan: Scan::Forward,
        weight: 0,
        derive: pair_annihilation,
    },
    Rule {
        name: "triple_recombination",
        inputs: &[Species::B, Species::B, Species::B],
        outputs: &[Species::A, Species::A],
        scan: Scan::Reverse,
        weight: 1,
        derive: triple_recombination,
    },
];

const CARRIER: [Rule; 2] = [
    Rule {
        name: "annihilation",
        inputs: &[Species::A, Species::A],
        outputs: &[Species::B, Species::B, Species::C],
        scan: Scan::Forward,
        weight: 0,
        derive: carrier_annihilation,
    },
    Rule {
        name: "recombination",
        inputs: &[Species::B, Species::B, Species::C],
        outputs: &[Species::A, Species::A],
        scan: Scan::Reverse,
        weight: 1,
        derive: carrier_recombination,
    },
];

/// Both A keep their velocities; the third B takes vx of the first and vy of the second.
fn pair_annihilation(inputs: &[Particle]) -> Vec<Product> {
    let (a1, a2) = (inputs[0].velocity, inputs[1].velocity);
    vec![
        Product::plain(a1),
        Product::plain(a2),
        Product::plain(Vec2::new(a1.x, a2.y)),
    ]
}

/// The first two B become A unchanged; the third has no output.
fn triple_recombination(inputs: &[Particle]) -> Vec<Product> {
    vec![
        Product::plain(inputs[0].velocity),
        Product::plain(inputs[1].velocity),
    ]
}

/// The pair swaps velocities; the carrier holds the components its own velocity lacks.
fn carrier_annihilation(inputs: &[Particle]) -> Vec<Product> {
    let (a1, a2) = (inputs[0].velocity, inputs[1].velocity);
    vec![
        Product::plain(a2),
        Product::plain(a1),
        Product::carrying(Vec2::new(a1.x, a2.y), Vec2::new(a2.x, a1.y)),
    ]
}

/// Rebuilds both A from the carrier; the B velocities do not contribute.
fn carrier_recombination(inputs: &[Particle]) -> Vec<Product> {
    let c = &inputs[2];
    let p = c.payload.unwrap_or_default();
    vec![
        Product::plain(Vec2::new(c.velocity.x, p.y)),
        Product::plain(Vec2::new(p.x, c.velocity.y)),
    ]
}
