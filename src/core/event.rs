use crate::core::particle::{Particle, Species, Vec2};

/// One application of a rule to one group of particles.
///
/// - `rule`: name of the rule that fired
/// - `cell`: grid cell where the group met
/// - `consumed`: particles taken as inputs (the rule's arity)
/// - `created`: particles inserted beyond the inputs' slots
/// - `discarded`: inputs removed with no corresponding output, as they were
///   just before removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub rule: &'static str,
    pub cell: Vec2,
    pub consumed: usize,
    pub created: usize,
    pub discarded: Vec<Particle>,
}

impl Reaction {
    /// Whether this reaction erased particle state.
    #[inline]
    pub fn is_lossy(&self) -> bool {
        !self.discarded.is_empty()
    }
}

/// Candidates a rule could not group, in a cell where some reaction fired.
///
/// Leftovers make the pairing of the reverse step ambiguous, so a step
/// that records any is not guaranteed to be undone exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leftover {
    pub rule: &'static str,
    pub cell: Vec2,
    pub species: Species,
    pub count: usize,
}

/// Outcome of a single `Universe::step`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub step: i64,
    pub reactions: Vec<Reaction>,
    pub leftovers: Vec<Leftover>,
}

impl StepReport {
    pub(crate) fn empty(step: i64) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// No reaction fired.
    #[inline]
    pub fn is_quiet(&self) -> bool {
        self.reactions.is_empty()
    }

    /// Number of times the named rule fired.
    pub fn count(&self, rule: &str) -> usize {
        self.reactions.iter().filter(|r| r.rule == rule).count()
    }

    /// Every particle erased during the step.
    pub fn discarded(&self) -> impl Iterator<Item = &Particle> {
        self.reactions.iter().flat_map(|r| r.discarded.iter())
    }

    /// True when stepping by `-step` is guaranteed to restore the prior state:
    /// nothing was discarded and every reacting cell was fully grouped.
    pub fn is_exactly_reversible(&self) -> bool {
        self.leftovers.is_empty() && !self.reactions.iter().any(Reaction::is_lossy)
    }
}
