//! Collision resolution: groups particles by cell and applies the rule table.
//!
//! The particle sequence is never edited while it is being scanned. Each
//! particle gets a slot holding the (possibly transmuted) particle plus the
//! particles created just before and just after it; the sequence is rebuilt
//! from the slots once every cell has been resolved.

use crate::core::event::{Leftover, Reaction};
use crate::core::particle::{Particle, Vec2};
use crate::core::rule::{Rule, RuleSet, Scan};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Reactions and leftovers produced by one collision pass.
#[derive(Debug, Default)]
pub struct Resolution {
    pub reactions: Vec<Reaction>,
    pub leftovers: Vec<Leftover>,
}

#[derive(Debug)]
struct Slot {
    before: Vec<Particle>,
    particle: Option<Particle>,
    after: Vec<Particle>,
}

impl Slot {
    fn new(p: Particle) -> Self {
        Self {
            before: Vec::new(),
            particle: Some(p),
            after: Vec::new(),
        }
    }

    fn into_particles(self) -> impl Iterator<Item = Particle> {
        self.before
            .into_iter()
            .chain(self.particle)
            .chain(self.after)
    }
}

/// Apply the rule table to every occupied cell.
///
/// Rules run front to back for positive steps and back to front for negative
/// ones; each rule's scan orientation is mirrored for negative steps. A
/// particle takes part in at most one reaction per call, and particles
/// created by a reaction are not visible to any rule until the next call.
/// `step == 0` leaves the sequence untouched.
pub fn resolve(rules: &RuleSet, particles: &mut Vec<Particle>, step: i64) -> Resolution {
    let mut out = Resolution::default();
    if step == 0 || particles.is_empty() {
        return out;
    }

    let mut cells: BTreeMap<Vec2, Vec<usize>> = BTreeMap::new();
    for (i, p) in particles.iter().enumerate() {
        cells.entry(p.position).or_default().push(i);
    }

    let mut slots: Vec<Slot> = particles.drain(..).map(Slot::new).collect();
    for (&cell, members) in &cells {
        resolve_cell(rules, step, cell, members, &mut slots, &mut out);
    }

    particles.extend(slots.into_iter().flat_map(Slot::into_particles));
    out
}

fn resolve_cell(
    rules: &RuleSet,
    step: i64,
    cell: Vec2,
    members: &[usize],
    slots: &mut [Slot],
    out: &mut Resolution,
) {
    let mut consumed = vec![false; members.len()];
    let mut pending: Vec<Leftover> = Vec::new();
    let mut fired = false;

    for rule in rules.ordered(step) {
        let scan = rule.scan.for_step(step);
        let counts = rule.input_counts();

        // Unconsumed members of each input species, in scan order.
        let pools: Vec<Vec<usize>> = counts
            .iter()
            .map(|&(species, _)| {
                let matching = (0..members.len()).filter(|&k| {
                    !consumed[k]
                        && slots[members[k]].particle.map(|p| p.species) == Some(species)
                });
                match scan {
                    Scan::Forward => matching.collect(),
                    Scan::Reverse => matching.rev().collect(),
                }
            })
            .collect();

        let groups = counts
            .iter()
            .zip(&pools)
            .map(|(&(_, n), pool)| pool.len() / n)
            .min()
            .unwrap_or(0);

        // Which pool feeds each input position of the pattern.
        let lanes: Vec<usize> = rule
            .inputs
            .iter()
            .map(|s| counts.iter().position(|(t, _)| t == s).unwrap_or(0))
            .collect();

        for g in 0..groups {
            let mut cursor = vec![0usize; counts.len()];
            let picked: Vec<usize> = lanes
                .iter()
                .map(|&lane| {
                    let k = pools[lane][g * counts[lane].1 + cursor[lane]];
                    cursor[lane] += 1;
                    k
                })
                .collect();
            for &k in &picked {
                consumed[k] = true;
            }
            let idx: Vec<usize> = picked.iter().map(|&k| members[k]).collect();
            let reaction = apply(rule, scan, cell, &idx, slots);
            trace!(
                rule = rule.name,
                x = cell.x,
                y = cell.y,
                consumed = reaction.consumed,
                created = reaction.created,
                discarded = reaction.discarded.len(),
                "reaction"
            );
            out.reactions.push(reaction);
            fired = true;
        }

        for (&(species, n), pool) in counts.iter().zip(&pools) {
            let surplus = pool.len() - groups * n;
            if surplus > 0 {
                pending.push(Leftover {
                    rule: rule.name,
                    cell,
                    species,
                    count: surplus,
                });
            }
        }
    }

    if fired {
        for l in &pending {
            debug!(
                rule = l.rule,
                x = l.cell.x,
                y = l.cell.y,
                species = %l.species,
                count = l.count,
                "ungrouped particles in reacting cell"
            );
        }
        out.leftovers.extend(pending);
    }
}

/// Replace one matched group with the rule's outputs.
///
/// `idx` holds the slot of each input in pattern order. Outputs reuse the
/// input slots position by position; extra outputs are placed next to the
/// last input (after it when scanning forward, mirrored before it when
/// scanning in reverse); inputs without an output are removed.
fn apply(rule: &Rule, scan: Scan, cell: Vec2, idx: &[usize], slots: &mut [Slot]) -> Reaction {
    let inputs: Vec<Particle> = idx.iter().filter_map(|&i| slots[i].particle).collect();
    let products = (rule.derive)(&inputs);
    let n = rule.arity();

    let mut extras: Vec<Particle> = Vec::new();
    for (j, (&species, product)) in rule.outputs.iter().zip(products).enumerate() {
        let p = Particle {
            species,
            position: cell,
            velocity: product.velocity,
            payload: product.payload,
        };
        if j < n {
            slots[idx[j]].particle = Some(p);
        } else {
            extras.push(p);
        }
    }

    let created = extras.len();
    if let Some(&anchor) = idx.last() {
        let slot = &mut slots[anchor];
        match scan {
            Scan::Forward => slot.after.extend(extras),
            Scan::Reverse => {
                for p in extras {
                    slot.before.insert(0, p);
                }
            }
        }
    }

    let mut discarded = Vec::new();
    for &i in idx.iter().skip(rule.outputs.len()) {
        if let Some(p) = slots[i].particle.take() {
            debug!(
                rule = rule.name,
                x = cell.x,
                y = cell.y,
                species = %p.species,
                vx = p.velocity.x,
                vy = p.velocity.y,
                "particle discarded"
            );
            discarded.push(p);
        }
    }

    Reaction {
        rule: rule.name,
        cell,
        consumed: n,
        created,
        discarded,
    }
}
