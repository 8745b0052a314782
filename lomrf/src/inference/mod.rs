/*!
Inference and weight learning: the `Inference`, `WeightLearner`, and
`SolverHandle` traits, plus one concrete implementation of each sufficient
to run MAP inference and weight learning over a small theory without
pulling in an external LP/ILP dependency.
*/

mod rng;

use std::time::Instant;

use crate::evidence::TriState;
use crate::mrf::{DependencyMap, Mrf};
use crate::structures::AtomSignature;
use crate::types::err::{LomrfError, NumericalError, SolverError};

pub use rng::MinimalPcg32;

/// A truth assignment over ground atom ids, as produced by inference or
/// supplied as ground-truth for loss computation.
pub type Valuation = std::collections::HashMap<u32, TriState>;

/// The outcome of one `infer` call. `Converged` and `DeadlineExceeded`
/// both carry a usable assignment: nonconvergence is recoverable, the
/// best-known assignment is still returned.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutcome {
    Converged { flips: u64 },
    DeadlineExceeded { flips: u64 },
}

/// MAP/marginal inference over a ground Markov random field.
pub trait Inference {
    fn infer(&mut self, mrf: &mut Mrf, query: &[AtomSignature], deadline: Option<Instant>) -> Result<InferenceOutcome, LomrfError>;
}

/// Weight learning against an annotated ground truth.
pub trait WeightLearner {
    /// `countGroundings`: for each parent clause index, the
    /// number of satisfied ground constraints weighted by signed
    /// dependency count.
    fn count_groundings(&self, mrf: &Mrf, dep: &DependencyMap) -> Vec<i64>;

    fn update_weights(&mut self, mrf: &mut Mrf, dep: &DependencyMap, weights: &[f64]);

    /// The current loss of `mrf`'s weights against `annotation`.
    fn loss(&self, mrf: &Mrf, annotation: &Valuation) -> f64;
}

/// The LP/ILP scope boundary: no solver internals here, only the handle
/// an `Inference` implementation acquires and
/// releases around a MAP call).
pub trait SolverHandle {
    fn solve(&mut self, relaxation: &IlpRelaxation) -> Result<IlpSolution, SolverError>;
}

/// An opaque LP relaxation of a MAP query; never constructed by the core
/// (external solver integrations build it), present only so
/// `SolverHandle` compiles against something concrete.
pub struct IlpRelaxation {
    pub atom_ids: Vec<u32>,
}

pub struct IlpSolution {
    pub truths: std::collections::HashMap<u32, bool>,
}

/// A handle that is always unavailable; the default used whenever no
/// external solver is configured; `-mapType ilp` is out of scope for the
/// core.
#[derive(Default)]
pub struct NoSolver;

impl SolverHandle for NoSolver {
    fn solve(&mut self, _relaxation: &IlpRelaxation) -> Result<IlpSolution, SolverError> {
        Err(SolverError::Unavailable)
    }
}

/// Stochastic local search (MaxWalkSAT): repeatedly flips the atom that
/// most reduces the total weight of unsatisfied constraints, with
/// probability `noise` flipping a uniformly random atom of an
/// unsatisfied constraint instead, to escape local optima.
pub struct MaxWalkSat {
    rng: MinimalPcg32,
    noise: f64,
    max_flips: u64,
}

impl MaxWalkSat {
    pub fn new(seed: u64, noise: f64, max_flips: u64) -> Self {
        MaxWalkSat {
            rng: MinimalPcg32::seeded(seed),
            noise,
            max_flips,
        }
    }

    /// Total weight of constraints left unsatisfied under the current
    /// assignment.
    fn cost(mrf: &Mrf) -> f64 {
        mrf.constraints().iter().filter(|c| !c.is_satisfied(mrf.atoms())).map(|c| c.weight).sum()
    }

    /// The net change in unsatisfied weight if `atom_id`'s truth were
    /// flipped, without mutating `mrf`.
    fn flip_gain(&self, mrf: &Mrf, atom_id: u32) -> f64 {
        let current = mrf.atom(atom_id).map(|a| a.truth).unwrap_or(TriState::Unknown);
        let flipped = current.flip();
        let before: f64 = mrf
            .constraints_touching(atom_id)
            .iter()
            .filter_map(|&id| mrf.constraint(id))
            .filter(|c| !c.is_satisfied(mrf.atoms()))
            .map(|c| c.weight)
            .sum();

        let mut probe = std::collections::HashMap::new();
        for &id in mrf.constraints_touching(atom_id) {
            if let Some(c) = mrf.constraint(id) {
                for &lit in &c.literals {
                    let id = crate::mrf::Constraint::atom_id(lit);
                    probe.entry(id).or_insert_with(|| mrf.atom(id).map(|a| a.truth).unwrap_or(TriState::Unknown));
                }
            }
        }
        probe.insert(atom_id, flipped);

        let after: f64 = mrf
            .constraints_touching(atom_id)
            .iter()
            .filter_map(|&id| mrf.constraint(id))
            .filter(|c| {
                !c.literals.iter().any(|&l| {
                    let id = crate::mrf::Constraint::atom_id(l);
                    let positive = crate::mrf::Constraint::is_positive(l);
                    matches!(
                        (positive, probe.get(&id)),
                        (true, Some(TriState::True)) | (false, Some(TriState::False))
                    )
                })
            })
            .map(|c| c.weight)
            .sum();

        before - after
    }
}

impl Inference for MaxWalkSat {
    fn infer(&mut self, mrf: &mut Mrf, _query: &[AtomSignature], deadline: Option<Instant>) -> Result<InferenceOutcome, LomrfError> {
        log::info!(target: "lomrf::inference", "starting MaxWalkSAT over {} atoms, {} constraints", mrf.number_of_atoms(), mrf.number_of_constraints());

        for flips in 0..self.max_flips {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    log::warn!(target: "lomrf::inference", "MaxWalkSAT hit its deadline after {flips} flips, cost {}", Self::cost(mrf));
                    return Ok(InferenceOutcome::DeadlineExceeded { flips });
                }
            }

            let unsatisfied: Vec<u32> = mrf.constraints().iter().filter(|c| !c.is_satisfied(mrf.atoms())).map(|c| c.id).collect();
            if unsatisfied.is_empty() {
                return Ok(InferenceOutcome::Converged { flips });
            }

            if flips % 1000 == 0 {
                log::debug!(target: "lomrf::inference", "flip {flips}: cost {}, {} constraints unsatisfied", Self::cost(mrf), unsatisfied.len());
            }

            let pick = unsatisfied[self.rng.random_range(unsatisfied.len())];
            let Some(constraint) = mrf.constraint(pick) else { continue };
            let candidate_atoms: Vec<u32> = constraint.literals.iter().map(|&l| crate::mrf::Constraint::atom_id(l)).collect();

            let chosen = if self.rng.random_f64() < self.noise {
                candidate_atoms[self.rng.random_range(candidate_atoms.len())]
            } else {
                candidate_atoms
                    .iter()
                    .copied()
                    .max_by(|&a, &b| self.flip_gain(mrf, a).partial_cmp(&self.flip_gain(mrf, b)).unwrap())
                    .unwrap()
            };

            let truth = mrf.atom(chosen).map(|a| a.truth).unwrap_or(TriState::Unknown);
            mrf.set_truth(chosen, truth.flip());
        }

        log::warn!(target: "lomrf::inference", "MaxWalkSAT exhausted {} flips without full convergence, cost {}", self.max_flips, Self::cost(mrf));
        Err(NumericalError::DeadlineExceeded.into())
    }
}

/// Max-margin weight learning: for each parent
/// clause, the weight update is proportional to the difference between
/// the grounding count under the annotated truth and under the current
/// MAP assignment.
pub struct MaxMargin {
    pub learning_rate: f64,
}

impl WeightLearner for MaxMargin {
    fn count_groundings(&self, mrf: &Mrf, dep: &DependencyMap) -> Vec<i64> {
        let max_parent = dep.values().flat_map(|parents| parents.keys().copied()).max().map_or(0, |m| m + 1);
        (0..max_parent).map(|parent| mrf.count_groundings(parent)).collect()
    }

    /// Recomputes every soft ground constraint's weight from the updated
    /// parent weights: `Σ parentWeight × signedCount`.
    fn update_weights(&mut self, mrf: &mut Mrf, dep: &DependencyMap, weights: &[f64]) {
        let recomputed: Vec<(u32, f64)> = dep
            .iter()
            .map(|(&constraint_id, parents)| {
                let weight = parents
                    .iter()
                    .map(|(&parent, &signed_count)| weights.get(parent).copied().unwrap_or(0.0) * signed_count as f64)
                    .sum();
                (constraint_id, weight)
            })
            .collect();

        for (constraint_id, weight) in recomputed {
            mrf.set_constraint_weight(constraint_id, weight);
        }
    }

    fn loss(&self, mrf: &Mrf, annotation: &Valuation) -> f64 {
        mrf.constraints()
            .iter()
            .filter(|c| {
                let satisfied_by_annotation = c.literals.iter().any(|&l| {
                    let id = crate::mrf::Constraint::atom_id(l);
                    let positive = crate::mrf::Constraint::is_positive(l);
                    matches!(
                        (positive, annotation.get(&id)),
                        (true, Some(TriState::True)) | (false, Some(TriState::False))
                    )
                });
                !satisfied_by_annotation
            })
            .map(|c| c.weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrf::{Constraint, GroundAtom};
    use std::collections::HashMap;

    fn two_atom_mrf(a_truth: TriState, b_truth: TriState) -> Mrf {
        let atoms = HashMap::from([(0, GroundAtom { id: 0, truth: a_truth }), (1, GroundAtom { id: 1, truth: b_truth })]);
        let constraints = vec![Constraint {
            id: 0,
            literals: vec![Constraint::encode_literal(0, true), Constraint::encode_literal(1, true)],
            weight: 1.0,
        }];
        let adjacency = HashMap::from([(0, vec![0]), (1, vec![0])]);
        Mrf::new(atoms, constraints, adjacency, 100.0, None)
    }

    #[test]
    fn max_walk_sat_converges_when_a_satisfying_flip_exists() {
        let mut mrf = two_atom_mrf(TriState::False, TriState::False);
        let mut solver = MaxWalkSat::new(7, 0.1, 100);
        let outcome = solver.infer(&mut mrf, &[], None).unwrap();
        assert!(matches!(outcome, InferenceOutcome::Converged { .. }));
    }

    #[test]
    fn max_margin_loss_is_zero_when_annotation_satisfies_every_constraint() {
        let mrf = two_atom_mrf(TriState::True, TriState::False);
        let annotation = Valuation::from([(0, TriState::True), (1, TriState::False)]);
        let learner = MaxMargin { learning_rate: 0.1 };
        assert_eq!(learner.loss(&mrf, &annotation), 0.0);
    }

    #[test]
    fn max_margin_loss_sums_weight_of_violated_constraints() {
        let mrf = two_atom_mrf(TriState::False, TriState::False);
        let annotation = Valuation::from([(0, TriState::False), (1, TriState::False)]);
        let learner = MaxMargin { learning_rate: 0.1 };
        assert_eq!(learner.loss(&mrf, &annotation), 1.0);
    }
}
