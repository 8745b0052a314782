/*!
The ground Markov random field: the grounder's output and the read-only
structure that inference and weight-learning consume.
*/

use std::collections::HashMap;

use crate::evidence::TriState;

/// One ground atom: its id (already assigned by the [identity
/// function](crate::identity)) and its current truth value, the only
/// mutable state during inference.
#[derive(Debug, Clone, Copy)]
pub struct GroundAtom {
    pub id: u32,
    pub truth: TriState,
}

/// One ground constraint: a disjunction of signed literal ids and the
/// weight inherited from its parent formula (`weightHard` if the parent
/// was a hard constraint).
#[derive(Debug, Clone)]
pub struct Constraint {
    pub id: u32,
    /// Positive entries are positive literals, negative entries encode a
    /// negated literal over the same atom id space shifted by one so that
    /// atom id 0 is representable (`-(id as i64) - 1`).
    pub literals: Vec<i64>,
    pub weight: f64,
}

impl Constraint {
    pub fn atom_id(signed: i64) -> u32 {
        if signed >= 0 {
            signed as u32
        } else {
            (-signed - 1) as u32
        }
    }

    pub fn is_positive(signed: i64) -> bool {
        signed >= 0
    }

    pub fn encode_literal(atom_id: u32, positive: bool) -> i64 {
        if positive {
            atom_id as i64
        } else {
            -(atom_id as i64) - 1
        }
    }

    pub fn is_satisfied(&self, atoms: &HashMap<u32, GroundAtom>) -> bool {
        self.literals.iter().any(|&l| {
            let atom_id = Self::atom_id(l);
            let positive = Self::is_positive(l);
            matches!(
                (positive, atoms.get(&atom_id).map(|a| a.truth)),
                (true, Some(TriState::True)) | (false, Some(TriState::False))
            )
        })
    }
}

/// `ground-constraint-id -> { parent-clause-index -> net signed count }`,
/// required by weight-learning's `countGroundings`.
pub type DependencyMap = HashMap<u32, HashMap<usize, i64>>;

/// The ground Markov random field produced by one grounding run.
#[derive(Debug)]
pub struct Mrf {
    atoms: HashMap<u32, GroundAtom>,
    constraints: Vec<Constraint>,
    /// atom id -> ids of constraints it appears in.
    adjacency: HashMap<u32, Vec<u32>>,
    weight_hard: f64,
    dependency_map: Option<DependencyMap>,
}

impl Mrf {
    pub fn new(
        atoms: HashMap<u32, GroundAtom>,
        constraints: Vec<Constraint>,
        adjacency: HashMap<u32, Vec<u32>>,
        weight_hard: f64,
        dependency_map: Option<DependencyMap>,
    ) -> Self {
        Mrf {
            atoms,
            constraints,
            adjacency,
            weight_hard,
            dependency_map,
        }
    }

    pub fn number_of_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn number_of_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn weight_hard(&self) -> f64 {
        self.weight_hard
    }

    pub fn atoms(&self) -> &HashMap<u32, GroundAtom> {
        &self.atoms
    }

    pub fn atom(&self, id: u32) -> Option<&GroundAtom> {
        self.atoms.get(&id)
    }

    pub fn set_truth(&mut self, id: u32, truth: TriState) {
        if let Some(atom) = self.atoms.get_mut(&id) {
            atom.truth = truth;
        }
    }

    /// Overwrites a soft constraint's weight, used by weight learning to
    /// push updated parent weights back into the grounded theory. A no-op
    /// on hard constraints: their weight stays pinned to `weightHard`.
    pub fn set_constraint_weight(&mut self, id: u32, weight: f64) {
        if let Some(constraint) = self.constraints.get_mut(id as usize) {
            if constraint.weight != self.weight_hard {
                constraint.weight = weight;
            }
        }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, id: u32) -> Option<&Constraint> {
        self.constraints.get(id as usize)
    }

    pub fn constraints_touching(&self, atom_id: u32) -> &[u32] {
        self.adjacency.get(&atom_id).map_or(&[], Vec::as_slice)
    }

    pub fn dependency_map(&self) -> Option<&DependencyMap> {
        self.dependency_map.as_ref()
    }

    /// For `parent_clause_index`, the number of constraints satisfied under
    /// the current truth assignment weighted by their signed dependency
    /// count (`countGroundings`).
    pub fn count_groundings(&self, parent_clause_index: usize) -> i64 {
        let Some(map) = &self.dependency_map else {
            return 0;
        };
        map.iter()
            .filter(|(constraint_id, parents)| {
                parents.contains_key(&parent_clause_index)
                    && self
                        .constraint(**constraint_id)
                        .is_some_and(|c| c.is_satisfied(&self.atoms))
            })
            .map(|(constraint_id, parents)| {
                let count = parents[&parent_clause_index];
                let _ = constraint_id;
                count
            })
            .sum()
    }
}
