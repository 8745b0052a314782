/*!
The evidence DB: per-predicate tri-state truth storage over an atom's
id range, plus function-mapping tables exposed as an auxiliary CWA
predicate (`Aux_fn(retval, args..)`).

A [`EvidenceBuilder`] is filled by the parser one assertion at a time and
finalized into a read-only [`Evidence`] snapshot: evidence atoms are
appended to a builder, then finalized once per compilation.
*/

use std::collections::HashMap;

use crate::identity::{AtomIdentity, PredicateIdentity};
use crate::structures::AtomSignature;
use crate::types::err::DomainError;

/// The truth domain used by open-world evidence (P8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    /// Boolean negation; `flip(flip(x)) = x` on `{TRUE, FALSE}`, and
    /// `flip(UNKNOWN) = UNKNOWN` (P8).
    pub fn flip(self) -> TriState {
        match self {
            TriState::True => TriState::False,
            TriState::False => TriState::True,
            TriState::Unknown => TriState::Unknown,
        }
    }

    /// Tri-state conjunction (P8): `TRUE∧UNKNOWN=UNKNOWN`,
    /// `FALSE∧UNKNOWN=FALSE`.
    pub fn and(self, other: TriState) -> TriState {
        use TriState::*;
        match (self, other) {
            (False, _) | (_, False) => False,
            (Unknown, _) | (_, Unknown) => Unknown,
            (True, True) => True,
        }
    }

    /// Tri-state disjunction (P8): `FALSE∨UNKNOWN=UNKNOWN`,
    /// `TRUE∨UNKNOWN=TRUE`.
    pub fn or(self, other: TriState) -> TriState {
        use TriState::*;
        match (self, other) {
            (True, _) | (_, True) => True,
            (Unknown, _) | (_, Unknown) => Unknown,
            (False, False) => False,
        }
    }
}

/// The world assumption governing a predicate's unasserted atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldAssumption {
    /// Unknown defaults to `FALSE`; only `TRUE` atoms need be asserted.
    Closed,
    /// Unknown defaults to `UNKNOWN`; explicit `TRUE`/`FALSE` override.
    Open,
}

/// A read-only tri-state vector over one predicate's id range.
struct PredicateEvidence {
    assumption: WorldAssumption,
    start: u32,
    len: u32,
    known: HashMap<u32, TriState>,
}

impl PredicateEvidence {
    fn new(identity: &PredicateIdentity, assumption: WorldAssumption) -> Self {
        PredicateEvidence {
            assumption,
            start: identity.start,
            len: identity.count() as u32,
            known: HashMap::new(),
        }
    }

    fn set(&mut self, id: u32, truth: TriState) {
        self.known.insert(id, truth);
    }

    fn truth(&self, id: u32) -> TriState {
        if let Some(t) = self.known.get(&id) {
            return *t;
        }
        match self.assumption {
            WorldAssumption::Closed => TriState::False,
            WorldAssumption::Open => TriState::Unknown,
        }
    }

    fn number_of(&self, want: TriState) -> u64 {
        match self.assumption {
            WorldAssumption::Closed if matches!(want, TriState::False) => {
                self.len as u64 - self.known.values().filter(|t| matches!(t, TriState::True)).count() as u64
            }
            WorldAssumption::Open if matches!(want, TriState::Unknown) => {
                self.len as u64 - self.known.len() as u64
            }
            _ => self.known.values().filter(|t| std::mem::discriminant(*t) == std::mem::discriminant(&want)).count() as u64,
        }
    }
}

/// A scoped, append-only builder for a single compilation's evidence.
pub struct EvidenceBuilder<'a> {
    identity: &'a AtomIdentity,
    assumptions: HashMap<AtomSignature, WorldAssumption>,
    predicates: HashMap<AtomSignature, PredicateEvidence>,
}

impl<'a> EvidenceBuilder<'a> {
    pub fn new(identity: &'a AtomIdentity, default_assumption: WorldAssumption) -> Self {
        EvidenceBuilder {
            identity,
            assumptions: HashMap::new(),
            predicates: HashMap::new(),
        }
        .with_default(default_assumption)
    }

    fn with_default(mut self, default_assumption: WorldAssumption) -> Self {
        self.assumptions.insert(AtomSignature::new("*", 0), default_assumption);
        self
    }

    /// Overrides the world assumption for a specific predicate (non-evidence
    /// predicates of a theory are typically declared OWA; evidence-only
    /// predicates CWA).
    pub fn set_assumption(&mut self, signature: AtomSignature, assumption: WorldAssumption) -> &mut Self {
        self.assumptions.insert(signature, assumption);
        self
    }

    fn assumption_for(&self, signature: &AtomSignature) -> WorldAssumption {
        self.assumptions
            .get(signature)
            .copied()
            .unwrap_or_else(|| *self.assumptions.get(&AtomSignature::new("*", 0)).unwrap())
    }

    fn entry(&mut self, signature: &AtomSignature) -> Option<&mut PredicateEvidence> {
        if !self.predicates.contains_key(signature) {
            let identity = self.identity.predicate(signature)?;
            let assumption = self.assumption_for(signature);
            self.predicates.insert(signature.clone(), PredicateEvidence::new(identity, assumption));
        }
        self.predicates.get_mut(signature)
    }

    /// Asserts the truth of one ground atom, identified by its id (already
    /// resolved via [`AtomIdentity::encode`] by the caller).
    pub fn assert(&mut self, signature: &AtomSignature, id: u32, truth: TriState) -> Result<(), DomainError> {
        let entry = self.entry(signature).ok_or(DomainError::UnknownConstant)?;
        entry.set(id, truth);
        Ok(())
    }

    /// Registers a function mapping `retval = fn(args..)` as one true tuple
    /// of the auxiliary CWA predicate `Aux_<fn>`. `arity` is the auxiliary
    /// predicate's full arity (the function's own arity plus one, for the
    /// return value slot).
    pub fn assert_function_mapping(&mut self, function_symbol: &str, arity: usize, id: u32) -> Result<(), DomainError> {
        let signature = AtomSignature::new(format!("Aux_{function_symbol}"), arity);
        let entry = self.entry(&signature).ok_or(DomainError::UnknownConstant)?;
        entry.assumption = WorldAssumption::Closed;
        entry.set(id, TriState::True);
        Ok(())
    }

    pub fn finalize(self) -> Evidence {
        Evidence {
            predicates: self.predicates,
        }
    }
}

/// The finalized, read-only evidence snapshot for one (theory, evidence)
/// compilation.
pub struct Evidence {
    predicates: HashMap<AtomSignature, PredicateEvidence>,
}

impl Evidence {
    /// The truth of the ground atom with the given id under `signature`.
    pub fn apply(&self, signature: &AtomSignature, id: u32) -> TriState {
        self.predicates.get(signature).map_or(TriState::Unknown, |p| p.truth(id))
    }

    pub fn contains(&self, signature: &AtomSignature, id: u32) -> bool {
        self.predicates.get(signature).is_some_and(|p| p.known.contains_key(&id))
    }

    pub fn number_of_true(&self, signature: &AtomSignature) -> u64 {
        self.predicates.get(signature).map_or(0, |p| p.number_of(TriState::True))
    }

    pub fn number_of_false(&self, signature: &AtomSignature) -> u64 {
        self.predicates.get(signature).map_or(0, |p| p.number_of(TriState::False))
    }

    pub fn number_of_unknown(&self, signature: &AtomSignature) -> u64 {
        self.predicates.get(signature).map_or(0, |p| p.number_of(TriState::Unknown))
    }

    pub fn number_of_known(&self, signature: &AtomSignature) -> u64 {
        self.number_of_true(signature) + self.number_of_false(signature)
    }

    /// Whether `signature` was given a world assumption at all (the
    /// grounder treats an undeclared predicate as an open-world query
    /// predicate: its literals are always kept, never resolved).
    pub fn is_declared(&self, signature: &AtomSignature) -> bool {
        self.predicates.contains_key(signature)
    }

    pub fn assumption_of(&self, signature: &AtomSignature) -> Option<WorldAssumption> {
        self.predicates.get(signature).map(|p| p.assumption)
    }
}
