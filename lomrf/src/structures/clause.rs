/*!
Clauses and definite clauses.
*/

use std::collections::HashSet;
use std::fmt;

use super::atom::{AtomicFormula, Literal};
use super::formula::Formula;

/// An unordered set of literals with an attached weight. Equality (used by
/// the `=~=` relation and by test assertions) compares literal *sets*, not
/// sequences, since clauses are unordered.
#[derive(Debug, Clone)]
pub struct Clause {
    pub literals: Vec<Literal>,
    pub weight: f64,
}

impl Clause {
    pub fn new(literals: Vec<Literal>, weight: f64) -> Self {
        Clause { literals, weight }
    }

    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_hard(&self) -> bool {
        self.weight.is_infinite() && self.weight > 0.0
    }

    /// Drops a literal appearing twice with the same sign down to one
    /// occurrence, preserving first-seen order.
    pub fn dedup_literals(&mut self) {
        let mut seen = HashSet::new();
        self.literals.retain(|l| seen.insert(l.clone()));
    }

    /// True iff some atom appears with both signs (the clause is a
    /// tautology and should be dropped during CNF extraction).
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|l| self.literals.iter().any(|other| l.is_complement_of(other)))
    }

    /// Every free `(symbol, domain)` variable pair across the clause's
    /// literals, in first-occurrence order. All remaining variables after
    /// CNF extraction are implicitly universally quantified, so this is
    /// exactly the set the grounder must range over.
    pub fn free_variables(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for literal in &self.literals {
            literal.atom.free_variables(&mut out);
        }
        out
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        if self.literals.len() != other.literals.len() {
            return false;
        }
        let mine: HashSet<&Literal> = self.literals.iter().collect();
        let theirs: HashSet<&Literal> = other.literals.iter().collect();
        mine == theirs && self.weight.to_bits() == other.weight.to_bits()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lit) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " v ")?;
            }
            write!(f, "{lit}")?;
        }
        if self.is_hard() {
            write!(f, ".")?;
        }
        Ok(())
    }
}

/// An implication with a single positive atom head and a conjunction of
/// literals as body.
#[derive(Debug, Clone)]
pub struct DefiniteClause {
    pub head: AtomicFormula,
    pub body: Formula,
}

/// A definite clause with an attached weight.
#[derive(Debug, Clone)]
pub struct WeightedDefiniteClause {
    pub weight: f64,
    pub clause: DefiniteClause,
}

impl WeightedDefiniteClause {
    pub fn is_hard(&self) -> bool {
        self.weight.is_infinite() && self.weight > 0.0
    }

    pub fn is_to_be_learned(&self) -> bool {
        self.weight.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::Term;

    fn lit(symbol: &str, positive: bool) -> Literal {
        Literal {
            atom: AtomicFormula::new(symbol, vec![Term::constant("A")]),
            positive,
        }
    }

    #[test]
    fn set_equality_ignores_order() {
        let c1 = Clause::new(vec![lit("P", true), lit("Q", false)], 1.0);
        let c2 = Clause::new(vec![lit("Q", false), lit("P", true)], 1.0);
        assert_eq!(c1, c2);
    }

    #[test]
    fn tautology_detection() {
        let c = Clause::new(vec![lit("P", true), lit("P", false)], 1.0);
        assert!(c.is_tautology());
    }

    #[test]
    fn dedup_keeps_single_copy() {
        let mut c = Clause::new(vec![lit("P", true), lit("P", true)], 1.0);
        c.dedup_literals();
        assert_eq!(c.literals.len(), 1);
    }
}
