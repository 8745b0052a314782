/*!
Atomic formulas and literals.
*/

use std::fmt;
use std::ops::Not;

use super::signature::AtomSignature;
use super::term::Term;

/// A predicate application, e.g. `Friends(Anna, Bob)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomicFormula {
    pub symbol: String,
    pub args: Vec<Term>,
    /// Distinguishes built-in (`=`, `<`, `succ`-backed, ...) atoms from
    /// ordinary predicates.
    pub is_dynamic: bool,
}

impl AtomicFormula {
    pub fn new(symbol: impl Into<String>, args: Vec<Term>) -> Self {
        AtomicFormula {
            symbol: symbol.into(),
            args,
            is_dynamic: false,
        }
    }

    pub fn dynamic(symbol: impl Into<String>, args: Vec<Term>) -> Self {
        AtomicFormula {
            symbol: symbol.into(),
            args,
            is_dynamic: true,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn signature(&self) -> AtomSignature {
        AtomSignature::new(self.symbol.clone(), self.arity())
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Ground constant values, if every argument is a constant.
    pub fn ground_constants(&self) -> Option<Vec<&str>> {
        self.args.iter().map(Term::as_constant).collect()
    }

    pub fn substitute(&self, symbol: &str, replacement: &Term) -> AtomicFormula {
        AtomicFormula {
            symbol: self.symbol.clone(),
            args: self.args.iter().map(|a| a.substitute(symbol, replacement)).collect(),
            is_dynamic: self.is_dynamic,
        }
    }

    pub fn free_variables(&self, out: &mut Vec<(String, String)>) {
        for arg in &self.args {
            arg.free_variables(out);
        }
    }
}

impl fmt::Display for AtomicFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// A signed atomic formula. Arity is inherited from the wrapped atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub atom: AtomicFormula,
    pub positive: bool,
}

impl Literal {
    pub fn positive(atom: AtomicFormula) -> Self {
        Literal { atom, positive: true }
    }

    pub fn negative(atom: AtomicFormula) -> Self {
        Literal { atom, positive: false }
    }

    pub fn signature(&self) -> AtomSignature {
        self.atom.signature()
    }

    pub fn negate(&self) -> Literal {
        Literal {
            atom: self.atom.clone(),
            positive: !self.positive,
        }
    }

    pub fn substitute(&self, symbol: &str, replacement: &Term) -> Literal {
        Literal {
            atom: self.atom.substitute(symbol, replacement),
            positive: self.positive,
        }
    }

    /// True iff `other` is the same atom with opposite sign.
    pub fn is_complement_of(&self, other: &Literal) -> bool {
        self.positive != other.positive && self.atom == other.atom
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            positive: !self.positive,
            ..self
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            write!(f, "!")?;
        }
        write!(f, "{}", self.atom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complements_detect_same_atom_opposite_sign() {
        let a = AtomicFormula::new("Smokes", vec![Term::constant("Anna")]);
        let pos = Literal::positive(a.clone());
        let neg = Literal::negative(a);
        assert!(pos.is_complement_of(&neg));
        assert!(!pos.is_complement_of(&pos));
    }
}
