/*!
Formulas: the recursive sum type over atomic formulas, Boolean
connectives, and quantifiers.
*/

use std::fmt;

use super::atom::AtomicFormula;
use super::term::Term;

/// A quantified variable: `Forall x F` / `Exist x F` bind exactly one
/// variable per node; the parser desugars `Forall x,y F`
/// into nested single-variable quantifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuantifiedVar {
    pub symbol: String,
    pub domain: String,
}

/// The recursive formula sum type.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Atom(AtomicFormula),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Equivalence(Box<Formula>, Box<Formula>),
    Forall(QuantifiedVar, Box<Formula>),
    Exists(QuantifiedVar, Box<Formula>),
}

impl Formula {
    pub fn not(f: Formula) -> Formula {
        Formula::Not(Box::new(f))
    }

    pub fn and(a: Formula, b: Formula) -> Formula {
        Formula::And(Box::new(a), Box::new(b))
    }

    pub fn or(a: Formula, b: Formula) -> Formula {
        Formula::Or(Box::new(a), Box::new(b))
    }

    pub fn implies(a: Formula, b: Formula) -> Formula {
        Formula::Implies(Box::new(a), Box::new(b))
    }

    pub fn equivalence(a: Formula, b: Formula) -> Formula {
        Formula::Equivalence(Box::new(a), Box::new(b))
    }

    pub fn forall(symbol: impl Into<String>, domain: impl Into<String>, f: Formula) -> Formula {
        Formula::Forall(
            QuantifiedVar {
                symbol: symbol.into(),
                domain: domain.into(),
            },
            Box::new(f),
        )
    }

    pub fn exists(symbol: impl Into<String>, domain: impl Into<String>, f: Formula) -> Formula {
        Formula::Exists(
            QuantifiedVar {
                symbol: symbol.into(),
                domain: domain.into(),
            },
            Box::new(f),
        )
    }

    /// Recursively substitutes every occurrence of variable `symbol` with
    /// `replacement`, not crossing a quantifier that rebinds the same
    /// symbol (there should be none after standardize-apart, but this
    /// keeps substitution correct regardless).
    pub fn substitute(&self, symbol: &str, replacement: &Term) -> Formula {
        match self {
            Formula::Atom(a) => Formula::Atom(a.substitute(symbol, replacement)),
            Formula::Not(f) => Formula::not(f.substitute(symbol, replacement)),
            Formula::And(a, b) => Formula::and(a.substitute(symbol, replacement), b.substitute(symbol, replacement)),
            Formula::Or(a, b) => Formula::or(a.substitute(symbol, replacement), b.substitute(symbol, replacement)),
            Formula::Implies(a, b) => {
                Formula::implies(a.substitute(symbol, replacement), b.substitute(symbol, replacement))
            }
            Formula::Equivalence(a, b) => {
                Formula::equivalence(a.substitute(symbol, replacement), b.substitute(symbol, replacement))
            }
            Formula::Forall(v, f) if v.symbol == symbol => Formula::Forall(v.clone(), f.clone()),
            Formula::Forall(v, f) => Formula::Forall(v.clone(), Box::new(f.substitute(symbol, replacement))),
            Formula::Exists(v, f) if v.symbol == symbol => Formula::Exists(v.clone(), f.clone()),
            Formula::Exists(v, f) => Formula::Exists(v.clone(), Box::new(f.substitute(symbol, replacement))),
        }
    }

    /// Every free `(symbol, domain)` variable pair, in first-occurrence
    /// order, excluding variables bound by an enclosing quantifier.
    pub fn free_variables(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.free_variables_into(&mut out);
        out
    }

    fn free_variables_into(&self, out: &mut Vec<(String, String)>) {
        match self {
            Formula::Atom(a) => a.free_variables(out),
            Formula::Not(f) => f.free_variables_into(out),
            Formula::And(a, b) | Formula::Or(a, b) | Formula::Implies(a, b) | Formula::Equivalence(a, b) => {
                a.free_variables_into(out);
                b.free_variables_into(out);
            }
            Formula::Forall(v, f) | Formula::Exists(v, f) => {
                let mut inner = Vec::new();
                f.free_variables_into(&mut inner);
                inner.retain(|(s, _)| s != &v.symbol);
                for pair in inner {
                    if !out.contains(&pair) {
                        out.push(pair);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(a) => write!(f, "{a}"),
            Formula::Not(inner) => write!(f, "!{inner}"),
            Formula::And(a, b) => write!(f, "({a} ^ {b})"),
            Formula::Or(a, b) => write!(f, "({a} v {b})"),
            Formula::Implies(a, b) => write!(f, "({a} => {b})"),
            Formula::Equivalence(a, b) => write!(f, "({a} <=> {b})"),
            Formula::Forall(v, inner) => write!(f, "Forall {} {inner}", v.symbol),
            Formula::Exists(v, inner) => write!(f, "Exist {} {inner}", v.symbol),
        }
    }
}

/// Weight = `+inf` denotes a hard constraint; weight = `NaN` denotes
/// "to be learned".
pub mod weight {
    pub const HARD: f64 = f64::INFINITY;
    pub const LEARNABLE: f64 = f64::NAN;
}

/// A formula with an attached weight.
#[derive(Debug, Clone)]
pub struct WeightedFormula {
    pub weight: f64,
    pub formula: Formula,
}

impl WeightedFormula {
    pub fn hard(formula: Formula) -> Self {
        WeightedFormula {
            weight: weight::HARD,
            formula,
        }
    }

    pub fn learnable(formula: Formula) -> Self {
        WeightedFormula {
            weight: weight::LEARNABLE,
            formula,
        }
    }

    pub fn weighted(weight: f64, formula: Formula) -> Self {
        WeightedFormula { weight, formula }
    }

    pub fn is_hard(&self) -> bool {
        self.weight.is_infinite() && self.weight > 0.0
    }

    pub fn is_to_be_learned(&self) -> bool {
        self.weight.is_nan()
    }
}
