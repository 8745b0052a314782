/*!
The FOL AST: terms, atoms, literals, formulas, clauses, and definite
clauses, as a sealed algebraic data type.
*/

pub mod atom;
pub mod clause;
pub mod formula;
pub mod signature;
pub mod term;

pub use atom::{AtomicFormula, Literal};
pub use clause::{Clause, DefiniteClause, WeightedDefiniteClause};
pub use formula::{weight, Formula, QuantifiedVar, WeightedFormula};
pub use signature::AtomSignature;
pub use term::{Term, TermFunction};
