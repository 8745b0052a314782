/*!
Error types used across the crate.

Mirrors the shape of a typical Rust solver/compiler crate: one small,
`Copy`/`Clone` enum per pipeline stage, each with a `From` impl feeding the
top-level [`LomrfError`] union. `?` is used throughout for propagation;
`.unwrap()`/`.expect()` are reserved for test code and genuinely
unreachable invariant violations.
*/

use std::fmt;

/// A union of the error kinds produced while compiling a theory, grounding
/// it, or running inference/learning on the resulting MRF.
#[derive(Clone, Debug, PartialEq)]
pub enum LomrfError {
    /// An undeclared predicate/function, an arity mismatch, or a type
    /// mismatch on a variable slot. Reported at parse time.
    Schema(SchemaError),

    /// A reference to a constant absent from its declared domain.
    /// Reported at evidence load time.
    Domain(DomainError),

    /// A hard ground clause has all literals falsified by evidence.
    /// Reported during grounding.
    Unsatisfiable,

    /// Nonconvergence of inference within a deadline. Recoverable: the
    /// best-known assignment is still available.
    Numerical(NumericalError),

    /// An external LP/ILP solver failed.
    Solver(SolverError),

    /// A syntax or lexical error while parsing a `.mln`/`.db` source.
    Parse(ParseError),
}

impl fmt::Display for LomrfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "schema error: {e:?}"),
            Self::Domain(e) => write!(f, "domain error: {e:?}"),
            Self::Unsatisfiable => write!(f, "theory is unsatisfiable under the given evidence"),
            Self::Numerical(e) => write!(f, "numerical error: {e:?}"),
            Self::Solver(e) => write!(f, "solver error: {e:?}"),
            Self::Parse(e) => write!(f, "parse error: {e:?}"),
        }
    }
}

impl std::error::Error for LomrfError {}

/// Errors raised while resolving the schema of a parsed theory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// Reference to a predicate/function symbol with no declared schema.
    UndeclaredSymbol,

    /// A use of a symbol does not match its declared arity.
    ArityMismatch,

    /// A variable's inferred domain conflicts with the domain demanded by
    /// its enclosing predicate/function slot.
    TypeMismatch,

    /// A definite-clause head used a function not in the function schema,
    /// or a head argument that is neither a variable nor a function of
    /// variables.
    InvalidDefiniteClauseHead,

    /// An `AtomicFormula` argument nests a function inside a function
    /// nesting is forbidden.
    NestedFunctionArgument,
}

impl From<SchemaError> for LomrfError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}

/// Errors raised while loading evidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// A constant used in an evidence atom or function mapping is not a
    /// member of its declared domain.
    UnknownConstant,

    /// A probabilistic evidence value was supplied; the grammar rejects
    /// these.
    ProbabilisticEvidenceRejected,
}

impl From<DomainError> for LomrfError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

/// Errors from inference's numerical routines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericalError {
    /// The outer loop reached its deadline before convergence.
    DeadlineExceeded,

    /// A dynamic-function literal was asked to evaluate a non-numeric
    /// argument (e.g. `plus` on a non-integer constant).
    NonNumericArgument,
}

impl From<NumericalError> for LomrfError {
    fn from(e: NumericalError) -> Self {
        Self::Numerical(e)
    }
}

/// Errors surfaced by an external LP/ILP solver handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The solver failed to return a solution.
    Failed,

    /// The solver handle could not be acquired.
    Unavailable,
}

impl From<SolverError> for LomrfError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

/// Errors raised while parsing a `.mln` or `.db` source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// An unexpected token at the given byte offset.
    Unexpected { offset: usize, found: String },

    /// Input ended mid-construct.
    UnexpectedEof,

    /// A domain range such as `{1, ..., N}` was malformed.
    MalformedRange,

    /// A weight prefix could not be parsed as `f64`.
    MalformedWeight,
}

impl From<ParseError> for LomrfError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}
