/*!
Terms: the leaves and function applications that atoms are built from.
*/

use std::fmt;

/// The domain name used for a variable whose domain has not yet been
/// resolved by the type-checking pass.
pub const UNRESOLVED_DOMAIN: &str = "_?_";

/// A term-function application, e.g. `meet(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermFunction {
    pub symbol: String,
    pub args: Vec<Term>,
    pub result_domain: String,
}

impl TermFunction {
    pub fn new(symbol: impl Into<String>, args: Vec<Term>, result_domain: impl Into<String>) -> Self {
        TermFunction {
            symbol: symbol.into(),
            args,
            result_domain: result_domain.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Ground iff every argument is ground.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }
}

impl fmt::Display for TermFunction {
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

/// A term: a ground constant, a variable, or a function application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Constant(String),
    Variable {
        symbol: String,
        domain: String,
        index: u32,
    },
    Function(TermFunction),
}

impl Term {
    pub fn constant(symbol: impl Into<String>) -> Self {
        Term::Constant(symbol.into())
    }

    pub fn variable(symbol: impl Into<String>) -> Self {
        Term::Variable {
            symbol: symbol.into(),
            domain: UNRESOLVED_DOMAIN.to_string(),
            index: 0,
        }
    }

    pub fn typed_variable(symbol: impl Into<String>, domain: impl Into<String>) -> Self {
        Term::Variable {
            symbol: symbol.into(),
            domain: domain.into(),
            index: 0,
        }
    }

    pub fn function(symbol: impl Into<String>, args: Vec<Term>, result_domain: impl Into<String>) -> Self {
        Term::Function(TermFunction::new(symbol, args, result_domain))
    }

    pub fn is_ground(&self) -> bool {
        match self {
            Term::Constant(_) => true,
            Term::Variable { .. } => false,
            Term::Function(tf) => tf.is_ground(),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable { .. })
    }

    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Term::Constant(c) => Some(c.as_str()),
            _ => None,
        }
    }

    pub fn variable_symbol(&self) -> Option<&str> {
        match self {
            Term::Variable { symbol, .. } => Some(symbol.as_str()),
            _ => None,
        }
    }

    /// Recursively substitutes every occurrence of variable `symbol` with
    /// `replacement`, including inside nested function arguments.
    pub fn substitute(&self, symbol: &str, replacement: &Term) -> Term {
        match self {
            Term::Variable { symbol: s, .. } if s == symbol => replacement.clone(),
            Term::Function(tf) => Term::Function(TermFunction {
                symbol: tf.symbol.clone(),
                args: tf.args.iter().map(|a| a.substitute(symbol, replacement)).collect(),
                result_domain: tf.result_domain.clone(),
            }),
            other => other.clone(),
        }
    }

    /// Collects every free variable `(symbol, domain)` pair appearing in
    /// this term.
    pub fn free_variables(&self, out: &mut Vec<(String, String)>) {
        match self {
            Term::Constant(_) => {}
            Term::Variable { symbol, domain, .. } => {
                let pair = (symbol.clone(), domain.clone());
                if !out.contains(&pair) {
                    out.push(pair);
                }
            }
            Term::Function(tf) => {
                for arg in &tf.args {
                    arg.free_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{c}"),
            Term::Variable { symbol, .. } => write!(f, "{symbol}"),
            Term::Function(tf) => write!(f, "{tf}"),
        }
    }
}
