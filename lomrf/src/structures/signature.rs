/*!
Atom signatures: `symbol/arity` pairs used as keys throughout schemas,
evidence, and the identity function.
*/

use std::fmt;

use crate::types::err::ParseError;

/// A predicate or function signature, `symbol/arity`. Equality is name +
/// arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomSignature {
    pub symbol: String,
    pub arity: usize,
}

impl AtomSignature {
    pub fn new(symbol: impl Into<String>, arity: usize) -> Self {
        AtomSignature {
            symbol: symbol.into(),
            arity,
        }
    }

    /// Parses the canonical `"Name/N"` form.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (symbol, arity) = text.rsplit_once('/').ok_or_else(|| ParseError::Unexpected {
            offset: 0,
            found: text.to_string(),
        })?;
        let arity: usize = arity.parse().map_err(|_| ParseError::Unexpected {
            offset: 0,
            found: text.to_string(),
        })?;
        Ok(AtomSignature::new(symbol, arity))
    }
}

impl fmt::Display for AtomSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_slash_arity() {
        assert_eq!(AtomSignature::parse("Smokes/1").unwrap(), AtomSignature::new("Smokes", 1));
    }

    #[test]
    fn display_round_trips_parse() {
        let sig = AtomSignature::new("Friends", 2);
        assert_eq!(AtomSignature::parse(&sig.to_string()).unwrap(), sig);
    }
}
