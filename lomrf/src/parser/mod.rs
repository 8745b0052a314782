/*!
Parsing: the `.mln` theory grammar and the `.db` evidence grammar,
sharing one [`lexer`].
*/

pub mod db;
pub mod kb;
mod lexer;

use crate::domain::ConstantsDomain;
use crate::evidence::{Evidence, EvidenceBuilder, WorldAssumption};
use crate::identity::AtomIdentity;
use crate::schema::Schemas;
use crate::structures::{WeightedDefiniteClause, WeightedFormula};
use crate::types::err::LomrfError;

pub use kb::ParsedKb;

/// A fully resolved theory: schemas, domains, formulas and definite
/// clauses, plus the atom identity function built from them.
pub struct Theory {
    pub domains: ConstantsDomain,
    pub schemas: Schemas,
    pub formulas: Vec<WeightedFormula>,
    pub definite_clauses: Vec<WeightedDefiniteClause>,
    pub identity: AtomIdentity,
}

/// Parses a `.mln` source string into a [`Theory`], building the atom
/// identity function from the resulting domains and schemas.
pub fn parse_theory(source: &str) -> Result<Theory, LomrfError> {
    let parsed = kb::parse_kb(source)?;
    let domains = parsed.domains.result();
    let identity = AtomIdentity::build(&parsed.schemas, &domains, 0);
    Ok(Theory {
        domains,
        schemas: parsed.schemas,
        formulas: parsed.formulas,
        definite_clauses: parsed.definite_clauses,
        identity,
    })
}

/// Parses a `.db` source string into a finalized [`Evidence`] snapshot
/// against an already-built [`Theory`].
pub fn parse_evidence(source: &str, theory: &Theory, default_assumption: WorldAssumption) -> Result<Evidence, LomrfError> {
    let mut builder = EvidenceBuilder::new(&theory.identity, default_assumption);
    db::parse_db(source, &theory.schemas, &theory.domains, &theory.identity, &mut builder)?;
    Ok(builder.finalize())
}
