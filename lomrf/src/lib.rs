/*!
An engine for Markov Logic Networks.

LoMRF compiles a weighted first-order theory (a `.mln` knowledge base) and
a database of ground facts (a `.db` evidence file) into a ground Markov
random field (MRF) over Boolean ground atoms, then exposes that MRF to
MAP/marginal inference and weight learning.

# Orientation

A compilation runs the pipeline in this order:
- [`parser`] turns `.mln`/`.db` source text into a [`parser::Theory`] and
  an [`evidence::Evidence`] snapshot.
- [`completion`] turns definite clauses into equivalent weighted formulas
  (predicate completion), so everything downstream sees one uniform
  weighted-formula representation.
- [`normalize`] turns each weighted formula into a set of weighted
  clauses in conjunctive normal form.
- [`ground`] expands those clauses over their free variables' domains
  into a [`mrf::Mrf`], simplifying against evidence as it goes.
- [`inference`] runs MAP/marginal inference or weight learning over the
  resulting MRF.

[`domain`], [`schema`], [`structures`], [`identity`], and [`unify`]
underlie every stage above: domains and schemas are resolved once during
parsing and threaded through unchanged; the atom identity function is the
single source of truth for the correspondence between a ground atom and
its integer id; unification and subsumption are used by predicate
completion and (in a full implementation) clause indexing.

No stage holds process-wide state: a [`config::Config`] and a
[`schema::Schemas`]/[`domain::ConstantsDomain`] pair are built fresh per
compilation and passed by reference to every later stage.
*/

pub mod completion;
pub mod config;
pub mod domain;
pub mod dynamic;
pub mod evidence;
pub mod ground;
pub mod identity;
pub mod inference;
pub mod mrf;
pub mod normalize;
pub mod parser;
pub mod schema;
pub mod structures;
pub mod types;
pub mod unify;

pub use types::err::LomrfError;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, LomrfError>;
