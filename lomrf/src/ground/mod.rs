/*!
The grounder: cartesian-product expansion of CNF clauses over their
free variables' domains, evidence simplification, and duplicate-literal
elimination, producing a ground [`Mrf`](crate::mrf::Mrf).

Grounding partitions the clause vector across worker threads
(`std::thread::scope`, for lifetime scoping over the borrowed domains,
identity, evidence, and schemas), each worker reporting its chunk's
result back to the coordinator over a `crossbeam::channel`. Workers are
strictly computational; the coordinator does the only suspension point,
draining the channel as the collect/merge barrier.
*/

use std::collections::HashMap;

use crossbeam::channel::unbounded;

use crate::domain::ConstantsDomain;
use crate::evidence::{Evidence, TriState, WorldAssumption};
use crate::identity::AtomIdentity;
use crate::mrf::{Constraint, GroundAtom, DependencyMap, Mrf};
use crate::schema::Schemas;
use crate::structures::{Clause, Literal};
use crate::types::err::LomrfError;

#[derive(Debug, Clone)]
pub struct GroundingConfig {
    pub workers: usize,
    pub with_dependency_map: bool,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        GroundingConfig {
            workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            with_dependency_map: true,
        }
    }
}

/// All ids consistent with `vars`' domains, in ascending mixed-radix order
/// (the same ordering rule as [`crate::identity::PredicateIdentity::matches`]).
fn ground_assignments<'a>(
    domains: &'a ConstantsDomain,
    vars: &'a [(String, String)],
) -> Box<dyn Iterator<Item = Vec<&'a str>> + 'a> {
    if vars.is_empty() {
        return Box::new(std::iter::once(Vec::new()));
    }
    let sizes: Vec<usize> = vars.iter().map(|(_, d)| domains.size(d)).collect();
    let total: u64 = sizes.iter().map(|s| *s as u64).product();
    Box::new((0..total).map(move |mut linear| {
        let mut out = Vec::with_capacity(vars.len());
        for (i, (_, domain)) in vars.iter().enumerate() {
            let size = sizes[i] as u64;
            let digit = linear % size;
            linear /= size;
            let d = domains.domain(domain).expect("free variable domain must exist");
            out.push(d.constant_at(digit as usize + 1).expect("digit in range"));
        }
        out
    }))
}

/// The outcome of grounding one literal against evidence/dynamic truth.
enum LiteralOutcome {
    /// The literal is true: the whole ground clause is a tautology.
    Tautology,
    /// The literal is false: drop it from the ground clause.
    Drop,
    /// The literal's truth is not yet known: keep it, with its atom id.
    Keep(i64),
}

fn evaluate_literal(
    literal: &Literal,
    domains: &ConstantsDomain,
    identity: &AtomIdentity,
    evidence: &Evidence,
    schemas: &Schemas,
) -> Result<LiteralOutcome, LomrfError> {
    let signature = literal.signature();
    let args = literal.atom.ground_constants().expect("literal is fully ground after substitution");

    if literal.atom.is_dynamic || schemas.is_dynamic_atom(&literal.atom.symbol) {
        let Some(atom_truth) = schemas.dynamic_predicates.evaluate(&literal.atom.symbol, &args) else {
            return Ok(LiteralOutcome::Drop);
        };
        let literal_truth = atom_truth == literal.positive;
        return Ok(if literal_truth { LiteralOutcome::Tautology } else { LiteralOutcome::Drop });
    }

    let id = identity.encode(domains, &signature, &args);
    if id == crate::identity::NOT_EXIST {
        return Err(LomrfError::Domain(crate::types::err::DomainError::UnknownConstant));
    }

    match evidence.assumption_of(&signature) {
        Some(WorldAssumption::Closed) => {
            let truth = evidence.apply(&signature, id);
            let literal_truth = match truth {
                TriState::True => literal.positive,
                TriState::False => !literal.positive,
                TriState::Unknown => return Ok(LiteralOutcome::Keep(Constraint::encode_literal(id, literal.positive))),
            };
            Ok(if literal_truth { LiteralOutcome::Tautology } else { LiteralOutcome::Drop })
        }
        Some(WorldAssumption::Open) | None => Ok(LiteralOutcome::Keep(Constraint::encode_literal(id, literal.positive))),
    }
}

struct GroundedConstraint {
    literals: Vec<i64>,
    weight: f64,
    parent_index: usize,
}

fn ground_clause(
    parent_index: usize,
    clause: &Clause,
    domains: &ConstantsDomain,
    identity: &AtomIdentity,
    evidence: &Evidence,
    schemas: &Schemas,
) -> Result<Vec<GroundedConstraint>, LomrfError> {
    let vars = clause.free_variables();
    let mut out = Vec::new();

    for assignment in ground_assignments(domains, &vars) {
        let mut ground_literals: Vec<Literal> = clause.literals.clone();
        for (var, value) in vars.iter().zip(&assignment) {
            let constant = crate::structures::Term::constant(*value);
            ground_literals = ground_literals.iter().map(|l| l.substitute(&var.0, &constant)).collect();
        }

        let mut kept: Vec<i64> = Vec::with_capacity(ground_literals.len());
        let mut is_tautology = false;
        for literal in &ground_literals {
            match evaluate_literal(literal, domains, identity, evidence, schemas)? {
                LiteralOutcome::Tautology => {
                    is_tautology = true;
                    break;
                }
                LiteralOutcome::Drop => {}
                LiteralOutcome::Keep(signed) => kept.push(signed),
            }
        }
        if is_tautology {
            continue;
        }

        kept.sort_unstable();
        kept.dedup();

        let mut seen_sign: HashMap<u32, bool> = HashMap::new();
        let mut self_tautology = false;
        for &signed in &kept {
            let atom_id = Constraint::atom_id(signed);
            let positive = Constraint::is_positive(signed);
            match seen_sign.get(&atom_id) {
                Some(&prev) if prev != positive => {
                    self_tautology = true;
                    break;
                }
                _ => {
                    seen_sign.insert(atom_id, positive);
                }
            }
        }
        if self_tautology {
            continue;
        }

        if kept.is_empty() {
            if clause.is_hard() {
                return Err(LomrfError::Unsatisfiable);
            }
            continue;
        }

        out.push(GroundedConstraint {
            literals: kept,
            weight: clause.weight,
            parent_index,
        });
    }

    Ok(out)
}

/// Grounds `clauses` (each the output of predicate completion + CNF
/// normalization, indexed by its position — that index is the "parent
/// clause" referenced by the dependency map) into a ground [`Mrf`].
pub fn ground(
    clauses: &[Clause],
    domains: &ConstantsDomain,
    identity: &AtomIdentity,
    evidence: &Evidence,
    schemas: &Schemas,
    config: &GroundingConfig,
) -> Result<Mrf, LomrfError> {
    let workers = config.workers.max(1).min(clauses.len().max(1));
    let chunk_size = clauses.len().div_ceil(workers).max(1);

    // Each worker reports its chunk's outcome as one message, tagged with
    // its chunk index so the coordinator can restore worker order after
    // draining the channel (message arrival order is not guaranteed to
    // match chunk order once workers run concurrently).
    let (tx, rx) = unbounded::<(usize, Result<Vec<GroundedConstraint>, LomrfError>)>();

    std::thread::scope(|scope| {
        for (chunk_index, chunk) in clauses.chunks(chunk_size).enumerate() {
            let base = chunk_index * chunk_size;
            let tx = tx.clone();
            scope.spawn(move || {
                let mut drafts = Vec::new();
                for (offset, clause) in chunk.iter().enumerate() {
                    match ground_clause(base + offset, clause, domains, identity, evidence, schemas) {
                        Ok(mut g) => drafts.append(&mut g),
                        Err(e) => {
                            let _ = tx.send((chunk_index, Err(e)));
                            return;
                        }
                    }
                }
                let _ = tx.send((chunk_index, Ok(drafts)));
            });
        }
    });
    drop(tx);

    let mut by_chunk: Vec<(usize, Result<Vec<GroundedConstraint>, LomrfError>)> = rx.into_iter().collect();
    by_chunk.sort_unstable_by_key(|(chunk_index, _)| *chunk_index);

    let mut worker_outputs: Vec<Vec<GroundedConstraint>> = Vec::with_capacity(by_chunk.len());
    for (_, result) in by_chunk {
        worker_outputs.push(result?);
    }

    // Merge step: concatenate worker outputs in worker index order, for a
    // deterministic merge order, then dedup identical ground
    // constraints by literal set, merging weights and dependency entries.
    let mut by_literal_set: HashMap<Vec<i64>, usize> = HashMap::new();
    let mut constraints: Vec<Constraint> = Vec::new();
    let mut weights: Vec<f64> = Vec::new();
    let mut dependency_map: DependencyMap = HashMap::new();
    let mut adjacency: HashMap<u32, Vec<u32>> = HashMap::new();

    for draft in worker_outputs.into_iter().flatten() {
        let constraint_id = if let Some(&existing) = by_literal_set.get(&draft.literals) {
            weights[existing] += draft.weight;
            existing
        } else {
            let id = constraints.len();
            by_literal_set.insert(draft.literals.clone(), id);
            constraints.push(Constraint {
                id: id as u32,
                literals: draft.literals.clone(),
                weight: 0.0,
            });
            weights.push(draft.weight);
            for &signed in &draft.literals {
                let atom_id = Constraint::atom_id(signed);
                adjacency.entry(atom_id).or_default().push(id as u32);
            }
            id
        };

        if config.with_dependency_map {
            *dependency_map
                .entry(constraint_id as u32)
                .or_default()
                .entry(draft.parent_index)
                .or_insert(0) += 1;
        }
    }

    let sum_abs_soft: f64 = weights.iter().filter(|w| w.is_finite()).map(|w| w.abs()).sum();
    let weight_hard = sum_abs_soft + 1.0;

    for (constraint, weight) in constraints.iter_mut().zip(weights) {
        constraint.weight = if weight.is_infinite() { weight_hard } else { weight };
    }

    // Every ground atom that survived into a kept constraint starts from
    // its evidence truth where one is known (open-world atoms that were
    // still asserted, used as the training annotation by weight
    // learning), and `False` otherwise. Never `Unknown`: inference
    // (MaxWalkSAT) searches by flipping, and `TriState::flip` is a fixed
    // point on `Unknown`, so an `Unknown` start would never move.
    let mut atoms: HashMap<u32, GroundAtom> = HashMap::new();
    for &atom_id in adjacency.keys() {
        let truth = identity
            .predicate_for_id(atom_id)
            .map(|p| evidence.apply(&p.signature, atom_id))
            .filter(|t| *t != TriState::Unknown)
            .unwrap_or(TriState::False);
        atoms.insert(atom_id, GroundAtom { id: atom_id, truth });
    }

    Ok(Mrf::new(
        atoms,
        constraints,
        adjacency,
        weight_hard,
        config.with_dependency_map.then_some(dependency_map),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstantsDomainBuilder;
    use crate::evidence::EvidenceBuilder;
    use crate::structures::{AtomSignature, AtomicFormula, Term};

    fn smokers_setup() -> (Schemas, ConstantsDomain, AtomIdentity) {
        let mut schemas = Schemas::new();
        schemas.declare_predicate(AtomSignature::new("Smokes", 1), vec!["person".into()]);
        schemas.declare_predicate(AtomSignature::new("Cancer", 1), vec!["person".into()]);

        let mut builder = ConstantsDomainBuilder::new();
        builder.extend("person", ["Anna", "Bob"]);
        let domains = builder.result();
        let identity = AtomIdentity::build(&schemas, &domains, 1);
        (schemas, domains, identity)
    }

    fn implication_clause() -> Clause {
        // !Smokes(x) v Cancer(x), soft weight 1.5
        Clause::new(
            vec![
                Literal::negative(AtomicFormula::new("Smokes", vec![Term::typed_variable("x", "person")])),
                Literal::positive(AtomicFormula::new("Cancer", vec![Term::typed_variable("x", "person")])),
            ],
            1.5,
        )
    }

    #[test]
    fn grounding_expands_over_the_single_free_variable_domain() {
        let (schemas, domains, identity) = smokers_setup();
        let evidence = EvidenceBuilder::new(&identity, WorldAssumption::Open).finalize();
        let clauses = vec![implication_clause()];
        let mrf = ground(&clauses, &domains, &identity, &evidence, &schemas, &GroundingConfig::default()).unwrap();
        assert_eq!(mrf.number_of_constraints(), 2);
        assert_eq!(mrf.number_of_atoms(), 4);
    }

    #[test]
    fn cwa_known_true_literal_makes_ground_clause_a_tautology() {
        let (schemas, domains, identity) = smokers_setup();
        let mut builder = EvidenceBuilder::new(&identity, WorldAssumption::Open);
        let smokes = AtomSignature::new("Smokes", 1);
        builder.set_assumption(smokes.clone(), WorldAssumption::Closed);
        let anna_id = identity.encode(&domains, &smokes, &["Anna"]);
        builder.assert(&smokes, anna_id, TriState::True).unwrap();
        let evidence = builder.finalize();

        let clauses = vec![implication_clause()];
        let mrf = ground(&clauses, &domains, &identity, &evidence, &schemas, &GroundingConfig::default()).unwrap();
        // Anna: Smokes(Anna) is known true, so !Smokes(Anna) is false and
        // is dropped, leaving the unit clause Cancer(Anna).
        // Bob: Smokes(Bob) defaults to false under CWA, so !Smokes(Bob) is
        // true and the whole ground clause is a tautology, contributing
        // nothing.
        assert_eq!(mrf.number_of_constraints(), 1);
    }

    #[test]
    fn kept_atoms_start_from_their_known_evidence_truth() {
        let (schemas, domains, identity) = smokers_setup();
        let mut builder = EvidenceBuilder::new(&identity, WorldAssumption::Open);
        let smokes = AtomSignature::new("Smokes", 1);
        let anna_id = identity.encode(&domains, &smokes, &["Anna"]);
        builder.assert(&smokes, anna_id, TriState::True).unwrap();
        let evidence = builder.finalize();

        let clauses = vec![implication_clause()];
        let mrf = ground(&clauses, &domains, &identity, &evidence, &schemas, &GroundingConfig::default()).unwrap();

        // Smokes(Anna) is open-world but explicitly asserted true, so it
        // is kept in a ground constraint (open-world literals are never
        // resolved away at grounding time) and seeded true, not false.
        assert_eq!(mrf.atom(anna_id).map(|a| a.truth), Some(TriState::True));
        let bob_id = identity.encode(&domains, &smokes, &["Bob"]);
        assert_eq!(mrf.atom(bob_id).map(|a| a.truth), Some(TriState::False));
    }

    #[test]
    fn unsatisfiable_hard_ground_clause_is_fatal() {
        let (schemas, domains, identity) = smokers_setup();
        let mut builder = EvidenceBuilder::new(&identity, WorldAssumption::Open);
        let smokes = AtomSignature::new("Smokes", 1);
        let cancer = AtomSignature::new("Cancer", 1);
        builder.set_assumption(smokes.clone(), WorldAssumption::Closed);
        builder.set_assumption(cancer.clone(), WorldAssumption::Closed);
        let anna_smokes = identity.encode(&domains, &smokes, &["Anna"]);
        let anna_cancer = identity.encode(&domains, &cancer, &["Anna"]);
        builder.assert(&smokes, anna_smokes, TriState::True).unwrap();
        builder.assert(&cancer, anna_cancer, TriState::False).unwrap();
        let bob_smokes = identity.encode(&domains, &smokes, &["Bob"]);
        let bob_cancer = identity.encode(&domains, &cancer, &["Bob"]);
        builder.assert(&smokes, bob_smokes, TriState::True).unwrap();
        builder.assert(&cancer, bob_cancer, TriState::False).unwrap();
        let evidence = builder.finalize();

        let mut hard_clause = implication_clause();
        hard_clause.weight = crate::structures::weight::HARD;
        let clauses = vec![hard_clause];
        let result = ground(&clauses, &domains, &identity, &evidence, &schemas, &GroundingConfig::default());
        assert_eq!(result.unwrap_err(), LomrfError::Unsatisfiable);
    }
}
