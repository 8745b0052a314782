//! End-to-end: parse, complete, normalize, ground, and run MAP inference
//! over the classic Friends & Smokers theory. `Friends` is closed-world
//! evidence; `Smokes`/`Cancer` are the open-world query predicates
//! inference decides.

use lomrf::evidence::{EvidenceBuilder, WorldAssumption};
use lomrf::completion::{predicate_completion, PredicateCompletionMode};
use lomrf::ground::{ground, GroundingConfig};
use lomrf::inference::{Inference, InferenceOutcome, MaxWalkSat};
use lomrf::normalize::to_cnf;
use lomrf::parser::{db::parse_db, parse_theory};
use lomrf::structures::AtomSignature;

const THEORY: &str = "
person = {Anna, Bob}

Friends(person, person)
Smokes(person)
Cancer(person)

1.5 Smokes(x) => Cancer(x)
1.1 Friends(x, y) => (Smokes(x) <=> Smokes(y))
";

const EVIDENCE: &str = "
Friends(Anna, Bob)
Friends(Bob, Anna)
Smokes(Anna)
";

fn build() -> lomrf::mrf::Mrf {
    let theory = parse_theory(THEORY).unwrap();

    let mut builder = EvidenceBuilder::new(&theory.identity, WorldAssumption::Closed);
    builder.set_assumption(AtomSignature::new("Smokes", 1), WorldAssumption::Open);
    builder.set_assumption(AtomSignature::new("Cancer", 1), WorldAssumption::Open);
    parse_db(EVIDENCE, &theory.schemas, &theory.domains, &theory.identity, &mut builder).unwrap();
    let evidence = builder.finalize();

    let completed = predicate_completion(&theory.definite_clauses, &theory.formulas, &theory.schemas, PredicateCompletionMode::Standard);
    let clauses: Vec<_> = completed.iter().flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas)).collect();

    ground(&clauses, &theory.domains, &theory.identity, &evidence, &theory.schemas, &GroundingConfig::default()).unwrap()
}

#[test]
fn grounds_into_a_nonempty_mrf() {
    let mrf = build();
    assert!(mrf.number_of_atoms() > 0);
    assert!(mrf.number_of_constraints() > 0);
}

#[test]
fn map_inference_converges_to_a_fully_decided_assignment() {
    let mut mrf = build();
    let query = vec![AtomSignature::new("Smokes", 1), AtomSignature::new("Cancer", 1)];
    let mut solver = MaxWalkSat::new(3, 0.3, 50_000);
    let outcome = solver.infer(&mut mrf, &query, None).unwrap();
    assert!(matches!(outcome, InferenceOutcome::Converged { .. }));

    // Every satisfiable open-world atom that was actually grounded must
    // end up decided True or False, never left at the Unknown it can
    // never escape once flipped.
    for atom in mrf.atoms().values() {
        assert_ne!(atom.truth, lomrf::evidence::TriState::Unknown);
    }
}
