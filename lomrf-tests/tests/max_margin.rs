//! Weight learning smoke test: a hand-authored knowledge base, small
//! enough that `countGroundings` and the resulting weight update can be
//! checked by direct computation, over the classic Friends & Smokers
//! predicates.
//!
//! `Smokes`/`Cancer` are declared open-world so their ground literals stay
//! in the MRF as learnable variables (closed-world literals are resolved
//! away entirely at grounding time and never reach a ground constraint);
//! the training file still gives every atom a definite truth value, which
//! seeds the MRF's initial (annotated) assignment.

use lomrf::completion::{predicate_completion, PredicateCompletionMode};
use lomrf::evidence::{EvidenceBuilder, WorldAssumption};
use lomrf::ground::{ground, GroundingConfig};
use lomrf::inference::{MaxMargin, Valuation, WeightLearner};
use lomrf::mrf::Mrf;
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

const TRAIN: &str = "
Friends(Anna, Bob)
Friends(Bob, Anna)
Smokes(Anna)
Smokes(Bob)
Cancer(Anna)
Cancer(Bob)
";

fn ground_training_mrf() -> Mrf {
    let theory = parse_theory(THEORY).unwrap();

    let mut builder = EvidenceBuilder::new(&theory.identity, WorldAssumption::Closed);
    builder.set_assumption(AtomSignature::new("Smokes", 1), WorldAssumption::Open);
    builder.set_assumption(AtomSignature::new("Cancer", 1), WorldAssumption::Open);
    parse_db(TRAIN, &theory.schemas, &theory.domains, &theory.identity, &mut builder).unwrap();
    let evidence = builder.finalize();

    let completed = predicate_completion(&theory.definite_clauses, &theory.formulas, &theory.schemas, PredicateCompletionMode::Standard);
    let clauses: Vec<_> = completed.iter().flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas)).collect();

    let grounding_config = GroundingConfig { workers: 1, with_dependency_map: true };
    ground(&clauses, &theory.domains, &theory.identity, &evidence, &theory.schemas, &grounding_config).unwrap()
}

#[test]
fn count_groundings_matches_the_number_of_satisfied_ground_constraints_per_parent() {
    let mrf = ground_training_mrf();
    let dep = mrf.dependency_map().unwrap();

    let learner = MaxMargin { learning_rate: 0.1 };
    let counts = learner.count_groundings(&mrf, dep);

    // Training evidence gives every Smokes/Cancer atom a definite truth,
    // and that truth satisfies both `Smokes=>Cancer` and the friendship
    // symmetry clauses everywhere they ground, so countGroundings is
    // exactly each parent's number of distinct ground-constraint
    // attributions.
    let expected: Vec<i64> = (0..counts.len())
        .map(|parent| dep.values().filter(|parents| parents.contains_key(&parent)).count() as i64)
        .collect();
    assert_eq!(counts, expected);
    assert!(counts.iter().all(|&c| c > 0));
}

#[test]
fn one_max_margin_pass_is_a_no_op_when_the_map_assignment_already_matches_the_annotation() {
    let mut mrf = ground_training_mrf();
    let dep = mrf.dependency_map().cloned().unwrap();

    // The MRF starts at the training annotation (evidence-seeded atom
    // truths); since no flip has happened yet, "MAP" and "annotated"
    // coincide, so the perceptron update must be exactly zero.
    let annotated: Valuation = mrf.atoms().iter().map(|(&id, atom)| (id, atom.truth)).collect();
    let mut learner = MaxMargin { learning_rate: 0.1 };
    let annotated_counts = learner.count_groundings(&mrf, &dep);
    let map_counts = learner.count_groundings(&mrf, &dep);
    let weights: Vec<f64> = annotated_counts
        .iter()
        .zip(&map_counts)
        .map(|(&a, &m)| learner.learning_rate * (a - m) as f64)
        .collect();
    assert!(weights.iter().all(|&w| w == 0.0));

    learner.update_weights(&mut mrf, &dep, &weights);
    assert_eq!(learner.loss(&mrf, &annotated), 0.0);
}

#[test]
fn a_disagreeing_map_assignment_produces_a_nonzero_update() {
    let mut mrf = ground_training_mrf();
    let theory = parse_theory(THEORY).unwrap();
    let dep = mrf.dependency_map().cloned().unwrap();
    let learner = MaxMargin { learning_rate: 0.1 };
    let annotated_counts = learner.count_groundings(&mrf, &dep);

    // Flip only the Cancer atoms away from the training annotation: this
    // breaks every ground instance of `Smokes=>Cancer` (parent 0) while
    // leaving the Friends-symmetry clauses (parents 1, 2), which never
    // mention Cancer, untouched.
    let cancer = theory.identity.predicate(&AtomSignature::new("Cancer", 1)).unwrap();
    for id in cancer.matches(&theory.domains, &[]) {
        if let Some(atom) = mrf.atom(id) {
            mrf.set_truth(id, atom.truth.flip());
        }
    }
    let map_counts = learner.count_groundings(&mrf, &dep);
    assert_ne!(annotated_counts, map_counts);
    assert_eq!(map_counts[0], 0);

    let mut learner = learner;
    let weights: Vec<f64> = annotated_counts
        .iter()
        .zip(&map_counts)
        .map(|(&a, &m)| learner.learning_rate * (a - m) as f64)
        .collect();
    assert!(weights[0] > 0.0);
    learner.update_weights(&mut mrf, &dep, &weights);
}
