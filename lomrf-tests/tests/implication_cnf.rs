//! End-to-end: `Smokes(x) => Cancer(x)` normalizes to the single clause
//! `!Smokes(x) v Cancer(x)`, driven through the real parser rather than
//! hand-built `Formula` values.

use lomrf::normalize::to_cnf;
use lomrf::parser::parse_theory;
use lomrf::structures::{AtomicFormula, Literal, Term};

const THEORY: &str = "
person = {Anna}

Smokes(person)
Cancer(person)

1.5 Smokes(x) => Cancer(x)
";

#[test]
fn implication_becomes_one_disjunctive_clause() {
    let theory = parse_theory(THEORY).unwrap();
    let clauses: Vec<_> = theory
        .formulas
        .iter()
        .flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas))
        .collect();

    assert_eq!(clauses.len(), 1);
    let clause = &clauses[0];
    assert_eq!(clause.weight, 1.5);

    let x = Term::typed_variable("x", "person");
    let expected_not_smokes = Literal::negative(AtomicFormula::new("Smokes", vec![x.clone()]));
    let expected_cancer = Literal::positive(AtomicFormula::new("Cancer", vec![x]));
    assert!(clause.literals.contains(&expected_not_smokes));
    assert!(clause.literals.contains(&expected_cancer));
    assert_eq!(clause.literals.len(), 2);
}

#[test]
fn a_hard_implication_keeps_an_infinite_weight() {
    const HARD: &str = "
person = {Anna}

Smokes(person)
Cancer(person)

Smokes(x) => Cancer(x).
";
    let theory = parse_theory(HARD).unwrap();
    let clauses: Vec<_> = theory
        .formulas
        .iter()
        .flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas))
        .collect();
    assert_eq!(clauses.len(), 1);
    assert!(clauses[0].is_hard());
}
