//! End-to-end: `Exist y Friends(x, y)` expands into one disjunct per
//! constant of `y`'s domain before clausification.

use lomrf::normalize::to_cnf;
use lomrf::parser::parse_theory;
use lomrf::structures::{AtomicFormula, Literal, Term};

const THEORY: &str = "
person = {Anna, Bob, Chris}

Friends(person, person)
Popular(person)

1.0 Popular(x) => Exist y Friends(x, y)
";

#[test]
fn existential_expands_to_a_disjunct_per_domain_constant() {
    let theory = parse_theory(THEORY).unwrap();
    let clauses: Vec<_> = theory
        .formulas
        .iter()
        .flat_map(|wf| to_cnf(wf, &theory.domains, &theory.schemas))
        .collect();

    assert_eq!(clauses.len(), 1);
    let clause = &clauses[0];

    // !Popular(x) v Friends(x,Anna) v Friends(x,Bob) v Friends(x,Chris)
    assert_eq!(clause.literals.len(), 4);

    let x = Term::typed_variable("x", "person");
    assert!(clause.literals.contains(&Literal::negative(AtomicFormula::new("Popular", vec![x.clone()]))));
    for person in ["Anna", "Bob", "Chris"] {
        let expected = Literal::positive(AtomicFormula::new("Friends", vec![x.clone(), Term::constant(person)]));
        assert!(clause.literals.contains(&expected), "missing disjunct for {person}");
    }
}
