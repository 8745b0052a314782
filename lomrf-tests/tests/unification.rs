//! Unification and most general pattern:
//! `mgp(InitiatedAt(meet(x,y),t), InitiatedAt(f,t)) = InitiatedAt(f,t)`
//! `mgp(InitiatedAt(meet(A,y),t), InitiatedAt(meet(A,B),t)) = InitiatedAt(meet(A,y),t)`

use lomrf::structures::{AtomicFormula, Term};
use lomrf::unify::{mgp, unify_atoms};

fn initiated_at(fluent: Term, time: Term) -> AtomicFormula {
    AtomicFormula::new("InitiatedAt", vec![fluent, time])
}

#[test]
fn mgp_of_a_compound_and_a_bare_variable_is_the_variable() {
    let a = initiated_at(
        Term::function("meet", vec![Term::variable("x"), Term::variable("y")], "fluent"),
        Term::variable("t"),
    );
    let b = initiated_at(Term::variable("f"), Term::variable("t"));
    assert_eq!(mgp(&a, &b).unwrap(), b);
}

#[test]
fn mgp_generalizes_only_the_differing_argument() {
    let a = initiated_at(
        Term::function("meet", vec![Term::constant("A"), Term::variable("y")], "fluent"),
        Term::variable("t"),
    );
    let b = initiated_at(
        Term::function("meet", vec![Term::constant("A"), Term::constant("B")], "fluent"),
        Term::variable("t"),
    );
    assert_eq!(mgp(&a, &b).unwrap(), a);
}

#[test]
fn unification_fails_across_distinct_constants() {
    let a = initiated_at(Term::constant("Walking"), Term::constant("1"));
    let b = initiated_at(Term::constant("Running"), Term::constant("1"));
    assert!(unify_atoms(&a, &b).is_none());
}

#[test]
fn unification_binds_a_variable_to_a_compound_term() {
    let a = initiated_at(Term::variable("f"), Term::constant("1"));
    let b = initiated_at(Term::function("meet", vec![Term::constant("A"), Term::constant("B")], "fluent"), Term::constant("1"));
    let subst = unify_atoms(&a, &b).unwrap();
    assert_eq!(subst.get("f"), Some(&Term::function("meet", vec![Term::constant("A"), Term::constant("B")], "fluent")));
}
