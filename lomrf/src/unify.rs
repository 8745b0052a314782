/*!
Unification and similarity: the Robinson most-general unifier with an
occurs check, α-equivalence (`=~=`) on literals and clauses, θ-subsumption,
and the most general pattern (mgp) of two atoms.
*/

use std::collections::HashMap;

use crate::structures::{AtomicFormula, Clause, Literal, Term, TermFunction};

/// A substitution from variable symbol to term.
pub type Substitution = HashMap<String, Term>;

fn apply(term: &Term, subst: &Substitution) -> Term {
    match term {
        Term::Variable { symbol, .. } => match subst.get(symbol) {
            Some(bound) => apply(bound, subst),
            None => term.clone(),
        },
        Term::Function(tf) => Term::Function(TermFunction {
            symbol: tf.symbol.clone(),
            args: tf.args.iter().map(|a| apply(a, subst)).collect(),
            result_domain: tf.result_domain.clone(),
        }),
        Term::Constant(_) => term.clone(),
    }
}

fn occurs(symbol: &str, term: &Term) -> bool {
    match term {
        Term::Variable { symbol: s, .. } => s == symbol,
        Term::Constant(_) => false,
        Term::Function(tf) => tf.args.iter().any(|a| occurs(symbol, a)),
    }
}

/// The Robinson most-general unifier of two terms, with an occurs check.
/// Returns `None` (never an error — unification failure is not fatal) if
/// no unifier exists.
pub fn unify_terms(a: &Term, b: &Term) -> Option<Substitution> {
    let mut subst = Substitution::new();
    unify_terms_into(a, b, &mut subst).then_some(subst)
}

fn unify_terms_into(a: &Term, b: &Term, subst: &mut Substitution) -> bool {
    let a = apply(a, subst);
    let b = apply(b, subst);
    match (&a, &b) {
        (Term::Constant(x), Term::Constant(y)) => x == y,
        (Term::Variable { symbol, .. }, other) | (other, Term::Variable { symbol, .. }) => {
            if let Term::Variable { symbol: s2, .. } = other {
                if s2 == symbol {
                    return true;
                }
            }
            if occurs(symbol, other) {
                return false;
            }
            subst.insert(symbol.clone(), other.clone());
            true
        }
        (Term::Function(f1), Term::Function(f2)) => {
            if f1.symbol != f2.symbol || f1.args.len() != f2.args.len() {
                return false;
            }
            f1.args.iter().zip(&f2.args).all(|(x, y)| unify_terms_into(x, y, subst))
        }
        _ => false,
    }
}

/// Unifies two atomic formulas (same symbol and arity required).
pub fn unify_atoms(a: &AtomicFormula, b: &AtomicFormula) -> Option<Substitution> {
    if a.symbol != b.symbol || a.args.len() != b.args.len() {
        return None;
    }
    let mut subst = Substitution::new();
    for (x, y) in a.args.iter().zip(&b.args) {
        if !unify_terms_into(x, y, &mut subst) {
            return None;
        }
    }
    Some(subst)
}

/// One-directional structural match: binds variables of `pattern` to
/// terms of `target`, treating `target`'s own variables as opaque
/// constants. Used by [`subsumes`] and alpha-equivalence, which both
/// require substitution to apply to only one side of the comparison.
fn match_term(pattern: &Term, target: &Term, subst: &mut Substitution) -> bool {
    match pattern {
        Term::Variable { symbol, .. } => match subst.get(symbol) {
            Some(bound) => bound == target,
            None => {
                subst.insert(symbol.clone(), target.clone());
                true
            }
        },
        Term::Constant(c) => matches!(target, Term::Constant(d) if c == d),
        Term::Function(pf) => match target {
            Term::Function(tf) if pf.symbol == tf.symbol && pf.args.len() == tf.args.len() => {
                pf.args.iter().zip(&tf.args).all(|(p, t)| match_term(p, t, subst))
            }
            _ => false,
        },
    }
}

fn match_literal(pattern: &Literal, target: &Literal, subst: &mut Substitution) -> bool {
    pattern.positive == target.positive
        && pattern.atom.symbol == target.atom.symbol
        && pattern.atom.args.len() == target.atom.args.len()
        && pattern
            .atom
            .args
            .iter()
            .zip(&target.atom.args)
            .all(|(p, t)| match_term(p, t, subst))
}

/// Classical θ-subsumption: `c1` subsumes `c2` iff there is a substitution
/// `θ` such that `c1·θ ⊆ c2`. Reflexive and transitive (P7).
pub fn subsumes(c1: &Clause, c2: &Clause) -> bool {
    fn search(remaining: &[Literal], target: &[Literal], subst: &mut Substitution) -> bool {
        let Some((first, rest)) = remaining.split_first() else {
            return true;
        };
        for candidate in target {
            let mut attempt = subst.clone();
            if match_literal(first, candidate, &mut attempt) && search(rest, target, &mut attempt) {
                *subst = attempt;
                return true;
            }
        }
        false
    }

    let mut subst = Substitution::new();
    search(&c1.literals, &c2.literals, &mut subst)
}

/// α-equivalence (`=~=`): two clauses are similar iff there is a bijection
/// between their literals preserving sign, constants, and function
/// structure, with a variable renaming consistent across the whole
/// clause (and invertible, since the relation is symmetric).
pub fn alpha_equivalent_clauses(c1: &Clause, c2: &Clause) -> bool {
    if c1.literals.len() != c2.literals.len() {
        return false;
    }

    fn search(
        remaining: &[Literal],
        pool: &[bool],
        target: &[Literal],
        forward: &mut Substitution,
        backward: &mut Substitution,
    ) -> bool {
        let Some((first, rest)) = remaining.split_first() else {
            return true;
        };
        for (i, used) in pool.iter().enumerate() {
            if *used {
                continue;
            }
            let candidate = &target[i];
            let mut fwd = forward.clone();
            let mut bwd = backward.clone();
            if match_literal(first, candidate, &mut fwd) && match_literal(candidate, first, &mut bwd) {
                let mut next_pool = pool.to_vec();
                next_pool[i] = true;
                if search(rest, &next_pool, target, &mut fwd, &mut bwd) {
                    *forward = fwd;
                    *backward = bwd;
                    return true;
                }
            }
        }
        false
    }

    let pool = vec![false; c2.literals.len()];
    let mut forward = Substitution::new();
    let mut backward = Substitution::new();
    search(&c1.literals, &pool, &c2.literals, &mut forward, &mut backward)
}

/// α-equivalence on two literals (a clause of one literal each).
pub fn alpha_equivalent_literals(a: &Literal, b: &Literal) -> bool {
    alpha_equivalent_clauses(&Clause::new(vec![a.clone()], 0.0), &Clause::new(vec![b.clone()], 0.0))
}

/// Anti-unification of two terms: the unique (up to renaming) most
/// specific term that generalizes both, reusing an existing variable from
/// either side rather than minting a fresh one whenever one side already
/// is a variable, to recover the already-written-down variable rather
/// than an arbitrary fresh name.
fn anti_unify(a: &Term, b: &Term, cache: &mut HashMap<(Term, Term), Term>, counter: &mut u32) -> Term {
    if a == b {
        return a.clone();
    }
    if let (Term::Function(fa), Term::Function(fb)) = (a, b) {
        if fa.symbol == fb.symbol && fa.args.len() == fb.args.len() {
            let args = fa
                .args
                .iter()
                .zip(&fb.args)
                .map(|(x, y)| anti_unify(x, y, cache, counter))
                .collect();
            return Term::Function(TermFunction {
                symbol: fa.symbol.clone(),
                args,
                result_domain: fa.result_domain.clone(),
            });
        }
    }
    if a.is_variable() {
        return a.clone();
    }
    if b.is_variable() {
        return b.clone();
    }
    if let Some(existing) = cache.get(&(a.clone(), b.clone())) {
        return existing.clone();
    }
    *counter += 1;
    let fresh = Term::variable(format!("_mgp{counter}"));
    cache.insert((a.clone(), b.clone()), fresh.clone());
    fresh
}

/// The most general pattern of two atoms: the unique (up to renaming)
/// atomic formula `G` such that `G` subsumes both `a` and `b` and every
/// common generalization subsumes `G`. `None` if `a` and `b` do not share
/// a symbol and arity.
pub fn mgp(a: &AtomicFormula, b: &AtomicFormula) -> Option<AtomicFormula> {
    if a.symbol != b.symbol || a.args.len() != b.args.len() {
        return None;
    }
    let mut cache = HashMap::new();
    let mut counter = 0;
    let args = a
        .args
        .iter()
        .zip(&b.args)
        .map(|(x, y)| anti_unify(x, y, &mut cache, &mut counter))
        .collect();
    Some(AtomicFormula {
        symbol: a.symbol.clone(),
        args,
        is_dynamic: a.is_dynamic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(symbol: &str, args: Vec<Term>) -> AtomicFormula {
        AtomicFormula::new(symbol, args)
    }

    #[test]
    fn mgp_reuses_existing_variable_on_one_side() {
        let a = atom(
            "InitiatedAt",
            vec![
                Term::function("meet", vec![Term::variable("x"), Term::variable("y")], "fluent"),
                Term::variable("t"),
            ],
        );
        let b = atom("InitiatedAt", vec![Term::variable("f"), Term::variable("t")]);
        let result = mgp(&a, &b).unwrap();
        assert_eq!(result, b);
    }

    #[test]
    fn mgp_generalizes_inside_matching_function_structure() {
        let a = atom(
            "InitiatedAt",
            vec![
                Term::function("meet", vec![Term::constant("A"), Term::variable("y")], "fluent"),
                Term::variable("t"),
            ],
        );
        let b = atom(
            "InitiatedAt",
            vec![
                Term::function("meet", vec![Term::constant("A"), Term::constant("B")], "fluent"),
                Term::variable("t"),
            ],
        );
        let result = mgp(&a, &b).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn subsumption_is_reflexive() {
        let c = Clause::new(vec![Literal::positive(atom("P", vec![Term::variable("x")]))], 1.0);
        assert!(subsumes(&c, &c));
    }

    #[test]
    fn subsumption_matches_variable_to_constant() {
        let general = Clause::new(vec![Literal::positive(atom("P", vec![Term::variable("x")]))], 1.0);
        let specific = Clause::new(
            vec![
                Literal::positive(atom("P", vec![Term::constant("Anna")])),
                Literal::negative(atom("Q", vec![Term::constant("Anna")])),
            ],
            1.0,
        );
        assert!(subsumes(&general, &specific));
        assert!(!subsumes(&specific, &general));
    }

    #[test]
    fn alpha_equivalence_is_symmetric_and_reflexive() {
        let c1 = Clause::new(
            vec![Literal::positive(atom("P", vec![Term::variable("x"), Term::variable("y")]))],
            1.0,
        );
        let c2 = Clause::new(
            vec![Literal::positive(atom("P", vec![Term::variable("a"), Term::variable("b")]))],
            1.0,
        );
        assert!(alpha_equivalent_clauses(&c1, &c1));
        assert!(alpha_equivalent_clauses(&c1, &c2));
        assert!(alpha_equivalent_clauses(&c2, &c1));
    }

    #[test]
    fn alpha_equivalence_rejects_different_constants() {
        let c1 = Clause::new(vec![Literal::positive(atom("P", vec![Term::constant("Anna")]))], 1.0);
        let c2 = Clause::new(vec![Literal::positive(atom("P", vec![Term::constant("Bob")]))], 1.0);
        assert!(!alpha_equivalent_clauses(&c1, &c2));
    }

    #[test]
    fn unify_occurs_check_rejects_cyclic_binding() {
        let x = Term::variable("x");
        let cyclic = Term::function("f", vec![x.clone()], "d");
        assert_eq!(unify_terms(&x, &cyclic), None);
    }
}
