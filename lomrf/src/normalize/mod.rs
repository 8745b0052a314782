/*!
Normal forms: the seven-step CNF procedure plus clause
post-processing (tautology elimination, duplicate-literal elimination,
ground dynamic-literal evaluation at extraction time).
*/

use crate::domain::ConstantsDomain;
use crate::schema::Schemas;
use crate::structures::{AtomicFormula, Clause, Formula, Literal, QuantifiedVar, Term, WeightedFormula};

/// Step 1: `F=>G -> !F v G`; `F<=>G -> (!F v G) ^ (F v !G)`.
pub fn remove_implications(f: &Formula) -> Formula {
    match f {
        Formula::Atom(_) => f.clone(),
        Formula::Not(inner) => Formula::not(remove_implications(inner)),
        Formula::And(a, b) => Formula::and(remove_implications(a), remove_implications(b)),
        Formula::Or(a, b) => Formula::or(remove_implications(a), remove_implications(b)),
        Formula::Implies(a, b) => {
            let a = remove_implications(a);
            let b = remove_implications(b);
            Formula::or(Formula::not(a), b)
        }
        Formula::Equivalence(a, b) => {
            let a = remove_implications(a);
            let b = remove_implications(b);
            Formula::and(
                Formula::or(Formula::not(a.clone()), b.clone()),
                Formula::or(a, Formula::not(b)),
            )
        }
        Formula::Forall(v, inner) => Formula::Forall(v.clone(), Box::new(remove_implications(inner))),
        Formula::Exists(v, inner) => Formula::Exists(v.clone(), Box::new(remove_implications(inner))),
    }
}

/// Step 2: push negation to the leaves. `!!F -> F`; De Morgan over `^`/`v`;
/// `!Forall x F -> Exist x !F`; `!Exist x F -> Forall x !F`.
pub fn nnf(f: &Formula) -> Formula {
    match f {
        Formula::Not(inner) => match inner.as_ref() {
            Formula::Not(inner2) => nnf(inner2),
            Formula::And(a, b) => Formula::or(nnf(&Formula::not(*a.clone())), nnf(&Formula::not(*b.clone()))),
            Formula::Or(a, b) => Formula::and(nnf(&Formula::not(*a.clone())), nnf(&Formula::not(*b.clone()))),
            Formula::Forall(v, body) => Formula::Exists(v.clone(), Box::new(nnf(&Formula::not(*body.clone())))),
            Formula::Exists(v, body) => Formula::Forall(v.clone(), Box::new(nnf(&Formula::not(*body.clone())))),
            Formula::Atom(_) => f.clone(),
            // Implies/Equivalence should already be gone by the time nnf runs.
            other => Formula::not(nnf(other)),
        },
        Formula::Atom(_) => f.clone(),
        Formula::And(a, b) => Formula::and(nnf(a), nnf(b)),
        Formula::Or(a, b) => Formula::or(nnf(a), nnf(b)),
        Formula::Implies(a, b) => nnf(&remove_implications(&Formula::implies(*a.clone(), *b.clone()))),
        Formula::Equivalence(a, b) => nnf(&remove_implications(&Formula::equivalence(*a.clone(), *b.clone()))),
        Formula::Forall(v, body) => Formula::Forall(v.clone(), Box::new(nnf(body))),
        Formula::Exists(v, body) => Formula::Exists(v.clone(), Box::new(nnf(body))),
    }
}

/// Step 3: rename every quantifier-bound variable to a name unique within
/// the formula, so no two quantifiers (and no quantifier and the implicit
/// outer universal closure) share a symbol.
pub fn standardize_apart(f: &Formula, counter: &mut u32) -> Formula {
    match f {
        Formula::Atom(_) => f.clone(),
        Formula::Not(inner) => Formula::not(standardize_apart(inner, counter)),
        Formula::And(a, b) => Formula::and(standardize_apart(a, counter), standardize_apart(b, counter)),
        Formula::Or(a, b) => Formula::or(standardize_apart(a, counter), standardize_apart(b, counter)),
        Formula::Implies(a, b) => Formula::implies(standardize_apart(a, counter), standardize_apart(b, counter)),
        Formula::Equivalence(a, b) => {
            Formula::equivalence(standardize_apart(a, counter), standardize_apart(b, counter))
        }
        Formula::Forall(v, body) => {
            *counter += 1;
            let fresh_symbol = format!("{}_{}", v.symbol, counter);
            let fresh = QuantifiedVar {
                symbol: fresh_symbol.clone(),
                domain: v.domain.clone(),
            };
            let renamed = body.substitute(&v.symbol, &Term::typed_variable(fresh_symbol, v.domain.clone()));
            Formula::Forall(fresh, Box::new(standardize_apart(&renamed, counter)))
        }
        Formula::Exists(v, body) => {
            *counter += 1;
            let fresh_symbol = format!("{}_{}", v.symbol, counter);
            let fresh = QuantifiedVar {
                symbol: fresh_symbol.clone(),
                domain: v.domain.clone(),
            };
            let renamed = body.substitute(&v.symbol, &Term::typed_variable(fresh_symbol, v.domain.clone()));
            Formula::Exists(fresh, Box::new(standardize_apart(&renamed, counter)))
        }
    }
}

/// Step 4: `Exist x:D F(x) -> OR_{c in D} F(c)`. Domains are finite and
/// enumerable, so no Skolemization is needed. Descends into the whole
/// tree, not just the prenex prefix, since NNF does not guarantee a
/// prenex form.
pub fn expand_existentials(f: &Formula, domains: &ConstantsDomain) -> Formula {
    match f {
        Formula::Atom(_) => f.clone(),
        Formula::Not(inner) => Formula::not(expand_existentials(inner, domains)),
        Formula::And(a, b) => Formula::and(expand_existentials(a, domains), expand_existentials(b, domains)),
        Formula::Or(a, b) => Formula::or(expand_existentials(a, domains), expand_existentials(b, domains)),
        Formula::Implies(a, b) => Formula::implies(expand_existentials(a, domains), expand_existentials(b, domains)),
        Formula::Equivalence(a, b) => {
            Formula::equivalence(expand_existentials(a, domains), expand_existentials(b, domains))
        }
        Formula::Forall(v, body) => Formula::Forall(v.clone(), Box::new(expand_existentials(body, domains))),
        Formula::Exists(v, body) => {
            let body = expand_existentials(body, domains);
            let domain = domains.domain(&v.domain);
            let constants: Vec<&str> = domain.map(|d| d.iter().collect()).unwrap_or_default();
            let mut disjuncts = constants
                .into_iter()
                .map(|c| body.substitute(&v.symbol, &Term::constant(c)));
            match disjuncts.next() {
                Some(first) => disjuncts.fold(first, Formula::or),
                None => Formula::Atom(AtomicFormula::new("_false_", vec![])),
            }
        }
    }
}

/// Step 5: drop every remaining universal quantifier; the variables it
/// bound become implicitly universally quantified.
pub fn drop_universals(f: &Formula) -> Formula {
    match f {
        Formula::Atom(_) => f.clone(),
        Formula::Not(inner) => Formula::not(drop_universals(inner)),
        Formula::And(a, b) => Formula::and(drop_universals(a), drop_universals(b)),
        Formula::Or(a, b) => Formula::or(drop_universals(a), drop_universals(b)),
        Formula::Implies(a, b) => Formula::implies(drop_universals(a), drop_universals(b)),
        Formula::Equivalence(a, b) => Formula::equivalence(drop_universals(a), drop_universals(b)),
        Formula::Forall(_, body) => drop_universals(body),
        Formula::Exists(_, body) => drop_universals(body),
    }
}

fn distribute_or(a: Formula, b: Formula) -> Formula {
    match (a, b) {
        (Formula::And(x, y), c) => Formula::and(distribute_or(*x, c.clone()), distribute_or(*y, c)),
        (c, Formula::And(x, y)) => Formula::and(distribute_or(c.clone(), *x), distribute_or(c, *y)),
        (a, b) => Formula::or(a, b),
    }
}

/// Step 6: distribute `v` over `^` until the formula is a conjunction of
/// disjunctions of literals. Assumes `f` contains only `Atom`/`Not`/`And`/`Or`
/// nodes (quantifiers must already be gone).
pub fn distribute(f: Formula) -> Formula {
    match f {
        Formula::And(a, b) => Formula::and(distribute(*a), distribute(*b)),
        Formula::Or(a, b) => distribute_or(distribute(*a), distribute(*b)),
        other => other,
    }
}

fn collect_and(f: &Formula, out: &mut Vec<Formula>) {
    match f {
        Formula::And(a, b) => {
            collect_and(a, out);
            collect_and(b, out);
        }
        other => out.push(other.clone()),
    }
}

fn collect_or(f: &Formula, out: &mut Vec<Literal>) {
    match f {
        Formula::Or(a, b) => {
            collect_or(a, out);
            collect_or(b, out);
        }
        Formula::Atom(a) => out.push(Literal::positive(a.clone())),
        Formula::Not(inner) => {
            if let Formula::Atom(a) = inner.as_ref() {
                out.push(Literal::negative(a.clone()));
            }
        }
        _ => {}
    }
}

/// Step 7: split the distributed conjunction-of-disjunctions into clauses
/// (sets of literals).
pub fn extract_clauses(f: &Formula) -> Vec<Vec<Literal>> {
    let mut conjuncts = Vec::new();
    collect_and(f, &mut conjuncts);
    conjuncts
        .iter()
        .map(|disjunct| {
            let mut literals = Vec::new();
            collect_or(disjunct, &mut literals);
            literals
        })
        .collect()
}

/// Evaluates a literal whose atom is both dynamic and ground against the
/// dynamic predicate registry. Returns `None` when the literal cannot be
/// evaluated (non-dynamic, or not fully ground) so callers can distinguish
/// "leave it alone" from "it's a domain error": a failed dynamic-literal
/// evaluation becomes an unsatisfiable literal plus a warning, not a
/// fatal error.
pub fn eval_dynamic_literal(lit: &Literal, schemas: &Schemas) -> Option<bool> {
    if !lit.atom.is_dynamic || !lit.atom.is_ground() {
        return None;
    }
    let values = lit.atom.ground_constants()?;
    let satisfied = schemas.dynamic_predicates.evaluate(&lit.atom.symbol, &values)?;
    Some(if lit.positive { satisfied } else { !satisfied })
}

/// Clause post-processing: tautology elimination, duplicate-literal
/// elimination, and ground dynamic-literal evaluation. Returns `None` if
/// the clause reduces to a tautology (dropped entirely).
pub fn postprocess_clause(mut literals: Vec<Literal>, weight: f64, schemas: &Schemas) -> Option<Clause> {
    let mut kept = Vec::with_capacity(literals.len());
    for lit in literals.drain(..) {
        match eval_dynamic_literal(&lit, schemas) {
            // The literal is satisfied by its own evaluation: the whole
            // clause is a tautology.
            Some(true) => return None,
            // The literal is falsified: drop just the literal.
            Some(false) => continue,
            None => kept.push(lit),
        }
    }

    let mut clause = Clause::new(kept, weight);
    if clause.is_tautology() {
        return None;
    }
    clause.dedup_literals();
    Some(clause)
}

/// The full CNF conversion pipeline, including the weight division rule:
/// the divisor is exactly the number of top-level conjuncts produced by
/// distribution, computed once (not recursively re-divided at nested
/// distribution steps). Hard (`+inf`) and to-be-learned (`NaN`) weights
/// pass through unchanged.
pub fn to_cnf(weighted: &WeightedFormula, domains: &ConstantsDomain, schemas: &Schemas) -> Vec<Clause> {
    let mut counter = 0;
    let f = remove_implications(&weighted.formula);
    let f = nnf(&f);
    let f = standardize_apart(&f, &mut counter);
    let f = expand_existentials(&f, domains);
    let f = drop_universals(&f);
    let f = distribute(f);
    let clause_literal_sets = extract_clauses(&f);

    let divisor = clause_literal_sets.len().max(1) as f64;
    let per_clause_weight = if weighted.weight.is_finite() {
        weighted.weight / divisor
    } else {
        weighted.weight
    };

    clause_literal_sets
        .into_iter()
        .filter_map(|literals| postprocess_clause(literals, per_clause_weight, schemas))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstantsDomainBuilder;
    use crate::structures::{weight, AtomicFormula};

    fn atom(symbol: &str, args: Vec<Term>) -> Formula {
        Formula::Atom(AtomicFormula::new(symbol, args))
    }

    #[test]
    fn cnf_of_equivalence_yields_two_clauses() {
        let domains = ConstantsDomainBuilder::new().result();
        let schemas = Schemas::new();

        let f = Formula::equivalence(
            atom("InitiatedAt", vec![Term::constant("Fight"), Term::variable("t")]),
            atom("Happens", vec![Term::constant("Abrupt"), Term::variable("t")]),
        );
        let clauses = to_cnf(&WeightedFormula::hard(f), &domains, &schemas);

        assert_eq!(clauses.len(), 2);
        let expected_a = Clause::new(
            vec![
                Literal::negative(AtomicFormula::new("InitiatedAt", vec![Term::constant("Fight"), Term::variable("t")])),
                Literal::positive(AtomicFormula::new("Happens", vec![Term::constant("Abrupt"), Term::variable("t")])),
            ],
            weight::HARD,
        );
        let expected_b = Clause::new(
            vec![
                Literal::positive(AtomicFormula::new("InitiatedAt", vec![Term::constant("Fight"), Term::variable("t")])),
                Literal::negative(AtomicFormula::new("Happens", vec![Term::constant("Abrupt"), Term::variable("t")])),
            ],
            weight::HARD,
        );
        assert!(clauses.contains(&expected_a));
        assert!(clauses.contains(&expected_b));
    }

    #[test]
    fn existential_expansion_over_finite_time_domain() {
        let mut builder = ConstantsDomainBuilder::new();
        builder.extend("time", ["1", "2", "3", "4"]);
        let domains = builder.result();
        let schemas = Schemas::new();

        let f = Formula::exists(
            "t",
            "time",
            atom("Happens", vec![Term::variable("e"), Term::variable("t")]),
        );
        let clauses = to_cnf(&WeightedFormula::hard(f), &domains, &schemas);

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].literals.len(), 4);
        for c in ["1", "2", "3", "4"] {
            assert!(clauses[0]
                .literals
                .iter()
                .any(|l| l.atom.args[1] == Term::constant(c)));
        }
    }

    #[test]
    fn soft_weight_is_divided_across_produced_clauses() {
        let domains = ConstantsDomainBuilder::new().result();
        let schemas = Schemas::new();

        let f = Formula::and(
            Formula::or(atom("P", vec![]), atom("Q", vec![])),
            atom("R", vec![]),
        );
        let clauses = to_cnf(&WeightedFormula::weighted(6.0, f), &domains, &schemas);
        assert_eq!(clauses.len(), 2);
        for c in &clauses {
            assert_eq!(c.weight, 3.0);
        }
    }

    #[test]
    fn ground_dynamic_literal_prunes_tautology_or_literal() {
        let domains = ConstantsDomainBuilder::new().result();
        let schemas = Schemas::new();

        // `1 < 2` is a ground dynamic literal that is always true: the
        // disjunction becomes a tautology and the clause disappears.
        let tautology = Formula::or(
            Formula::Atom(AtomicFormula::dynamic("<", vec![Term::constant("1"), Term::constant("2")])),
            atom("P", vec![]),
        );
        assert!(to_cnf(&WeightedFormula::hard(tautology), &domains, &schemas).is_empty());

        // `2 < 1` is always false: the literal drops, leaving just P.
        let pruned = Formula::or(
            Formula::Atom(AtomicFormula::dynamic("<", vec![Term::constant("2"), Term::constant("1")])),
            atom("P", vec![]),
        );
        let clauses = to_cnf(&WeightedFormula::hard(pruned), &domains, &schemas);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].literals.len(), 1);
    }
}
