/*!
Predicate completion: turns a set of weighted definite clauses into
an equivalent set of weighted formulas, in one of three modes.
*/

use std::collections::HashMap;

use crate::schema::Schemas;
use crate::structures::{AtomSignature, AtomicFormula, Formula, Term, WeightedDefiniteClause, WeightedFormula};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateCompletionMode {
    Standard,
    Decomposed,
    Simplification,
}

/// A head symbol's canonical atom plus, for every clause that shares the
/// head, its body merged under the existential closure of its own
/// body-only free variables.
struct CompletedHead {
    canonical: AtomicFormula,
    disjuncts: Vec<Formula>,
}

fn canonical_head(signature: &AtomSignature, schemas: &Schemas) -> AtomicFormula {
    let domains = schemas
        .predicate_domains(signature)
        .expect("predicate completion only runs over declared predicates");
    let args = domains
        .iter()
        .enumerate()
        .map(|(i, domain)| Term::typed_variable(format!("_h{i}"), domain.clone()))
        .collect();
    AtomicFormula::new(signature.symbol.clone(), args)
}

/// Renames every variable of `clause` apart using `tag` as a uniqueness
/// suffix, then binds each head argument position to the canonical
/// variable at that position: a plain variable head arg is substituted
/// directly; a compound function head arg is related to the canonical
/// variable via an injected `equals` conjunct, specializing the head's
/// function symbol and argument pattern.
fn standardize_clause_to_head(clause: &WeightedDefiniteClause, canonical: &AtomicFormula, tag: usize) -> Formula {
    let mut renamed_body = clause.clause.body.clone();
    let mut renamed_head_args = clause.clause.head.args.clone();

    let own_vars: Vec<String> = {
        let mut vars = Vec::new();
        for arg in &renamed_head_args {
            arg.free_variables(&mut vars);
        }
        clause.clause.body.free_variables().into_iter().for_each(|v| {
            if !vars.contains(&v) {
                vars.push(v);
            }
        });
        vars.into_iter().map(|(s, _)| s).collect()
    };

    for symbol in &own_vars {
        let fresh = Term::variable(format!("{symbol}_{tag}"));
        renamed_body = renamed_body.substitute(symbol, &fresh);
        renamed_head_args = renamed_head_args.iter().map(|a| a.substitute(symbol, &fresh)).collect();
    }

    let mut equalities = Vec::new();
    for (i, head_arg) in renamed_head_args.iter().enumerate() {
        let canonical_var = &canonical.args[i];
        match head_arg {
            Term::Variable { symbol, .. } => {
                renamed_body = renamed_body.substitute(symbol, canonical_var);
            }
            _ => {
                equalities.push(Formula::Atom(AtomicFormula::dynamic(
                    "equals",
                    vec![canonical_var.clone(), head_arg.clone()],
                )));
            }
        }
    }

    let mut body = renamed_body;
    for eq in equalities {
        body = Formula::and(eq, body);
    }

    let canonical_symbols: Vec<&str> = canonical.args.iter().filter_map(Term::variable_symbol).collect();
    let mut free = body.free_variables();
    free.retain(|(s, _)| !canonical_symbols.contains(&s.as_str()));
    for (symbol, domain) in free.into_iter().rev() {
        body = Formula::exists(symbol, domain, body);
    }

    body
}

fn group_by_head(definite: &[WeightedDefiniteClause]) -> Vec<(AtomSignature, Vec<&WeightedDefiniteClause>)> {
    let mut order: Vec<AtomSignature> = Vec::new();
    let mut groups: HashMap<AtomSignature, Vec<&WeightedDefiniteClause>> = HashMap::new();
    for clause in definite {
        let signature = clause.clause.head.signature();
        if !groups.contains_key(&signature) {
            order.push(signature.clone());
        }
        groups.entry(signature).or_default().push(clause);
    }
    order.into_iter().map(|sig| (sig.clone(), groups.remove(&sig).unwrap())).collect()
}

fn complete_heads(definite: &[WeightedDefiniteClause], schemas: &Schemas) -> Vec<CompletedHead> {
    group_by_head(definite)
        .into_iter()
        .map(|(signature, clauses)| {
            let canonical = canonical_head(&signature, schemas);
            let disjuncts = clauses
                .iter()
                .enumerate()
                .map(|(i, clause)| standardize_clause_to_head(clause, &canonical, i))
                .collect();
            CompletedHead { canonical, disjuncts }
        })
        .collect()
}

fn or_all(mut disjuncts: Vec<Formula>) -> Formula {
    let mut body = disjuncts.pop().expect("a head group always has at least one clause");
    while let Some(next) = disjuncts.pop() {
        body = Formula::or(next, body);
    }
    body
}

/// Substitutes `completed.canonical`'s variables with `call_args` in a copy
/// of `completed`'s body disjunction, instantiating it for one call site.
fn instantiate_body(completed: &CompletedHead, call_args: &[Term]) -> Formula {
    let body = or_all(completed.disjuncts.clone());
    completed
        .canonical
        .args
        .iter()
        .zip(call_args)
        .fold(body, |acc, (canonical_var, call_arg)| {
            let symbol = canonical_var.variable_symbol().unwrap();
            acc.substitute(symbol, call_arg)
        })
}

fn substitute_head_occurrences(formula: &Formula, completed: &CompletedHead) -> Formula {
    match formula {
        Formula::Atom(a) if a.symbol == completed.canonical.symbol && a.args.len() == completed.canonical.args.len() => {
            instantiate_body(completed, &a.args)
        }
        Formula::Atom(_) => formula.clone(),
        Formula::Not(f) => Formula::not(substitute_head_occurrences(f, completed)),
        Formula::And(a, b) => Formula::and(
            substitute_head_occurrences(a, completed),
            substitute_head_occurrences(b, completed),
        ),
        Formula::Or(a, b) => Formula::or(
            substitute_head_occurrences(a, completed),
            substitute_head_occurrences(b, completed),
        ),
        Formula::Implies(a, b) => Formula::implies(
            substitute_head_occurrences(a, completed),
            substitute_head_occurrences(b, completed),
        ),
        Formula::Equivalence(a, b) => Formula::equivalence(
            substitute_head_occurrences(a, completed),
            substitute_head_occurrences(b, completed),
        ),
        Formula::Forall(v, f) => Formula::Forall(v.clone(), Box::new(substitute_head_occurrences(f, completed))),
        Formula::Exists(v, f) => Formula::Exists(v.clone(), Box::new(substitute_head_occurrences(f, completed))),
    }
}

/// Turns `definite` (plus the untouched `formulas`) into a fully
/// weighted-formula theory, per `mode`.
pub fn predicate_completion(
    definite: &[WeightedDefiniteClause],
    formulas: &[WeightedFormula],
    schemas: &Schemas,
    mode: PredicateCompletionMode,
) -> Vec<WeightedFormula> {
    if definite.is_empty() {
        return formulas.to_vec();
    }

    match mode {
        PredicateCompletionMode::Standard => {
            let mut out: Vec<WeightedFormula> = formulas.to_vec();
            for completed in complete_heads(definite, schemas) {
                let body = or_all(completed.disjuncts);
                out.push(WeightedFormula::hard(Formula::equivalence(Formula::Atom(completed.canonical), body)));
            }
            out
        }
        PredicateCompletionMode::Decomposed => {
            let mut out: Vec<WeightedFormula> = formulas.to_vec();
            for (signature, clauses) in group_by_head(definite) {
                let canonical = canonical_head(&signature, schemas);
                let mut bodies = Vec::with_capacity(clauses.len());
                for (i, clause) in clauses.iter().enumerate() {
                    let body = standardize_clause_to_head(clause, &canonical, i);
                    out.push(WeightedFormula::weighted(
                        clause.weight,
                        Formula::implies(body.clone(), Formula::Atom(canonical.clone())),
                    ));
                    bodies.push(body);
                }
                out.push(WeightedFormula::hard(Formula::implies(
                    Formula::Atom(canonical.clone()),
                    or_all(bodies),
                )));
            }
            out
        }
        PredicateCompletionMode::Simplification => {
            let completed_heads = complete_heads(definite, schemas);
            let mut out = Vec::with_capacity(formulas.len());
            for f in formulas {
                let mut rewritten = f.formula.clone();
                for completed in &completed_heads {
                    rewritten = substitute_head_occurrences(&rewritten, completed);
                }
                out.push(WeightedFormula::weighted(f.weight, rewritten));
            }
            out
        }
    }
}
