/*!
Built-in computable predicates: `=`, `!=`, `<`, `<=`, `>`, `>=`, and
`substring`. Each is a fixed contract (signature, state function) looked up
in a registry map, in place of any virtual dispatch on predicate symbol.
*/

use std::collections::HashMap;

/// A dynamic predicate's state function: given the ground string values of
/// its arguments, compute its truth value.
pub type DynamicPredicateFn = fn(&[&str]) -> bool;

fn as_i64(values: &[&str], index: usize) -> Option<i64> {
    values.get(index)?.parse::<i64>().ok()
}

fn equals(values: &[&str]) -> bool {
    values[0] == values[1]
}

/// Defined as the boolean negation of `equals`, never via a separate
/// (and historically buggy) `==` check.
fn not_equals(values: &[&str]) -> bool {
    !equals(values)
}

fn less_than(values: &[&str]) -> bool {
    match (as_i64(values, 0), as_i64(values, 1)) {
        (Some(a), Some(b)) => a < b,
        _ => values[0] < values[1],
    }
}

fn less_than_eq(values: &[&str]) -> bool {
    less_than(values) || equals(values)
}

fn greater_than(values: &[&str]) -> bool {
    !less_than_eq(values)
}

fn greater_than_eq(values: &[&str]) -> bool {
    !less_than(values)
}

fn substring(values: &[&str]) -> bool {
    values[1].contains(values[0])
}

/// A registry of the built-in predicates keyed by surface symbol.
pub struct DynamicPredicateRegistry {
    functions: HashMap<&'static str, DynamicPredicateFn>,
}

impl DynamicPredicateRegistry {
    pub fn with_builtins() -> Self {
        let mut functions: HashMap<&'static str, DynamicPredicateFn> = HashMap::new();
        functions.insert("equals", equals as DynamicPredicateFn);
        functions.insert("=", equals as DynamicPredicateFn);
        functions.insert("notEquals", not_equals as DynamicPredicateFn);
        functions.insert("!=", not_equals as DynamicPredicateFn);
        functions.insert("lessThan", less_than as DynamicPredicateFn);
        functions.insert("<", less_than as DynamicPredicateFn);
        functions.insert("lessThanEq", less_than_eq as DynamicPredicateFn);
        functions.insert("<=", less_than_eq as DynamicPredicateFn);
        functions.insert("greaterThan", greater_than as DynamicPredicateFn);
        functions.insert(">", greater_than as DynamicPredicateFn);
        functions.insert("greaterThanEq", greater_than_eq as DynamicPredicateFn);
        functions.insert(">=", greater_than_eq as DynamicPredicateFn);
        functions.insert("substring", substring as DynamicPredicateFn);
        DynamicPredicateRegistry { functions }
    }

    pub fn get(&self, symbol: &str) -> Option<DynamicPredicateFn> {
        self.functions.get(symbol).copied()
    }

    pub fn is_dynamic(&self, symbol: &str) -> bool {
        self.functions.contains_key(symbol)
    }

    pub fn evaluate(&self, symbol: &str, values: &[&str]) -> Option<bool> {
        self.get(symbol).map(|f| f(values))
    }
}

impl Default for DynamicPredicateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_equals_is_boolean_inverse_of_equals() {
        let reg = DynamicPredicateRegistry::with_builtins();
        for (a, b) in [("1", "1"), ("1", "2"), ("Anna", "Anna"), ("Anna", "Bob")] {
            assert_eq!(reg.evaluate("notEquals", &[a, b]), reg.evaluate("equals", &[a, b]).map(|v| !v));
        }
    }

    #[test]
    fn numeric_comparisons() {
        let reg = DynamicPredicateRegistry::with_builtins();
        assert_eq!(reg.evaluate("<", &["3", "10"]), Some(true));
        assert_eq!(reg.evaluate(">=", &["10", "10"]), Some(true));
    }
}
