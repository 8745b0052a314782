/*!
Built-in computable functions: `succ`/`prec` and the arithmetic and
string shortcuts `+ - * / % concat`.
*/

use std::collections::HashMap;

/// A dynamic function's state function: given the ground string values of
/// its arguments, compute its (string-encoded) result, or `None` on a
/// domain error (e.g. a non-integer argument to `plus`).
pub type DynamicFunctionFn = fn(&[&str]) -> Option<String>;

fn as_i64(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

fn succ(values: &[&str]) -> Option<String> {
    as_i64(values[0]).map(|v| (v + 1).to_string())
}

fn prec(values: &[&str]) -> Option<String> {
    as_i64(values[0]).map(|v| (v - 1).to_string())
}

fn plus(values: &[&str]) -> Option<String> {
    Some((as_i64(values[0])? + as_i64(values[1])?).to_string())
}

fn minus(values: &[&str]) -> Option<String> {
    Some((as_i64(values[0])? - as_i64(values[1])?).to_string())
}

fn times(values: &[&str]) -> Option<String> {
    Some((as_i64(values[0])? * as_i64(values[1])?).to_string())
}

fn divide(values: &[&str]) -> Option<String> {
    let b = as_i64(values[1])?;
    if b == 0 {
        return None;
    }
    Some((as_i64(values[0])? / b).to_string())
}

fn modulo(values: &[&str]) -> Option<String> {
    let b = as_i64(values[1])?;
    if b == 0 {
        return None;
    }
    Some((as_i64(values[0])? % b).to_string())
}

fn concat(values: &[&str]) -> Option<String> {
    Some(values.concat())
}

/// A registry of the built-in functions keyed by surface symbol.
pub struct DynamicFunctionRegistry {
    functions: HashMap<&'static str, DynamicFunctionFn>,
}

impl DynamicFunctionRegistry {
    pub fn with_builtins() -> Self {
        let mut functions: HashMap<&'static str, DynamicFunctionFn> = HashMap::new();
        functions.insert("succ", succ as DynamicFunctionFn);
        functions.insert("++", succ as DynamicFunctionFn);
        functions.insert("prec", prec as DynamicFunctionFn);
        functions.insert("--", prec as DynamicFunctionFn);
        functions.insert("plus", plus as DynamicFunctionFn);
        functions.insert("+", plus as DynamicFunctionFn);
        functions.insert("minus", minus as DynamicFunctionFn);
        functions.insert("-", minus as DynamicFunctionFn);
        functions.insert("times", times as DynamicFunctionFn);
        functions.insert("*", times as DynamicFunctionFn);
        functions.insert("divide", divide as DynamicFunctionFn);
        functions.insert("/", divide as DynamicFunctionFn);
        functions.insert("mod", modulo as DynamicFunctionFn);
        functions.insert("%", modulo as DynamicFunctionFn);
        functions.insert("concat", concat as DynamicFunctionFn);
        DynamicFunctionRegistry { functions }
    }

    pub fn get(&self, symbol: &str) -> Option<DynamicFunctionFn> {
        self.functions.get(symbol).copied()
    }

    pub fn is_dynamic(&self, symbol: &str) -> bool {
        self.functions.contains_key(symbol)
    }

    pub fn evaluate(&self, symbol: &str, values: &[&str]) -> Option<Option<String>> {
        self.get(symbol).map(|f| f(values))
    }
}

impl Default for DynamicFunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succ_and_prec_are_inverse() {
        let reg = DynamicFunctionRegistry::with_builtins();
        let ten = reg.evaluate("succ", &["9"]).unwrap().unwrap();
        assert_eq!(ten, "10");
        assert_eq!(reg.evaluate("prec", &[ten.as_str()]).unwrap().unwrap(), "9");
    }

    #[test]
    fn division_by_zero_is_a_domain_error_not_a_panic() {
        let reg = DynamicFunctionRegistry::with_builtins();
        assert_eq!(reg.evaluate("/", &["1", "0"]).unwrap(), None);
    }
}
