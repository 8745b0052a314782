/*!
Predicate, function, and dynamic schemas, bundled into one immutable
[`Schemas`] snapshot threaded through parsing and grounding.

Rather than three independent maps passed around separately, everything
arity/type-lookup related hangs off one object with one source of
truth.
*/

use std::collections::HashMap;

use crate::dynamic::{DynamicFunctionRegistry, DynamicPredicateRegistry};
use crate::structures::AtomSignature;
use crate::types::err::SchemaError;

/// `AtomSignature -> ordered argument domain names`.
pub type PredicateSchema = HashMap<AtomSignature, Vec<String>>;

/// `AtomSignature -> (result domain, ordered argument domain names)`.
pub type FunctionSchema = HashMap<AtomSignature, (String, Vec<String>)>;

/// The immutable schema snapshot for one compilation.
#[derive(Default)]
pub struct Schemas {
    predicates: PredicateSchema,
    functions: FunctionSchema,
    pub dynamic_predicates: DynamicPredicateRegistry,
    pub dynamic_functions: DynamicFunctionRegistry,
}

impl Schemas {
    pub fn new() -> Self {
        Schemas {
            predicates: HashMap::new(),
            functions: HashMap::new(),
            dynamic_predicates: DynamicPredicateRegistry::with_builtins(),
            dynamic_functions: DynamicFunctionRegistry::with_builtins(),
        }
    }

    pub fn declare_predicate(&mut self, signature: AtomSignature, arg_domains: Vec<String>) {
        self.predicates.insert(signature, arg_domains);
    }

    /// Also declares the auxiliary CWA predicate `Aux_<fn>/arity+1` used to
    /// represent the function's graph as evidence: function mappings are
    /// asserted as tuples of this predicate.
    pub fn declare_function(&mut self, signature: AtomSignature, result_domain: String, arg_domains: Vec<String>) {
        let mut aux_domains = vec![result_domain.clone()];
        aux_domains.extend(arg_domains.iter().cloned());
        let aux_signature = AtomSignature::new(format!("Aux_{}", signature.symbol), aux_domains.len());
        self.predicates.insert(aux_signature, aux_domains);
        self.functions.insert(signature, (result_domain, arg_domains));
    }

    pub fn predicate_domains(&self, signature: &AtomSignature) -> Result<&[String], SchemaError> {
        self.predicates
            .get(signature)
            .map(Vec::as_slice)
            .ok_or(SchemaError::UndeclaredSymbol)
    }

    pub fn function_domains(&self, signature: &AtomSignature) -> Result<&(String, Vec<String>), SchemaError> {
        self.functions.get(signature).ok_or(SchemaError::UndeclaredSymbol)
    }

    pub fn is_predicate_declared(&self, signature: &AtomSignature) -> bool {
        self.predicates.contains_key(signature)
    }

    pub fn predicate_signatures(&self) -> impl Iterator<Item = &AtomSignature> {
        self.predicates.keys()
    }

    pub fn is_dynamic_atom(&self, symbol: &str) -> bool {
        self.dynamic_predicates.is_dynamic(symbol)
    }

    pub fn is_dynamic_function(&self, symbol: &str) -> bool {
        self.dynamic_functions.is_dynamic(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_predicate_is_a_schema_error() {
        let schemas = Schemas::new();
        let result = schemas.predicate_domains(&AtomSignature::new("Smokes", 1));
        assert_eq!(result, Err(SchemaError::UndeclaredSymbol));
    }

    #[test]
    fn declared_predicate_round_trips() {
        let mut schemas = Schemas::new();
        schemas.declare_predicate(AtomSignature::new("Friends", 2), vec!["person".into(), "person".into()]);
        assert_eq!(
            schemas.predicate_domains(&AtomSignature::new("Friends", 2)).unwrap(),
            ["person".to_string(), "person".to_string()]
        );
    }
}
