/*!
Dynamic predicates & functions: built-in computable atoms and
functions, registered in a fixed map rather than dispatched virtually.
*/

pub mod functions;
pub mod predicates;

pub use functions::{DynamicFunctionFn, DynamicFunctionRegistry};
pub use predicates::{DynamicPredicateFn, DynamicPredicateRegistry};
