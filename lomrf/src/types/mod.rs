/*!
Crate-wide error type and result alias.
*/

pub mod err;

pub use err::LomrfError;

/// The crate-wide result alias. Unification, `mgp`, and subsumption never
/// use this: a failed match there is a plain `Option::None`, never fatal.
pub type Result<T> = std::result::Result<T, LomrfError>;
