/*!
Domains and constants.

A [`Domain`] is a named, ordered set of string constants; each constant is
assigned a dense 1-based local index the first time it is added. A
[`ConstantsDomain`] maps domain name to `Domain` and is the immutable
snapshot threaded through parsing, the atom [identity function](crate::identity),
and [grounding](crate::ground).
*/

use std::collections::HashMap;
use std::ops::AddAssign;

/// A named, ordered set of string constants with dense 1-based local
/// indices. Adding the same constant twice is a no-op (idempotent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    name: String,
    constants: Vec<String>,
    index: HashMap<String, usize>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Self {
        Domain {
            name: name.into(),
            constants: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// The 1-based local index of `constant`, or `None` if it is not a
    /// member of this domain.
    pub fn local_index(&self, constant: &str) -> Option<usize> {
        self.index.get(constant).copied()
    }

    /// The constant at 1-based `local_index`, or `None` if out of range.
    pub fn constant_at(&self, local_index: usize) -> Option<&str> {
        if local_index == 0 {
            return None;
        }
        self.constants.get(local_index - 1).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.constants.iter().map(String::as_str)
    }

    pub fn contains(&self, constant: &str) -> bool {
        self.index.contains_key(constant)
    }

    /// Inserts `constant` if absent, returning its local index either way.
    fn insert(&mut self, constant: &str) -> usize {
        if let Some(existing) = self.index.get(constant) {
            return *existing;
        }
        self.constants.push(constant.to_string());
        let idx = self.constants.len();
        self.index.insert(constant.to_string(), idx);
        idx
    }
}

/// A scoped builder of a [`ConstantsDomain`]. Every compilation creates a
/// fresh builder; there is no process-wide state.
#[derive(Debug, Clone, Default)]
pub struct ConstantsDomainBuilder {
    domains: HashMap<String, Domain>,
}

impl ConstantsDomainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremental add: adds one constant to one
    /// domain, creating the domain if it does not yet exist.
    pub fn add(&mut self, domain: &str, constant: &str) -> &mut Self {
        self.domains
            .entry(domain.to_string())
            .or_insert_with(|| Domain::new(domain))
            .insert(constant);
        self
    }

    /// Batch add: adds every constant in `constants`
    /// to `domain`, in order.
    pub fn extend(&mut self, domain: &str, constants: impl IntoIterator<Item = impl AsRef<str>>) -> &mut Self {
        let entry = self
            .domains
            .entry(domain.to_string())
            .or_insert_with(|| Domain::new(domain));
        for c in constants {
            entry.insert(c.as_ref());
        }
        self
    }

    /// Snapshot semantics: the returned value is immutable and detached
    /// from further mutation of `self`.
    pub fn result(&self) -> ConstantsDomain {
        ConstantsDomain {
            domains: self.domains.clone(),
        }
    }
}

/// `+=` sugar for [`ConstantsDomainBuilder::add`]: `builder += ("time", "1")`.
impl<'a> AddAssign<(&'a str, &'a str)> for ConstantsDomainBuilder {
    fn add_assign(&mut self, (domain, constant): (&'a str, &'a str)) {
        self.add(domain, constant);
    }
}

/// An immutable snapshot of every domain declared in a theory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantsDomain {
    domains: HashMap<String, Domain>,
}

impl ConstantsDomain {
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// The size of `name`, or 0 if the domain is unknown.
    pub fn size(&self, name: &str) -> usize {
        self.domains.get(name).map_or(0, Domain::len)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_and_batch_add_are_idempotent() {
        let mut builder = ConstantsDomainBuilder::new();
        builder += ("person", "Anna");
        builder += ("person", "Anna");
        builder.extend("person", ["Bob", "Anna", "Chris"]);

        let domain = builder.result();
        let person = domain.domain("person").unwrap();
        assert_eq!(person.len(), 3);
        assert_eq!(person.local_index("Anna"), Some(1));
        assert_eq!(person.local_index("Bob"), Some(2));
        assert_eq!(person.local_index("Chris"), Some(3));
    }

    #[test]
    fn snapshot_is_disjoint_from_later_mutation() {
        let mut builder = ConstantsDomainBuilder::new();
        builder.add("time", "0");
        let before = builder.result();
        builder.add("time", "1");

        assert_eq!(before.size("time"), 1);
        assert_eq!(builder.result().size("time"), 2);
    }
}
