/*!
The atom identity function: a dense bijection between ground atoms of
a predicate and a contiguous range of integer ids.

For predicate `P/n` with argument domains `D1..Dn` of sizes `s1..sn`, the
identity function allocates `[start, start + prod(si))` and

```text
encode(c1,...,cn) = start + sum_i (localIndex(ci) - 1) * prod_{j<i} sj
```

`decode`/`extract` invert it.
*/

use crate::domain::ConstantsDomain;
use crate::schema::Schemas;
use crate::structures::AtomSignature;

/// `u32::MAX` is reserved as the "not exists" sentinel: no predicate range
/// is expected to reach it (ids are dense and contiguous from 1).
pub const NOT_EXIST: u32 = u32::MAX;

/// The identity function for a single predicate: one contiguous id range.
#[derive(Debug, Clone)]
pub struct PredicateIdentity {
    pub signature: AtomSignature,
    pub start: u32,
    pub domain_sizes: Vec<usize>,
    arg_domains: Vec<String>,
}

impl PredicateIdentity {
    fn strides(&self) -> Vec<u64> {
        let mut strides = Vec::with_capacity(self.domain_sizes.len());
        let mut acc: u64 = 1;
        for size in &self.domain_sizes {
            strides.push(acc);
            acc *= *size as u64;
        }
        strides
    }

    /// The number of ids this predicate occupies: `prod(si)` (P1).
    pub fn count(&self) -> u64 {
        self.domain_sizes.iter().map(|s| *s as u64).product()
    }

    pub fn encode(&self, domains: &ConstantsDomain, args: &[&str]) -> u32 {
        if args.len() != self.arg_domains.len() {
            return NOT_EXIST;
        }
        let strides = self.strides();
        let mut offset: u64 = 0;
        for (i, constant) in args.iter().enumerate() {
            let domain_name = &self.arg_domains[i];
            let Some(domain) = domains.domain(domain_name) else {
                return NOT_EXIST;
            };
            let Some(local_index) = domain.local_index(constant) else {
                return NOT_EXIST;
            };
            offset += (local_index as u64 - 1) * strides[i];
        }
        (self.start as u64 + offset) as u32
    }

    pub fn decode(&self, domains: &ConstantsDomain, id: u32) -> Option<Vec<String>> {
        if id < self.start || (id as u64 - self.start as u64) >= self.count() {
            return None;
        }
        let mut offset = id as u64 - self.start as u64;
        let strides = self.strides();
        let mut args = Vec::with_capacity(self.domain_sizes.len());
        for i in 0..self.domain_sizes.len() {
            let size = self.domain_sizes[i] as u64;
            let stride = strides[i];
            let local_index = (offset / stride) % size;
            offset -= local_index * stride;
            let domain = domains.domain(&self.arg_domains[i])?;
            args.push(domain.constant_at(local_index as usize + 1)?.to_string());
        }
        let _ = offset;
        Some(args)
    }

    /// All ids consistent with a partial argument assignment (slot index
    /// -> constant), in ascending slot index then ascending local index,
    /// nested order.
    pub fn matches<'a>(
        &'a self,
        domains: &'a ConstantsDomain,
        partial: &'a [(usize, &'a str)],
    ) -> impl Iterator<Item = u32> + 'a {
        let strides = self.strides();
        let n = self.domain_sizes.len();
        let fixed: Vec<Option<u64>> = (0..n)
            .map(|slot| {
                partial.iter().find(|(s, _)| *s == slot).and_then(|(_, constant)| {
                    domains
                        .domain(&self.arg_domains[slot])
                        .and_then(|d| d.local_index(constant))
                        .map(|idx| idx as u64 - 1)
                })
            })
            .collect();

        let total: u64 = self.count();
        (0..total).filter_map(move |linear| {
            let mut remaining = linear;
            let mut offset = 0u64;
            for slot in 0..n {
                let size = self.domain_sizes[slot] as u64;
                let digit = remaining % size;
                remaining /= size;
                match fixed[slot] {
                    Some(required) if required != digit => return None,
                    _ => {}
                }
                offset += digit * strides[slot];
            }
            Some((self.start as u64 + offset) as u32)
        })
    }
}

/// The global identity function: one [`PredicateIdentity`] per declared
/// predicate, laid out back to back starting from `start_id`.
#[derive(Debug, Clone)]
pub struct AtomIdentity {
    predicates: Vec<PredicateIdentity>,
}

impl AtomIdentity {
    pub fn build(schemas: &Schemas, domains: &ConstantsDomain, start_id: u32) -> Self {
        let mut signatures: Vec<&AtomSignature> = schemas.predicate_signatures().collect();
        signatures.sort();

        let mut predicates = Vec::with_capacity(signatures.len());
        let mut next = start_id;
        for signature in signatures {
            let arg_domains = schemas
                .predicate_domains(signature)
                .expect("signature came from the schema's own key set")
                .to_vec();
            let domain_sizes = arg_domains.iter().map(|d| domains.size(d)).collect::<Vec<_>>();
            let count: u64 = domain_sizes.iter().map(|s| *s as u64).product();
            predicates.push(PredicateIdentity {
                signature: signature.clone(),
                start: next,
                domain_sizes,
                arg_domains,
            });
            next += count as u32;
        }
        AtomIdentity { predicates }
    }

    pub fn predicate(&self, signature: &AtomSignature) -> Option<&PredicateIdentity> {
        self.predicates.iter().find(|p| &p.signature == signature)
    }

    pub fn total_atoms(&self) -> u64 {
        self.predicates.iter().map(PredicateIdentity::count).sum()
    }

    pub fn predicate_for_id(&self, id: u32) -> Option<&PredicateIdentity> {
        self.predicates
            .iter()
            .find(|p| id >= p.start && (id as u64 - p.start as u64) < p.count())
    }

    pub fn encode(&self, domains: &ConstantsDomain, signature: &AtomSignature, args: &[&str]) -> u32 {
        self.predicate(signature).map_or(NOT_EXIST, |p| p.encode(domains, args))
    }

    pub fn decode(&self, domains: &ConstantsDomain, id: u32) -> Option<(AtomSignature, Vec<String>)> {
        let p = self.predicate_for_id(id)?;
        p.decode(domains, id).map(|args| (p.signature.clone(), args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstantsDomainBuilder;

    fn alpha_schema() -> (Schemas, ConstantsDomain) {
        let mut schemas = Schemas::new();
        schemas.declare_predicate(
            AtomSignature::new("Alpha", 3),
            vec!["event".into(), "fluent".into(), "time".into()],
        );

        let mut builder = ConstantsDomainBuilder::new();
        builder.extend("event", ["E1", "E2", "E3"]);
        builder.extend("fluent", ["F1", "F2"]);
        builder.extend("time", (0..=7).map(|t| t.to_string()));
        (schemas, builder.result())
    }

    #[test]
    fn naive_identity_bijection_scenario() {
        let (schemas, domains) = alpha_schema();
        let identity = AtomIdentity::build(&schemas, &domains, 1);
        let alpha = identity.predicate(&AtomSignature::new("Alpha", 3)).unwrap();

        assert_eq!(identity.total_atoms(), 48);
        assert_eq!(alpha.encode(&domains, &["E1", "F1", "0"]), 1);
        assert_eq!(alpha.encode(&domains, &["E3", "F2", "7"]), 48);

        let fluent_f1: Vec<(usize, &str)> = vec![(1, "F1")];
        assert_eq!(alpha.matches(&domains, &fluent_f1).count(), 24);

        let fluent_f1_time_0: Vec<(usize, &str)> = vec![(1, "F1"), (2, "0")];
        assert_eq!(alpha.matches(&domains, &fluent_f1_time_0).count(), 3);
    }

    #[test]
    fn encode_decode_are_mutually_inverse() {
        let (schemas, domains) = alpha_schema();
        let identity = AtomIdentity::build(&schemas, &domains, 1);
        let alpha = identity.predicate(&AtomSignature::new("Alpha", 3)).unwrap();

        for id in alpha.start..(alpha.start + alpha.count() as u32) {
            let decoded = alpha.decode(&domains, id).unwrap();
            let refs: Vec<&str> = decoded.iter().map(String::as_str).collect();
            assert_eq!(alpha.encode(&domains, &refs), id);
        }
    }

    #[test]
    fn matches_with_empty_partial_is_every_id() {
        let (schemas, domains) = alpha_schema();
        let identity = AtomIdentity::build(&schemas, &domains, 1);
        let alpha = identity.predicate(&AtomSignature::new("Alpha", 3)).unwrap();
        assert_eq!(alpha.matches(&domains, &[]).count() as u64, alpha.count());
    }

    #[test]
    fn unknown_constant_encodes_to_sentinel() {
        let (schemas, domains) = alpha_schema();
        let identity = AtomIdentity::build(&schemas, &domains, 1);
        let alpha = identity.predicate(&AtomSignature::new("Alpha", 3)).unwrap();
        assert_eq!(alpha.encode(&domains, &["E1", "F1", "99"]), NOT_EXIST);
    }
}
