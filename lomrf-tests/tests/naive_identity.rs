//! End-to-end: the atom identity function built from a parsed theory is a
//! bijection between (predicate, ground args) and a contiguous id range,
//! exercised through the full parser rather than by constructing
//! schemas/domains by hand.

use lomrf::parser::parse_theory;
use lomrf::structures::AtomSignature;

const THEORY: &str = "
person = {Anna, Bob, Chris}

Friends(person, person)
Smokes(person)

Smokes(x) => Smokes(x).
";

#[test]
fn every_ground_atom_round_trips_through_encode_decode() {
    let theory = parse_theory(THEORY).unwrap();

    for signature in [AtomSignature::new("Friends", 2), AtomSignature::new("Smokes", 1)] {
        let identity = theory.identity.predicate(&signature).unwrap();
        for id in identity.matches(&theory.domains, &[]) {
            let (decoded_signature, args) = theory.identity.decode(&theory.domains, id).unwrap();
            assert_eq!(decoded_signature, signature);
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            assert_eq!(theory.identity.encode(&theory.domains, &signature, &arg_refs), id);
        }
    }
}

#[test]
fn distinct_predicates_occupy_disjoint_id_ranges() {
    let theory = parse_theory(THEORY).unwrap();
    let friends = theory.identity.predicate(&AtomSignature::new("Friends", 2)).unwrap();
    let smokes = theory.identity.predicate(&AtomSignature::new("Smokes", 1)).unwrap();

    let friends_ids: Vec<u32> = friends.matches(&theory.domains, &[]).collect();
    let smokes_ids: Vec<u32> = smokes.matches(&theory.domains, &[]).collect();
    assert_eq!(friends_ids.len(), 9); // 3 x 3
    assert_eq!(smokes_ids.len(), 3);
    assert!(friends_ids.iter().all(|id| !smokes_ids.contains(id)));
}
