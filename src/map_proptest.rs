#![cfg(test)]

// Property tests for OpenAddressingMap kept inside the crate so they sit
// next to the implementation they constrain.

use crate::map::{OpenAddressingMap, ProbeExhausted, DEFAULT_CAPACITY};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    GetOr(usize, i32),
    Contains(usize),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            3 => idx.clone().prop_map(OpI::Get),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::GetOr(i, d)),
            2 => idx.clone().prop_map(OpI::Contains),
            2 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Every capacity a map constructed at DEFAULT_CAPACITY can reach: growth
// and escalation both apply `2n + 1`, purges and `clear` keep the
// capacity, so the reachable set is one fixed orbit.
fn in_growth_orbit(cap: usize) -> bool {
    let mut c = DEFAULT_CAPACITY;
    while c < cap {
        c = 2 * c + 1;
    }
    c == cap
}

// With a randomized hasher, an absent key's bounded walk can legitimately
// exhaust instead of hitting an empty slot; both outcomes prove absence.
fn absent(sut: &OpenAddressingMap<String, i32>, key: &str) -> bool {
    matches!(sut.try_get(key), Ok(None) | Err(ProbeExhausted))
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the model's previous value; overwrites never inflate `len`.
// - `remove` returns the model's value and decrements `len`.
// - Present keys always resolve within the probe bound with the model's value.
// - Absent keys report absence (empty-terminated walk or probe exhaustion).
// - `iter` yields each live entry exactly once; capacity stays in the
//   `2n + 1` growth orbit; `clear` keeps capacity and empties the map.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: OpenAddressingMap<String, i32> = OpenAddressingMap::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i].clone();
                    let prev = sut.put(k.clone(), v);
                    prop_assert_eq!(prev, model.insert(k, v));
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    match model.remove(k.as_str()) {
                        Some(mv) => prop_assert_eq!(sut.remove(k.as_str()), Some(mv)),
                        None => {
                            // Removing an absent key is only well-defined when
                            // its walk terminates; exhaustion would be the
                            // lookup hard-failure path.
                            if let Ok(None) = sut.try_get(k.as_str()) {
                                prop_assert_eq!(sut.remove(k.as_str()), None);
                            }
                        }
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    match model.get(k.as_str()) {
                        Some(mv) => prop_assert_eq!(sut.get(k.as_str()), Some(mv)),
                        None => prop_assert!(absent(&sut, k)),
                    }
                }
                OpI::GetOr(i, d) => {
                    let k = &pool[i];
                    if sut.try_get(k.as_str()).is_ok() {
                        let expect = model.get(k.as_str()).copied().unwrap_or(d);
                        prop_assert_eq!(sut.get_or(k.as_str(), d), expect);
                    }
                }
                OpI::Contains(i) => {
                    let k = &pool[i];
                    if model.contains_key(k.as_str()) {
                        prop_assert!(sut.contains_key(k.as_str()));
                    } else {
                        prop_assert!(absent(&sut, k));
                    }
                }
                OpI::Iterate => {
                    let s: BTreeMap<String, i32> =
                        sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    let m: BTreeMap<String, i32> =
                        model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(s, m);
                }
                OpI::Clear => {
                    let cap = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(in_growth_orbit(sut.capacity()));
        }
    }
}

// Property: growth correctness under pure insertion. Every inserted key
// stays retrievable with its latest value across however many rehashes the
// load factor forces, and `len` counts each distinct key once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_entries(keys in proptest::collection::hash_set(any::<u64>(), 1..200)) {
        let mut sut: OpenAddressingMap<u64, u64> = OpenAddressingMap::with_capacity(DEFAULT_CAPACITY);
        for &k in &keys {
            prop_assert_eq!(sut.put(k, k.wrapping_mul(3)), None);
        }
        prop_assert_eq!(sut.len(), keys.len());
        prop_assert!(in_growth_orbit(sut.capacity()));
        for &k in &keys {
            prop_assert_eq!(sut.get(&k), Some(&k.wrapping_mul(3)));
        }
        let seen = sut.keys().count();
        prop_assert_eq!(seen, keys.len());
    }
}
