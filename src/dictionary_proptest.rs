#![cfg(test)]

// Property tests for Dictionary kept inside the crate so they can audit the
// list and slot structure after every step.

use crate::config::Config;
use crate::dictionary::{Dictionary, Handle};
use crate::hash::SlotHasher;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Upsert(usize, i32),
    Replace(usize, i32),
    Remove(usize),
    Lookup(usize),
    Mutate(usize, i32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-e]{1,4}", 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Upsert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            4 => idx.clone().prop_map(OpI::Remove),
            3 => idx.clone().prop_map(OpI::Lookup),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Every key in one slot: the whole list is a single cluster.
#[derive(Clone, Default)]
struct ConstSlot;
impl SlotHasher for ConstSlot {
    fn slot(&self, _key: &str, _slots: usize) -> usize {
        0
    }
}

// Runs one scenario against a HashMap model.
// Invariants exercised across random operation sequences:
// - lookup parity with the model; len/is_empty parity after each op.
// - overwrite keeps the entry's handle and list position.
// - remove hands back the model's value; removing absent keys changes nothing.
// - handles of removed entries never resolve again.
// - check_invariants holds after every op (contiguous clusters, slot pointers
//   on first members, consistent endpoints and links).
fn run<H: SlotHasher>(
    mut sut: Dictionary<i32, H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut live: HashMap<String, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Upsert(i, v) => {
                let k = &pool[i];
                let order_before = sut.keys_in_order();
                let h = sut.upsert(k, v).expect("valid key");
                match live.get(k) {
                    Some(&prev) => {
                        prop_assert_eq!(prev, h, "overwrite keeps the entry");
                        prop_assert_eq!(sut.keys_in_order(), order_before, "overwrite keeps order");
                    }
                    None => {
                        live.insert(k.clone(), h);
                    }
                }
                model.insert(k.clone(), v);
            }
            OpI::Replace(i, v) => {
                let k = &pool[i];
                let old = sut.replace(k, v).expect("valid key");
                prop_assert_eq!(old, model.insert(k.clone(), v));
                if old.is_none() {
                    let h = sut.lookup_entry(k).unwrap().expect("just inserted");
                    live.insert(k.clone(), h);
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let len_before = sut.len();
                let got = sut.remove(k).expect("valid key");
                prop_assert_eq!(got, model.remove(k));
                match live.remove(k) {
                    Some(h) => stale.push(h),
                    None => {
                        prop_assert_eq!(sut.len(), len_before);
                    }
                }
                prop_assert!(sut.lookup(k).unwrap().is_none());
            }
            OpI::Lookup(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.lookup(k).unwrap(), model.get(k));
                let h = sut.lookup_entry(k).unwrap();
                prop_assert_eq!(h, live.get(k).copied());
                if let Some(h) = h {
                    prop_assert_eq!(h.key(&sut), Some(k.as_str()));
                }
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(vr) = sut.lookup_mut(k).unwrap() {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(k).expect("model agrees on presence");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
            }
        }

        // Post-conditions after each op
        if let Err(msg) = sut.check_invariants() {
            return Err(TestCaseError::fail(msg));
        }
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_default_slots((pool, ops) in arb_scenario()) {
        run(Dictionary::new(), &pool, ops)?;
    }

    // Three slots for up to ten keys: clusters are long and interleave heavily.
    #[test]
    fn prop_few_slots((pool, ops) in arb_scenario()) {
        run(Dictionary::with_config(Config::new().slots(3)), &pool, ops)?;
    }

    // Worst case: one cluster holds everything.
    #[test]
    fn prop_single_cluster((pool, ops) in arb_scenario()) {
        run(Dictionary::with_hasher(ConstSlot), &pool, ops)?;
    }
}
