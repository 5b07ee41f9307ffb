#![cfg(test)]

// Property tests for ByteHashMap kept inside the crate so they can check
// chain invariants through `chain_stats` without feature gates.

use crate::hash::KeyHasher;
use crate::map::ByteHashMap;
use crate::{Cursor, Value};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, u32),
    Delete(usize),
    Get(usize),
    Contains(Vec<u8>),
    Bump(usize),
    Iterate,
    Reserve(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}".prop_map(String::into_bytes), 1..=12).prop_flat_map(
        |pool| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let contains_pool = proptest::sample::select(pool.clone());
            let op = prop_oneof![
                (idx.clone(), any::<u32>()).prop_map(|(i, v)| OpI::Set(i, v)),
                idx.clone().prop_map(OpI::Delete),
                idx.clone().prop_map(OpI::Get),
                prop_oneof![
                    contains_pool,
                    "[a-z]{0,5}".prop_map(String::into_bytes)
                ]
                .prop_map(OpI::Contains),
                idx.clone().prop_map(OpI::Bump),
                Just(OpI::Iterate),
                (0usize..64).prop_map(OpI::Reserve),
            ];
            proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
        },
    )
}

// Run one scenario against a std HashMap model.
// Invariants exercised after every op:
// - `get_value` returns the most recent value set for a key.
// - `len` equals the model size and the sum of chain lengths.
// - Non-terminal segments are always full.
// - A cursor visits each live key exactly once, with its current value.
fn run_state_machine<H: KeyHasher>(
    mut sut: ByteHashMap<H>,
    pool: &[Vec<u8>],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Vec<u8>, u32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                sut.set(&pool[i], Some(Value::U32(v))).unwrap();
                model.insert(pool[i].clone(), v);
            }
            OpI::Delete(i) => {
                let removed = sut.delete(&pool[i]);
                prop_assert_eq!(removed, model.remove(&pool[i]).is_some());
            }
            OpI::Get(i) => {
                let got = sut.get_value(&pool[i]);
                prop_assert_eq!(got, model.get(&pool[i]).copied().map(Value::U32));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            OpI::Bump(i) => {
                if let Some(bytes) = sut.at_mut(&pool[i]) {
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(bytes);
                    let next = u32::from_ne_bytes(raw).wrapping_add(1);
                    bytes.copy_from_slice(&next.to_ne_bytes());
                    let mv = model.get_mut(&pool[i]).expect("model has key");
                    *mv = mv.wrapping_add(1);
                } else {
                    prop_assert!(!model.contains_key(&pool[i]));
                }
            }
            OpI::Iterate => {
                let mut cursor = Cursor::default();
                let mut seen = BTreeSet::new();
                while let Some(e) = sut.advance(&mut cursor) {
                    prop_assert!(seen.insert(e.key.to_vec()), "key yielded twice");
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(e.value);
                    prop_assert_eq!(Some(&u32::from_ne_bytes(raw)), model.get(e.key));
                }
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(seen, m_keys);
            }
            OpI::Reserve(n) => {
                sut.reserve(n).unwrap();
            }
        }

        let stats = sut.chain_stats();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(stats.entries, model.len());
        prop_assert_eq!(stats.partial_inner_segments, 0);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = ByteHashMap::builder().value_size(4).build().unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Hasher that maps every key to the same few hashes, so chains overflow
// and deletes must compact across segments.
#[derive(Clone, Default)]
struct FewHashes;
impl KeyHasher for FewHashes {
    fn hash_key(&self, key: &[u8], _seed: u64) -> u64 {
        key.len() as u64 % 2
    }
}

// Property: Same state-machine invariants as above, under heavy collision
// behavior. This stresses equality probing and tail compaction.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ByteHashMap::with_hasher(4, 0, FewHashes).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: binary fixed-width keys (which often contain NUL bytes) behave
// like any other key as long as every key has the same width.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_fixed_width_binary_keys(keys in proptest::collection::vec(0u32..512, 1..200)) {
        let mut sut = ByteHashMap::new(8, 0).unwrap();
        let mut model: HashMap<u32, u64> = HashMap::new();
        for (i, k) in keys.iter().enumerate() {
            sut.set(&k.to_le_bytes(), Some(Value::U64(i as u64))).unwrap();
            model.insert(*k, i as u64);
        }
        prop_assert_eq!(sut.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(sut.get_value(&k.to_le_bytes()), Some(Value::U64(*v)));
        }
        for (k, _) in sut.iter() {
            prop_assert_eq!(k.len(), 4);
        }
    }
}
