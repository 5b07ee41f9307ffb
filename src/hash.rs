//! Seeded byte hashing.
//!
//! [`hash_bytes`] reproduces the 64-bit `_Hash_bytes` routine shipped with
//! libstdc++ (a MurmurHash2-64A derivative). Words are read little-endian,
//! so outputs are identical across hosts and match the C++ routine on
//! little-endian machines.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

const MUL: u64 = (0xc6a4_a793_u64 << 32) + 0x5bd1_e995;

#[inline]
fn shift_mix(v: u64) -> u64 {
    v ^ (v >> 47)
}

/// Hash `bytes` with the given `seed`.
pub fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = seed ^ (bytes.len() as u64).wrapping_mul(MUL);

    let mut words = bytes.chunks_exact(8);
    for word in &mut words {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(word);
        let data = shift_mix(u64::from_le_bytes(buf).wrapping_mul(MUL)).wrapping_mul(MUL);
        hash ^= data;
        hash = hash.wrapping_mul(MUL);
    }

    let tail = words.remainder();
    if !tail.is_empty() {
        let data = tail
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        hash ^= data;
        hash = hash.wrapping_mul(MUL);
    }

    hash = shift_mix(hash).wrapping_mul(MUL);
    shift_mix(hash)
}

/// Source of key hashes for a map.
///
/// The map only relies on determinism: identical `(key, seed)` pairs must
/// hash identically for the lifetime of the map.
pub trait KeyHasher {
    fn hash_key(&self, key: &[u8], seed: u64) -> u64;
}

/// Default hasher, backed by [`hash_bytes`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Murmur;

impl KeyHasher for Murmur {
    #[inline]
    fn hash_key(&self, key: &[u8], seed: u64) -> u64 {
        hash_bytes(key, seed)
    }
}

/// Draw a per-instance seed. Not cryptographic; it only decorrelates
/// pathological key sets across maps.
pub(crate) fn fresh_seed() -> u64 {
    RandomState::new().build_hasher().finish()
}
