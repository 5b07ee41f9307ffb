//! Construction-time configuration for [`ByteHashMap`].

use crate::arena::DEFAULT_ARENA_CAPACITY;
use crate::error::Result;
use crate::hash::{fresh_seed, KeyHasher, Murmur};
use crate::map::ByteHashMap;
use crate::table::Table;
use crate::value::ValueSize;
use tracing::trace;

/// Builder for [`ByteHashMap`].
///
/// Defaults: value size 0 (a set), capacity 0 (one bucket), a fresh seed
/// per map, a 1 KiB key arena, and the seed kept across rehashes.
#[derive(Clone, Debug)]
pub struct MapBuilder<H = Murmur> {
    value_size: usize,
    capacity: usize,
    seed: Option<u64>,
    arena_capacity: usize,
    reseed_on_rehash: bool,
    hasher: H,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self {
            value_size: 0,
            capacity: 0,
            seed: None,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            reseed_on_rehash: false,
            hasher: Murmur,
        }
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> MapBuilder<H> {
    /// Value width in bytes: 0, 1, 2, 4 or 8. Validated by `build`.
    pub fn value_size(mut self, bytes: usize) -> Self {
        self.value_size = bytes;
        self
    }

    /// Expected number of entries; 0 uses the default.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Fix the hash seed instead of drawing one.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initial key arena size in bytes. Also used for the arena of each
    /// rehashed table.
    pub fn key_arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = bytes;
        self
    }

    /// Draw a new seed on every rehash instead of keeping the current one.
    pub fn reseed_on_rehash(mut self, reseed: bool) -> Self {
        self.reseed_on_rehash = reseed;
        self
    }

    pub fn hasher<H2>(self, hasher: H2) -> MapBuilder<H2> {
        MapBuilder {
            value_size: self.value_size,
            capacity: self.capacity,
            seed: self.seed,
            arena_capacity: self.arena_capacity,
            reseed_on_rehash: self.reseed_on_rehash,
            hasher,
        }
    }
}

impl<H> MapBuilder<H>
where
    H: KeyHasher,
{
    pub fn build(self) -> Result<ByteHashMap<H>> {
        // Reject the value size before allocating anything.
        let value_size = ValueSize::try_from(self.value_size)?;
        let seed = self.seed.unwrap_or_else(fresh_seed);
        let table = Table::new(value_size, self.capacity, self.arena_capacity, seed)?;
        trace!(
            value_size = self.value_size,
            buckets = table.bucket_count(),
            "created byte map"
        );
        Ok(ByteHashMap::from_parts(
            self.hasher,
            table,
            self.arena_capacity,
            self.reseed_on_rehash,
        ))
    }
}
