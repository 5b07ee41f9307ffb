//! ByteHashMap: public map over a [`Table`], with input validation, growth
//! policy and the hasher.

use crate::builder::MapBuilder;
use crate::error::{MapError, Result};
use crate::hash::{fresh_seed, KeyHasher, Murmur};
use crate::iter::{Cursor, Entry, Iter};
use crate::segment::SEGMENT_CAPACITY;
use crate::stamp::DebugStamp;
use crate::table::{bucket_count_for, KeyWidth, Table};
use crate::value::{Value, ValueSize};
use core::fmt;
use tracing::debug;

/// Load factor (entries per bucket) above which the next `set` rehashes.
pub const MAX_LOAD_FACTOR: f64 = 6.5;

/// Byte-keyed hash map with fixed-width values.
///
/// Keys are arbitrary byte strings, copied into the map. Values are 0, 1,
/// 2, 4 or 8 bytes wide, declared once at construction; a width of 0 makes
/// the map a set.
#[derive(Clone)]
pub struct ByteHashMap<H = Murmur> {
    hasher: H,
    table: Table,
    arena_capacity: usize,
    reseed_on_rehash: bool,
    stamp: DebugStamp,
}

impl ByteHashMap {
    /// Map for values of `value_size` bytes, sized for `capacity` entries
    /// (0 picks the default of one bucket).
    pub fn new(value_size: usize, capacity: usize) -> Result<Self> {
        MapBuilder::new()
            .value_size(value_size)
            .capacity(capacity)
            .build()
    }

    pub fn builder() -> MapBuilder {
        MapBuilder::new()
    }
}

impl<H> ByteHashMap<H>
where
    H: KeyHasher,
{
    pub fn with_hasher(value_size: usize, capacity: usize, hasher: H) -> Result<Self> {
        MapBuilder::new()
            .value_size(value_size)
            .capacity(capacity)
            .hasher(hasher)
            .build()
    }

    pub(crate) fn from_parts(
        hasher: H,
        table: Table,
        arena_capacity: usize,
        reseed_on_rehash: bool,
    ) -> Self {
        Self {
            hasher,
            table,
            arena_capacity,
            reseed_on_rehash,
            stamp: DebugStamp::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Bucket count times the per-segment capacity.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    pub fn value_size(&self) -> ValueSize {
        self.table.value_size
    }

    pub fn key_width(&self) -> KeyWidth {
        self.table.key_width
    }

    pub fn seed(&self) -> u64 {
        self.table.seed
    }

    /// Bytes held by the key arena, including keys of deleted entries.
    pub fn arena_len(&self) -> usize {
        self.table.arena_len()
    }

    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        self.hasher.hash_key(key, self.table.seed)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.table.find(self.hash(key), key).found
    }

    /// Stored value bytes for `key`; empty for sets.
    pub fn at(&self, key: &[u8]) -> Option<&[u8]> {
        let slot = self.table.find(self.hash(key), key);
        slot.found.then(|| self.table.value(&slot))
    }

    /// Mutable value bytes for `key`, for in-place updates such as
    /// counters.
    pub fn at_mut(&mut self, key: &[u8]) -> Option<&mut [u8]> {
        let slot = self.table.find(self.hash(key), key);
        if !slot.found {
            return None;
        }
        Some(self.table.value_mut(&slot))
    }

    /// Copy the value stored for `key` into the front of `dest`. Returns
    /// whether the key was found; nothing is copied for sets.
    ///
    /// # Panics
    ///
    /// If `dest` is shorter than the value size, whether or not the key is
    /// present.
    pub fn get(&self, key: &[u8], dest: &mut [u8]) -> bool {
        let width = self.table.value_size.bytes();
        assert!(
            dest.len() >= width,
            "destination of {} bytes cannot hold a value of {} bytes",
            dest.len(),
            width
        );
        match self.at(key) {
            Some(value) => {
                dest[..width].copy_from_slice(value);
                true
            }
            None => false,
        }
    }

    /// Typed value for `key`. Always `None` for sets; use
    /// [`ByteHashMap::contains_key`] there.
    pub fn get_value(&self, key: &[u8]) -> Option<Value> {
        self.at(key)
            .and_then(|bytes| Value::decode(self.table.value_size, bytes))
    }

    /// Insert `key` or overwrite its value.
    ///
    /// `value` must match the declared value size: `None` for sets,
    /// `Some` of the matching [`Value`] variant otherwise. On error the map
    /// is unchanged.
    pub fn set(&mut self, key: &[u8], value: Option<Value>) -> Result<()> {
        let encoded = self.encode(value)?;
        self.check_key(key)?;

        if self.table.load_factor() > MAX_LOAD_FACTOR {
            let capacity = self
                .table
                .capacity()
                .checked_mul(2)
                .ok_or(MapError::CapacityOverflow)?;
            self.rehash(capacity)?;
        }

        let hash = self.hash(key);
        let slot = self.table.find(hash, key);
        let width = self.table.value_size.bytes();
        if slot.found {
            self.table
                .value_mut(&slot)
                .copy_from_slice(&encoded[..width]);
            return Ok(());
        }
        self.table.append(slot, hash, key, &encoded[..width])?;
        self.stamp.bump();
        Ok(())
    }

    /// Remove `key`. Returns whether it was present. The key's arena bytes
    /// are kept until the next rehash or clear.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        let slot = self.table.find(self.hash(key), key);
        if !slot.found {
            return false;
        }
        self.table.remove(slot);
        self.stamp.bump();
        true
    }

    /// Grow so that `additional` more keys can be inserted without a
    /// rehash.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let wanted = self
            .len()
            .checked_add(additional)
            .ok_or(MapError::CapacityOverflow)?;
        let min_buckets = (wanted as f64 / MAX_LOAD_FACTOR).ceil() as usize;
        let capacity = min_buckets
            .checked_mul(SEGMENT_CAPACITY)
            .ok_or(MapError::CapacityOverflow)?;
        let buckets = bucket_count_for(capacity)?;
        if buckets > self.table.bucket_count() {
            self.rehash(buckets * SEGMENT_CAPACITY)?;
        }
        Ok(())
    }

    /// Remove every entry, keeping the bucket table and arena allocation.
    pub fn clear(&mut self) {
        self.table.clear();
        self.stamp.bump();
    }

    /// Move `cursor` to the next entry and return it, or `None` once every
    /// bucket has been visited.
    pub fn advance<'a>(&'a self, cursor: &mut Cursor) -> Option<Entry<'a>> {
        cursor.mark.check(&self.stamp);
        self.table.advance(cursor).map(|e| Entry {
            key: e.key,
            value: e.value,
        })
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: &self.table,
            cursor: Cursor::default(),
            remaining: self.table.len(),
        }
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn chain_stats(&self) -> crate::table::ChainStats {
        self.table.chain_stats()
    }

    fn encode(&self, value: Option<Value>) -> Result<[u8; ValueSize::MAX_BYTES]> {
        let expected = self.table.value_size;
        let found = value.map_or(ValueSize::Zero, Value::size);
        if found != expected {
            return Err(MapError::ValueWidth {
                expected: expected.bytes(),
                found: found.bytes(),
            });
        }
        Ok(value.map_or([0; ValueSize::MAX_BYTES], Value::encode))
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        let uniform = self.table.key_width.observe(key.len()) != KeyWidth::Mixed;
        if !uniform && (self.table.nul_keys > 0 || key.contains(&0)) {
            return Err(MapError::NulInVariableWidthKey);
        }
        Ok(())
    }

    /// Rebuild into a table sized for `capacity`, re-inserting every live
    /// entry. The current table is untouched if allocation fails.
    fn rehash(&mut self, capacity: usize) -> Result<()> {
        let old_capacity = self.table.capacity();
        let seed = if self.reseed_on_rehash {
            fresh_seed()
        } else {
            self.table.seed
        };
        let reuse_hashes = seed == self.table.seed;

        let mut next = Table::new(self.table.value_size, capacity, self.arena_capacity, seed)?;
        let mut cursor = Cursor::default();
        while let Some(entry) = self.table.advance(&mut cursor) {
            let hash = if reuse_hashes {
                entry.hash
            } else {
                self.hasher.hash_key(entry.key, seed)
            };
            let slot = next.find(hash, entry.key);
            next.append(slot, hash, entry.key, entry.value)?;
        }
        debug_assert_eq!(next.len(), self.table.len());

        self.table = next;
        self.stamp.bump();
        debug!(
            from = old_capacity,
            to = capacity,
            len = self.table.len(),
            reseeded = !reuse_hashes,
            "rehashed byte map"
        );
        Ok(())
    }
}

impl<H> fmt::Debug for ByteHashMap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteHashMap")
            .field("len", &self.table.len())
            .field("capacity", &self.table.capacity())
            .field("value_size", &self.table.value_size)
            .field("key_width", &self.table.key_width)
            .finish_non_exhaustive()
    }
}

impl<'a, H> IntoIterator for &'a ByteHashMap<H>
where
    H: KeyHasher,
{
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
