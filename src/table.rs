//! Bucket table: chain heads, the overflow segment pool and the key arena.
//!
//! `Table` is purely structural. It never hashes; callers pass the hash
//! computed with the table's seed. Growth policy and input validation live
//! in [`crate::ByteHashMap`].

use crate::arena::KeyArena;
use crate::error::{MapError, Result};
use crate::iter::Cursor;
use crate::segment::{Segment, SegmentId, SegmentKey, SEGMENT_CAPACITY};
use crate::value::ValueSize;
use slotmap::SlotMap;
use tracing::trace;

/// Width shared by the keys of a map, tracked so iteration can skip the
/// terminator scan.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyWidth {
    /// No key inserted yet.
    Unknown,
    /// Every key inserted so far has this many bytes.
    Fixed(usize),
    /// Keys of different widths were inserted.
    Mixed,
}

impl KeyWidth {
    /// Marker after inserting a key of `len` bytes.
    #[inline]
    pub(crate) fn observe(self, len: usize) -> KeyWidth {
        match self {
            KeyWidth::Unknown => KeyWidth::Fixed(len),
            KeyWidth::Fixed(w) if w == len => self,
            _ => KeyWidth::Mixed,
        }
    }

    /// Whether a key of `len` bytes could be present.
    #[inline]
    fn admits(self, len: usize) -> bool {
        match self {
            KeyWidth::Unknown => false,
            KeyWidth::Fixed(w) => w == len,
            KeyWidth::Mixed => true,
        }
    }
}

/// Result of a chain scan: where the key lives, or where it would be
/// appended.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Slot {
    pub(crate) bucket: usize,
    pub(crate) segment: SegmentId,
    pub(crate) pos: usize,
    pub(crate) found: bool,
}

/// Entry produced by a cursor over the table.
pub(crate) struct TableEntry<'a> {
    pub(crate) hash: u64,
    pub(crate) key: &'a [u8],
    pub(crate) value: &'a [u8],
}

/// Number of buckets backing `capacity` entries: a power of two, at least
/// one.
pub(crate) fn bucket_count_for(capacity: usize) -> Result<usize> {
    let capacity = capacity.max(SEGMENT_CAPACITY);
    capacity
        .div_ceil(SEGMENT_CAPACITY)
        .checked_next_power_of_two()
        .filter(|buckets| buckets.checked_mul(SEGMENT_CAPACITY).is_some())
        .ok_or(MapError::CapacityOverflow)
}

#[derive(Clone, Debug)]
pub(crate) struct Table {
    pub(crate) seed: u64,
    pub(crate) value_size: ValueSize,
    pub(crate) key_width: KeyWidth,
    // Live keys containing a NUL byte. Nonzero only under a fixed width.
    pub(crate) nul_keys: usize,
    len: usize,
    heads: Vec<Segment>,
    overflow: SlotMap<SegmentKey, Segment>,
    keys: KeyArena,
}

impl Table {
    pub(crate) fn new(
        value_size: ValueSize,
        capacity: usize,
        arena_capacity: usize,
        seed: u64,
    ) -> Result<Self> {
        let buckets = bucket_count_for(capacity)?;
        let mut heads = Vec::new();
        heads.try_reserve_exact(buckets)?;
        heads.resize_with(buckets, Segment::default);
        Ok(Self {
            seed,
            value_size,
            key_width: KeyWidth::Unknown,
            nul_keys: 0,
            len: 0,
            heads,
            overflow: SlotMap::with_key(),
            keys: KeyArena::with_capacity(arena_capacity)?,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len() * SEGMENT_CAPACITY
    }

    pub(crate) fn load_factor(&self) -> f64 {
        self.len as f64 / self.heads.len() as f64
    }

    pub(crate) fn arena_len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    fn width(&self) -> usize {
        self.value_size.bytes()
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash as usize) & (self.heads.len() - 1)
    }

    fn segment(&self, id: SegmentId) -> &Segment {
        match id {
            SegmentId::Head(b) => &self.heads[b],
            SegmentId::Overflow(k) => &self.overflow[k],
        }
    }

    fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        match id {
            SegmentId::Head(b) => &mut self.heads[b],
            SegmentId::Overflow(k) => &mut self.overflow[k],
        }
    }

    /// Scan the chain for `key`. On a miss, the slot names the terminal
    /// segment and its occupied length, which is where an append goes.
    pub(crate) fn find(&self, hash: u64, key: &[u8]) -> Slot {
        let bucket = self.bucket_of(hash);
        // Under a fixed width, a key of another length cannot be present.
        let comparable = self.key_width.admits(key.len());
        let mut id = SegmentId::Head(bucket);
        loop {
            let seg = self.segment(id);
            if comparable {
                for pos in 0..seg.len() {
                    if seg.hash(pos) == hash && self.keys.matches(seg.offset(pos), key) {
                        return Slot {
                            bucket,
                            segment: id,
                            pos,
                            found: true,
                        };
                    }
                }
            }
            match seg.next() {
                Some(next) => id = SegmentId::Overflow(next),
                None => {
                    return Slot {
                        bucket,
                        segment: id,
                        pos: seg.len(),
                        found: false,
                    }
                }
            }
        }
    }

    pub(crate) fn value(&self, slot: &Slot) -> &[u8] {
        self.segment(slot.segment).value(slot.pos, self.width())
    }

    pub(crate) fn value_mut(&mut self, slot: &Slot) -> &mut [u8] {
        let width = self.width();
        self.segment_mut(slot.segment).value_mut(slot.pos, width)
    }

    /// Insert a new entry at the append position named by a missed `find`.
    ///
    /// Arena space is reserved before anything else changes, so an
    /// allocation failure leaves the table as it was.
    pub(crate) fn append(&mut self, slot: Slot, hash: u64, key: &[u8], value: &[u8]) -> Result<()> {
        debug_assert!(!slot.found);
        debug_assert_eq!(value.len(), self.width());
        self.keys.try_reserve_key(key.len())?;

        let (id, pos) = if slot.pos == SEGMENT_CAPACITY {
            let next = self.overflow.insert(Segment::default());
            self.segment_mut(slot.segment).set_next(Some(next));
            trace!(bucket = slot.bucket, "linked overflow segment");
            (SegmentId::Overflow(next), 0)
        } else {
            (slot.segment, slot.pos)
        };
        debug_assert_eq!(self.segment(id).len(), pos);

        let offset = self.keys.push_key(key);
        self.segment_mut(id).push(hash, offset, value);
        self.len += 1;
        self.key_width = self.key_width.observe(key.len());
        self.nul_keys += usize::from(key.contains(&0));
        Ok(())
    }

    /// Terminal segment of a bucket's chain and its predecessor.
    fn chain_tail(&self, bucket: usize) -> (SegmentId, Option<SegmentId>) {
        let mut prev = None;
        let mut id = SegmentId::Head(bucket);
        while let Some(next) = self.segment(id).next() {
            prev = Some(id);
            id = SegmentId::Overflow(next);
        }
        (id, prev)
    }

    /// Remove the entry at a found slot by moving the chain's last entry
    /// into it. Order within the chain is not preserved.
    pub(crate) fn remove(&mut self, slot: Slot) {
        debug_assert!(slot.found);
        let width = self.width();
        let removed = self.segment(slot.segment).offset(slot.pos);
        if let KeyWidth::Fixed(w) = self.key_width {
            if self.keys.key(removed, w).contains(&0) {
                self.nul_keys -= 1;
            }
        }
        let (tail, prev) = self.chain_tail(slot.bucket);

        let Some(last) = self.segment_mut(tail).pop(width) else {
            return;
        };
        let vacated_last = slot.segment == tail && slot.pos == self.segment(tail).len();
        if !vacated_last {
            self.segment_mut(slot.segment).overwrite(slot.pos, &last, width);
        }

        if let (SegmentId::Overflow(key), Some(prev)) = (tail, prev) {
            if self.overflow[key].is_empty() {
                self.segment_mut(prev).set_next(None);
                self.overflow.remove(key);
                trace!(bucket = slot.bucket, "released empty overflow segment");
            }
        }
        self.len -= 1;
        if self.len == 0 {
            self.key_width = KeyWidth::Unknown;
        }
    }

    /// Advance `cursor` to the next live entry.
    ///
    /// Stale cursors (the table changed since they were positioned) stay
    /// memory-safe: out-of-range buckets end the walk and released
    /// overflow segments skip to the next bucket.
    pub(crate) fn advance<'a>(&'a self, cursor: &mut Cursor) -> Option<TableEntry<'a>> {
        if self.len == 0 {
            return None;
        }
        let width = self.width();
        while cursor.bucket < self.heads.len() {
            let seg = match cursor.segment {
                None => Some(&self.heads[cursor.bucket]),
                Some(k) => self.overflow.get(k),
            };
            let Some(seg) = seg else {
                cursor.next_bucket();
                continue;
            };
            if cursor.pos < seg.len() {
                let pos = cursor.pos;
                cursor.pos += 1;
                return Some(TableEntry {
                    hash: seg.hash(pos),
                    key: self.key_at(seg.offset(pos)),
                    value: seg.value(pos, width),
                });
            }
            match seg.next() {
                Some(next) => {
                    cursor.segment = Some(next);
                    cursor.pos = 0;
                }
                None => cursor.next_bucket(),
            }
        }
        None
    }

    fn key_at(&self, offset: usize) -> &[u8] {
        match self.key_width {
            KeyWidth::Fixed(w) => self.keys.key(offset, w),
            KeyWidth::Unknown | KeyWidth::Mixed => self.keys.key_until_nul(offset),
        }
    }

    /// Drop every entry while keeping the bucket table and arena capacity.
    pub(crate) fn clear(&mut self) {
        for head in &mut self.heads {
            head.reset();
        }
        self.overflow.clear();
        self.keys.clear();
        self.len = 0;
        self.key_width = KeyWidth::Unknown;
        self.nul_keys = 0;
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub(crate) fn chain_stats(&self) -> ChainStats {
        let mut stats = ChainStats {
            buckets: self.heads.len(),
            overflow_segments: self.overflow.len(),
            ..ChainStats::default()
        };
        for bucket in 0..self.heads.len() {
            let mut id = SegmentId::Head(bucket);
            let mut segments = 1;
            let mut entries = 0;
            loop {
                let seg = self.segment(id);
                entries += seg.len();
                match seg.next() {
                    Some(next) => {
                        if !seg.is_full() {
                            stats.partial_inner_segments += 1;
                        }
                        segments += 1;
                        id = SegmentId::Overflow(next);
                    }
                    None => break,
                }
            }
            stats.entries += entries;
            stats.longest_chain = stats.longest_chain.max(segments);
        }
        stats
    }
}

/// Shape of the bucket chains, for benches and invariant checks.
#[cfg(any(test, feature = "bench_internal"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub buckets: usize,
    pub overflow_segments: usize,
    /// Segments in the longest chain, head included.
    pub longest_chain: usize,
    /// Sum of segment lengths over all chains.
    pub entries: usize,
    /// Non-terminal segments that are not full. Always zero.
    pub partial_inner_segments: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(value_size: ValueSize, capacity: usize) -> Table {
        Table::new(value_size, capacity, 64, 0).unwrap()
    }

    fn insert(t: &mut Table, hash: u64, key: &[u8], value: &[u8]) {
        let slot = t.find(hash, key);
        assert!(!slot.found);
        t.append(slot, hash, key, value).unwrap();
    }

    #[test]
    fn bucket_count_is_power_of_two() {
        assert_eq!(bucket_count_for(0).unwrap(), 1);
        assert_eq!(bucket_count_for(8).unwrap(), 1);
        assert_eq!(bucket_count_for(9).unwrap(), 2);
        assert_eq!(bucket_count_for(24).unwrap(), 4);
        assert_eq!(bucket_count_for(1000).unwrap(), 128);
        assert_eq!(bucket_count_for(usize::MAX), Err(MapError::CapacityOverflow));
    }

    #[test]
    fn key_width_transitions() {
        let w = KeyWidth::Unknown.observe(4);
        assert_eq!(w, KeyWidth::Fixed(4));
        assert_eq!(w.observe(4), KeyWidth::Fixed(4));
        assert_eq!(w.observe(3), KeyWidth::Mixed);
        assert_eq!(KeyWidth::Mixed.observe(4), KeyWidth::Mixed);
        assert_eq!(KeyWidth::Unknown.observe(0), KeyWidth::Fixed(0));
    }

    /// A miss reports the terminal segment and its append position; a
    /// full terminal segment reports position == capacity.
    #[test]
    fn find_miss_reports_append_position() {
        let mut t = table(ValueSize::Zero, 8);
        for i in 0..SEGMENT_CAPACITY as u8 {
            let slot = t.find(0, &[i + 1]);
            assert_eq!((slot.segment, slot.pos, slot.found), (SegmentId::Head(0), i as usize, false));
            t.append(slot, 0, &[i + 1], &[]).unwrap();
        }
        let slot = t.find(0, b"z");
        assert_eq!(slot.pos, SEGMENT_CAPACITY);
        t.append(slot, 0, b"z", &[]).unwrap();
        let stats = t.chain_stats();
        assert_eq!(stats.overflow_segments, 1);
        assert_eq!(stats.longest_chain, 2);
        assert!(t.find(0, b"z").found);
    }

    /// Equal hashes with different bytes are a miss, not a match.
    #[test]
    fn hash_collision_without_byte_equality_is_a_miss() {
        let mut t = table(ValueSize::One, 8);
        insert(&mut t, 42, b"left", &[1]);
        insert(&mut t, 42, b"rght", &[2]);
        let l = t.find(42, b"left");
        let r = t.find(42, b"rght");
        assert!(l.found && r.found);
        assert_eq!(t.value(&l), &[1]);
        assert_eq!(t.value(&r), &[2]);
        assert!(!t.find(42, b"lef").found);
    }

    /// Removal pulls the chain's last entry forward and frees an
    /// overflow segment once it empties.
    #[test]
    fn remove_compacts_from_chain_tail() {
        let mut t = table(ValueSize::One, 8);
        for i in 0..=SEGMENT_CAPACITY as u8 {
            insert(&mut t, 7, &[b'a' + i], &[i]);
        }
        assert_eq!(t.chain_stats().overflow_segments, 1);

        let slot = t.find(7, b"c");
        t.remove(slot);
        assert_eq!(t.len(), SEGMENT_CAPACITY);
        assert_eq!(t.chain_stats().overflow_segments, 0);
        assert!(!t.find(7, b"c").found);

        // The entry that lived in the overflow segment moved into the hole.
        let moved = t.find(7, &[b'a' + SEGMENT_CAPACITY as u8]);
        assert!(moved.found);
        assert_eq!(moved.segment, SegmentId::Head(0));
        assert_eq!(t.value(&moved), &[SEGMENT_CAPACITY as u8]);
        assert_eq!(t.chain_stats().partial_inner_segments, 0);
    }

    #[test]
    fn removing_the_last_entry_leaves_the_rest() {
        let mut t = table(ValueSize::Two, 8);
        insert(&mut t, 1, b"x", &[1, 0]);
        insert(&mut t, 1, b"y", &[2, 0]);
        let slot = t.find(1, b"y");
        t.remove(slot);
        assert_eq!(t.len(), 1);
        let x = t.find(1, b"x");
        assert_eq!(t.value(&x), &[1, 0]);
    }

    #[test]
    fn advance_visits_every_entry_once() {
        let mut t = table(ValueSize::Zero, 16);
        for i in 0..40u8 {
            // Few distinct hashes force overflow chains.
            insert(&mut t, u64::from(i % 3), &[b'k', i + 1], &[]);
        }
        let mut cursor = Cursor::default();
        let mut seen = std::collections::BTreeSet::new();
        while let Some(e) = t.advance(&mut cursor) {
            assert_eq!(e.hash, u64::from((e.key[1] - 1) % 3));
            assert!(seen.insert(e.key.to_vec()));
        }
        assert_eq!(seen.len(), 40);
        assert!(t.advance(&mut cursor).is_none());
    }

    #[test]
    fn mixed_width_keys_are_recovered_by_terminator() {
        let mut t = table(ValueSize::Zero, 8);
        insert(&mut t, 1, b"a", &[]);
        insert(&mut t, 2, b"bbb", &[]);
        insert(&mut t, 3, b"", &[]);
        assert_eq!(t.key_width, KeyWidth::Mixed);
        let mut cursor = Cursor::default();
        let mut keys = Vec::new();
        while let Some(e) = t.advance(&mut cursor) {
            keys.push(e.key.to_vec());
        }
        keys.sort();
        assert_eq!(keys, vec![b"".to_vec(), b"a".to_vec(), b"bbb".to_vec()]);
    }

    /// The NUL-key count follows live keys and the width marker resets
    /// once the table empties.
    #[test]
    fn nul_key_count_tracks_removals() {
        let mut t = table(ValueSize::Zero, 8);
        insert(&mut t, 1, &[0, 9], &[]);
        insert(&mut t, 2, b"ab", &[]);
        insert(&mut t, 3, &[7, 0], &[]);
        assert_eq!(t.nul_keys, 2);

        t.remove(t.find(1, &[0, 9]));
        assert_eq!(t.nul_keys, 1);
        t.remove(t.find(2, b"ab"));
        assert_eq!(t.nul_keys, 1);
        assert_eq!(t.key_width, KeyWidth::Fixed(2));
        t.remove(t.find(3, &[7, 0]));
        assert_eq!(t.nul_keys, 0);
        assert_eq!(t.key_width, KeyWidth::Unknown);
    }

    #[test]
    fn clear_keeps_buckets_and_forgets_entries() {
        let mut t = table(ValueSize::One, 32);
        for i in 0..20u8 {
            insert(&mut t, 0, &[i + 1], &[i]);
        }
        t.clear();
        assert_eq!(t.len(), 0);
        assert_eq!(t.bucket_count(), 4);
        assert_eq!(t.arena_len(), 0);
        assert_eq!(t.key_width, KeyWidth::Unknown);
        assert_eq!(t.chain_stats().overflow_segments, 0);
        assert!(t.advance(&mut Cursor::default()).is_none());
    }
}
