//! Fixed-capacity entry segments that make up a bucket chain.

use crate::value::ValueSize;

/// Entries per segment.
pub(crate) const SEGMENT_CAPACITY: usize = 8;

slotmap::new_key_type! {
    /// Key of an overflow segment in the map's segment pool.
    pub(crate) struct SegmentKey;
}

/// Location of a segment: a bucket head in the table, or an overflow
/// segment in the pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SegmentId {
    Head(usize),
    Overflow(SegmentKey),
}

/// Copy of one entry, used to move the chain's last entry into a hole.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RawEntry {
    pub(crate) hash: u64,
    pub(crate) offset: usize,
    pub(crate) value: [u8; ValueSize::MAX_BYTES],
}

#[derive(Clone, Debug)]
pub(crate) struct Segment {
    hashes: [u64; SEGMENT_CAPACITY],
    offsets: [usize; SEGMENT_CAPACITY],
    // Flat value storage; entry `i` occupies `[i * width, (i + 1) * width)`.
    values: [u8; SEGMENT_CAPACITY * ValueSize::MAX_BYTES],
    len: usize,
    next: Option<SegmentKey>,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            hashes: [0; SEGMENT_CAPACITY],
            offsets: [0; SEGMENT_CAPACITY],
            values: [0; SEGMENT_CAPACITY * ValueSize::MAX_BYTES],
            len: 0,
            next: None,
        }
    }
}

impl Segment {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == SEGMENT_CAPACITY
    }

    #[inline]
    pub(crate) fn next(&self) -> Option<SegmentKey> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<SegmentKey>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn hash(&self, pos: usize) -> u64 {
        self.hashes[pos]
    }

    #[inline]
    pub(crate) fn offset(&self, pos: usize) -> usize {
        self.offsets[pos]
    }

    #[inline]
    pub(crate) fn value(&self, pos: usize, width: usize) -> &[u8] {
        &self.values[pos * width..(pos + 1) * width]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, pos: usize, width: usize) -> &mut [u8] {
        &mut self.values[pos * width..(pos + 1) * width]
    }

    /// Append an entry; `value` must be exactly `width` bytes.
    pub(crate) fn push(&mut self, hash: u64, offset: usize, value: &[u8]) {
        debug_assert!(!self.is_full());
        let pos = self.len;
        self.hashes[pos] = hash;
        self.offsets[pos] = offset;
        self.value_mut(pos, value.len()).copy_from_slice(value);
        self.len += 1;
    }

    /// Remove and return the last entry.
    pub(crate) fn pop(&mut self, width: usize) -> Option<RawEntry> {
        let pos = self.len.checked_sub(1)?;
        let mut value = [0u8; ValueSize::MAX_BYTES];
        value[..width].copy_from_slice(self.value(pos, width));
        self.len = pos;
        Some(RawEntry {
            hash: self.hashes[pos],
            offset: self.offsets[pos],
            value,
        })
    }

    /// Overwrite the live entry at `pos`.
    pub(crate) fn overwrite(&mut self, pos: usize, entry: &RawEntry, width: usize) {
        debug_assert!(pos < self.len);
        self.hashes[pos] = entry.hash;
        self.offsets[pos] = entry.offset;
        self.value_mut(pos, width)
            .copy_from_slice(&entry.value[..width]);
    }

    /// Forget all entries and the overflow link.
    pub(crate) fn reset(&mut self) {
        self.len = 0;
        self.next = None;
    }
}
