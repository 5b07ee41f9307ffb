//! Iteration over live entries.

use crate::segment::SegmentKey;
use crate::stamp::StampMark;
use crate::table::Table;
use core::iter::FusedIterator;

/// Resumable position in a map, advanced with [`crate::ByteHashMap::advance`].
///
/// Start from `Cursor::default()`. A cursor holds no borrow of the map, so
/// the map may be mutated between advances; doing so is out of contract
/// (entries may be skipped or repeated) and panics in debug builds.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    pub(crate) bucket: usize,
    // `None` while on the bucket's head segment.
    pub(crate) segment: Option<SegmentKey>,
    pub(crate) pos: usize,
    pub(crate) mark: StampMark,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn next_bucket(&mut self) {
        self.bucket += 1;
        self.segment = None;
        self.pos = 0;
    }
}

/// One entry produced by a cursor.
///
/// `value` is empty for sets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Entry<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
}

/// Iterator over `(key, value)` byte slices of a map.
pub struct Iter<'a> {
    pub(crate) table: &'a Table,
    pub(crate) cursor: Cursor,
    pub(crate) remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.table.advance(&mut self.cursor)?;
        self.remaining -= 1;
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
