//! Debug-only modification stamp.
//!
//! A map bumps its stamp on every structural change (new key, delete,
//! rehash, clear). A [`crate::Cursor`] records the stamp on its first
//! advance; in debug builds, advancing after the map changed panics. In
//! release builds, both types are zero-sized and every call is a no-op.

/// Per-map mutation counter. Embed in the map and call `bump` after each
/// structural change.
#[derive(Clone, Debug, Default)]
pub(crate) struct DebugStamp {
    #[cfg(debug_assertions)]
    value: u64,
}

impl DebugStamp {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            value: 0,
        }
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.value = self.value.wrapping_add(1);
        }
    }
}

/// Stamp observed by a cursor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StampMark {
    #[cfg(debug_assertions)]
    seen: Option<u64>,
}

impl StampMark {
    /// Record the stamp on first use; afterwards, panic in debug builds if
    /// it moved.
    #[inline]
    pub(crate) fn check(&mut self, stamp: &DebugStamp) {
        #[cfg(debug_assertions)]
        {
            match self.seen {
                None => self.seen = Some(stamp.value),
                Some(seen) => assert!(
                    seen == stamp.value,
                    "map mutated while a cursor was iterating it"
                ),
            }
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = stamp;
        }
    }
}
