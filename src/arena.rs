//! Append-only key storage.
//!
//! Every inserted key is copied here followed by a NUL byte; bucket
//! entries refer to keys by their starting offset. Bytes are never
//! reclaimed while the arena lives: deleting an entry only drops the
//! offset held by its segment.

use std::collections::TryReserveError;

/// Initial arena capacity when none is configured.
pub(crate) const DEFAULT_ARENA_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub(crate) struct KeyArena {
    bytes: Vec<u8>,
}

impl KeyArena {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity)?;
        Ok(Self { bytes })
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Ensure a key of `key_len` bytes and its terminator fit, doubling the
    /// capacity until they do. Leaves the arena untouched on failure.
    pub(crate) fn try_reserve_key(&mut self, key_len: usize) -> Result<(), TryReserveError> {
        let needed = self.bytes.len().saturating_add(key_len).saturating_add(1);
        let current = self.bytes.capacity();
        if needed <= current {
            return Ok(());
        }
        let mut target = current.max(1);
        while target < needed {
            target = target.saturating_mul(2);
        }
        self.bytes.try_reserve_exact(target - self.bytes.len())
    }

    /// Append `key` plus a NUL terminator and return its offset.
    ///
    /// Callers reserve first via [`KeyArena::try_reserve_key`].
    pub(crate) fn push_key(&mut self, key: &[u8]) -> usize {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(key);
        self.bytes.push(0);
        offset
    }

    /// Byte-exact comparison against the key stored at `offset`: same bytes
    /// and a terminator right after them.
    pub(crate) fn matches(&self, offset: usize, key: &[u8]) -> bool {
        let end = offset + key.len();
        self.bytes.get(offset..end) == Some(key) && self.bytes.get(end) == Some(&0)
    }

    /// Key of known width stored at `offset`.
    pub(crate) fn key(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    /// Key stored at `offset`, delimited by its NUL terminator.
    pub(crate) fn key_until_nul(&self, offset: usize) -> &[u8] {
        let tail = &self.bytes[offset..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..end]
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }
}
