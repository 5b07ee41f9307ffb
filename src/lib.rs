//! byte-hashmap: an embeddable, single-threaded hash map keyed by byte
//! strings, with fixed-width inline values and a self-managing key arena.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable map for byte keys where values are at most
//!   one machine word, and where a width of zero gives a set.
//! - Layers:
//!   - KeyArena: append-only byte buffer holding NUL-terminated copies of
//!     every inserted key; entries refer to keys by offset.
//!   - Segment: fixed-capacity (8) block of entries (hash, key offset,
//!     inline value bytes) with an optional link to an overflow segment.
//!   - Table: power-of-two array of chain heads plus a slotmap pool of
//!     overflow segments; structural find/append/remove/advance only.
//!   - ByteHashMap: public API; validates inputs, owns the hasher and the
//!     seed, and decides when to rehash.
//!
//! Constraints
//! - Single-threaded: mutation takes `&mut self`; there is no internal
//!   synchronization.
//! - Value sizes are 0, 1, 2, 4 or 8 bytes, fixed at construction. Values
//!   travel as the tagged [`Value`] enum and are checked against the
//!   declared [`ValueSize`].
//! - Keys are copied into the arena; callers keep their buffers.
//! - Arena bytes of deleted keys are reclaimed only by a rehash or clear.
//!
//! Lookup
//! - A key's bucket is `hash(key, seed) & (buckets - 1)`. A chain scan
//!   compares stored hashes first, then the key bytes and terminator. A
//!   miss returns the terminal segment and its length, so `set` appends
//!   without scanning twice.
//! - Deletion moves the chain's last entry into the hole; every segment
//!   but the last in a chain is full, and emptied overflow segments are
//!   released.
//!
//! Growth
//! - Before an insertion, if `len / buckets > 6.5`, the table is rebuilt at
//!   double capacity by iterating the old one. The seed is kept unless
//!   [`MapBuilder::reseed_on_rehash`] is set; a kept seed lets stored hashes
//!   be reused. Allocation failures surface as [`MapError::Alloc`] and
//!   leave the map untouched.
//!
//! Key widths
//! - [`KeyWidth`] records whether all keys share one width. While they do,
//!   iteration slices keys by that width and keys may contain NUL bytes
//!   (binary integer keys). Once widths vary, key lengths come from NUL
//!   terminators and NUL-containing keys are refused.
//!
//! Iteration
//! - [`Cursor`] is a resumable position (bucket, segment, slot) advanced by
//!   [`ByteHashMap::advance`]. It does not borrow the map; mutating between
//!   advances is out of contract and panics in debug builds.
//! - [`ByteHashMap::iter`] wraps a cursor as a borrow-checked iterator.
//!
//! Hashing
//! - The default [`Murmur`] hasher is [`hash::hash_bytes`], bit-compatible
//!   with libstdc++'s 64-bit `_Hash_bytes`. Any [`KeyHasher`] can be
//!   plugged in.

mod arena;
mod builder;
mod error;
pub mod hash;
mod iter;
mod map;
mod map_proptest;
mod segment;
mod stamp;
mod table;
mod value;

// Public surface
pub use builder::MapBuilder;
pub use error::{MapError, Result};
pub use hash::{KeyHasher, Murmur};
pub use iter::{Cursor, Entry, Iter};
pub use map::{ByteHashMap, MAX_LOAD_FACTOR};
pub use table::KeyWidth;
pub use value::{Value, ValueSize};

#[cfg(feature = "bench_internal")]
pub use table::ChainStats;
