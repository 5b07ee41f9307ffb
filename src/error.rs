//! Error types for the `byte-hashmap` crate

use std::collections::TryReserveError;

/// Errors returned by map construction and mutation.
///
/// A lookup or delete that misses is not an error; those report `false` or
/// `None` instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    /// The requested value size is not one of 0, 1, 2, 4 or 8 bytes.
    ///
    /// Checked before anything is allocated.
    #[error("unsupported value size of {0} bytes (expected 0, 1, 2, 4 or 8)")]
    InvalidValueSize(usize),

    /// A value was supplied whose width differs from the map's declared
    /// value size. Sets (value size 0) take no value at all.
    #[error("value of {found} bytes does not match the map's value size of {expected} bytes")]
    ValueWidth {
        /// Declared value size of the map.
        expected: usize,
        /// Width of the value passed in.
        found: usize,
    },

    /// A key containing a NUL byte was inserted while keys of differing
    /// widths are (or would become) present.
    ///
    /// Once widths vary, key lengths are recovered from NUL terminators in
    /// the key arena, so embedded NULs are only allowed while every key
    /// has the same width.
    #[error("keys with embedded NUL bytes require every key in the map to have the same width")]
    NulInVariableWidthKey,

    /// The requested capacity does not fit in a power-of-two bucket table.
    #[error("requested capacity overflows the bucket table")]
    CapacityOverflow,

    /// The allocator could not grow the bucket table or the key arena.
    ///
    /// The map is left exactly as it was before the failing call.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}

/// Result alias for fallible map operations.
pub type Result<T> = core::result::Result<T, MapError>;
