//! Error types for contract violations on the tree and its adapters.
//!
//! Expected outcomes such as "key not present" are reported by the
//! operations themselves (a `bool` or an `Option`). An [`Error`] means the
//! caller broke a precondition: it asked for an element that cannot exist,
//! or supplied a configuration the tree cannot honour.

use thiserror::Error;

/// Errors surfaced by [`BPTree`](crate::BPTree), [`Map`](crate::Map) and
/// [`MultiMap`](crate::MultiMap).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An element was requested from a tree that holds none.
    #[error("precondition violated: the tree is empty")]
    EmptyTree,

    /// A cursor positioned at the end was dereferenced.
    #[error("precondition violated: invalid iterator (dereferenced past the end)")]
    InvalidIterator,

    /// The node minimum must allow at least one entry per node, and twice
    /// it plus two must fit in a `usize`.
    #[error("invalid configuration: node minimum must be between 1 and {max}, got {min}", max = crate::Config::MAX_MIN)]
    InvalidMinimum {
        /// The rejected minimum.
        min: usize,
    },

    /// The capacity hint asks for more nodes than a tree can address.
    #[error("invalid configuration: node capacity must be at most {max}, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity hint.
        capacity: usize,
        /// The largest accepted hint.
        max: usize,
    },
}

/// A `Result` alias using this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
