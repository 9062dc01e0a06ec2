//! An in-memory B+Tree with linked leaves, plus ordered map adapters.
//!
//! This crate provides [`BPTree`], an ordered set whose entries live only in
//! the leaves of a B+Tree, and two adapters built on it:
//!
//! - [`Map`] - one value per key; inserting an existing key overwrites it
//! - [`MultiMap`] - many values per key, kept in insertion order
//!
//! All three expose cursor-style navigation (`find`, `lower_bound`,
//! `upper_bound`) alongside ordinary Rust iterators and ranges.
//!
//! # Example
//!
//! ```
//! use bptree::{Map, MultiMap};
//!
//! let mut index = Map::new();
//! index.insert("Aleph", "Alpha");
//! index.insert("Aleph", "Omega");
//! assert_eq!(index.len(), 1);
//! assert_eq!(index[&"Aleph"], "Omega");
//!
//! let mut tags = MultiMap::new();
//! tags.insert("Aleph", "Alpha");
//! tags.insert("Aleph", "Beta");
//! assert_eq!(tags.count(&"Aleph"), 2);
//! assert_eq!(tags.get(&"Aleph"), Some(&["Alpha", "Beta"][..]));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Linked leaves** - Iteration steps along the leaf chain without revisiting internal nodes
//! - **Configurable fan-out** - Node minimum set per tree through [`Config`]
//! - **Self-checking** - [`BPTree::verify`] walks every structural invariant for tests
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index, so the leaf
//! chain is a plain non-owning index. Insertion and removal are "loose": a
//! child may briefly hold one entry too many (or too few) and is repaired by
//! its parent on the way back up the recursion.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod config;
mod error;
mod pair;
mod raw;

pub mod bptree;
pub mod map;
pub mod multimap;

pub use bptree::BPTree;
pub use config::Config;
pub use error::{Error, Result};
pub use map::Map;
pub use multimap::MultiMap;
pub use pair::{MPair, Mergeable, Pair};
