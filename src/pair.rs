//! Entry types stored by [`Map`](crate::Map) and [`MultiMap`](crate::MultiMap).
//!
//! Both compare by key alone, so a tree of pairs orders, finds and removes
//! entries by key while carrying the value along.

use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec;
use alloc::vec::Vec;

/// Combines an incoming entry into an equal one already stored.
///
/// A [`BPTree`](crate::BPTree) built with
/// [`with_duplicates`](crate::BPTree::with_duplicates) calls this instead of
/// rejecting an insert whose key is already present.
///
/// # Examples
///
/// ```
/// use bptree::{BPTree, Config, Mergeable};
///
/// #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// struct Tally(u32);
///
/// impl Mergeable for Tally {
///     fn merge(&mut self, _other: Self) {}
/// }
///
/// let mut tree = BPTree::with_duplicates(Config::default()).unwrap();
/// assert!(tree.insert(Tally(1)));
/// assert!(tree.insert(Tally(1)));
/// assert_eq!(tree.len(), 1);
/// ```
pub trait Mergeable {
    /// Folds `other`, which compares equal to `self`, into `self`.
    fn merge(&mut self, other: Self);
}

/// A key and a single value; inserting an existing key overwrites the value.
#[derive(Clone, Debug, Default)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> From<(K, V)> for Pair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

impl<K, V> Mergeable for Pair<K, V> {
    fn merge(&mut self, other: Self) {
        self.value = other.value;
    }
}

/// A key and every value inserted under it, oldest first.
#[derive(Clone, Debug, Default)]
pub struct MPair<K, V> {
    pub key: K,
    pub values: Vec<V>,
}

impl<K, V> MPair<K, V> {
    /// A key with no values yet.
    pub fn new(key: K) -> Self {
        Self { key, values: Vec::new() }
    }

    pub fn with_value(key: K, value: V) -> Self {
        Self {
            key,
            values: vec![value],
        }
    }
}

impl<K: Clone, V> MPair<K, V> {
    /// The key alone, for internal nodes that only route by key.
    pub(crate) fn separator(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<K, V> Mergeable for MPair<K, V> {
    fn merge(&mut self, mut other: Self) {
        self.values.append(&mut other.values);
    }
}

macro_rules! order_by_key {
    ($pair:ident) => {
        impl<K: PartialEq, V> PartialEq for $pair<K, V> {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key
            }
        }

        impl<K: Eq, V> Eq for $pair<K, V> {}

        impl<K: Ord, V> PartialOrd for $pair<K, V> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<K: Ord, V> Ord for $pair<K, V> {
            fn cmp(&self, other: &Self) -> Ordering {
                self.key.cmp(&other.key)
            }
        }

        impl<K, V> Borrow<K> for $pair<K, V> {
            fn borrow(&self) -> &K {
                &self.key
            }
        }
    };
}

order_by_key!(Pair);
order_by_key!(MPair);
