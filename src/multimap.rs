//! An ordered map that keeps every value inserted under a key.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, RangeBounds};
use core::slice;

use alloc::vec::Vec;

use crate::bptree::{self, BPTree};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pair::MPair;

/// An ordered multimap based on a [`BPTree`] of [`MPair`]s.
///
/// Each key is stored once, with its values in insertion order. Iteration
/// visits every value of a key before moving to the next key.
///
/// # Examples
///
/// ```
/// use bptree::MultiMap;
///
/// let mut index = MultiMap::new();
/// index.insert("Aleph", "Alpha");
/// index.insert("Beth", "Beta");
/// index.insert("Aleph", "Omega");
///
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.value_count(), 3);
/// assert_eq!(
///     index.iter().collect::<Vec<_>>(),
///     [(&"Aleph", &"Alpha"), (&"Aleph", &"Omega"), (&"Beth", &"Beta")]
/// );
/// ```
pub struct MultiMap<K, V> {
    tree: BPTree<MPair<K, V>>,
}

impl<K: Clone, V> MultiMap<K, V> {
    /// Makes a new, empty `MultiMap` with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: BPTree::merging(Config::default()).with_separator(MPair::separator),
        }
    }

    /// Makes a new, empty `MultiMap`.
    ///
    /// Internal nodes hold a copy of the key only, never the values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMinimum`] or [`Error::InvalidCapacity`] if
    /// `config` does not validate.
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            tree: BPTree::with_duplicates(config)?.with_separator(MPair::separator),
        })
    }
}

impl<K, V> MultiMap<K, V> {
    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of values across all keys.
    ///
    /// # Complexity
    ///
    /// O(n) in the number of keys.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.tree.iter().map(|pair| pair.values.len()).sum()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets a cursor over every `(key, value)`, sorted by key and then by
    /// insertion order.
    pub fn iter(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.tree.iter())
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.tree.end())
    }
}

impl<K: Ord, V> MultiMap<K, V> {
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Number of values stored under `key`.
    pub fn count(&self, key: &K) -> usize {
        self.get(key).map_or(0, <[V]>::len)
    }

    /// Returns the values under `key`, oldest first.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.tree.get(key).map(|pair| pair.values.as_slice())
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut Vec<V>> {
        self.tree.get_mut(key).map(|pair| &mut pair.values)
    }

    /// Returns a cursor at the first value of `key`, or the end cursor if
    /// `key` is absent.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(self.tree.find(key))
    }

    /// Returns a cursor at the first value of the first key not less than
    /// `key`.
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(self.tree.lower_bound(key))
    }

    /// Returns a cursor at the first value of the first key greater than
    /// `key`.
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, K, V> {
        Cursor::new(self.tree.upper_bound(key))
    }

    /// Iterates over every `(key, value)` whose key falls within `range`.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds
    /// are `Excluded`.
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
        Range {
            inner: self.tree.range::<K, R>(range),
            current: None,
        }
    }

    /// Checks the structural invariants of the underlying tree.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.tree.verify()
    }
}

impl<K: Ord + Clone, V: Clone> MultiMap<K, V> {
    /// Appends `value` to the values under `key`.
    ///
    /// Returns `true` if the key was not present before.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let fresh = !self.contains(&key);
        self.tree.insert(MPair::with_value(key, value));
        fresh
    }

    /// Removes `key` and all of its values. Returns `false` if the key is
    /// absent.
    pub fn erase(&mut self, key: &K) -> bool {
        self.tree.remove(key)
    }

    /// Removes `key` and returns its values.
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        self.tree.take(key).map(|pair| pair.values)
    }

    /// Returns the values under `key`, inserting the key with no values
    /// first if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::MultiMap;
    ///
    /// let mut tags = MultiMap::new();
    /// tags.at("rust").push("fast");
    /// tags.at("rust").push("safe");
    /// assert_eq!(tags.count(&"rust"), 2);
    /// ```
    pub fn at(&mut self, key: K) -> &mut Vec<V> {
        &mut self.tree.get_or_insert(MPair::new(key)).values
    }
}

impl<K: Clone, V: Clone> Clone for MultiMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MultiMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.tree.iter().map(|pair| (&pair.key, &pair.values))).finish()
    }
}

impl<K: Clone, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for MultiMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .tree
                .iter()
                .zip(other.tree.iter())
                .all(|(left, right)| left.key == right.key && left.values == right.values)
    }
}

impl<K: Eq, V: Eq> Eq for MultiMap<K, V> {}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for MultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MultiMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + Clone, V: Clone> Extend<(K, V)> for MultiMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a MultiMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Cursor<'a, K, V>;

    fn into_iter(self) -> Cursor<'a, K, V> {
        self.iter()
    }
}

impl<K: Ord, V> Index<&K> for MultiMap<K, V> {
    type Output = [V];

    /// Returns the values under the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `MultiMap`.
    fn index(&self, key: &K) -> &[V] {
        self.get(key).expect("no entry found for key")
    }
}

/// A two-level cursor over a [`MultiMap`]: a position in the tree plus a
/// position in that key's values.
///
/// The cursor only ever rests on an existing value or at the end; keys
/// whose value list is empty are skipped.
///
/// # Examples
///
/// ```
/// use bptree::MultiMap;
///
/// let index: MultiMap<_, _> = [(1, 'a'), (1, 'b'), (2, 'c')].into_iter().collect();
/// let mut cursor = index.iter();
/// assert_eq!(cursor.get(), Ok((&1, &'a')));
/// cursor.next_key();
/// assert_eq!(cursor.get(), Ok((&2, &'c')));
/// cursor.next_key();
/// assert!(cursor.is_end());
/// ```
pub struct Cursor<'a, K, V> {
    entry: bptree::Iter<'a, MPair<K, V>>,
    value: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    fn new(entry: bptree::Iter<'a, MPair<K, V>>) -> Self {
        let mut cursor = Self { entry, value: 0 };
        cursor.settle();
        cursor
    }

    /// Moves off exhausted value lists onto the next key that has a value.
    fn settle(&mut self) {
        while let Ok(pair) = self.entry.get()
            && self.value >= pair.values.len()
        {
            self.entry.next();
            self.value = 0;
        }
    }

    /// The `(key, value)` under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIterator`] if the cursor is past the end.
    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        let pair = self.entry.get()?;
        let value = pair.values.get(self.value).ok_or(Error::InvalidIterator)?;
        Ok((&pair.key, value))
    }

    /// Skips the remaining values of the current key.
    pub fn next_key(&mut self) {
        self.entry.next();
        self.value = 0;
        self.settle();
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.entry.is_end()
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            value: self.value,
        }
    }
}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && self.value == other.value
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get().ok()).finish()
    }
}

impl<'a, K, V> Iterator for Cursor<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let item = self.get().ok()?;
        self.value += 1;
        self.settle();
        Some(item)
    }
}

impl<K, V> FusedIterator for Cursor<'_, K, V> {}

/// An iterator over the `(key, value)` pairs of a sub-range of keys in a
/// [`MultiMap`].
pub struct Range<'a, K, V> {
    inner: bptree::Range<'a, MPair<K, V>>,
    current: Option<(&'a K, slice::Iter<'a, V>)>,
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            current: self.current.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            if let Some((key, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                return Some((*key, value));
            }
            let pair = self.inner.next()?;
            self.current = Some((&pair.key, pair.values.iter()));
        }
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}
