//! An ordered map with one value per key.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, RangeBounds};

use crate::bptree::{self, BPTree};
use crate::config::Config;
use crate::error::Result;
use crate::pair::Pair;

/// An ordered map based on a [`BPTree`] of [`Pair`]s.
///
/// Inserting a key that is already present overwrites its value; the tree
/// never holds two entries for one key.
///
/// # Examples
///
/// ```
/// use bptree::Map;
///
/// let mut index = Map::new();
/// index.insert("Aleph", "Alpha");
/// index.insert("Beth", "Beta");
/// index.insert("Aleph", "Omega");
///
/// assert_eq!(index.len(), 2);
/// assert_eq!(index[&"Aleph"], "Omega");
/// assert_eq!(index.lower_bound(&"B").get(), Ok((&"Beth", &"Beta")));
/// ```
pub struct Map<K, V> {
    tree: BPTree<Pair<K, V>>,
}

impl<K, V> Map<K, V> {
    /// Makes a new, empty `Map` with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: BPTree::merging(Config::default()),
        }
    }

    /// Makes a new, empty `Map`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMinimum`](crate::Error::InvalidMinimum) or
    /// [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) if `config`
    /// does not validate.
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            tree: BPTree::with_duplicates(config)?,
        })
    }

    /// Returns the number of keys in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Iter<'_, K, V> {
        Iter { inner: self.tree.end() }
    }
}

impl<K: Ord, V> Map<K, V> {
    /// Returns `true` if the map contains a value for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Number of values stored under `key`: 0 or 1.
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.contains(key))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|pair| &pair.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key).map(|pair| &mut pair.value)
    }

    /// Returns a cursor at `key`, or the end cursor if it is absent.
    pub fn find(&self, key: &K) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.find(key),
        }
    }

    /// Returns a cursor at the first key not less than `key`.
    pub fn lower_bound(&self, key: &K) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.lower_bound(key),
        }
    }

    /// Returns a cursor at the first key greater than `key`.
    pub fn upper_bound(&self, key: &K) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.upper_bound(key),
        }
    }

    /// Iterates over the entries whose keys fall within `range`.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds
    /// are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::Map;
    ///
    /// let map: Map<_, _> = [(1, 'a'), (3, 'c'), (5, 'e'), (7, 'g')].into_iter().collect();
    /// let inner: Vec<_> = map.range(2..=5).map(|(key, value)| (*key, *value)).collect();
    /// assert_eq!(inner, [(3, 'c'), (5, 'e')]);
    /// ```
    pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
        Range {
            inner: self.tree.range::<K, R>(range),
        }
    }

    /// Checks the structural invariants of the underlying tree.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.tree.verify()
    }
}

impl<K: Ord + Clone, V: Clone> Map<K, V> {
    /// Inserts `value` under `key`, overwriting any previous value.
    ///
    /// Returns `true` if the key was not present before.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let fresh = !self.contains(&key);
        self.tree.insert(Pair::new(key, value));
        fresh
    }

    /// Removes `key` and its value. Returns `false` if the key is absent.
    pub fn erase(&mut self, key: &K) -> bool {
        self.tree.remove(key)
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.take(key).map(|pair| pair.value)
    }

    /// Returns the value under `key`, inserting `V::default()` first if the
    /// key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::Map;
    ///
    /// let mut hits: Map<&str, u32> = Map::new();
    /// *hits.at("home") += 1;
    /// *hits.at("home") += 1;
    /// assert_eq!(hits.get(&"home"), Some(&2));
    /// ```
    pub fn at(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        &mut self.tree.get_or_insert(Pair::new(key, V::default())).value
    }
}

impl<K: Clone, V: Clone> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for Map<K, V> {}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + Clone, V: Clone> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Ord, V> Index<&K> for Map<K, V> {
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `Map`.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

/// A cursor over the entries of a [`Map`], sorted by key.
pub struct Iter<'a, K, V> {
    inner: bptree::Iter<'a, Pair<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// The entry under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIterator`](crate::Error::InvalidIterator) if
    /// the cursor is past the end.
    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        self.inner.get().map(|pair| (&pair.key, &pair.value))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V> Eq for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.get().ok()).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|pair| (&pair.key, &pair.value))
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An iterator over a sub-range of entries in a [`Map`].
pub struct Range<'a, K, V> {
    inner: bptree::Range<'a, Pair<K, V>>,
}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|pair| (&pair.key, &pair.value))
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}
