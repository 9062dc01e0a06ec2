use core::borrow::Borrow;
use core::fmt;
use core::ops::{Bound, RangeBounds};

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pair::Mergeable;
use crate::raw::{Position, RawBPTree, SeparatorFn};

mod iter;
mod print;

pub use iter::{Iter, Range};

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<Q, R>(range: &R)
where
    Q: ?Sized + Ord,
    R: RangeBounds<Q>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                start < end
            } else {
                start <= end
            };
        assert!(valid, "range start is greater than range end in BPTree");
    }
}

/// An ordered set of entries kept in a B+Tree.
///
/// Entries live only in the leaves, which are chained left to right so a
/// cursor can walk the whole tree without climbing back up. Internal nodes
/// hold copies of the first entry of each right-hand subtree as separators.
/// Every node other than the root holds between [`min`](BPTree::min) and
/// [`max`](BPTree::max) entries.
///
/// By default an insert whose entry compares equal to a stored one is
/// rejected. A tree built with [`with_duplicates`](BPTree::with_duplicates)
/// instead merges the new entry into the stored one through [`Mergeable`];
/// this is how [`Map`](crate::Map) overwrites values and
/// [`MultiMap`](crate::MultiMap) collects them.
///
/// It is a logic error for an entry to be modified in such a way that its
/// ordering relative to any other entry changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use bptree::BPTree;
///
/// let mut tree = BPTree::new();
/// for key in [5, 1, 9, 3, 7] {
///     assert!(tree.insert(key));
/// }
/// assert!(!tree.insert(3));
///
/// assert_eq!(tree.len(), 5);
/// assert_eq!(tree.lower_bound(&4).get(), Ok(&5));
/// assert_eq!(tree.upper_bound(&5).get(), Ok(&7));
///
/// assert!(tree.remove(&1));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 5, 7, 9]);
/// assert!(tree.verify());
/// ```
pub struct BPTree<T> {
    raw: RawBPTree<T>,
}

impl<T> BPTree<T> {
    /// Makes a new, empty tree with the default [`Config`] that rejects
    /// duplicate entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let tree: BPTree<i32> = BPTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!((tree.min(), tree.max()), (1, 2));
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: RawBPTree::new(Config::default(), None),
        }
    }

    /// Makes a new, empty tree that rejects duplicate entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMinimum`] or [`Error::InvalidCapacity`] if
    /// `config` does not validate.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            raw: RawBPTree::new(config, None),
        })
    }

    /// Makes a new, empty tree that merges an entry equal to a stored one
    /// into it instead of rejecting it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMinimum`] or [`Error::InvalidCapacity`] if
    /// `config` does not validate.
    pub fn with_duplicates(config: Config) -> Result<Self>
    where
        T: Mergeable,
    {
        config.validate()?;
        Ok(Self::merging(config))
    }

    /// `with_duplicates` for a `config` already known to be valid.
    pub(crate) fn merging(config: Config) -> Self
    where
        T: Mergeable,
    {
        Self {
            raw: RawBPTree::new(config, Some(<T as Mergeable>::merge)),
        }
    }

    /// Routes internal nodes through `separator(entry)` instead of full
    /// clones of `entry`.
    pub(crate) fn with_separator(self, separator: SeparatorFn<T>) -> Self {
        Self {
            raw: self.raw.with_separator(separator),
        }
    }

    /// Returns the number of entries in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Minimum entries per non-root node.
    #[must_use]
    pub fn min(&self) -> usize {
        self.raw.min()
    }

    /// Maximum entries per node, `2 * min`.
    #[must_use]
    pub fn max(&self) -> usize {
        self.raw.max()
    }

    /// True if equal entries are merged rather than rejected.
    #[must_use]
    pub fn dups_ok(&self) -> bool {
        self.raw.dups_ok()
    }

    /// Number of levels from the root to the leaves; 1 for a lone leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every entry, leaving a single empty leaf.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no entries.
    pub fn front(&self) -> Result<&T> {
        let position = self.raw.first_position().ok_or(Error::EmptyTree)?;
        Ok(self.raw.entry(position))
    }

    /// Returns the largest entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no entries.
    pub fn back(&self) -> Result<&T> {
        let position = self.raw.last_position().ok_or(Error::EmptyTree)?;
        Ok(self.raw.entry(position))
    }

    /// Gets a cursor over the entries in ascending order.
    ///
    /// # Complexity
    ///
    /// O(log n) to reach the first leaf; O(1) per step via linked leaves.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.raw, self.raw.first_position())
    }

    /// Same as [`iter`](BPTree::iter).
    pub fn begin(&self) -> Iter<'_, T> {
        self.iter()
    }

    /// The past-the-end cursor.
    pub fn end(&self) -> Iter<'_, T> {
        Iter::new(&self.raw, None)
    }

    /// Checks every structural invariant.
    ///
    /// This walks the whole tree and is meant for tests, not for use after
    /// each mutation.
    #[must_use]
    pub fn verify(&self) -> bool
    where
        T: Ord,
    {
        self.raw.violations().is_empty()
    }

    /// Describes every invariant violation found, for test diagnostics.
    #[must_use]
    pub fn violations(&self) -> Vec<String>
    where
        T: Ord,
    {
        self.raw.violations()
    }
}

impl<T: Ord> BPTree<T> {
    /// Returns true if an entry equal to `key` is stored.
    ///
    /// The key may be any borrowed form of the entry type, but the ordering
    /// on the borrowed form *must* match the ordering on the entry type.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(key)
    }

    /// Returns the stored entry equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|position| self.raw.entry(position))
    }

    /// Returns the stored entry equal to `key`, mutably.
    ///
    /// Only the parts of the entry that do not take part in its ordering may
    /// be changed.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let position = self.raw.search(key)?;
        Some(self.raw.entry_mut(position))
    }

    /// Returns a cursor at the entry equal to `key`, or the end cursor.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::{BPTree, Error};
    ///
    /// let tree: BPTree<_> = [2, 4, 6].into_iter().collect();
    /// assert_eq!(tree.find(&4).get(), Ok(&4));
    /// assert!(tree.find(&5).is_end());
    /// assert_eq!(tree.find(&5).get(), Err(Error::InvalidIterator));
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Iter::new(&self.raw, self.raw.search(key))
    }

    /// Returns a cursor at the first entry not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Iter::new(&self.raw, self.raw.lower_bound(key))
    }

    /// Returns a cursor at the first entry greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Iter<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Iter::new(&self.raw, self.raw.upper_bound(key))
    }

    /// Iterates over the entries within `range`, in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds
    /// are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let tree: BPTree<_> = (1..=10).collect();
    /// assert_eq!(tree.range(3..6).copied().collect::<Vec<_>>(), [3, 4, 5]);
    /// assert_eq!(tree.range(8..).copied().collect::<Vec<_>>(), [8, 9, 10]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        validate_range_bounds::<Q, R>(&range);
        let front = match range.start_bound() {
            Bound::Included(start) => self.raw.lower_bound(start),
            Bound::Excluded(start) => self.raw.upper_bound(start),
            Bound::Unbounded => self.raw.first_position(),
        };
        let back: Option<Position> = match range.end_bound() {
            Bound::Included(end) => self.raw.upper_bound(end),
            Bound::Excluded(end) => self.raw.lower_bound(end),
            Bound::Unbounded => None,
        };
        Range::new(&self.raw, front, back)
    }
}

impl<T: Ord + Clone> BPTree<T> {
    /// Inserts `entry`.
    ///
    /// Returns `false` if an equal entry is already stored and the tree
    /// rejects duplicates; the tree is left unchanged. A tree built with
    /// [`with_duplicates`](BPTree::with_duplicates) merges the entry into the
    /// stored one and returns `true`.
    pub fn insert(&mut self, entry: T) -> bool {
        self.raw.insert(entry)
    }

    /// Removes the entry equal to `key`. Returns `false` if there is none.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).is_some()
    }

    /// Removes the entry equal to `key` and returns it.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the stored entry equal to `entry`, inserting `entry` first if
    /// there is none.
    ///
    /// An entry that is already stored is returned as is; `entry` is dropped
    /// without being merged.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::new();
    /// assert_eq!(*tree.get_or_insert(3), 3);
    /// assert_eq!(*tree.get_or_insert(3), 3);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn get_or_insert(&mut self, entry: T) -> &mut T {
        self.raw.get_or_insert(entry)
    }
}

impl<T: Clone> Clone for BPTree<T> {
    /// Deep copy; the copy shares no nodes with `self`.
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for BPTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for BPTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for BPTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BPTree<T> {}

impl<T: Ord + Clone> FromIterator<T> for BPTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BPTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone> Extend<T> for BPTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl<'a, T> IntoIterator for &'a BPTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn zero_minimum_is_rejected() {
        let result: Result<BPTree<u8>> = BPTree::with_config(Config::default().min(0));
        assert!(matches!(result, Err(Error::InvalidMinimum { min: 0 })));
    }

    #[test]
    fn front_and_back_on_empty_tree_fail() {
        let tree: BPTree<u8> = BPTree::new();
        assert_eq!(tree.front(), Err(Error::EmptyTree));
        assert_eq!(tree.back(), Err(Error::EmptyTree));
    }

    #[test]
    fn oversized_config_is_rejected_before_use() {
        let min = usize::MAX / 2 + 1;
        let result: Result<BPTree<u8>> = BPTree::with_config(Config::default().min(min));
        assert_eq!(result.err(), Some(Error::InvalidMinimum { min }));

        let result: Result<BPTree<u8>> = BPTree::with_config(Config::default().capacity(usize::MAX));
        assert!(matches!(result, Err(Error::InvalidCapacity { capacity: usize::MAX, .. })));
    }

    #[test]
    fn back_on_drained_tree_fails() {
        let mut tree: BPTree<_> = (0..20).collect();
        for key in 0..20 {
            assert_eq!(tree.back(), Ok(&19));
            tree.remove(&key);
        }
        assert_eq!(tree.back(), Err(Error::EmptyTree));
        assert_eq!(tree.front(), Err(Error::EmptyTree));
    }

    #[test]
    fn front_and_back_track_extremes() {
        let mut tree = BPTree::with_config(Config::default().min(2)).unwrap();
        for key in [40, 10, 30, 20, 50, 0] {
            tree.insert(key);
        }
        assert_eq!(tree.front(), Ok(&0));
        assert_eq!(tree.back(), Ok(&50));
    }

    #[test]
    fn begin_reaches_end() {
        let tree: BPTree<_> = (0..20).collect();
        let mut cursor = tree.begin();
        let mut steps = 0;
        while cursor != tree.end() {
            cursor.next();
            steps += 1;
        }
        assert_eq!(steps, 20);
    }

    #[test]
    fn range_bounds_are_respected() {
        fn collect(range: Range<'_, i32>) -> Vec<i32> {
            range.copied().collect()
        }

        let tree: BPTree<_> = (0..50).map(|n| n * 2).collect();
        assert_eq!(collect(tree.range(10..=14)), vec![10, 12, 14]);
        assert_eq!(collect(tree.range(9..15)), vec![10, 12, 14]);
        assert_eq!(collect(tree.range((Bound::Excluded(10), Bound::Excluded(16)))), vec![12, 14]);
        assert_eq!(collect(tree.range(..4)), vec![0, 2]);
        assert_eq!(collect(tree.range(95..)), vec![96, 98]);
        assert!(collect(tree.range(11..12)).is_empty());
        assert!(collect(tree.range(200..)).is_empty());
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end in BPTree")]
    fn inverted_range_panics() {
        let tree: BPTree<_> = (0..5).collect();
        let _ = tree.range((Bound::Excluded(3), Bound::Excluded(3)));
    }

    #[test]
    fn take_returns_removed_entry() {
        let mut tree: BPTree<_> = (0..10).collect();
        assert_eq!(tree.take(&4), Some(4));
        assert_eq!(tree.take(&4), None);
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn equality_ignores_shape() {
        let ascending: BPTree<_> = (0..100).collect();
        let descending: BPTree<_> = (0..100).rev().collect();
        assert_eq!(ascending, descending);
    }
}
