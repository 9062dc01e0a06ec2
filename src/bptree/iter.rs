use core::fmt;
use core::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::raw::{Position, RawBPTree};

/// A cursor over the entries of a [`BPTree`](crate::BPTree).
///
/// `Iter` is both a forward [`Iterator`] and a position in the leaf chain:
/// [`get`](Iter::get) reads the entry under the cursor without moving it, and
/// two cursors over the same tree compare equal when they sit on the same
/// entry (or are both at the end).
pub struct Iter<'a, T> {
    tree: &'a RawBPTree<T>,
    position: Option<Position>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(tree: &'a RawBPTree<T>, position: Option<Position>) -> Self {
        Self { tree, position }
    }

    /// The entry under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIterator`] if the cursor is past the end.
    pub fn get(&self) -> Result<&'a T> {
        let position = self.position.ok_or(Error::InvalidIterator)?;
        Ok(self.tree.entry(position))
    }

    /// True if the cursor is past the last entry.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            position: self.position,
        }
    }
}

impl<T> PartialEq for Iter<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<T> Eq for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.get().ok()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let position = self.position?;
        self.position = self.tree.advance(position);
        Some(self.tree.entry(position))
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// An iterator over a sub-range of entries, created by
/// [`BPTree::range`](crate::BPTree::range).
pub struct Range<'a, T> {
    tree: &'a RawBPTree<T>,
    front: Option<Position>,
    back: Option<Position>,
}

impl<'a, T> Range<'a, T> {
    /// `back` is exclusive; `None` runs to the end of the tree.
    pub(crate) fn new(tree: &'a RawBPTree<T>, front: Option<Position>, back: Option<Position>) -> Self {
        Self { tree, front, back }
    }
}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Range<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let position = self.front?;
        if self.front == self.back {
            self.front = None;
            return None;
        }
        self.front = self.tree.advance(position);
        Some(self.tree.entry(position))
    }
}

impl<T> FusedIterator for Range<'_, T> {}
