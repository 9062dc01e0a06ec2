//! Ordered-array primitives shared by every node.
//!
//! Each node keeps its entries and child handles in a [`Items`] buffer whose
//! length is the logical size. Nodes are allowed one slot beyond their limit
//! between a loose insert/remove and the fixup that follows it, so every
//! buffer is sized for `max + 2` elements.

use core::borrow::Borrow;

use smallvec::SmallVec;

/// Elements kept inline before a node buffer spills to the heap. Covers the
/// default `min = 1` tree (3 entries, 4 children at peak) without allocating.
pub(crate) const INLINE: usize = 4;

pub(crate) type Items<T> = SmallVec<[T; INLINE]>;

/// Index of the first element not less than `key`, or `items.len()`.
#[inline]
pub(crate) fn first_ge<T, Q>(items: &[T], key: &Q) -> usize
where
    T: Borrow<Q>,
    Q: ?Sized + Ord,
{
    items.partition_point(|item| item.borrow().cmp(key).is_lt())
}

/// True if `items[index]` exists and equals `key`.
#[inline]
pub(crate) fn is_match<T, Q>(items: &[T], index: usize, key: &Q) -> bool
where
    T: Borrow<Q>,
    Q: ?Sized + Ord,
{
    items.get(index).is_some_and(|item| item.borrow().cmp(key).is_eq())
}

/// Shifts `items[index..]` right by one and writes `value` at `index`.
#[inline]
pub(crate) fn insert_item<T>(items: &mut Items<T>, index: usize, value: T) {
    items.insert(index, value);
}

/// Removes and returns `items[index]`, shifting the tail left.
#[inline]
pub(crate) fn delete_item<T>(items: &mut Items<T>, index: usize) -> T {
    items.remove(index)
}

#[inline]
pub(crate) fn attach_item<T>(items: &mut Items<T>, value: T) {
    items.push(value);
}

#[inline]
pub(crate) fn detach_item<T>(items: &mut Items<T>) -> Option<T> {
    items.pop()
}

/// Moves the upper half of `src` onto the end of `dest`.
///
/// With `mid = src.len() / 2`, `after_mid` leaves `src[mid]` behind as the
/// last element of `src` (it is then detached and promoted as a separator);
/// otherwise `src[mid]` travels with the upper half.
pub(crate) fn split<T>(src: &mut Items<T>, dest: &mut Items<T>, after_mid: bool) {
    let mid = src.len() / 2;
    let from = if after_mid { (mid + 1).min(src.len()) } else { mid };
    dest.extend(src.drain(from..));
}

/// Appends all of `src` to `dest`, leaving `src` empty.
pub(crate) fn merge<T>(src: &mut Items<T>, dest: &mut Items<T>) {
    dest.extend(src.drain(..));
}

/// True if `value` is greater than every element of `items`.
pub(crate) fn is_gt<T: Ord>(items: &[T], value: &T) -> bool {
    items.iter().all(|item| value > item)
}

/// True if `value` is less than or equal to every element of `items`.
pub(crate) fn is_le<T: Ord>(items: &[T], value: &T) -> bool {
    items.iter().all(|item| value <= item)
}

/// True if `items` is strictly ascending.
pub(crate) fn is_sorted_strict<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|pair| pair[0] < pair[1])
}
