use core::borrow::Borrow;
use core::mem;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::trace;

use super::arena::Arena;
use super::array::{self, Items, attach_item, delete_item, detach_item, first_ge, insert_item, is_match};
use super::handle::Handle;
use super::node::Node;
use crate::config::Config;

/// Merge hook captured from [`Mergeable`](crate::Mergeable) when the tree
/// accepts duplicate keys.
pub(crate) type MergeFn<T> = fn(&mut T, T);

/// Builds the internal-node copy of a leaf entry. Without one, separators
/// are plain clones.
pub(crate) type SeparatorFn<T> = fn(&T) -> T;

fn separator_of<T: Clone>(hook: Option<SeparatorFn<T>>, entry: &T) -> T {
    match hook {
        Some(separator) => separator(entry),
        None => entry.clone(),
    }
}

/// A slot in the leaf chain. `None` in its place means "end".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Position {
    pub(crate) leaf: Handle,
    pub(crate) index: usize,
}

/// The core B+Tree backing `BPTree`, `Map` and `MultiMap`.
///
/// Insertion and removal are "loose": the recursive descent edits the leaf
/// directly and lets a child run one entry over `max` (or under `min`); the
/// parent then repairs that child on the way back up. The root is the only
/// node allowed to be short, and an empty tree is a single empty leaf.
pub(crate) struct RawBPTree<T> {
    nodes: Arena<Node<T>>,
    root: Handle,
    min: usize,
    merge: Option<MergeFn<T>>,
    separator: Option<SeparatorFn<T>>,
}

impl<T> RawBPTree<T> {
    /// Creates an empty tree. `config` must already be validated.
    pub(crate) fn new(config: Config, merge: Option<MergeFn<T>>) -> Self {
        debug_assert!(config.validate().is_ok());
        let mut nodes = Arena::with_capacity(config.node_capacity().max(1));
        let root = nodes.alloc(Node::new());
        Self {
            nodes,
            root,
            min: config.node_min(),
            merge,
            separator: None,
        }
    }

    /// Stores `separator(entry)` in internal nodes instead of a full clone.
    /// The result must compare equal to `entry`.
    pub(crate) fn with_separator(mut self, separator: SeparatorFn<T>) -> Self {
        self.separator = Some(separator);
        self
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.get(self.root).size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn min(&self) -> usize {
        self.min
    }

    pub(crate) fn max(&self) -> usize {
        2 * self.min
    }

    pub(crate) fn dups_ok(&self) -> bool {
        self.merge.is_some()
    }

    pub(crate) fn root(&self) -> Handle {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        self.nodes.get(handle)
    }

    /// Number of live nodes, leaves included.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels; a lone leaf has height 1.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.nodes.get(self.root);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
            height += 1;
        }
        height
    }

    /// Drops every node and leaves a single empty leaf as the root.
    pub(crate) fn clear(&mut self) {
        trace!(target: "bptree", "clearing {} entries in {} nodes", self.len(), self.node_count());
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new());
    }

    /// Leftmost leaf; the root itself when the tree is a single leaf.
    pub(crate) fn first_leaf(&self) -> Handle {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return current;
            }
            current = node.child(0);
        }
    }

    pub(crate) fn last_leaf(&self) -> Handle {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return current;
            }
            current = node.child(node.child_count() - 1);
        }
    }

    /// Position of the first entry, or `None` if the tree is empty.
    pub(crate) fn first_position(&self) -> Option<Position> {
        let leaf = self.first_leaf();
        (self.nodes.get(leaf).data_count() > 0).then_some(Position { leaf, index: 0 })
    }

    pub(crate) fn last_position(&self) -> Option<Position> {
        let leaf = self.last_leaf();
        let count = self.nodes.get(leaf).data_count();
        count.checked_sub(1).map(|index| Position { leaf, index })
    }

    /// Position one step further along the leaf chain.
    pub(crate) fn advance(&self, position: Position) -> Option<Position> {
        let node = self.nodes.get(position.leaf);
        if position.index + 1 < node.data_count() {
            return Some(Position {
                leaf: position.leaf,
                index: position.index + 1,
            });
        }
        self.leaf_start(node.next)
    }

    /// First slot of `leaf`, skipping over an empty leaf.
    fn leaf_start(&self, leaf: Option<Handle>) -> Option<Position> {
        let leaf = leaf?;
        if self.nodes.get(leaf).data_count() > 0 {
            Some(Position { leaf, index: 0 })
        } else {
            None
        }
    }

    pub(crate) fn entry(&self, position: Position) -> &T {
        &self.nodes.get(position.leaf).data[position.index]
    }

    pub(crate) fn entry_mut(&mut self, position: Position) -> &mut T {
        &mut self.nodes.get_mut(position.leaf).data[position.index]
    }

    /// Recomputes the cached subtree size of `handle` from its children.
    fn refresh_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = if node.is_leaf() {
            node.data_count()
        } else {
            node.children.iter().map(|&child| self.nodes.get(child).size).sum()
        };
        self.nodes.get_mut(handle).size = size;
    }
}

impl<T: Ord> RawBPTree<T> {
    /// Walks from the root to the leaf that owns `key`.
    ///
    /// Returns the leaf and `first_ge` of `key` within it.
    fn descend<Q>(&self, key: &Q) -> (Handle, usize)
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            let index = first_ge(&node.data, key);
            if node.is_leaf() {
                return (current, index);
            }
            let found = is_match(&node.data, index, key);
            current = node.child(if found { index + 1 } else { index });
        }
    }

    /// Finds the leaf slot holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Position>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf, index) = self.descend(key);
        let node = self.nodes.get(leaf);
        is_match(&node.data, index, key).then_some(Position { leaf, index })
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// First entry not less than `key`, crossing into the next leaf when the
    /// match position falls past the end of the owning leaf.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Position>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf, index) = self.descend(key);
        let node = self.nodes.get(leaf);
        if index < node.data_count() {
            Some(Position { leaf, index })
        } else {
            self.leaf_start(node.next)
        }
    }

    /// First entry greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Position>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let position = self.lower_bound(key)?;
        if self.entry(position).borrow().cmp(key).is_eq() {
            self.advance(position)
        } else {
            Some(position)
        }
    }

    /// Smallest leaf entry in the subtree rooted at `handle`.
    fn smallest(&self, handle: Handle) -> &T {
        let mut current = self.nodes.get(handle);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
        }
        &current.data[0]
    }
}

impl<T: Ord + Clone> RawBPTree<T> {
    /// Inserts `entry`.
    ///
    /// Returns `false` only when the key is already present and duplicates
    /// are rejected. With duplicates allowed an existing entry absorbs the
    /// new one and the call still reports success.
    pub(crate) fn insert(&mut self, entry: T) -> bool {
        let root = self.root;
        let inserted = self.loose_insert(root, entry);
        if self.nodes.get(root).data_count() > self.max() {
            self.grow_root();
        }
        inserted
    }

    fn loose_insert(&mut self, handle: Handle, entry: T) -> bool {
        let merge = self.merge;
        let node = self.nodes.get_mut(handle);
        let index = first_ge(&node.data, &entry);
        let found = index < node.data_count() && node.data[index] == entry;

        if node.is_leaf() {
            if found {
                return match merge {
                    Some(merge) => {
                        merge(&mut node.data[index], entry);
                        true
                    }
                    None => false,
                };
            }
            insert_item(&mut node.data, index, entry);
            node.size += 1;
            return true;
        }

        let child_index = if found { index + 1 } else { index };
        let child = node.child(child_index);
        if !self.loose_insert(child, entry) {
            return false;
        }
        if self.nodes.get(child).data_count() > self.max() {
            self.fix_excess(handle, child_index);
        }
        self.refresh_size(handle);
        true
    }

    /// Moves the overflowing root under a fresh root and splits it there.
    fn grow_root(&mut self) {
        let old_root = self.root;
        let size = self.nodes.get(old_root).size;
        self.root = self.nodes.alloc(Node::with_child(old_root, size));
        trace!(target: "bptree", "growing: root {:?} wrapped by {:?}", old_root, self.root);
        self.fix_excess(self.root, 0);
    }

    /// Splits `children[index]` of `parent`, which holds `max + 1` entries.
    ///
    /// A leaf keeps its lower half and the upper half (median included)
    /// moves to a new sibling whose first entry is copied up. An internal
    /// node gives up its median to the parent outright.
    fn fix_excess(&mut self, parent: Handle, index: usize) {
        let child = self.nodes.get(parent).child(index);
        let node = self.nodes.get_mut(child);
        let leaf = node.is_leaf();

        let mut sibling = Node::new();
        array::split(&mut node.data, &mut sibling.data, !leaf);
        array::split(&mut node.children, &mut sibling.children, false);
        let separator = if leaf {
            sibling.next = node.next;
            separator_of(self.separator, &sibling.data[0])
        } else {
            detach_item(&mut node.data).expect("`RawBPTree::fix_excess()` - overflowing node has no median")
        };

        let sibling = self.nodes.alloc(sibling);
        if leaf {
            self.nodes.get_mut(child).next = Some(sibling);
        }
        self.refresh_size(child);
        self.refresh_size(sibling);

        let parent_node = self.nodes.get_mut(parent);
        insert_item(&mut parent_node.data, index, separator);
        insert_item(&mut parent_node.children, index + 1, sibling);
        trace!(target: "bptree", "split {:?}: new sibling {:?} under {:?}", child, sibling, parent);
    }

    /// Removes the entry matching `key` and returns it.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let root = self.root;
        let removed = self.loose_remove(root, key)?;
        let node = self.nodes.get(root);
        if node.data_count() == 0 && node.child_count() == 1 {
            self.root = node.child(0);
            self.nodes.free(root);
            trace!(target: "bptree", "shrinking: root {:?} replaced by {:?}", root, self.root);
        }
        Some(removed)
    }

    fn loose_remove<Q>(&mut self, handle: Handle, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get_mut(handle);
        let index = first_ge(&node.data, key);
        let found = is_match(&node.data, index, key);

        if node.is_leaf() {
            if !found {
                return None;
            }
            node.size -= 1;
            return Some(delete_item(&mut node.data, index));
        }

        let child_index = if found { index + 1 } else { index };
        let child = node.child(child_index);
        let removed = self.loose_remove(child, key)?;
        if self.nodes.get(child).data_count() < self.min {
            self.fix_shortage(handle, child_index);
        }
        if found {
            self.remove_dup_key(handle, key);
        }
        self.refresh_size(handle);
        Some(removed)
    }

    /// Replaces the separator copy of a removed key with the new smallest
    /// entry of its right subtree.
    ///
    /// The copy sits in `handle` or, if a fixup pulled it down, in a
    /// descendant on the search path for `key`.
    fn remove_dup_key<Q>(&mut self, handle: Handle, key: &Q)
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = handle;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return;
            }
            let index = first_ge(&node.data, key);
            if is_match(&node.data, index, key) {
                let replacement = separator_of(self.separator, self.smallest(node.child(index + 1)));
                self.nodes.get_mut(current).data[index] = replacement;
                return;
            }
            current = node.child(index);
        }
    }

    /// Repairs `children[index]` of `parent`, which is one entry short.
    ///
    /// Borrows from the right sibling, then the left, and merges with a
    /// sibling (right first) when neither can spare an entry.
    fn fix_shortage(&mut self, parent: Handle, index: usize) {
        let node = self.nodes.get(parent);
        let count = node.child_count();
        let spare = |sibling: usize| self.nodes.get(node.child(sibling)).data_count() > self.min;

        if index + 1 < count && spare(index + 1) {
            self.borrow_from_right(parent, index);
        } else if index > 0 && spare(index - 1) {
            self.borrow_from_left(parent, index);
        } else if index + 1 < count {
            self.merge_children(parent, index);
        } else {
            self.merge_children(parent, index - 1);
        }
    }

    /// Moves the first entry of `children[index + 1]` to the end of
    /// `children[index]`.
    fn borrow_from_right(&mut self, parent: Handle, index: usize) {
        let (child, right) = {
            let node = self.nodes.get(parent);
            (node.child(index), node.child(index + 1))
        };

        let right_node = self.nodes.get_mut(right);
        let moved = delete_item(&mut right_node.data, 0);
        if right_node.is_leaf() {
            let separator = separator_of(self.separator, &right_node.data[0]);
            attach_item(&mut self.nodes.get_mut(child).data, moved);
            self.nodes.get_mut(parent).data[index] = separator;
        } else {
            let moved_child = delete_item(&mut right_node.children, 0);
            let separator = mem::replace(&mut self.nodes.get_mut(parent).data[index], moved);
            let child_node = self.nodes.get_mut(child);
            attach_item(&mut child_node.data, separator);
            attach_item(&mut child_node.children, moved_child);
        }

        self.refresh_size(child);
        self.refresh_size(right);
        trace!(target: "bptree", "rotated left: {:?} <- {:?} under {:?}", child, right, parent);
    }

    /// Moves the last entry of `children[index - 1]` to the front of
    /// `children[index]`.
    fn borrow_from_left(&mut self, parent: Handle, index: usize) {
        let (left, child) = {
            let node = self.nodes.get(parent);
            (node.child(index - 1), node.child(index))
        };

        let left_node = self.nodes.get_mut(left);
        let moved = detach_item(&mut left_node.data).expect("`RawBPTree::borrow_from_left()` - sibling is empty");
        if left_node.is_leaf() {
            let separator = separator_of(self.separator, &moved);
            insert_item(&mut self.nodes.get_mut(child).data, 0, moved);
            self.nodes.get_mut(parent).data[index - 1] = separator;
        } else {
            let moved_child =
                detach_item(&mut left_node.children).expect("`RawBPTree::borrow_from_left()` - sibling has no children");
            let separator = mem::replace(&mut self.nodes.get_mut(parent).data[index - 1], moved);
            let child_node = self.nodes.get_mut(child);
            insert_item(&mut child_node.data, 0, separator);
            insert_item(&mut child_node.children, 0, moved_child);
        }

        self.refresh_size(left);
        self.refresh_size(child);
        trace!(target: "bptree", "rotated right: {:?} -> {:?} under {:?}", left, child, parent);
    }

    /// Folds `children[index + 1]` into `children[index]`, consuming the
    /// separator between them.
    fn merge_children(&mut self, parent: Handle, index: usize) {
        let parent_node = self.nodes.get_mut(parent);
        let separator = delete_item(&mut parent_node.data, index);
        let right = delete_item(&mut parent_node.children, index + 1);
        let left = parent_node.child(index);

        let mut right_node = self.nodes.take(right);
        let left_node = self.nodes.get_mut(left);
        if left_node.is_leaf() {
            // The separator is only a copy of right's first entry.
            left_node.next = right_node.next;
        } else {
            attach_item(&mut left_node.data, separator);
        }
        array::merge(&mut right_node.data, &mut left_node.data);
        array::merge(&mut right_node.children, &mut left_node.children);

        self.refresh_size(left);
        trace!(target: "bptree", "merged {:?} into {:?} under {:?}", right, left, parent);
    }

    /// Returns the stored entry equal to `entry`, inserting `entry` first if
    /// there is none. An existing entry is returned untouched.
    pub(crate) fn get_or_insert(&mut self, entry: T) -> &mut T {
        let position = match self.search(&entry) {
            Some(position) => position,
            None => {
                let lookup = entry.clone();
                self.insert(entry);
                self.search(&lookup).expect("`RawBPTree::get_or_insert()` - inserted entry is missing")
            }
        };
        self.entry_mut(position)
    }
}

impl<T: Clone> Clone for RawBPTree<T> {
    /// Deep copy. Leaves are relinked to their copied neighbours as the copy
    /// proceeds left to right.
    fn clone(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.nodes.len());
        let (root, _) = self.copy_subtree(self.root, &mut nodes, None);
        Self {
            nodes,
            root,
            min: self.min,
            merge: self.merge,
            separator: self.separator,
        }
    }
}

impl<T: Clone> RawBPTree<T> {
    /// Copies the subtree at `source` into `nodes`.
    ///
    /// `last_leaf` is the most recently copied leaf; the copy of the first
    /// leaf under `source` is linked after it. Returns the new subtree root
    /// and the new most recently copied leaf.
    fn copy_subtree(
        &self,
        source: Handle,
        nodes: &mut Arena<Node<T>>,
        last_leaf: Option<Handle>,
    ) -> (Handle, Option<Handle>) {
        let node = self.nodes.get(source);
        if node.is_leaf() {
            let copy = nodes.alloc(node.shallow_copy());
            if let Some(previous) = last_leaf {
                nodes.get_mut(previous).next = Some(copy);
            }
            return (copy, Some(copy));
        }

        let mut children: Items<Handle> = Items::with_capacity(node.child_count());
        let mut last_leaf = last_leaf;
        for &child in &node.children {
            let (copy, tail) = self.copy_subtree(child, nodes, last_leaf);
            children.push(copy);
            last_leaf = tail;
        }

        let mut copy = node.shallow_copy();
        copy.children = children;
        (nodes.alloc(copy), last_leaf)
    }
}

/// What a subtree walk learned about one child, used by the verifier.
struct SubtreeReport {
    depth: usize,
    size: usize,
}

impl<T: Ord> RawBPTree<T> {
    /// Checks every structural invariant and describes each violation.
    ///
    /// Walks the whole tree; meant for tests and debugging only.
    pub(crate) fn violations(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut leaves = Vec::new();

        let root = self.nodes.get(self.root);
        if !root.is_leaf() && root.data_count() == 0 {
            errors.push(format!("root {:?} is internal but holds no separators", self.root));
        }
        self.check_node(self.root, true, None, None, &mut leaves, &mut errors);
        self.check_leaf_chain(&leaves, &mut errors);
        errors
    }

    fn check_node(
        &self,
        handle: Handle,
        is_root: bool,
        lower: Option<&T>,
        upper: Option<&T>,
        leaves: &mut Vec<Handle>,
        errors: &mut Vec<String>,
    ) -> SubtreeReport {
        let node = self.nodes.get(handle);
        let count = node.data_count();

        if !is_root && (count < self.min || count > self.max()) {
            errors.push(format!(
                "node {handle:?} holds {count} entries, expected {}..={}",
                self.min,
                self.max()
            ));
        }
        if is_root && count > self.max() {
            errors.push(format!("root {handle:?} holds {count} entries, over the maximum {}", self.max()));
        }
        if !node.is_leaf() && node.child_count() != count + 1 {
            errors.push(format!(
                "node {handle:?} has {} children for {count} entries",
                node.child_count()
            ));
        }
        if !array::is_sorted_strict(&node.data) {
            errors.push(format!("node {handle:?} entries are not strictly ascending"));
        }
        if let Some(lower) = lower
            && !array::is_le(&node.data, lower)
        {
            errors.push(format!("node {handle:?} holds an entry below its lower separator"));
        }
        if let Some(upper) = upper
            && !array::is_gt(&node.data, upper)
        {
            errors.push(format!("node {handle:?} holds an entry at or above its upper separator"));
        }

        if node.is_leaf() {
            leaves.push(handle);
            if node.size != count {
                errors.push(format!("leaf {handle:?} caches size {} but holds {count}", node.size));
            }
            return SubtreeReport { depth: 1, size: count };
        }

        let mut depth = None;
        let mut size = 0;
        for (index, &child) in node.children.iter().enumerate() {
            let child_lower = if index == 0 { lower } else { node.data.get(index - 1) };
            let child_upper = node.data.get(index).or(upper);
            let report = self.check_node(child, false, child_lower, child_upper, leaves, errors);

            match depth {
                None => depth = Some(report.depth),
                Some(expected) if expected != report.depth => errors.push(format!(
                    "node {handle:?} child {index} reaches leaves at depth {} instead of {expected}",
                    report.depth
                )),
                Some(_) => {}
            }
            size += report.size;

            if index > 0
                && let Some(separator) = node.data.get(index - 1)
                && self.smallest_if_any(child).is_some_and(|first| first != separator)
            {
                errors.push(format!(
                    "node {handle:?} separator {} is not a copy of the smallest entry to its right",
                    index - 1
                ));
            }
        }

        if node.size != size {
            errors.push(format!("node {handle:?} caches size {} but reaches {size}", node.size));
        }
        SubtreeReport {
            depth: depth.unwrap_or(0) + 1,
            size,
        }
    }

    fn smallest_if_any(&self, handle: Handle) -> Option<&T> {
        let mut current = self.nodes.get(handle);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
        }
        current.data.first()
    }

    fn check_leaf_chain(&self, leaves: &[Handle], errors: &mut Vec<String>) {
        for (index, &leaf) in leaves.iter().enumerate() {
            let expected = leaves.get(index + 1).copied();
            let actual = self.nodes.get(leaf).next;
            if actual != expected {
                errors.push(format!("leaf {leaf:?} links to {actual:?}, expected {expected:?}"));
            }
        }

        let mut previous: Option<&T> = None;
        for &leaf in leaves {
            for entry in &self.nodes.get(leaf).data {
                if previous.is_some_and(|previous| previous >= entry) {
                    errors.push(format!("leaf chain is out of order at leaf {leaf:?}"));
                }
                previous = Some(entry);
            }
        }
    }
}
