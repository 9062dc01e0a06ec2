use super::array::Items;
use super::handle::Handle;

/// A single tree node.
///
/// Leaves carry the real entries and the `next` link of the leaf chain.
/// Internal nodes carry separator copies in `data`, one more child than
/// separators, and leave `next` unset.
pub(crate) struct Node<T> {
    pub(crate) data: Items<T>,
    pub(crate) children: Items<Handle>,
    // Non-owning. Only meaningful on leaves.
    pub(crate) next: Option<Handle>,
    // Number of leaf entries reachable from this node.
    pub(crate) size: usize,
}

impl<T> Node<T> {
    pub(crate) fn new() -> Self {
        Self {
            data: Items::new(),
            children: Items::new(),
            next: None,
            size: 0,
        }
    }

    /// Creates an internal node whose only child is `child`.
    pub(crate) fn with_child(child: Handle, size: usize) -> Self {
        let mut node = Self::new();
        node.children.push(child);
        node.size = size;
        node
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn data_count(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }
}

impl<T: Clone> Node<T> {
    /// Copies entries and subtree size, but not children or the leaf link.
    pub(crate) fn shallow_copy(&self) -> Self {
        Self {
            data: self.data.clone(),
            children: Items::new(),
            next: None,
            size: self.size,
        }
    }
}
