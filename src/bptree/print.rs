use core::fmt::{self, Write};

use alloc::string::String;

use super::BPTree;
use crate::raw::{Handle, RawBPTree};

const INDENT: usize = 4;

impl<T: fmt::Debug> BPTree<T> {
    /// Writes the tree rotated 90° counter-clockwise: the root at the left
    /// margin, each level indented four more columns, the rightmost subtree
    /// on top.
    ///
    /// With `debug` set, each node is preceded by a header naming its slot,
    /// subtree size and, for leaves, the next leaf.
    ///
    /// # Errors
    ///
    /// Propagates any error from `out`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let tree: BPTree<_> = [1, 2, 3].into_iter().collect();
    /// let mut out = String::new();
    /// tree.print(&mut out, false).unwrap();
    /// assert_eq!(out, "    3\n    2\n2\n    1\n");
    /// ```
    pub fn print<W: Write>(&self, out: &mut W, debug: bool) -> fmt::Result {
        print_node(&self.raw, self.raw.root(), 0, out, debug)
    }

    /// The [`print`](BPTree::print) rendering as a string.
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        self.print(&mut out, false)
            .expect("`BPTree::to_debug_string()` - writing into a `String` failed");
        out
    }
}

fn print_node<T: fmt::Debug, W: Write>(
    tree: &RawBPTree<T>,
    handle: Handle,
    level: usize,
    out: &mut W,
    debug: bool,
) -> fmt::Result {
    let node = tree.node(handle);
    let pad = level * INDENT;

    if debug {
        write!(out, "{:pad$}{handle:?} size={}", "", node.size)?;
        if node.is_leaf() {
            match node.next {
                Some(next) => write!(out, " next={next:?}")?,
                None => write!(out, " next=-")?,
            }
        }
        writeln!(out)?;
    }

    if node.is_leaf() {
        for entry in node.data.iter().rev() {
            writeln!(out, "{:pad$}{entry:?}", "")?;
        }
        return Ok(());
    }

    let count = node.data_count();
    print_node(tree, node.child(count), level + 1, out, debug)?;
    for index in (0..count).rev() {
        writeln!(out, "{:pad$}{:?}", "", node.data[index])?;
        print_node(tree, node.child(index), level + 1, out, debug)?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::BPTree;
    use alloc::string::String;

    #[test]
    fn empty_tree_prints_nothing() {
        let tree: BPTree<i32> = BPTree::new();
        assert_eq!(tree.to_debug_string(), "");
    }

    #[test]
    fn lone_leaf_prints_descending() {
        let tree: BPTree<_> = [1, 2].into_iter().collect();
        assert_eq!(tree.to_debug_string(), "2\n1\n");
    }

    #[test]
    fn debug_string_matches_plain_print() {
        let tree: BPTree<_> = (0..100).collect();
        let mut out = String::new();
        tree.print(&mut out, false).unwrap();
        assert_eq!(tree.to_debug_string(), out);
        assert!(out.lines().any(|line| line.trim_start() == "99"));
    }

    #[test]
    fn debug_mode_adds_node_headers() {
        let tree: BPTree<_> = [1, 2, 3].into_iter().collect();
        let mut out = String::new();
        tree.print(&mut out, true).unwrap();

        let headers = out.lines().filter(|line| line.contains("size=")).count();
        assert_eq!(headers, 3);
        assert!(out.lines().next().is_some_and(|line| line.starts_with('#') && line.ends_with("size=3")));
        assert_eq!(out.matches("next=-").count(), 1);
    }
}
