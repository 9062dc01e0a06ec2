use crate::error::{Error, Result};
use crate::raw::Handle;

/// Construction parameters for a [`BPTree`](crate::BPTree).
///
/// Every node other than the root holds between `min` and `2 * min` entries.
///
/// # Examples
///
/// ```
/// use bptree::{BPTree, Config};
///
/// let tree: BPTree<u32> = BPTree::with_config(Config::default().min(3).capacity(64)).unwrap();
/// assert_eq!(tree.min(), 3);
/// assert_eq!(tree.max(), 6);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    min: usize,
    capacity: usize,
}

impl Config {
    /// The smallest node minimum, and the default.
    pub const DEFAULT_MIN: usize = 1;

    /// The largest node minimum. An overflowing node holds `2 * min + 1`
    /// entries and `2 * min + 2` children.
    pub const MAX_MIN: usize = (usize::MAX - 2) / 2;

    /// The largest capacity hint: one slot per addressable node.
    pub const MAX_CAPACITY: usize = Handle::MAX + 1;

    /// Sets the minimum number of entries per non-root node.
    #[must_use]
    pub const fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }

    /// Reserves room for roughly `capacity` nodes up front.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// The configured node minimum.
    #[must_use]
    pub const fn node_min(&self) -> usize {
        self.min
    }

    /// The node maximum, `2 * min` for any valid configuration.
    #[must_use]
    pub const fn node_max(&self) -> usize {
        self.min.saturating_mul(2)
    }

    /// The configured node capacity hint.
    #[must_use]
    pub const fn node_capacity(&self) -> usize {
        self.capacity
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMinimum`] when `min` is zero or above
    /// [`MAX_MIN`](Config::MAX_MIN), and [`Error::InvalidCapacity`] when
    /// `capacity` is above [`MAX_CAPACITY`](Config::MAX_CAPACITY).
    pub const fn validate(&self) -> Result<()> {
        if self.min == 0 || self.min > Self::MAX_MIN {
            return Err(Error::InvalidMinimum { min: self.min });
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(Error::InvalidCapacity {
                capacity: self.capacity,
                max: Self::MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            capacity: 0,
        }
    }
}
