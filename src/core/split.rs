//! The two-arc decomposition
//!
//! Linear storage cannot answer a query for an origin-crossing interval in
//! one pass, so every such interval is decomposed into the arc running to
//! the end of the reference and the arc running from the origin. Queries
//! are issued per arc and the results concatenated in arc order.

use crate::core::region::Region;

impl Region {
    /// Decompose the interval into its two arcs
    ///
    /// The first arc is `[start, reference_length]`, the second `[1, end]`.
    /// Both carry the parent's reference, strand, coordinate system, and
    /// data source, and neither crosses the origin, so each can be handed
    /// to any per-base collaborator as-is.
    ///
    /// # Examples
    /// ```
    /// use replimap::{Region, Strand};
    ///
    /// let region = Region::new("pCT100", 1_000_000, 999_990, 10, Strand::Forward)?;
    /// let (first, second) = region.split();
    ///
    /// assert_eq!((first.start(), first.end()), (999_990, 1_000_000));
    /// assert_eq!((second.start(), second.end()), (1, 10));
    /// # Ok::<(), replimap::RegionError>(())
    /// ```
    pub fn split(&self) -> (Region, Region) {
        let first = self.derive(self.start(), self.reference_length(), self.strand());
        let second = self.derive(1, self.end(), self.strand());
        (first, second)
    }
}
