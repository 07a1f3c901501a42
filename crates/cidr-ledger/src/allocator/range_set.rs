//! Ordered set of disjoint ranges confined to a boundary
//!
//! Entries are kept sorted by start and are pairwise disjoint and
//! non-adjacent: touching ranges are always coalesced on insert. Overlapping
//! inserts are rejected, never absorbed.

use super::range::Range;
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Free space left in a [`RangeSet`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSpace {
    /// Gaps in ascending order
    pub ranges: Vec<Range>,
    /// Sum of all gap lengths
    pub total: u64,
}

/// Allocation ledger over a fixed boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeSet {
    boundary: Range,
    ranges: Vec<Range>,
}

impl Default for RangeSet {
    fn default() -> Self {
        Self::new(Range::full())
    }
}

impl RangeSet {
    /// Create an empty set confined to `boundary`
    pub fn new(boundary: Range) -> Self {
        Self {
            boundary,
            ranges: Vec::new(),
        }
    }

    pub fn boundary(&self) -> Range {
        self.boundary
    }

    /// Allocated ranges in ascending order
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Number of disjoint allocated ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of allocated points
    pub fn allocated_length(&self) -> u64 {
        self.ranges.iter().map(Range::length).sum()
    }

    /// Check if a point falls inside an allocated range
    pub fn contains_point(&self, point: u64) -> bool {
        let idx = self.ranges.partition_point(|r| r.end() <= point);
        self.ranges
            .get(idx)
            .map(|r| r.includes_point(point))
            .unwrap_or(false)
    }

    /// Record `candidate` as allocated
    ///
    /// A candidate touching its neighbours is merged with them (both sides
    /// at once when it bridges a gap exactly). On error the set is unchanged.
    pub fn insert(&mut self, candidate: Range) -> Result<()> {
        if !self.boundary.includes(&candidate) {
            return Err(Error::OutOfBoundary {
                range: candidate,
                boundary: self.boundary,
            });
        }

        // First entry that could intersect or touch the candidate; everything
        // before it ends strictly before the candidate starts.
        let idx = self.ranges.partition_point(|r| r.end() < candidate.start());

        let Some(curr) = self.ranges.get(idx).copied() else {
            debug!(range = %candidate, "Appending range");
            self.ranges.push(candidate);
            return Ok(());
        };

        let test = candidate.intersection_test(&curr);
        if test.intersected {
            return Err(Self::overlap(candidate, curr));
        }

        if !test.touched {
            // curr.end >= candidate.start without touching, so curr lies after
            // the candidate with a gap.
            debug!(range = %candidate, index = idx, "Inserting range");
            self.ranges.insert(idx, candidate);
            return Ok(());
        }

        let mut merged = candidate.merged(&curr)?;

        if let Some(next) = self.ranges.get(idx + 1).copied() {
            let next_test = candidate.intersection_test(&next);
            if next_test.intersected {
                return Err(Self::overlap(candidate, next));
            }
            if next_test.touched {
                merged = merged.merged(&next)?;
                debug!(range = %candidate, merged = %merged, "Coalescing with both neighbours");
                self.ranges[idx] = merged;
                self.ranges.remove(idx + 1);
                return Ok(());
            }
        }

        debug!(range = %candidate, merged = %merged, "Coalescing with neighbour");
        self.ranges[idx] = merged;
        Ok(())
    }

    fn overlap(candidate: Range, existing: Range) -> Error {
        warn!(range = %candidate, existing = %existing, "Rejecting overlapping range");
        Error::Overlap {
            candidate,
            existing,
        }
    }

    /// Complement of the allocated ranges within the boundary
    pub fn available_ranges(&self) -> FreeSpace {
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut cursor = self.boundary.start();

        for allocated in &self.ranges {
            if allocated.start() > cursor {
                ranges.push(Range::from_bounds(cursor, allocated.start()));
            }
            cursor = allocated.end();
        }

        if cursor < self.boundary.end() {
            ranges.push(Range::from_bounds(cursor, self.boundary.end()));
        }

        let total = ranges.iter().map(Range::length).sum();
        FreeSpace { ranges, total }
    }
}
