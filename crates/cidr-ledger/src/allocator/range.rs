//! Half-open integer intervals over the IPv4 value space
//!
//! Bounds are stored as `u64` so the exclusive end of a `/0` block
//! (`2^32`) is representable.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// One past the highest IPv4 address value
pub const ADDRESS_SPACE_END: u64 = 1 << 32;

/// A half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Range {
    start: u64,
    end: u64,
}

/// Outcome of comparing two ranges
///
/// `start`/`end` are the clamped bounds `max(starts)`/`min(ends)`. When
/// neither flag is set the ranges are disjoint with a gap between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionTest {
    /// The ranges share at least one point
    pub intersected: bool,
    /// The ranges share only a boundary
    pub touched: bool,
    pub start: u64,
    pub end: u64,
}

impl Range {
    /// Create a range, rejecting inverted bounds and bounds past `2^32`
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end || end > ADDRESS_SPACE_END {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range from bounds already known to be valid
    pub(crate) fn from_bounds(start: u64, end: u64) -> Self {
        debug_assert!(start <= end && end <= ADDRESS_SPACE_END);
        Self { start, end }
    }

    /// The whole IPv4 value space
    pub fn full() -> Self {
        Self {
            start: 0,
            end: ADDRESS_SPACE_END,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a point lies in `[start, end)`
    pub fn includes_point(&self, point: u64) -> bool {
        point >= self.start && point < self.end
    }

    /// Check if `other` is fully nested in this range
    pub fn includes(&self, other: &Range) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn intersection_test(&self, other: &Range) -> IntersectionTest {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        IntersectionTest {
            intersected: end > start,
            touched: end == start,
            start,
            end,
        }
    }

    /// Extend this range in place to cover `other`
    ///
    /// Fails with `NotMergeable` when the ranges neither intersect nor touch.
    pub fn enroll(&mut self, other: &Range) -> Result<()> {
        *self = self.merged(other)?;
        Ok(())
    }

    /// The smallest range covering both, if they intersect or touch
    pub fn merged(&self, other: &Range) -> Result<Range> {
        let test = self.intersection_test(other);
        if !test.intersected && !test.touched {
            return Err(Error::NotMergeable(*self, *other));
        }
        Ok(Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
