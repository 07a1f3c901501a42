//! Interval bookkeeping for address allocation
//!
//! Provides:
//! - Half-open ranges over the IPv4 value space
//! - An ordered, coalescing set of allocated ranges with free-space queries

mod range;
mod range_set;

pub use range::{IntersectionTest, Range, ADDRESS_SPACE_END};
pub use range_set::{FreeSpace, RangeSet};
