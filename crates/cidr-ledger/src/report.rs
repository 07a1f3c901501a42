//! Free-space report for a block
//!
//! Presentation only: each gap becomes one line, annotated with CIDR
//! notation when the gap happens to align to a block boundary.

use crate::allocator::{FreeSpace, Range};
use crate::models::{Address, Block};
use ipnet::Ipv4Net;
use serde::Serialize;
use std::fmt;

/// One unallocated range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSpaceLine {
    /// First free address
    pub first: Address,
    /// Last free address (inclusive)
    pub last: Address,
    /// Number of free addresses
    pub length: u64,
    /// The gap as a CIDR block, if it aligns to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr: Option<Ipv4Net>,
}

impl FreeSpaceLine {
    fn from_gap(gap: &Range) -> Self {
        Self {
            first: Address::new(gap.start() as u32),
            last: Address::new((gap.end() - 1) as u32),
            length: gap.length(),
            cidr: Block::from_range(gap).ok().map(|b| b.to_ipv4_net()),
        }
    }
}

impl fmt::Display for FreeSpaceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.first, self.last, self.length)?;
        if let Some(cidr) = &self.cidr {
            write!(f, " ({})", cidr)?;
        }
        Ok(())
    }
}

/// All unallocated ranges of a block plus their total size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSpaceReport {
    pub lines: Vec<FreeSpaceLine>,
    pub total: u64,
}

impl FreeSpaceReport {
    pub fn from_free_space(free: &FreeSpace) -> Self {
        Self {
            // Gaps are never empty, so `end - 1` stays within the gap.
            lines: free.ranges.iter().map(FreeSpaceLine::from_gap).collect(),
            total: free.total,
        }
    }

    /// Gaps that can be written as a single CIDR block
    pub fn aligned_blocks(&self) -> impl Iterator<Item = Ipv4Net> + '_ {
        self.lines.iter().filter_map(|line| line.cidr)
    }
}

impl fmt::Display for FreeSpaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        write!(f, "total ({})", self.total)
    }
}
