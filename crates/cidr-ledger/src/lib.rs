//! CIDR Ledger
//!
//! Models IPv4 addresses and CIDR blocks and tracks which parts of a block
//! have been handed out:
//! - Dotted-decimal and CIDR text parsing and formatting
//! - Network, broadcast, mask and host-range arithmetic
//! - Subnet enumeration with slice-style indices
//! - An ordered interval ledger that coalesces adjacent allocations,
//!   rejects overlaps and enumerates free space
//!
//! # Example
//!
//! ```
//! use cidr_ledger::Block;
//!
//! let mut block: Block = "10.0.0.0/24".parse().unwrap();
//! block.allocate_subnets(2, 0, Some(1)).unwrap();
//! block.allocate_subnets(2, 2, Some(3)).unwrap();
//!
//! let free: Vec<String> = block
//!     .describe_free_space()
//!     .aligned_blocks()
//!     .map(|net| net.to_string())
//!     .collect();
//! assert_eq!(free, ["10.0.0.64/26", "10.0.0.192/26"]);
//! ```

pub mod allocator;
pub mod config;
pub mod error;
pub mod models;
pub mod report;

// Re-export core types
pub use allocator::{FreeSpace, IntersectionTest, Range, RangeSet};
pub use config::{BatchMode, LedgerConfig};
pub use error::{Error, Result};
pub use models::{Address, AddressSpan, Block, HostRange};
pub use report::{FreeSpaceLine, FreeSpaceReport};
