//! Error types for address, range and block operations

use crate::allocator::Range;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Parse errors
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid CIDR: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefix(String),

    // Range errors
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Cannot merge {0} with {1}: ranges neither intersect nor touch")]
    NotMergeable(Range, Range),

    // Allocation errors
    #[error("Range {range} is outside of boundary {boundary}")]
    OutOfBoundary { range: Range, boundary: Range },

    #[error("Range {candidate} overlaps allocated range {existing}")]
    Overlap { candidate: Range, existing: Range },

    #[error("Subnet already allocated: {subnet}")]
    AlreadyAllocated {
        subnet: String,
        #[source]
        source: Box<Error>,
    },

    // Subnet derivation errors
    #[error("Subnet prefix length /{0} leaves no room for hosts")]
    PrefixOverflow(u16),

    #[error("Subnet index out of range: {0}")]
    IndexOutOfRange(String),

    // Range to block conversion errors
    #[error("Range length {0} is not a power of two")]
    NotPowerOfTwo(u64),

    #[error("Range {0} is not aligned to a CIDR boundary")]
    MisalignedRange(Range),
}

impl Error {
    /// True for an overlap, including one wrapped by `AlreadyAllocated`
    pub fn is_overlap(&self) -> bool {
        match self {
            Error::Overlap { .. } => true,
            Error::AlreadyAllocated { source, .. } => source.is_overlap(),
            _ => false,
        }
    }
}

impl From<ipnet::PrefixLenError> for Error {
    fn from(e: ipnet::PrefixLenError) -> Self {
        Error::InvalidPrefix(e.to_string())
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(e: std::net::AddrParseError) -> Self {
        Error::InvalidAddress(e.to_string())
    }
}
