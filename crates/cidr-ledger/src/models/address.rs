//! IPv4 address as a 32-bit value

use crate::allocator::Range;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Anything that covers a contiguous span of addresses
pub trait AddressSpan {
    /// The covered addresses as a half-open range
    fn span(&self) -> Range;
}

/// An IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u32);

impl Address {
    pub const MIN: Address = Address(0);
    pub const MAX: Address = Address(u32::MAX);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Convert a wider integer, failing outside `[0, 2^32)`
    pub fn try_from_u64(value: u64) -> Result<Self> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidAddress(format!("{} is out of range", value)))
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// The following address; fails at `255.255.255.255`
    pub fn next(&self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| Error::InvalidAddress(format!("no address after {}", self)))
    }

    /// The preceding address; fails at `0.0.0.0`
    pub fn prev(&self) -> Result<Self> {
        self.0
            .checked_sub(1)
            .map(Self)
            .ok_or_else(|| Error::InvalidAddress(format!("no address before {}", self)))
    }
}

impl AddressSpan for Address {
    fn span(&self) -> Range {
        let start = u64::from(self.0);
        Range::from_bounds(start, start + 1)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl From<[u8; 4]> for Address {
    fn from(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(u32::from(ip))
    }
}

impl From<Address> for Ipv4Addr {
    fn from(addr: Address) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parse canonical dotted-decimal text (no leading zeros)
    fn from_str(s: &str) -> Result<Self> {
        let ip = Ipv4Addr::from_str(s)
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", s, e)))?;
        Ok(ip.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
