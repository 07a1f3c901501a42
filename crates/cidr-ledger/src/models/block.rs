//! CIDR blocks and the subnets allocated out of them

use super::address::{Address, AddressSpan};
use crate::allocator::{FreeSpace, Range, RangeSet};
use crate::config::{BatchMode, LedgerConfig};
use crate::report::FreeSpaceReport;
use crate::{Error, Result};
use ipnet::Ipv4Net;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Longest prefix that still has usable host addresses
const MAX_HOST_PREFIX: u8 = 30;

/// First and last usable host addresses of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostRange {
    pub first: Address,
    pub last: Address,
}

/// An IPv4 CIDR block that tracks which of its sub-ranges are allocated
///
/// The address given at construction is kept as-is; host bits are only
/// dropped when the block is displayed or its span is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    net: Ipv4Net,
    config: LedgerConfig,
    allocations: RangeSet,
}

impl Block {
    /// Create a block with the default configuration
    pub fn new(address: Address, prefix_len: u8) -> Result<Self> {
        Self::with_config(address, prefix_len, LedgerConfig::default())
    }

    pub fn with_config(address: Address, prefix_len: u8, config: LedgerConfig) -> Result<Self> {
        let net = Ipv4Net::new(address.into(), prefix_len)?;
        Ok(Self::from_net(net, config))
    }

    fn from_net(net: Ipv4Net, config: LedgerConfig) -> Self {
        let network = u64::from(u32::from(net.network()));
        let boundary = Range::from_bounds(network, network + (1u64 << (32 - net.prefix_len())));
        Self {
            net,
            config,
            allocations: RangeSet::new(boundary),
        }
    }

    /// Re-express an address range as the block spanning exactly that range
    ///
    /// The length must be a power of two and the range must start on a
    /// boundary of that size.
    pub fn from_range(range: &Range) -> Result<Self> {
        let length = range.length();
        if !length.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(length));
        }

        let prefix_len = 32 - length.trailing_zeros() as u8;
        let block = Self::new(Address::try_from_u64(range.start())?, prefix_len)?;
        if block.span() != *range {
            return Err(Error::MisalignedRange(*range));
        }
        Ok(block)
    }

    /// Address as given at construction
    pub fn address(&self) -> Address {
        self.net.addr().into()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of addresses covered, `2^(32 - prefix)`
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - self.prefix_len())
    }

    pub fn network_address(&self) -> Address {
        self.net.network().into()
    }

    pub fn broadcast_address(&self) -> Address {
        self.net.broadcast().into()
    }

    pub fn mask(&self) -> Address {
        self.net.netmask().into()
    }

    /// Addresses excluding network and broadcast
    pub fn usable_address_count(&self) -> u64 {
        self.address_count().saturating_sub(2)
    }

    /// `None` for /31 and /32, which have no usable hosts
    pub fn host_range(&self) -> Option<HostRange> {
        if self.prefix_len() > MAX_HOST_PREFIX {
            return None;
        }
        Some(HostRange {
            first: Address::new(self.network_address().value() + 1),
            last: Address::new(self.broadcast_address().value() - 1),
        })
    }

    pub fn first_usable_address(&self) -> Option<Address> {
        self.host_range().map(|hosts| hosts.first)
    }

    pub fn last_usable_address(&self) -> Option<Address> {
        self.host_range().map(|hosts| hosts.last)
    }

    /// The block as a normalized `Ipv4Net`
    pub fn to_ipv4_net(&self) -> Ipv4Net {
        self.net.trunc()
    }

    /// Check if an address or block lies entirely within this block
    pub fn contains<T: AddressSpan + ?Sized>(&self, item: &T) -> bool {
        self.span().includes(&item.span())
    }

    /// Allocation state of this block
    pub fn allocations(&self) -> &RangeSet {
        &self.allocations
    }

    pub fn free_space(&self) -> FreeSpace {
        self.allocations.available_ranges()
    }

    /// Split off equally sized child blocks without recording them
    ///
    /// Children have prefix `prefix_len + prefix_increment` and are taken
    /// from indices `[start, end)`. Negative indices count back from the
    /// number of children; `end = None` means the last child.
    pub fn make_subnets(
        &self,
        prefix_increment: u8,
        start: i64,
        end: Option<i64>,
    ) -> Result<Vec<Block>> {
        let subnet_prefix = u16::from(self.prefix_len()) + u16::from(prefix_increment);
        if subnet_prefix >= 32 {
            return Err(Error::PrefixOverflow(subnet_prefix));
        }

        let subnet_size = 1u64 << (32 - subnet_prefix);
        let count = (self.address_count() / subnet_size) as i64;

        let start = if start < 0 { start + count } else { start };
        let end = match end {
            Some(end) if end < 0 => end + count,
            Some(end) => end,
            None => count,
        };

        if start < 0 || start >= count {
            return Err(Error::IndexOutOfRange(format!(
                "start index {} outside 0..{}",
                start, count
            )));
        }
        if end < 0 || end > count {
            return Err(Error::IndexOutOfRange(format!(
                "end index {} outside 0..={}",
                end, count
            )));
        }
        if end <= start {
            return Err(Error::IndexOutOfRange(format!(
                "empty index range {}..{}",
                start, end
            )));
        }

        let network = u64::from(self.network_address().value());
        (start..end)
            .map(|index| {
                let address = Address::try_from_u64(network + index as u64 * subnet_size)?;
                Block::with_config(address, subnet_prefix as u8, self.config)
            })
            .collect()
    }

    /// Split off child blocks and record them as allocated
    ///
    /// A conflicting child fails with `AlreadyAllocated`. Under
    /// [`BatchMode::Atomic`] nothing from the batch is recorded on failure;
    /// under [`BatchMode::Partial`] children before the conflict stay recorded.
    #[instrument(skip(self), fields(block = %self))]
    pub fn allocate_subnets(
        &mut self,
        prefix_increment: u8,
        start: i64,
        end: Option<i64>,
    ) -> Result<Vec<Block>> {
        let subnets = self.make_subnets(prefix_increment, start, end)?;

        match self.config.batch_mode {
            BatchMode::Atomic => {
                let mut staged = self.allocations.clone();
                for subnet in &subnets {
                    staged
                        .insert(subnet.span())
                        .map_err(|e| Self::already_allocated(subnet, e))?;
                }
                self.allocations = staged;
            }
            BatchMode::Partial => {
                for subnet in &subnets {
                    self.allocations
                        .insert(subnet.span())
                        .map_err(|e| Self::already_allocated(subnet, e))?;
                }
            }
        }

        debug!(count = subnets.len(), "Allocated subnets");
        Ok(subnets)
    }

    /// Record an externally built block as allocated
    pub fn take(&mut self, block: &Block) -> Result<()> {
        self.allocations.insert(block.span()).map_err(|e| {
            if e.is_overlap() {
                Self::already_allocated(block, e)
            } else {
                e
            }
        })?;
        debug!(block = %self, taken = %block, "Recorded block");
        Ok(())
    }

    fn already_allocated(subnet: &Block, source: Error) -> Error {
        Error::AlreadyAllocated {
            subnet: subnet.to_string(),
            source: Box::new(source),
        }
    }

    /// Human-readable listing of the unallocated ranges
    pub fn describe_free_space(&self) -> FreeSpaceReport {
        FreeSpaceReport::from_free_space(&self.free_space())
    }
}

impl AddressSpan for Block {
    fn span(&self) -> Range {
        self.allocations.boundary()
    }
}

impl AddressSpan for Ipv4Net {
    fn span(&self) -> Range {
        let network = u64::from(u32::from(self.network()));
        Range::from_bounds(network, u64::from(u32::from(self.broadcast())) + 1)
    }
}

impl AddressSpan for Ipv4Addr {
    fn span(&self) -> Range {
        Address::from(*self).span()
    }
}

impl From<Ipv4Net> for Block {
    fn from(net: Ipv4Net) -> Self {
        Self::from_net(net, LedgerConfig::default())
    }
}

impl FromStr for Block {
    type Err = Error;

    /// Parse `a.b.c.d/p`
    fn from_str(s: &str) -> Result<Self> {
        let (address, prefix) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidCidr(format!("{}: missing prefix length", s)))?;

        let address = Address::from_str(address)
            .map_err(|e| Error::InvalidCidr(format!("{}: {}", s, e)))?;

        if prefix.is_empty() || prefix.len() > 2 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCidr(format!("{}: malformed prefix length", s)));
        }
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|_| Error::InvalidCidr(format!("{}: malformed prefix length", s)))?;
        if prefix_len > 32 {
            return Err(Error::InvalidPrefix(s.to_string()));
        }

        Self::new(address, prefix_len)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_address(), self.prefix_len())
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
