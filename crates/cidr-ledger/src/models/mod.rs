//! Address and CIDR block models

mod address;
mod block;

pub use address::{Address, AddressSpan};
pub use block::{Block, HostRange};
