//! Ledger configuration

use serde::{Deserialize, Serialize};

/// How a multi-subnet allocation behaves when one subnet conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Commit the batch only if every subnet can be recorded
    #[default]
    Atomic,
    /// Keep subnets recorded before the conflict
    Partial,
}

/// Configuration for a [`Block`](crate::Block) ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Conflict handling for `allocate_subnets`
    pub batch_mode: BatchMode,
}

impl LedgerConfig {
    /// Configuration that keeps partially applied batches
    pub fn partial() -> Self {
        Self {
            batch_mode: BatchMode::Partial,
        }
    }
}
