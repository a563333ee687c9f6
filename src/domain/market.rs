//! Exchange market snapshots.
//!
//! Read-only views of what the exchange reported at fetch time.
//! Nothing here is persisted; a fresh snapshot is taken every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bet::Side;

// ────────────────────────────────────────────
// Identifier aliases shared by ports and adapters
// ────────────────────────────────────────────

/// Exchange market identifier (e.g. `1.234567890`).
pub type MarketId = String;

/// Exchange runner / selection identifier.
pub type SelectionId = u64;

/// Exchange competition identifier.
pub type CompetitionId = u64;

/// A runner listed in a market catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub selection_id: SelectionId,
    pub runner_name: String,
}

/// A market catalogue entry, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_id: MarketId,
    pub market_name: String,
    pub competition_id: CompetitionId,
    pub competition_name: String,
    pub event_name: String,
    pub market_start_time: DateTime<Utc>,
    /// Commission charged on net winnings, as a fraction (0.05 = 5%).
    pub commission_rate: f64,
    pub total_matched: f64,
    pub runners: Vec<Runner>,
}

impl Market {
    /// Name of the runner with the given selection, if catalogued.
    pub fn runner_name(&self, selection_id: SelectionId) -> Option<&str> {
        self.runners
            .iter()
            .find(|r| r.selection_id == selection_id)
            .map(|r| r.runner_name.as_str())
    }
}

/// Best available offer on one side of one runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    /// Best decimal price on this side.
    pub price: f64,
    /// Size available at that price.
    pub size: f64,
    pub commission_rate: f64,
}

/// A market together with its viable book entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBook {
    pub market: Market,
    pub entries: Vec<BookEntry>,
}
