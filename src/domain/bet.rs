//! Bet types: sides, candidates, orders and placement records.
//!
//! Exposes two groups:
//! - Derived values (`Candidate`, `PlacedBetRecord`) produced by the
//!   selection use case and persisted after placement
//! - Venue reports (`OpenOrder`, `ClearedOrder`, `PlacementReport`)
//!   returned through the exchange port

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::market::{CompetitionId, MarketId, SelectionId};
use super::staking::StakingError;

/// Exchange bet identifier.
pub type BetId = String;

/// Back (the outcome happens) or lay (it does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Back,
    Lay,
}

impl Side {
    /// Wire representation used by the exchange (`BACK` / `LAY`).
    pub const fn as_venue_str(self) -> &'static str {
        match self {
            Self::Back => "BACK",
            Self::Lay => "LAY",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Back => write!(f, "back"),
            Self::Lay => write!(f, "lay"),
        }
    }
}

impl FromStr for Side {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("back") {
            Ok(Self::Back)
        } else if s.eq_ignore_ascii_case("lay") {
            Ok(Self::Lay)
        } else {
            Err(StakingError::InvalidInput(format!(
                "invalid side '{s}', accepted values are 'back' and 'lay'"
            )))
        }
    }
}

/// A sized bet on one book entry, before any filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub market_id: MarketId,
    pub market_name: String,
    pub competition_id: CompetitionId,
    pub competition_name: String,
    pub event_name: String,
    pub market_start_time: DateTime<Utc>,
    /// Calendar date of the event in the reference timezone.
    pub date: NaiveDate,
    pub selection_id: SelectionId,
    pub runner_name: Option<String>,
    pub side: Side,
    pub price: f64,
    /// Size available at `price` when the book was read.
    pub size: f64,
    pub commission_rate: f64,
    /// Probability of this bet winning (already inverted for lay).
    pub probability: f64,
    pub kelly_fraction: f64,
    pub liability: f64,
    pub stake: f64,
    pub expected_value: f64,
}

impl Candidate {
    /// The order that would place this candidate.
    pub fn to_order(&self) -> BetOrder {
        BetOrder {
            market_id: self.market_id.clone(),
            selection_id: self.selection_id,
            side: self.side,
            stake: self.stake,
            price: self.price,
        }
    }
}

/// A limit order instruction sent to the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetOrder {
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    pub stake: f64,
    pub price: f64,
}

/// What the exchange reported after accepting an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub bet_id: BetId,
    pub placed_date: DateTime<Utc>,
    pub average_price_matched: Option<f64>,
    pub size_matched: Option<f64>,
    /// Instruction status as reported by the venue (e.g. `SUCCESS`).
    pub status: String,
}

/// System-of-record entry for a placed bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBetRecord {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub placed_at: DateTime<Utc>,
    pub bet_id: BetId,
    pub status: String,
}

impl PlacedBetRecord {
    /// Combine a candidate with its placement report.
    pub fn new(candidate: Candidate, report: PlacementReport) -> Self {
        Self {
            candidate,
            placed_at: report.placed_date,
            bet_id: report.bet_id,
            status: report.status.to_lowercase(),
        }
    }
}

/// An unsettled order currently on the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub bet_id: BetId,
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    pub price: f64,
    pub size: f64,
    pub size_matched: f64,
    pub size_remaining: f64,
    pub status: String,
    pub placed_date: Option<DateTime<Utc>>,
}

/// A settled order from the exchange's cleared-orders report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearedOrder {
    pub bet_id: BetId,
    pub market_id: MarketId,
    pub selection_id: SelectionId,
    pub side: Side,
    /// `WON` / `LOST` / `PLACE` as reported.
    pub bet_outcome: String,
    pub price_matched: f64,
    pub size_settled: f64,
    pub profit: f64,
    pub commission: f64,
    pub settled_date: Option<DateTime<Utc>>,
}
