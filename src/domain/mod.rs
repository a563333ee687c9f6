//! Domain layer - Core business logic and models.
//!
//! Pure staking math plus the records that flow between the exchange,
//! the probability datasets and the selection use case.
//! No I/O here (hexagonal architecture inner ring).

pub mod bet;
pub mod market;
pub mod probability;
pub mod staking;

// Re-export core types for convenience
pub use bet::{
    BetId, BetOrder, Candidate, ClearedOrder, OpenOrder, PlacedBetRecord, PlacementReport, Side,
};
pub use market::{BookEntry, CompetitionId, Market, MarketBook, MarketId, Runner, SelectionId};
pub use probability::{ProbabilityEstimate, SelectionLookup, SelectionRef};
pub use staking::{StakingError, expected_value, kelly_fraction, round_cents};
