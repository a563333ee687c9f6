//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the bot's workflow. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `MarketScan` / `BookScan`: Lazy catalogue and book enumeration
//! - `EstimateIndex`: Joining book entries with probability estimates
//! - `StakingRules`: Candidate sizing, filtering and best pick
//! - `SettledSummary`: Settled-bet reporting
//! - `BetSelector`: One value-bet run end to end

pub mod matching;
pub mod scan;
pub mod selection;
pub mod settlement;
pub mod value_bet;

pub use matching::{EstimateIndex, JoinedEntry, MergeMismatch, UnresolvedSelection};
pub use scan::{BookScan, MarketScan, ScanError};
pub use selection::{StakingRules, select_best};
pub use settlement::SettledSummary;
pub use value_bet::{BetSelector, RunReport};
