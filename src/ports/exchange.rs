//! Exchange Port - Betting Exchange Interface
//!
//! Defines the trait the selection use case needs from a betting
//! exchange: order reports, market catalogue, order books, placement
//! and balance. One call per method invocation; no retries, no
//! batching across markets.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::bet::{BetOrder, ClearedOrder, OpenOrder, PlacementReport};
use crate::domain::market::{BookEntry, CompetitionId, Market};

/// Exchange-side failure.
#[derive(Debug, Error)]
pub enum ExchangeError {
  /// Login rejected, session invalid, or certificate material unusable.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// The venue declined an order.
  #[error("order rejected by exchange: {code}")]
  OrderRejected {
    /// Venue error code (e.g. `INSUFFICIENT_FUNDS`).
    code: String,
  },

  /// Non-success HTTP status.
  #[error("{operation} returned {status}: {body}")]
  Api {
    operation: String,
    status: u16,
    body: String,
  },

  /// The request never produced a response.
  #[error("{operation} request failed")]
  Transport {
    operation: String,
    #[source]
    source: reqwest::Error,
  },

  /// The response could not be understood.
  #[error("malformed {operation} response: {reason}")]
  Malformed { operation: String, reason: String },
}

/// Catalogue query for a single competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuery {
  pub competition_id: CompetitionId,
  /// Market type code, e.g. `MATCH_ODDS`.
  pub market_type: String,
  pub max_results: u32,
}

/// Trait for betting exchange providers.
///
/// Implementors hold an authenticated session for the lifetime of a
/// run. All methods are awaited one at a time by the caller.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
  /// All orders currently open on the account.
  async fn list_open_bets(&self) -> Result<Vec<OpenOrder>, ExchangeError>;

  /// All settled orders on the account.
  async fn list_settled_bets(&self) -> Result<Vec<ClearedOrder>, ExchangeError>;

  /// Market catalogue for one competition and market type.
  async fn list_market_catalogue(
    &self,
    query: &MarketQuery,
  ) -> Result<Vec<Market>, ExchangeError>;

  /// Best back and lay offers for a market.
  ///
  /// Returns no entries when the market is not open or is in-play.
  async fn list_book(&self, market: &Market) -> Result<Vec<BookEntry>, ExchangeError>;

  /// Place a single limit order.
  ///
  /// # Errors
  /// `ExchangeError::OrderRejected` when the venue reports a failure.
  async fn place_bet(&self, order: &BetOrder) -> Result<PlacementReport, ExchangeError>;

  /// Balance available to bet.
  async fn available_balance(&self) -> Result<f64, ExchangeError>;
}
