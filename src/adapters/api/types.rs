//! Betfair API Request/Response Types
//!
//! Serialization types for the Betfair Exchange JSON REST API
//! (identity, betting and account endpoints). Field names follow the
//! API's camelCase; optional fields default so that partial
//! projections still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────

/// Response from the certificate login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  /// Session token, present on success.
  #[serde(default)]
  pub session_token: Option<String>,
  /// `SUCCESS` or a failure reason such as `INVALID_USERNAME_OR_PASSWORD`.
  pub login_status: String,
}

// ────────────────────────────────────────────
// Market catalogue
// ────────────────────────────────────────────

/// Market catalogue entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCatalogue {
  pub market_id: String,
  pub market_name: String,
  #[serde(default)]
  pub market_start_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub description: Option<MarketDescription>,
  #[serde(default)]
  pub total_matched: Option<f64>,
  #[serde(default)]
  pub runners: Vec<RunnerCatalogue>,
  #[serde(default)]
  pub competition: Option<CompetitionInfo>,
  #[serde(default)]
  pub event: Option<EventInfo>,
}

/// `MARKET_DESCRIPTION` projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDescription {
  /// Commission in percent (5.0 = 5%).
  #[serde(default)]
  pub market_base_rate: Option<f64>,
  #[serde(default)]
  pub market_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub suspend_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub market_type: Option<String>,
}

/// `COMPETITION` projection.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionInfo {
  pub id: String,
  pub name: String,
}

/// `EVENT` projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub open_date: Option<DateTime<Utc>>,
}

/// `RUNNER_DESCRIPTION` projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerCatalogue {
  pub selection_id: u64,
  pub runner_name: String,
  #[serde(default)]
  pub sort_priority: Option<u32>,
}

// ────────────────────────────────────────────
// Market book
// ────────────────────────────────────────────

/// Market book with best offers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBookResponse {
  pub market_id: String,
  /// `OPEN`, `SUSPENDED`, `CLOSED` or `INACTIVE`.
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub inplay: Option<bool>,
  #[serde(default)]
  pub runners: Vec<RunnerBook>,
}

/// Runner prices within a market book.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerBook {
  pub selection_id: u64,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub ex: Option<ExchangePrices>,
}

/// Available offers, best first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePrices {
  #[serde(default)]
  pub available_to_back: Vec<PriceSize>,
  #[serde(default)]
  pub available_to_lay: Vec<PriceSize>,
}

/// A price level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceSize {
  pub price: f64,
  pub size: f64,
}

// ────────────────────────────────────────────
// Orders
// ────────────────────────────────────────────

/// `placeOrders` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrdersRequest {
  pub market_id: String,
  pub instructions: Vec<PlaceInstruction>,
}

/// A single placement instruction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInstruction {
  /// Always `LIMIT`.
  pub order_type: String,
  pub selection_id: u64,
  /// `BACK` or `LAY`.
  pub side: String,
  pub limit_order: LimitOrder,
}

/// Limit order parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrder {
  pub size: f64,
  pub price: f64,
  /// `LAPSE`: unmatched remainder is cancelled when the market turns in-play.
  pub persistence_type: String,
}

/// `placeOrders` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceExecutionReport {
  /// `SUCCESS`, `FAILURE`, `PROCESSED_WITH_ERRORS` or `TIMEOUT`.
  pub status: String,
  #[serde(default)]
  pub error_code: Option<String>,
  #[serde(default)]
  pub market_id: Option<String>,
  #[serde(default)]
  pub instruction_reports: Vec<PlaceInstructionReport>,
}

/// Per-instruction outcome.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInstructionReport {
  pub status: String,
  #[serde(default)]
  pub error_code: Option<String>,
  #[serde(default)]
  pub bet_id: Option<String>,
  #[serde(default)]
  pub placed_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub average_price_matched: Option<f64>,
  #[serde(default)]
  pub size_matched: Option<f64>,
}

/// `listCurrentOrders` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderSummaryReport {
  #[serde(default)]
  pub current_orders: Vec<CurrentOrderSummary>,
  #[serde(default)]
  pub more_available: bool,
}

/// An open order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderSummary {
  pub bet_id: String,
  pub market_id: String,
  pub selection_id: u64,
  pub side: String,
  pub price_size: PriceSize,
  /// `EXECUTABLE` or `EXECUTION_COMPLETE`.
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub placed_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub size_matched: Option<f64>,
  #[serde(default)]
  pub size_remaining: Option<f64>,
}

/// `listClearedOrders` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedOrderSummaryReport {
  #[serde(default)]
  pub cleared_orders: Vec<ClearedOrderSummary>,
  #[serde(default)]
  pub more_available: bool,
}

/// A settled order. Every field is optional in the API because the
/// report can be rolled up.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedOrderSummary {
  #[serde(default)]
  pub bet_id: Option<String>,
  #[serde(default)]
  pub market_id: Option<String>,
  #[serde(default)]
  pub selection_id: Option<u64>,
  #[serde(default)]
  pub side: Option<String>,
  #[serde(default)]
  pub bet_outcome: Option<String>,
  #[serde(default)]
  pub price_matched: Option<f64>,
  #[serde(default)]
  pub size_settled: Option<f64>,
  #[serde(default)]
  pub profit: Option<f64>,
  #[serde(default)]
  pub commission: Option<f64>,
  #[serde(default)]
  pub settled_date: Option<DateTime<Utc>>,
}

// ────────────────────────────────────────────
// Account
// ────────────────────────────────────────────

/// `getAccountFunds` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFundsResponse {
  pub available_to_bet_balance: f64,
  #[serde(default)]
  pub exposure: Option<f64>,
}
