//! Settlement Use Case - Summary of Settled Bets
//!
//! Aggregates the account's cleared orders into a compact report:
//! how many bets settled, how many won or lost, and the profit and
//! commission they produced.

use serde::Serialize;
use tracing::info;

use crate::domain::bet::ClearedOrder;

/// Aggregated outcome of settled bets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettledSummary {
  /// Settled bets considered.
  pub bets: usize,
  /// Bets with outcome `WON`.
  pub won: usize,
  /// Bets with outcome `LOST`.
  pub lost: usize,
  /// Net profit, as reported per bet.
  pub total_profit: f64,
  /// Commission paid.
  pub total_commission: f64,
  /// Share of decided bets that were won, if any were decided.
  pub strike_rate: Option<f64>,
}

impl SettledSummary {
  /// Summarise a set of cleared orders.
  pub fn from_orders(orders: &[ClearedOrder]) -> Self {
    let mut summary = orders.iter().fold(Self::default(), |mut acc, order| {
      acc.bets += 1;
      match order.bet_outcome.as_str() {
        "WON" => acc.won += 1,
        "LOST" => acc.lost += 1,
        _ => {}
      }
      acc.total_profit += order.profit;
      acc.total_commission += order.commission;
      acc
    });
    let decided = summary.won + summary.lost;
    summary.strike_rate = (decided > 0).then(|| summary.won as f64 / decided as f64);

    info!(
      bets = summary.bets,
      won = summary.won,
      lost = summary.lost,
      profit = summary.total_profit,
      commission = summary.total_commission,
      strike_rate = ?summary.strike_rate,
      "Settled bets summarised"
    );
    summary
  }
}
