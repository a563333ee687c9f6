//! Selection - Sizing, Filtering and Picking the Best Candidate
//!
//! Each joined book entry is sized with fractional Kelly against the
//! bankroll, valued net of commission, filtered by the staking
//! thresholds, and the single highest expected value wins.

use std::collections::HashSet;

use crate::config::StakingConfig;
use crate::domain::bet::{Candidate, Side};
use crate::domain::market::{Market, MarketId};
use crate::domain::staking::{StakingError, expected_value, kelly_fraction, round_cents};

use super::matching::JoinedEntry;

/// Staking thresholds applied to every candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakingRules {
  /// Kelly multiplier (0.25 = quarter-Kelly).
  pub kelly_fraction: f64,
  /// Minimum back stake.
  pub min_bet: f64,
  /// Minimum lay liability.
  pub min_liability: f64,
  /// Expected value must be strictly greater than this.
  pub min_expected_value: f64,
}

impl From<&StakingConfig> for StakingRules {
  fn from(config: &StakingConfig) -> Self {
    Self {
      kelly_fraction: config.kelly_fraction,
      min_bet: config.min_bet,
      min_liability: config.min_liability(),
      min_expected_value: config.min_expected_value,
    }
  }
}

impl StakingRules {
  /// Size and value one joined entry.
  ///
  /// For a lay the bet wins when the selection loses, so the estimate
  /// is inverted. The Kelly fraction of the bankroll is the liability:
  /// the whole stake for a back, `stake * (price - 1)` for a lay.
  ///
  /// # Errors
  /// `StakingError::InvalidInput` when price or probability are out of
  /// domain; the caller skips the entry.
  pub fn evaluate(
    &self,
    market: &Market,
    joined: &JoinedEntry,
    bankroll: f64,
  ) -> Result<Candidate, StakingError> {
    let entry = &joined.entry;
    let probability = match entry.side {
      Side::Back => joined.probability,
      Side::Lay => 1.0 - joined.probability,
    };

    let kelly = kelly_fraction(probability, entry.price, self.kelly_fraction)?;
    let liability = kelly.max(0.0) * bankroll;
    let stake = round_cents(match entry.side {
      Side::Back => liability,
      Side::Lay => liability / (entry.price - 1.0),
    });
    let value = expected_value(
      stake,
      probability,
      entry.price,
      entry.commission_rate,
      entry.side,
    )?;

    Ok(Candidate {
      market_id: market.market_id.clone(),
      market_name: market.market_name.clone(),
      competition_id: market.competition_id,
      competition_name: market.competition_name.clone(),
      event_name: market.event_name.clone(),
      market_start_time: market.market_start_time,
      date: joined.date,
      selection_id: entry.selection_id,
      runner_name: market.runner_name(entry.selection_id).map(str::to_string),
      side: entry.side,
      price: entry.price,
      size: entry.size,
      commission_rate: entry.commission_rate,
      probability,
      kelly_fraction: kelly,
      liability,
      stake,
      expected_value: value,
    })
  }

  /// Whether a candidate clears the thresholds.
  pub fn accepts(&self, candidate: &Candidate) -> bool {
    if candidate.expected_value <= self.min_expected_value {
      return false;
    }
    match candidate.side {
      Side::Back => candidate.stake >= self.min_bet,
      Side::Lay => candidate.liability >= self.min_liability,
    }
  }
}

/// Highest expected value outside the already-bet markets.
///
/// On a tie the earlier candidate wins.
pub fn select_best(
  candidates: impl IntoIterator<Item = Candidate>,
  open_markets: &HashSet<MarketId>,
) -> Option<Candidate> {
  candidates
    .into_iter()
    .filter(|c| !open_markets.contains(&c.market_id))
    .fold(None, |best, candidate| match best {
      Some(best) if candidate.expected_value.total_cmp(&best.expected_value).is_le() => {
        Some(best)
      }
      _ => Some(candidate),
    })
}
