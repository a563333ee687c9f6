//! Value Bet Use Case - One Scan, At Most One Bet
//!
//! A single run:
//! 1. Optionally summarises settled bets
//! 2. Lists open bets; their markets are never bet again
//! 3. Reads the bankroll once
//! 4. Scans markets and books lazily, joins them with the estimates
//! 5. Sizes, values and filters every joined entry
//! 6. Places the highest expected value candidate (unless dry-run)
//!    and persists the placed-bet record
//!
//! Failures for one competition, one market or one entry are logged
//! and skipped. Failures listing open bets, reading the balance,
//! placing the bet or persisting it abort the run.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, MarketsConfig};
use crate::config::loader::reference_timezone;
use crate::domain::bet::{Candidate, PlacedBetRecord};
use crate::domain::market::{CompetitionId, MarketId};
use crate::ports::{BetStore, Exchange};

use super::matching::{EstimateIndex, MergeMismatch, UnresolvedSelection};
use super::scan::{BookScan, MarketScan};
use super::selection::{StakingRules, select_best};
use super::settlement::SettledSummary;

/// Outcome of a run, printed as JSON at the end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub dry_run: bool,
  pub bankroll: f64,
  /// Markets with open bets, excluded from selection.
  pub open_markets: usize,
  pub competitions: Vec<CompetitionId>,
  /// Markets with a non-empty book that were matched against estimates.
  pub markets_scanned: usize,
  /// Competitions or markets skipped after a venue failure.
  pub scan_failures: usize,
  /// Entries sized successfully.
  pub candidates: usize,
  /// Candidates clearing the staking thresholds.
  pub eligible: usize,
  pub selected: Option<Candidate>,
  pub placed: Option<PlacedBetRecord>,
  /// Object key of the persisted record.
  pub object_key: Option<String>,
  pub mismatches: Vec<MergeMismatch>,
  pub unresolved: Vec<UnresolvedSelection>,
  pub settled: Option<SettledSummary>,
}

/// Orchestrates a value-bet run over an exchange and a bet store.
pub struct BetSelector<E: Exchange + ?Sized, S: BetStore + ?Sized> {
  exchange: Arc<E>,
  store: Arc<S>,
  rules: StakingRules,
  markets: MarketsConfig,
  timezone: Tz,
  dry_run: bool,
}

impl<E: Exchange + ?Sized, S: BetStore + ?Sized> BetSelector<E, S> {
  /// Build a selector from the application config.
  pub fn new(exchange: Arc<E>, store: Arc<S>, config: &AppConfig) -> Result<Self> {
    Ok(Self {
      exchange,
      store,
      rules: StakingRules::from(&config.staking),
      markets: config.markets.clone(),
      timezone: reference_timezone(config)?,
      dry_run: config.bot.dry_run,
    })
  }

  /// Run once, with the scan horizon counted from now.
  pub async fn run(&self, index: &EstimateIndex) -> Result<RunReport> {
    self.run_at(index, Utc::now()).await
  }

  /// Run once, with the scan horizon counted from `now`.
  #[instrument(skip(self, index), fields(dry_run = self.dry_run))]
  pub async fn run_at(&self, index: &EstimateIndex, now: DateTime<Utc>) -> Result<RunReport> {
    let mut report = RunReport {
      dry_run: self.dry_run,
      unresolved: index.unresolved().to_vec(),
      ..RunReport::default()
    };

    if self.markets.report_settled {
      report.settled = self.settled_summary().await;
    }

    let open_markets: HashSet<MarketId> = self
      .exchange
      .list_open_bets()
      .await
      .context("Failed to list open bets")?
      .into_iter()
      .map(|order| order.market_id)
      .collect();
    report.open_markets = open_markets.len();

    let bankroll = self
      .exchange
      .available_balance()
      .await
      .context("Failed to read available balance")?;
    report.bankroll = bankroll;

    report.competitions = if self.markets.competition_ids.is_empty() {
      index.competition_ids()
    } else {
      self.markets.competition_ids.clone()
    };

    info!(
      bankroll,
      open_markets = open_markets.len(),
      competitions = report.competitions.len(),
      "Starting market scan"
    );

    let eligible = self
      .scan(index, bankroll, &open_markets, now, &mut report)
      .await;
    report.eligible = eligible.len();

    let Some(best) = select_best(eligible, &open_markets) else {
      info!(
        candidates = report.candidates,
        "No candidate cleared the staking thresholds"
      );
      return Ok(report);
    };

    info!(
      market_id = %best.market_id,
      selection_id = best.selection_id,
      side = %best.side,
      price = best.price,
      stake = best.stake,
      expected_value = best.expected_value,
      "Best candidate selected"
    );
    report.selected = Some(best.clone());

    if self.dry_run {
      info!("Dry run, not placing");
      return Ok(report);
    }

    let placement = self
      .exchange
      .place_bet(&best.to_order())
      .await
      .context("Failed to place bet")?;
    let record = PlacedBetRecord::new(best, placement);
    let key = self
      .store
      .save_bet(&record)
      .await
      .with_context(|| format!("Failed to persist bet {}", record.bet_id))?;

    report.object_key = Some(key);
    report.placed = Some(record);
    Ok(report)
  }

  /// Walk every book and collect the candidates clearing the thresholds.
  async fn scan(
    &self,
    index: &EstimateIndex,
    bankroll: f64,
    open_markets: &HashSet<MarketId>,
    now: DateTime<Utc>,
    report: &mut RunReport,
  ) -> Vec<Candidate> {
    let markets = MarketScan::from_config(
      &*self.exchange,
      report.competitions.clone(),
      &self.markets,
      now,
    );
    let mut books = BookScan::new(markets, open_markets.clone());
    let mut eligible = Vec::new();

    while let Some(item) = books.next().await {
      let book = match item {
        Ok(book) => book,
        Err(e) => {
          let cause = std::error::Error::source(&e)
            .map(ToString::to_string)
            .unwrap_or_default();
          warn!(error = %e, %cause, "Scan item skipped");
          report.scan_failures += 1;
          continue;
        }
      };
      report.markets_scanned += 1;

      let joined = match index.join(&book.market, &book.entries, self.timezone) {
        Ok(joined) => joined,
        Err(mismatch) => {
          debug!(%mismatch, "Market skipped");
          report.mismatches.push(mismatch);
          continue;
        }
      };

      for entry in &joined {
        match self.rules.evaluate(&book.market, entry, bankroll) {
          Ok(candidate) => {
            report.candidates += 1;
            if self.rules.accepts(&candidate) {
              eligible.push(candidate);
            }
          }
          Err(e) => warn!(
            market_id = %book.market.market_id,
            selection_id = entry.entry.selection_id,
            error = %e,
            "Entry skipped"
          ),
        }
      }
    }

    eligible
  }

  async fn settled_summary(&self) -> Option<SettledSummary> {
    match self.exchange.list_settled_bets().await {
      Ok(orders) => Some(SettledSummary::from_orders(&orders)),
      Err(e) => {
        warn!(error = %e, "Settled bets unavailable");
        None
      }
    }
  }
}
