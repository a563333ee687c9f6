//! Market Scan - Lazy Catalogue and Book Enumeration
//!
//! `MarketScan` walks the configured competitions one catalogue call at
//! a time and yields markets starting inside the horizon. `BookScan`
//! layers one book call per market on top and yields only markets with
//! at least one viable book entry.
//!
//! Both are single-pass: once exhausted they keep returning `None`.
//! Build a new scan to start over. A failure for one competition or
//! one market is yielded as an error item and the scan carries on with
//! the next one.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::debug;

use crate::config::MarketsConfig;
use crate::domain::market::{CompetitionId, Market, MarketBook, MarketId};
use crate::ports::{Exchange, ExchangeError, MarketQuery};

/// A failure for one item of a scan.
#[derive(Debug, Error)]
pub enum ScanError {
  #[error("market catalogue for competition {competition_id} failed")]
  Catalogue {
    competition_id: CompetitionId,
    #[source]
    source: ExchangeError,
  },

  #[error("market book for {market_id} failed")]
  Book {
    market_id: MarketId,
    #[source]
    source: ExchangeError,
  },
}

/// Lazy sequence of markets across competitions.
pub struct MarketScan<'a, E: Exchange + ?Sized> {
  exchange: &'a E,
  pending: VecDeque<CompetitionId>,
  buffered: VecDeque<Market>,
  market_type: String,
  max_results: u32,
  /// Markets starting after this are dropped.
  cutoff: DateTime<Utc>,
}

impl<'a, E: Exchange + ?Sized> MarketScan<'a, E> {
  pub fn new(
    exchange: &'a E,
    competition_ids: impl IntoIterator<Item = CompetitionId>,
    market_type: impl Into<String>,
    max_results: u32,
    cutoff: DateTime<Utc>,
  ) -> Self {
    Self {
      exchange,
      pending: competition_ids.into_iter().collect(),
      buffered: VecDeque::new(),
      market_type: market_type.into(),
      max_results,
      cutoff,
    }
  }

  /// Scan using the market settings, with the horizon counted from `now`.
  ///
  /// A horizon beyond chrono's range saturates at the latest
  /// representable time.
  pub fn from_config(
    exchange: &'a E,
    competition_ids: impl IntoIterator<Item = CompetitionId>,
    config: &MarketsConfig,
    now: DateTime<Utc>,
  ) -> Self {
    Self::new(
      exchange,
      competition_ids,
      config.market_type.clone(),
      config.max_results,
      horizon_cutoff(now, config.horizon_days),
    )
  }

  /// Next market, fetching the next competition's catalogue on demand.
  pub async fn next(&mut self) -> Option<Result<Market, ScanError>> {
    loop {
      if let Some(market) = self.buffered.pop_front() {
        return Some(Ok(market));
      }

      let competition_id = self.pending.pop_front()?;
      let query = MarketQuery {
        competition_id,
        market_type: self.market_type.clone(),
        max_results: self.max_results,
      };

      match self.exchange.list_market_catalogue(&query).await {
        Ok(markets) => {
          let listed = markets.len();
          let cutoff = self.cutoff;
          self
            .buffered
            .extend(markets.into_iter().filter(|m| m.market_start_time <= cutoff));
          debug!(
            competition_id,
            listed,
            within_horizon = self.buffered.len(),
            "Competition catalogue scanned"
          );
        }
        Err(source) => {
          return Some(Err(ScanError::Catalogue {
            competition_id,
            source,
          }));
        }
      }
    }
  }
}

fn horizon_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  TimeDelta::try_days(days)
    .and_then(|horizon| now.checked_add_signed(horizon))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Lazy sequence of markets paired with their viable book entries.
pub struct BookScan<'a, E: Exchange + ?Sized> {
  markets: MarketScan<'a, E>,
  /// Markets skipped without fetching a book.
  excluded: HashSet<MarketId>,
}

impl<'a, E: Exchange + ?Sized> BookScan<'a, E> {
  pub fn new(markets: MarketScan<'a, E>, excluded: HashSet<MarketId>) -> Self {
    Self { markets, excluded }
  }

  /// Next market with a non-empty book.
  pub async fn next(&mut self) -> Option<Result<MarketBook, ScanError>> {
    loop {
      let market = match self.markets.next().await? {
        Ok(market) => market,
        Err(e) => return Some(Err(e)),
      };

      if self.excluded.contains(&market.market_id) {
        debug!(market_id = %market.market_id, "Market already bet, skipping book");
        continue;
      }

      match self.markets.exchange.list_book(&market).await {
        Ok(entries) if entries.is_empty() => {
          debug!(market_id = %market.market_id, "No viable book entries");
        }
        Ok(entries) => return Some(Ok(MarketBook { market, entries })),
        Err(source) => {
          return Some(Err(ScanError::Book {
            market_id: market.market_id,
            source,
          }));
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;
  use std::sync::Mutex;

  use async_trait::async_trait;
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::domain::bet::{BetOrder, ClearedOrder, OpenOrder, PlacementReport, Side};
  use crate::domain::market::BookEntry;

  /// In-memory exchange recording the calls it receives.
  #[derive(Default)]
  struct FakeExchange {
    catalogues: HashMap<CompetitionId, Vec<Market>>,
    failing_competitions: HashSet<CompetitionId>,
    books: HashMap<MarketId, Vec<BookEntry>>,
    calls: Mutex<Vec<String>>,
  }

  impl FakeExchange {
    fn calls(&self) -> Vec<String> {
      self.calls.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl Exchange for FakeExchange {
    async fn list_open_bets(&self) -> Result<Vec<OpenOrder>, ExchangeError> {
      Ok(Vec::new())
    }

    async fn list_settled_bets(&self) -> Result<Vec<ClearedOrder>, ExchangeError> {
      Ok(Vec::new())
    }

    async fn list_market_catalogue(
      &self,
      query: &MarketQuery,
    ) -> Result<Vec<Market>, ExchangeError> {
      self
        .calls
        .lock()
        .unwrap()
        .push(format!("catalogue:{}", query.competition_id));
      if self.failing_competitions.contains(&query.competition_id) {
        return Err(ExchangeError::Malformed {
          operation: "listMarketCatalogue".to_string(),
          reason: "boom".to_string(),
        });
      }
      Ok(self.catalogues.get(&query.competition_id).cloned().unwrap_or_default())
    }

    async fn list_book(&self, market: &Market) -> Result<Vec<BookEntry>, ExchangeError> {
      self.calls.lock().unwrap().push(format!("book:{}", market.market_id));
      Ok(self.books.get(&market.market_id).cloned().unwrap_or_default())
    }

    async fn place_bet(&self, _order: &BetOrder) -> Result<PlacementReport, ExchangeError> {
      unreachable!("scans never place bets")
    }

    async fn available_balance(&self) -> Result<f64, ExchangeError> {
      Ok(0.0)
    }
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
  }

  fn market(id: &str, competition_id: CompetitionId, days_ahead: i64) -> Market {
    Market {
      market_id: id.to_string(),
      market_name: "Match Odds".to_string(),
      competition_id,
      competition_name: "League".to_string(),
      event_name: format!("Event {id}"),
      market_start_time: now() + Duration::days(days_ahead),
      commission_rate: 0.05,
      total_matched: 0.0,
      runners: Vec::new(),
    }
  }

  fn entry(market_id: &str) -> BookEntry {
    BookEntry {
      market_id: market_id.to_string(),
      selection_id: 1,
      side: Side::Back,
      price: 2.0,
      size: 10.0,
      commission_rate: 0.05,
    }
  }

  #[tokio::test]
  async fn test_market_scan_applies_horizon() {
    let mut exchange = FakeExchange::default();
    exchange.catalogues.insert(
      1,
      vec![market("1.1", 1, 1), market("1.2", 1, 8), market("1.3", 1, 7)],
    );

    let mut scan = MarketScan::new(&exchange, [1], "MATCH_ODDS", 1000, now() + Duration::days(7));
    let mut ids = Vec::new();
    while let Some(item) = scan.next().await {
      ids.push(item.unwrap().market_id);
    }

    assert_eq!(ids, vec!["1.1", "1.3"]);
    assert!(scan.next().await.is_none());
  }

  #[tokio::test]
  async fn test_oversized_horizon_saturates() {
    let mut exchange = FakeExchange::default();
    exchange
      .catalogues
      .insert(1, vec![market("1.1", 1, 1), market("1.2", 1, 3000)]);
    let config = MarketsConfig {
      horizon_days: 200_000_000_000_000,
      ..MarketsConfig::default()
    };

    let mut scan = MarketScan::from_config(&exchange, [1], &config, now());
    assert_eq!(scan.cutoff, DateTime::<Utc>::MAX_UTC);
    assert_eq!(scan.next().await.unwrap().unwrap().market_id, "1.1");
    assert_eq!(scan.next().await.unwrap().unwrap().market_id, "1.2");
    assert!(scan.next().await.is_none());
  }

  #[test]
  fn test_horizon_cutoff_counts_days_from_now() {
    assert_eq!(horizon_cutoff(now(), 7), now() + Duration::days(7));
  }

  #[tokio::test]
  async fn test_market_scan_is_lazy_per_competition() {
    let mut exchange = FakeExchange::default();
    exchange.catalogues.insert(1, vec![market("1.1", 1, 1)]);
    exchange.catalogues.insert(2, vec![market("2.1", 2, 1)]);

    let mut scan = MarketScan::new(&exchange, [1, 2], "MATCH_ODDS", 1000, now() + Duration::days(7));
    let first = scan.next().await.unwrap().unwrap();
    assert_eq!(first.market_id, "1.1");
    assert_eq!(exchange.calls(), vec!["catalogue:1"]);

    scan.next().await.unwrap().unwrap();
    assert_eq!(exchange.calls(), vec!["catalogue:1", "catalogue:2"]);
  }

  #[tokio::test]
  async fn test_market_scan_continues_after_failed_competition() {
    let mut exchange = FakeExchange::default();
    exchange.failing_competitions.insert(1);
    exchange.catalogues.insert(2, vec![market("2.1", 2, 1)]);

    let mut scan = MarketScan::new(&exchange, [1, 2], "MATCH_ODDS", 1000, now() + Duration::days(7));
    assert!(matches!(
      scan.next().await,
      Some(Err(ScanError::Catalogue { competition_id: 1, .. }))
    ));
    assert_eq!(scan.next().await.unwrap().unwrap().market_id, "2.1");
    assert!(scan.next().await.is_none());
  }

  #[tokio::test]
  async fn test_book_scan_skips_empty_and_excluded_markets() {
    let mut exchange = FakeExchange::default();
    exchange.catalogues.insert(
      1,
      vec![market("1.1", 1, 1), market("1.2", 1, 1), market("1.3", 1, 1)],
    );
    exchange.books.insert("1.2".to_string(), vec![entry("1.2")]);
    exchange.books.insert("1.3".to_string(), vec![entry("1.3")]);

    let markets = MarketScan::new(&exchange, [1], "MATCH_ODDS", 1000, now() + Duration::days(7));
    let mut scan = BookScan::new(markets, HashSet::from(["1.3".to_string()]));

    let book = scan.next().await.unwrap().unwrap();
    assert_eq!(book.market.market_id, "1.2");
    assert_eq!(book.entries.len(), 1);
    assert!(scan.next().await.is_none());

    assert_eq!(
      exchange.calls(),
      vec!["catalogue:1", "book:1.1", "book:1.2"]
    );
  }
}
