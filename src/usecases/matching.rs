//! Matching - Joining Book Entries with Probability Estimates
//!
//! Book entries and estimates share the key
//! (event name, local event date, competition id, selection id).
//! The event date is the market start time converted to the reference
//! timezone the estimates were produced in.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::market::{BookEntry, CompetitionId, Market, MarketId, SelectionId};
use crate::domain::probability::{ProbabilityEstimate, SelectionLookup, SelectionRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct JoinKey {
  event_name: String,
  date: NaiveDate,
  competition_id: CompetitionId,
  selection_id: SelectionId,
}

/// An estimate whose team name had no lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSelection {
  pub competition_id: CompetitionId,
  pub event_name: String,
  pub date: NaiveDate,
  pub team_name: String,
}

/// No book entry of a market matched any estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("no probability estimate for market {market_id} ({event_name}, {date})")]
pub struct MergeMismatch {
  pub market_id: MarketId,
  pub competition_id: CompetitionId,
  pub event_name: String,
  pub date: NaiveDate,
}

/// A book entry with the probability of its selection winning.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedEntry {
  pub entry: BookEntry,
  /// Probability of the selection winning (not yet inverted for lay).
  pub probability: f64,
  /// Event date in the reference timezone.
  pub date: NaiveDate,
}

/// Calendar date of `time` in `tz`.
pub fn local_date(time: DateTime<Utc>, tz: Tz) -> NaiveDate {
  time.with_timezone(&tz).date_naive()
}

/// Estimates keyed for joining.
#[derive(Debug, Clone, Default)]
pub struct EstimateIndex {
  by_key: HashMap<JoinKey, f64>,
  competitions: BTreeSet<CompetitionId>,
  unresolved: Vec<UnresolvedSelection>,
}

impl EstimateIndex {
  /// Index estimates, resolving team names through `lookup`.
  ///
  /// Unresolvable team names are kept as diagnostics. For duplicate
  /// keys the first estimate wins.
  pub fn build(estimates: &[ProbabilityEstimate], lookup: &SelectionLookup) -> Self {
    let mut index = Self::default();

    for estimate in estimates {
      let selection_id = match &estimate.selection {
        SelectionRef::Id(id) => *id,
        SelectionRef::Team(team) => match lookup.resolve(estimate.competition_id, team) {
          Some(id) => id,
          None => {
            index.unresolved.push(UnresolvedSelection {
              competition_id: estimate.competition_id,
              event_name: estimate.event_name.clone(),
              date: estimate.date,
              team_name: team.clone(),
            });
            continue;
          }
        },
      };

      let key = JoinKey {
        event_name: estimate.event_name.clone(),
        date: estimate.date,
        competition_id: estimate.competition_id,
        selection_id,
      };
      if index.by_key.contains_key(&key) {
        warn!(
          event_name = %estimate.event_name,
          date = %estimate.date,
          selection_id,
          "Duplicate probability estimate ignored"
        );
        continue;
      }
      index.by_key.insert(key, estimate.probability);
      index.competitions.insert(estimate.competition_id);
    }

    info!(
      indexed = index.by_key.len(),
      unresolved = index.unresolved.len(),
      competitions = index.competitions.len(),
      "Probability estimates indexed"
    );
    index
  }

  /// Competitions with at least one usable estimate, ascending.
  pub fn competition_ids(&self) -> Vec<CompetitionId> {
    self.competitions.iter().copied().collect()
  }

  pub fn unresolved(&self) -> &[UnresolvedSelection] {
    &self.unresolved
  }

  pub fn len(&self) -> usize {
    self.by_key.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_key.is_empty()
  }

  /// Attach probabilities to a market's book entries.
  ///
  /// Entries without an estimate are dropped.
  ///
  /// # Errors
  /// `MergeMismatch` when none of the entries matched.
  pub fn join(
    &self,
    market: &Market,
    entries: &[BookEntry],
    tz: Tz,
  ) -> Result<Vec<JoinedEntry>, MergeMismatch> {
    let date = local_date(market.market_start_time, tz);

    let joined: Vec<JoinedEntry> = entries
      .iter()
      .filter_map(|entry| {
        let key = JoinKey {
          event_name: market.event_name.clone(),
          date,
          competition_id: market.competition_id,
          selection_id: entry.selection_id,
        };
        self.by_key.get(&key).map(|&probability| JoinedEntry {
          entry: entry.clone(),
          probability,
          date,
        })
      })
      .collect();

    if joined.is_empty() {
      return Err(MergeMismatch {
        market_id: market.market_id.clone(),
        competition_id: market.competition_id,
        event_name: market.event_name.clone(),
        date,
      });
    }

    debug!(
      market_id = %market.market_id,
      entries = entries.len(),
      joined = joined.len(),
      "Book joined with estimates"
    );
    Ok(joined)
  }
}
