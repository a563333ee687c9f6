//! Externally sourced win probabilities and the team-name lookup used
//! to attach them to exchange selections.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::market::{CompetitionId, SelectionId};

/// How an estimate identifies its selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRef {
    /// Exchange selection id, ready to join.
    Id(SelectionId),
    /// Team name, resolved through a [`SelectionLookup`].
    Team(String),
}

/// A single win probability for one selection in one event.
///
/// Immutable once loaded; `probability` is validated to lie in [0, 1]
/// by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityEstimate {
    pub competition_id: CompetitionId,
    pub event_name: String,
    /// Event date in the reference timezone of the data source.
    pub date: NaiveDate,
    pub selection: SelectionRef,
    pub probability: f64,
}

/// Maps (competition, team name) to an exchange selection id.
///
/// Names are compared trimmed and ASCII-lowercased.
#[derive(Debug, Clone, Default)]
pub struct SelectionLookup {
    entries: HashMap<(CompetitionId, String), SelectionId>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl SelectionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team name. Later inserts for the same key win.
    pub fn insert(&mut self, competition_id: CompetitionId, team_name: &str, selection_id: SelectionId) {
        self.entries
            .insert((competition_id, normalize(team_name)), selection_id);
    }

    pub fn resolve(&self, competition_id: CompetitionId, team_name: &str) -> Option<SelectionId> {
        self.entries
            .get(&(competition_id, normalize(team_name)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_normalizes_names() {
        let mut lookup = SelectionLookup::new();
        lookup.insert(10932509, "Manchester City", 47999);

        assert_eq!(lookup.resolve(10932509, "  manchester city "), Some(47999));
        assert_eq!(lookup.resolve(10932509, "MANCHESTER CITY"), Some(47999));
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn test_lookup_is_scoped_by_competition() {
        let mut lookup = SelectionLookup::new();
        lookup.insert(1, "Rangers", 100);

        assert_eq!(lookup.resolve(2, "Rangers"), None);
    }
}
