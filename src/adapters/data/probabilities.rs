//! Dataset Loader - CSV Probability Estimates and Selection Lookup
//!
//! Reads the externally produced probability table and the team-name
//! lookup table. Rows that fail to parse or violate a domain rule are
//! skipped with a warning; only an unreadable file is fatal.
//!
//! Probability columns:
//! `competition_id,event_name,date,selection_id,team_name,probability`
//! (one of `selection_id` / `team_name` must be set).
//!
//! Lookup columns: `competition_id,team_name,selection_id`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::market::{CompetitionId, SelectionId};
use crate::domain::probability::{ProbabilityEstimate, SelectionLookup, SelectionRef};

#[derive(Debug, Deserialize)]
struct ProbabilityRow {
    competition_id: CompetitionId,
    event_name: String,
    date: String,
    #[serde(default)]
    selection_id: Option<SelectionId>,
    #[serde(default)]
    team_name: Option<String>,
    probability: f64,
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    competition_id: CompetitionId,
    team_name: String,
    selection_id: SelectionId,
}

impl TryFrom<ProbabilityRow> for ProbabilityEstimate {
    type Error = String;

    fn try_from(row: ProbabilityRow) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&row.probability) {
            return Err(format!("probability {} outside [0, 1]", row.probability));
        }
        let event_name = row.event_name.trim();
        if event_name.is_empty() {
            return Err("empty event_name".to_string());
        }
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("bad date '{}': {e}", row.date))?;

        let team = row
            .team_name
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let selection = match (row.selection_id, team) {
            (Some(id), _) => SelectionRef::Id(id),
            (None, Some(team)) => SelectionRef::Team(team),
            (None, None) => return Err("neither selection_id nor team_name set".to_string()),
        };

        Ok(Self {
            competition_id: row.competition_id,
            event_name: event_name.to_string(),
            date,
            selection,
            probability: row.probability,
        })
    }
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

/// Load probability estimates, skipping invalid rows.
pub fn load_probabilities(path: impl AsRef<Path>) -> Result<Vec<ProbabilityEstimate>> {
    let path = path.as_ref();
    let mut estimates = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in reader(path)?.deserialize::<ProbabilityRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let parsed = row
            .map_err(|e| e.to_string())
            .and_then(ProbabilityEstimate::try_from);
        match parsed {
            Ok(estimate) => estimates.push(estimate),
            Err(reason) => {
                skipped += 1;
                warn!(path = %path.display(), line, %reason, "Skipping probability row");
            }
        }
    }

    info!(
        path = %path.display(),
        loaded = estimates.len(),
        skipped,
        "Probability estimates loaded"
    );
    Ok(estimates)
}

/// Load the team-name lookup, skipping invalid rows.
pub fn load_selection_lookup(path: impl AsRef<Path>) -> Result<SelectionLookup> {
    let path = path.as_ref();
    let mut lookup = SelectionLookup::new();
    let mut skipped = 0usize;

    for (index, row) in reader(path)?.deserialize::<LookupRow>().enumerate() {
        let line = index + 2;
        match row {
            Ok(row) if !row.team_name.trim().is_empty() => {
                lookup.insert(row.competition_id, &row.team_name, row.selection_id);
            }
            Ok(_) => {
                skipped += 1;
                warn!(path = %path.display(), line, "Skipping lookup row with empty team_name");
            }
            Err(e) => {
                skipped += 1;
                warn!(path = %path.display(), line, error = %e, "Skipping lookup row");
            }
        }
    }

    info!(
        path = %path.display(),
        entries = lookup.len(),
        skipped,
        "Selection lookup loaded"
    );
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_probabilities_skips_bad_rows() {
        let file = csv_file(
            "competition_id,event_name,date,selection_id,team_name,probability\n\
             81,Home v Away,2024-05-01,11,,0.55\n\
             81,Home v Away,2024-05-01,,Away,0.25\n\
             81,Home v Away,2024-05-01,11,,1.5\n\
             81,Home v Away,01/05/2024,11,,0.5\n\
             81,Home v Away,2024-05-01,,,0.5\n\
             abc,Home v Away,2024-05-01,11,,0.5\n",
        );

        let estimates = load_probabilities(file.path()).unwrap();
        assert_eq!(estimates.len(), 2);

        assert_eq!(estimates[0].selection, SelectionRef::Id(11));
        assert_eq!(estimates[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert!((estimates[0].probability - 0.55).abs() < 1e-12);

        assert_eq!(estimates[1].selection, SelectionRef::Team("Away".to_string()));
    }

    #[test]
    fn test_load_probabilities_missing_file_is_fatal() {
        assert!(load_probabilities("/nonexistent/probabilities.csv").is_err());
    }

    #[test]
    fn test_load_selection_lookup() {
        let file = csv_file(
            "competition_id,team_name,selection_id\n\
             81, Juventus ,2345\n\
             81,Inter,not-a-number\n\
             81,,99\n",
        );

        let lookup = load_selection_lookup(file.path()).unwrap();
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.resolve(81, "juventus"), Some(2345));
    }
}
