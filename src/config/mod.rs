//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml`. Every section
//! is optional and falls back to the defaults below. Credentials never
//! live here; they come from the environment
//! (see `adapters::api::auth::Credentials`).

pub mod loader;

use serde::Deserialize;

/// Top-level bot configuration.
///
/// Passed explicitly to the components that need it; nothing reads
/// process-wide state after startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Bot identity and run mode.
  pub bot: BotConfig,
  /// Staking thresholds.
  pub staking: StakingConfig,
  /// Which markets to scan and how.
  pub markets: MarketsConfig,
  /// Exchange API endpoints.
  pub api: ApiConfig,
  /// Input datasets.
  pub data: DataConfig,
  /// Placed-bet storage.
  pub persistence: PersistenceConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
  /// Select a bet but do not place or persist it.
  pub dry_run: bool,
}

/// Staking configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
  /// Kelly fraction multiplier (0.25 = quarter-Kelly).
  pub kelly_fraction: f64,
  /// Minimum back stake accepted by the exchange.
  pub min_bet: f64,
  /// Lay liability must be at least `min_bet * min_liability_multiplier`.
  pub min_liability_multiplier: f64,
  /// Candidates need an expected value strictly above this.
  pub min_expected_value: f64,
}

/// Market scan configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketsConfig {
  /// Competitions to scan. Empty = every competition in the probabilities.
  pub competition_ids: Vec<u64>,
  /// Exchange market type code.
  pub market_type: String,
  /// Maximum catalogue entries per competition.
  pub max_results: u32,
  /// Only markets starting within this many days.
  pub horizon_days: i64,
  /// IANA timezone the probability dates are expressed in.
  pub reference_timezone: String,
  /// Fetch and summarise settled bets at the start of each run.
  pub report_settled: bool,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Certificate login endpoint base.
  pub identity_url: String,
  /// Betting API base URL.
  pub betting_url: String,
  /// Account API base URL.
  pub account_url: String,
  /// Request timeout in seconds. Unset = HTTP client default.
  pub timeout_seconds: Option<u64>,
}

/// Input dataset configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
  /// CSV of probability estimates.
  pub probabilities_path: String,
  /// CSV mapping team names to selection ids.
  pub selections_path: Option<String>,
}

/// Object storage backend for placed bets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
  /// A local directory laid out like a bucket.
  Local,
  /// Amazon S3 or an S3-compatible store.
  S3,
}

/// Persistence configuration.
///
/// Bets land under `bets/<bet_id>.json` in whichever backend is selected.
/// S3 credentials come from the standard `AWS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
  pub backend: StorageBackend,
  /// Root directory for the `local` backend.
  pub bucket_dir: String,
  /// Bucket name for the `s3` backend.
  pub bucket: Option<String>,
  /// Region override (otherwise `AWS_REGION`).
  pub region: Option<String>,
  /// Endpoint of an S3-compatible service.
  pub endpoint: Option<String>,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: "betfair-value-bot".to_string(),
      log_level: "info".to_string(),
      dry_run: false,
    }
  }
}

impl Default for StakingConfig {
  fn default() -> Self {
    Self {
      kelly_fraction: 0.25,
      min_bet: 5.0,
      min_liability_multiplier: 5.0,
      min_expected_value: 0.0,
    }
  }
}

impl StakingConfig {
  /// Minimum accepted lay liability.
  pub fn min_liability(&self) -> f64 {
    self.min_bet * self.min_liability_multiplier
  }
}

impl Default for MarketsConfig {
  fn default() -> Self {
    Self {
      competition_ids: Vec::new(),
      market_type: "MATCH_ODDS".to_string(),
      max_results: 1000,
      horizon_days: 7,
      reference_timezone: "America/Los_Angeles".to_string(),
      report_settled: false,
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      identity_url: "https://identitysso-cert.betfair.com".to_string(),
      betting_url: "https://api.betfair.com/exchange/betting/rest/v1.0".to_string(),
      account_url: "https://api.betfair.com/exchange/account/rest/v1.0".to_string(),
      timeout_seconds: None,
    }
  }
}

impl Default for DataConfig {
  fn default() -> Self {
    Self {
      probabilities_path: "data/probabilities.csv".to_string(),
      selections_path: None,
    }
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      backend: StorageBackend::Local,
      bucket_dir: "bucket".to_string(),
      bucket: None,
      region: None,
      endpoint: None,
    }
  }
}
