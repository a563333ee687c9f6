//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use tracing::info;

use super::{AppConfig, StorageBackend};

/// Upper bound on the scan horizon.
pub const MAX_HORIZON_DAYS: i64 = 3650;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    path = %path.display(),
    kelly = config.staking.kelly_fraction,
    min_bet = config.staking.min_bet,
    dry_run = config.bot.dry_run,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
  /// Loaded from this file.
  File(PathBuf),
  /// No file at the implicit default path; built-in defaults in use.
  Defaults,
}

/// Resolve the configuration for a run.
///
/// An `explicit` path must exist. Without one, `default_path` is loaded
/// when present and the built-in defaults are used otherwise.
pub fn resolve_config(
  explicit: Option<&str>,
  default_path: &str,
) -> Result<(AppConfig, ConfigSource)> {
  if let Some(path) = explicit {
    return Ok((load_config(path)?, ConfigSource::File(PathBuf::from(path))));
  }

  if Path::new(default_path).exists() {
    return Ok((
      load_config(default_path)?,
      ConfigSource::File(PathBuf::from(default_path)),
    ));
  }

  let config = AppConfig::default();
  validate_config(&config)?;
  Ok((config, ConfigSource::Defaults))
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Parse the configured reference timezone.
pub fn reference_timezone(config: &AppConfig) -> Result<Tz> {
  config
    .markets
    .reference_timezone
    .parse::<Tz>()
    .map_err(|e| {
      anyhow::anyhow!(
        "Unknown reference_timezone '{}': {e}",
        config.markets.reference_timezone
      )
    })
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Staking parameters inside their domains
/// - Positive scan limits
/// - A known reference timezone
/// - Non-empty endpoints and paths
fn validate_config(config: &AppConfig) -> Result<()> {
  // Staking validation
  anyhow::ensure!(
    (0.0..=1.0).contains(&config.staking.kelly_fraction),
    "Kelly fraction must be in [0, 1], got {}",
    config.staking.kelly_fraction
  );
  anyhow::ensure!(
    config.staking.min_bet >= 0.0,
    "min_bet must be non-negative, got {}",
    config.staking.min_bet
  );
  anyhow::ensure!(
    config.staking.min_liability_multiplier >= 0.0,
    "min_liability_multiplier must be non-negative, got {}",
    config.staking.min_liability_multiplier
  );
  anyhow::ensure!(
    config.staking.min_expected_value.is_finite(),
    "min_expected_value must be finite"
  );

  // Market scan validation
  anyhow::ensure!(
    !config.markets.market_type.is_empty(),
    "market_type must not be empty"
  );
  anyhow::ensure!(
    config.markets.max_results > 0,
    "max_results must be positive"
  );
  anyhow::ensure!(
    (1..=MAX_HORIZON_DAYS).contains(&config.markets.horizon_days),
    "horizon_days must be in [1, {MAX_HORIZON_DAYS}], got {}",
    config.markets.horizon_days
  );
  reference_timezone(config)?;

  // API validation
  anyhow::ensure!(
    !config.api.identity_url.is_empty(),
    "Identity URL must not be empty"
  );
  anyhow::ensure!(
    !config.api.betting_url.is_empty(),
    "Betting API URL must not be empty"
  );
  anyhow::ensure!(
    !config.api.account_url.is_empty(),
    "Account API URL must not be empty"
  );

  // Data validation
  anyhow::ensure!(
    !config.data.probabilities_path.is_empty(),
    "probabilities_path must not be empty"
  );

  // Persistence validation
  match config.persistence.backend {
    StorageBackend::Local => anyhow::ensure!(
      !config.persistence.bucket_dir.is_empty(),
      "bucket_dir must not be empty for the local backend"
    ),
    StorageBackend::S3 => anyhow::ensure!(
      config
        .persistence
        .bucket
        .as_deref()
        .is_some_and(|b| !b.is_empty()),
      "bucket must be set for the s3 backend"
    ),
  }

  Ok(())
}
