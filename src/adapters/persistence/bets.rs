//! Bet Object Store - One JSON Object per Placed Bet
//!
//! Each placed bet is written once to object storage at
//! `bets/<bet_id>.json`, and that object is the system of record.
//! Two backends sit behind the same `ObjectStore` interface:
//! - `s3`: Amazon S3 or an S3-compatible service (credentials from `AWS_*`)
//! - `local`: a directory laid out like a bucket, for development
//!
//! A put is atomic on both: an object is either absent or complete.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tokio::fs;
use tracing::{info, instrument};

use crate::config::{PersistenceConfig, StorageBackend};
use crate::domain::bet::PlacedBetRecord;
use crate::ports::repository::BetStore;

const BETS_PREFIX: &str = "bets";

/// Object-storage-backed bet store.
pub struct BetObjectStore {
    store: Arc<dyn ObjectStore>,
    /// Bucket URL, for logs and error context.
    location: String,
}

impl BetObjectStore {
    /// Open the backend selected in the persistence settings.
    pub async fn from_config(config: &PersistenceConfig) -> Result<Self> {
        let store = match config.backend {
            StorageBackend::Local => Self::local(&config.bucket_dir).await?,
            StorageBackend::S3 => Self::s3(config)?,
        };
        info!(location = %store.location, "Bet store ready");
        Ok(store)
    }

    /// Store rooted at a local directory, created if missing.
    pub async fn local(bucket_dir: &str) -> Result<Self> {
        fs::create_dir_all(bucket_dir)
            .await
            .with_context(|| format!("Failed to create bucket directory {bucket_dir}"))?;
        let store = LocalFileSystem::new_with_prefix(bucket_dir)
            .with_context(|| format!("Failed to open bucket directory {bucket_dir}"))?;

        Ok(Self::new(Arc::new(store), format!("file://{bucket_dir}")))
    }

    /// Store in an S3 bucket.
    ///
    /// Credentials and defaults come from the `AWS_*` environment; the
    /// configured region and endpoint override them.
    pub fn s3(config: &PersistenceConfig) -> Result<Self> {
        let bucket = config
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .context("persistence.bucket must be set for the s3 backend")?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        let store = builder
            .build()
            .with_context(|| format!("Failed to configure S3 bucket {bucket}"))?;

        Ok(Self::new(Arc::new(store), format!("s3://{bucket}")))
    }

    fn new(store: Arc<dyn ObjectStore>, location: String) -> Self {
        Self { store, location }
    }

    /// Object key for a bet id (`bets/<bet_id>.json`).
    pub fn object_key(bet_id: &str) -> Result<String> {
        anyhow::ensure!(
            !bet_id.is_empty()
                && bet_id != "."
                && !bet_id.contains("..")
                && !bet_id.contains(['/', '\\']),
            "Invalid bet id for object key: {bet_id:?}"
        );
        Ok(format!("{BETS_PREFIX}/{bet_id}.json"))
    }
}

#[async_trait]
impl BetStore for BetObjectStore {
    #[instrument(skip(self, record), fields(bet_id = %record.bet_id))]
    async fn save_bet(&self, record: &PlacedBetRecord) -> Result<String> {
        let key = Self::object_key(&record.bet_id)?;
        let json = serde_json::to_vec_pretty(record).context("Failed to serialize bet record")?;

        self.store
            .put(&ObjectPath::from(key.as_str()), PutPayload::from(json))
            .await
            .with_context(|| format!("Failed to write {}/{key}", self.location))?;

        info!(location = %self.location, key = %key, "Bet record saved");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use object_store::memory::InMemory;

    use super::*;
    use crate::domain::bet::{Candidate, Side};

    fn record(bet_id: &str) -> PlacedBetRecord {
        PlacedBetRecord {
            candidate: Candidate {
                market_id: "1.234".to_string(),
                market_name: "Match Odds".to_string(),
                competition_id: 10932509,
                competition_name: "English Premier League".to_string(),
                event_name: "Arsenal v Chelsea".to_string(),
                market_start_time: Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap(),
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                selection_id: 1096,
                runner_name: Some("Arsenal".to_string()),
                side: Side::Lay,
                price: 3.0,
                size: 120.0,
                commission_rate: 0.05,
                probability: 0.7,
                kelly_fraction: 0.05,
                liability: 50.0,
                stake: 25.0,
                expected_value: 6.625,
            },
            placed_at: Utc.with_ymd_and_hms(2024, 4, 30, 9, 15, 0).unwrap(),
            bet_id: bet_id.to_string(),
            status: "success".to_string(),
        }
    }

    async fn read_object(store: &BetObjectStore, key: &str) -> Vec<u8> {
        store
            .store
            .get(&ObjectPath::from(key))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_save_writes_record_under_bets_key() {
        let store = BetObjectStore::new(Arc::new(InMemory::new()), "memory://".to_string());

        let key = store.save_bet(&record("31242604945")).await.unwrap();
        assert_eq!(key, "bets/31242604945.json");

        let loaded: PlacedBetRecord =
            serde_json::from_slice(&read_object(&store, &key).await).unwrap();
        let expected = record("31242604945");
        assert_eq!(loaded.bet_id, expected.bet_id);
        assert_eq!(loaded.placed_at, expected.placed_at);
        assert_eq!(loaded.candidate.market_id, expected.candidate.market_id);
        assert_eq!(loaded.candidate.side, Side::Lay);
        assert_eq!(loaded.candidate.date, expected.candidate.date);
        assert!((loaded.candidate.stake - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_saved_object_is_flat_json() {
        let store = BetObjectStore::new(Arc::new(InMemory::new()), "memory://".to_string());
        store.save_bet(&record("42")).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&read_object(&store, "bets/42.json").await).unwrap();
        assert_eq!(json["bet_id"], "42");
        assert_eq!(json["side"], "lay");
        assert_eq!(json["event_name"], "Arsenal v Chelsea");
        assert_eq!(json["status"], "success");
    }

    #[tokio::test]
    async fn test_local_backend_lays_out_bucket_directory() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = dir.path().join("bucket");
        let config = PersistenceConfig {
            bucket_dir: bucket.to_str().unwrap().to_string(),
            ..PersistenceConfig::default()
        };

        let store = BetObjectStore::from_config(&config).await.unwrap();
        store.save_bet(&record("7")).await.unwrap();

        let raw = std::fs::read_to_string(bucket.join("bets/7.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["bet_id"], "7");
    }

    #[test]
    fn test_s3_backend_targets_configured_bucket() {
        let config = PersistenceConfig {
            backend: StorageBackend::S3,
            bucket: Some("value-bets".to_string()),
            region: Some("eu-west-1".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            ..PersistenceConfig::default()
        };

        let store = BetObjectStore::s3(&config).unwrap();
        assert_eq!(store.location, "s3://value-bets");
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let config = PersistenceConfig {
            backend: StorageBackend::S3,
            ..PersistenceConfig::default()
        };
        assert!(BetObjectStore::s3(&config).is_err());
    }

    #[test]
    fn test_object_key_rejects_path_traversal() {
        assert!(BetObjectStore::object_key("../etc/passwd").is_err());
        assert!(BetObjectStore::object_key("a/b").is_err());
        assert!(BetObjectStore::object_key("").is_err());
        assert_eq!(BetObjectStore::object_key("123").unwrap(), "bets/123.json");
    }
}
