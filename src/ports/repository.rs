//! Repository Port - Placed Bet Persistence Interface
//!
//! The program keeps no durable state of its own. Each placed bet is
//! written once to object storage, keyed by its bet id, and that
//! object is the system of record.

use async_trait::async_trait;

use crate::domain::bet::PlacedBetRecord;

/// Trait for placed-bet storage providers.
#[async_trait]
pub trait BetStore: Send + Sync + 'static {
  /// Persist a placed bet. Returns the object key it was written under.
  async fn save_bet(&self, record: &PlacedBetRecord) -> anyhow::Result<String>;
}
