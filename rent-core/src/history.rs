//! Bounded, sliding-expiry history of past calculations.
//!
//! The whole history lives in one key-value slot as a JSON array, newest
//! entry first. Every read drops entries older than the expiry window measured
//! from the moment of the read, and every append rewrites the slot
//! immediately.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::db::store::{KeyValueStore, StoreError};
use crate::error::QuoteError;
use crate::models::HistoryEntry;
use crate::session::AdminFlag;

/// Slot holding the serialised history.
pub const HISTORY_KEY: &str = "calculation_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Most entries retained; also the point at which new quotes are refused.
    pub max_entries: usize,
    /// Entries older than this many days are dropped on the next access.
    pub expiry_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            expiry_days: 365,
        }
    }
}

pub struct HistoryStore<S> {
    store: S,
    config: HistoryConfig,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(
        store: S,
        config: HistoryConfig,
    ) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn is_expired(
        &self,
        entry: &HistoryEntry,
        now: DateTime<Utc>,
    ) -> bool {
        now - entry.timestamp > Duration::days(self.config.expiry_days)
    }

    /// Active entries, newest first.
    pub async fn list_active(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.list_active_at(Utc::now()).await
    }

    /// Active entries as of `now`. Expired entries found on the way are
    /// pruned from the slot as well.
    pub async fn list_active_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let (entries, pruned) = self.read_fresh(now).await?;
        if pruned {
            self.write(&entries).await?;
        }
        Ok(entries)
    }

    /// Number of active entries as of `now`.
    pub async fn count_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        Ok(self.list_active_at(now).await?.len())
    }

    /// Refuses a new calculation when the history is full, unless the
    /// session has been unlocked.
    pub async fn check_capacity_at(
        &self,
        admin: &AdminFlag,
        now: DateTime<Utc>,
    ) -> Result<(), QuoteError> {
        if admin.is_unlocked() {
            return Ok(());
        }

        let count = self.count_at(now).await?;
        if count >= self.config.max_entries {
            warn!(count, max = self.config.max_entries, "history full, refusing calculation");
            return Err(QuoteError::Capacity {
                max_entries: self.config.max_entries,
            });
        }
        Ok(())
    }

    pub async fn append(
        &self,
        entry: HistoryEntry,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        self.append_at(entry, Utc::now()).await
    }

    /// Prepends `entry` to the active history as of `now`, truncates to
    /// `max_entries` and persists the result. Returns the stored sequence.
    pub async fn append_at(
        &self,
        entry: HistoryEntry,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let (mut entries, _) = self.read_fresh(now).await?;

        entries.insert(0, entry);
        if entries.len() > self.config.max_entries {
            debug!(
                evicted = entries.len() - self.config.max_entries,
                "evicting oldest history entries"
            );
            entries.truncate(self.config.max_entries);
        }

        self.write(&entries).await?;
        info!(entries = entries.len(), "history updated");
        Ok(entries)
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY).await?;
        info!("history cleared");
        Ok(())
    }

    async fn read_fresh(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Vec<HistoryEntry>, bool), StoreError> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok((Vec::new(), false));
        };

        let mut entries: Vec<HistoryEntry> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key: HISTORY_KEY.to_string(),
                reason: e.to_string(),
            })?;

        let before = entries.len();
        entries.retain(|entry| !self.is_expired(entry, now));
        let pruned = entries.len() != before;
        if pruned {
            debug!(expired = before - entries.len(), "dropped expired history entries");
        }

        Ok((entries, pruned))
    }

    async fn write(
        &self,
        entries: &[HistoryEntry],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(entries).map_err(|e| StoreError::Corrupt {
            key: HISTORY_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(HISTORY_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::PricingEngine;
    use crate::db::store::MemoryStore;
    use crate::models::{CalculationInput, RiskProfile, SuburbRecord};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entry(
        client: &str,
        timestamp: DateTime<Utc>,
    ) -> HistoryEntry {
        let input = CalculationInput {
            client_name: client.to_string(),
            vehicle_price: dec!(200000),
            retail_value: dec!(180000),
            suburb: SuburbRecord {
                name: "Soweto".to_string(),
                town: "Johannesburg".to_string(),
                municipality: "City of Johannesburg".to_string(),
                province: "Gauteng".to_string(),
                distance_km: dec!(50),
            },
            risk_profile: RiskProfile::Medium,
            manual_deposit: None,
            term_months: 48,
            credit_score: Some(700),
        };
        let result = PricingEngine::default().price(&input);
        HistoryEntry {
            input,
            result,
            timestamp,
        }
    }

    fn store(
        max_entries: usize,
        expiry_days: i64,
    ) -> HistoryStore<MemoryStore> {
        HistoryStore::new(
            MemoryStore::new(),
            HistoryConfig {
                max_entries,
                expiry_days,
            },
        )
    }

    fn clients(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.input.client_name.as_str()).collect()
    }

    #[test]
    fn default_config_matches_production_limits() {
        assert_eq!(
            HistoryConfig::default(),
            HistoryConfig {
                max_entries: 1000,
                expiry_days: 365,
            }
        );
    }

    #[tokio::test]
    async fn empty_slot_lists_nothing() {
        assert!(store(10, 7).list_active_at(now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_keeps_newest_first() {
        let history = store(10, 7);

        history.append_at(entry("first", now()), now()).await.unwrap();
        history.append_at(entry("second", now()), now()).await.unwrap();

        let active = history.list_active_at(now()).await.unwrap();
        assert_eq!(clients(&active), vec!["second", "first"]);
    }

    #[tokio::test]
    async fn append_round_trips_entries_exactly() {
        let history = store(10, 7);
        let original = entry("exact", now());

        history.append_at(original.clone(), now()).await.unwrap();

        assert_eq!(history.list_active_at(now()).await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn append_truncates_to_max_entries() {
        let history = store(3, 7);
        for client in ["a", "b", "c", "d"] {
            history.append_at(entry(client, now()), now()).await.unwrap();
        }

        let active = history.list_active_at(now()).await.unwrap();
        assert_eq!(clients(&active), vec!["d", "c", "b"]);
    }

    #[tokio::test]
    async fn expiry_is_sliding_relative_to_access_time() {
        let history = store(10, 7);
        let written = now() - Duration::days(5);
        history.append_at(entry("aging", written), written).await.unwrap();

        assert_eq!(history.list_active_at(now()).await.unwrap().len(), 1);
        assert_eq!(
            history
                .list_active_at(now() + Duration::days(3))
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn entry_exactly_at_expiry_boundary_is_kept() {
        let history = store(10, 7);
        let written = now() - Duration::days(7);
        history.append_at(entry("boundary", written), written).await.unwrap();

        assert_eq!(history.list_active_at(now()).await.unwrap().len(), 1);
        assert!(
            history
                .list_active_at(now() + Duration::seconds(1))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn expired_entries_are_pruned_from_the_slot() {
        let history = store(10, 7);
        let old = now() - Duration::days(30);
        history.append_at(entry("old", old), old).await.unwrap();
        history.append_at(entry("new", now()), now()).await.unwrap();

        let raw = history.store.get(HISTORY_KEY).await.unwrap().unwrap();
        let stored: Vec<HistoryEntry> = serde_json::from_str(&raw).unwrap();

        assert_eq!(clients(&stored), vec!["new"]);
    }

    #[tokio::test]
    async fn expired_entries_free_capacity() {
        let history = store(2, 7);
        let old = now() - Duration::days(10);
        history.append_at(entry("a", old), old).await.unwrap();
        history.append_at(entry("b", old), old).await.unwrap();

        let result = history.check_capacity_at(&AdminFlag::default(), now()).await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn full_history_refuses_new_calculation() {
        let history = store(2, 7);
        history.append_at(entry("a", now()), now()).await.unwrap();
        history.append_at(entry("b", now()), now()).await.unwrap();

        let result = history.check_capacity_at(&AdminFlag::default(), now()).await;

        assert_eq!(result, Err(QuoteError::Capacity { max_entries: 2 }));
    }

    #[tokio::test]
    async fn unlocked_session_skips_capacity_check() {
        let history = store(1, 7);
        history.append_at(entry("a", now()), now()).await.unwrap();
        let mut admin = AdminFlag::default();
        admin.unlock();

        assert_eq!(history.check_capacity_at(&admin, now()).await, Ok(()));
    }

    #[tokio::test]
    async fn corrupt_slot_is_reported_not_discarded() {
        let history = store(10, 7);
        history.store.set(HISTORY_KEY, "not json").await.unwrap();

        let err = history.list_active_at(now()).await.unwrap_err();

        assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
        assert_eq!(
            history.store.get(HISTORY_KEY).await.unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let history = store(10, 7);
        history.append_at(entry("a", now()), now()).await.unwrap();

        history.clear().await.unwrap();

        assert!(history.list_active_at(now()).await.unwrap().is_empty());
    }
}
