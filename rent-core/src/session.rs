//! A quoting session: one user, one history, one submit at a time.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::calculations::PricingEngine;
use crate::db::store::{KeyValueStore, StoreError};
use crate::error::QuoteError;
use crate::history::{HistoryConfig, HistoryStore};
use crate::models::{HistoryEntry, SuburbRecord};
use crate::validation::{self, QuoteForm};

/// Session-scoped permission to exceed the history cap.
///
/// Starts locked and can only be unlocked; it is never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminFlag {
    unlocked: bool,
}

impl AdminFlag {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn unlock(&mut self) {
        self.unlocked = true;
    }
}

pub struct QuoteSession<S> {
    history: HistoryStore<S>,
    engine: PricingEngine,
    admin: AdminFlag,
}

impl<S: KeyValueStore> QuoteSession<S> {
    pub fn new(
        store: S,
        history_config: HistoryConfig,
        engine: PricingEngine,
    ) -> Self {
        Self {
            history: HistoryStore::new(store, history_config),
            engine,
            admin: AdminFlag::default(),
        }
    }

    pub fn unlock_admin(&mut self) {
        if !self.admin.is_unlocked() {
            info!("admin mode activated for this session");
        }
        self.admin.unlock();
    }

    pub fn is_admin(&self) -> bool {
        self.admin.is_unlocked()
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Active history, newest first.
    pub async fn recent(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.history.list_active().await
    }

    /// Runs one calculation: capacity check, validation, pricing, then a
    /// write-through append. Nothing is written unless every step succeeds.
    pub async fn submit(
        &mut self,
        form: &QuoteForm,
        suburb: Option<&SuburbRecord>,
    ) -> Result<HistoryEntry, QuoteError> {
        self.submit_at(form, suburb, Utc::now()).await
    }

    pub async fn submit_at(
        &mut self,
        form: &QuoteForm,
        suburb: Option<&SuburbRecord>,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry, QuoteError> {
        self.history.check_capacity_at(&self.admin, now).await?;

        let input = validation::validate(form, suburb).map_err(QuoteError::Validation)?;
        let result = self.engine.price(&input);
        debug!(client = %input.client_name, installment = %result.monthly_installment, "quote priced");

        let entry = HistoryEntry {
            input,
            result,
            timestamp: now,
        };
        self.history.append_at(entry.clone(), now).await?;

        info!(client = %entry.input.client_name, "calculation completed");
        Ok(entry)
    }
}
