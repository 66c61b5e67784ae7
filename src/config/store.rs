//! Typed runtime option storage.
//!
//! Options are addressed by [`OptionKey`] instead of free-form strings. The
//! store is injected into whatever needs it: [`DbConfigStore`] persists to the
//! `agent_options` table, [`MemoryConfigStore`] keeps values in process and
//! backs tests and one-shot runs.

use crate::{
    core::agent::Agent,
    entities::{AgentOption, agent_option},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Every option the crate reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// Learning rate of an agent, in (0, 1]
    LearningRate(Agent),
    /// Context window of an agent, in [100, 10000]
    ContextWindow(Agent),
    /// Key accepted in the `X-Vortex-API-Key` header
    ApiKey,
}

impl OptionKey {
    /// Storage key for this option.
    #[must_use]
    pub fn storage_key(self) -> String {
        match self {
            Self::LearningRate(agent) => format!("vortex_{}_learning_rate", agent.slug()),
            Self::ContextWindow(agent) => format!("vortex_{}_context_window", agent.slug()),
            Self::ApiKey => "vortex_api_key".to_string(),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Read/write access to runtime options.
pub trait ConfigStore {
    /// Returns the stored value, or `None` if the option was never set.
    fn get(&self, key: OptionKey) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Inserts or replaces the value of an option.
    fn set(&self, key: OptionKey, value: String) -> impl Future<Output = Result<()>> + Send;
}

/// Options persisted in the `agent_options` table.
#[derive(Debug, Clone)]
pub struct DbConfigStore {
    db: DatabaseConnection,
}

impl DbConfigStore {
    /// Wraps a connection whose schema already contains `agent_options`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ConfigStore for DbConfigStore {
    #[instrument(skip(self))]
    async fn get(&self, key: OptionKey) -> Result<Option<String>> {
        let state = AgentOption::find()
            .filter(agent_option::Column::Key.eq(key.storage_key()))
            .one(&self.db)
            .await?;
        debug!("Option {} = {:?}", key, state.as_ref().map(|s| &s.value));
        Ok(state.map(|s| s.value))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: OptionKey, value: String) -> Result<()> {
        let now = Utc::now().naive_utc();

        // Check if the key exists
        let existing = AgentOption::find()
            .filter(agent_option::Column::Key.eq(key.storage_key()))
            .one(&self.db)
            .await?;

        if let Some(state) = existing {
            let mut active_model: agent_option::ActiveModel = state.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_state = agent_option::ActiveModel {
                key: Set(key.storage_key()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            new_state.insert(&self.db).await?;
        }

        info!("Stored option {}", key);
        Ok(())
    }
}

/// Options held in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: Arc<RwLock<HashMap<OptionKey, String>>>,
}

impl MemoryConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: OptionKey) -> Result<Option<String>> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: OptionKey, value: String) -> Result<()> {
        self.values.write().await.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_storage_keys() {
        assert_eq!(
            OptionKey::LearningRate(Agent::Cloe).storage_key(),
            "vortex_cloe_learning_rate"
        );
        assert_eq!(
            OptionKey::ContextWindow(Agent::BusinessStrategist).storage_key(),
            "vortex_business_strategist_context_window"
        );
        assert_eq!(OptionKey::ApiKey.storage_key(), "vortex_api_key");
    }

    #[tokio::test]
    async fn test_db_store_set_and_get() -> Result<()> {
        let db = setup_test_db().await?;
        let store = DbConfigStore::new(db);

        assert_eq!(store.get(OptionKey::ApiKey).await?, None);

        store.set(OptionKey::ApiKey, "secret".to_string()).await?;
        assert_eq!(
            store.get(OptionKey::ApiKey).await?,
            Some("secret".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_db_store_updates_existing() -> Result<()> {
        let db = setup_test_db().await?;
        let store = DbConfigStore::new(db.clone());
        let key = OptionKey::LearningRate(Agent::Huraii);

        store.set(key, "0.01".to_string()).await?;
        store.set(key, "0.02".to_string()).await?;

        assert_eq!(store.get(key).await?, Some("0.02".to_string()));
        let rows = AgentOption::find().all(&db).await?;
        assert_eq!(rows.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_keys_are_independent() -> Result<()> {
        let store = MemoryConfigStore::new();
        store
            .set(OptionKey::ContextWindow(Agent::Cloe), "500".to_string())
            .await?;

        assert_eq!(
            store.get(OptionKey::ContextWindow(Agent::Cloe)).await?,
            Some("500".to_string())
        );
        assert_eq!(
            store.get(OptionKey::ContextWindow(Agent::Thorius)).await?,
            None
        );
        Ok(())
    }
}
