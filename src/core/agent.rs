//! Agent tuning parameters.
//!
//! Each marketplace agent has a learning rate and a context window stored in
//! the [`ConfigStore`]. Setters validate before writing; getters fall back to
//! defaults when nothing has been stored or the stored value is unreadable.

use crate::config::store::{ConfigStore, OptionKey};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};

/// Learning rate used before one has been configured
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
/// Context window used before one has been configured
pub const DEFAULT_CONTEXT_WINDOW: u32 = 1000;
/// Smallest accepted context window
pub const MIN_CONTEXT_WINDOW: u32 = 100;
/// Largest accepted context window
pub const MAX_CONTEXT_WINDOW: u32 = 10_000;

/// Marketplace agents that own tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    /// Image generation assistant
    Huraii,
    /// Curation and analytics engine
    Cloe,
    /// Market strategy advisor
    BusinessStrategist,
    /// Platform guide
    Thorius,
}

impl Agent {
    /// Every agent, in a stable order
    pub const ALL: [Self; 4] = [
        Self::Huraii,
        Self::Cloe,
        Self::BusinessStrategist,
        Self::Thorius,
    ];

    /// Identifier used in option keys
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Huraii => "huraii",
            Self::Cloe => "cloe",
            Self::BusinessStrategist => "business_strategist",
            Self::Thorius => "thorius",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Validates and stores an agent's learning rate.
///
/// # Errors
/// Returns `Error::Validation` unless `0 < rate <= 1`, or a store error.
#[instrument(skip(store))]
pub async fn set_learning_rate<S: ConfigStore + Sync>(
    store: &S,
    agent: Agent,
    rate: f64,
) -> Result<()> {
    if !(rate > 0.0 && rate <= 1.0) {
        return Err(Error::validation("Learning rate must be between 0 and 1"));
    }

    store
        .set(OptionKey::LearningRate(agent), rate.to_string())
        .await?;
    info!("Learning rate for {} set to {}", agent, rate);
    Ok(())
}

/// Validates and stores an agent's context window.
///
/// # Errors
/// Returns `Error::Validation` unless `100 <= size <= 10000`, or a store error.
#[instrument(skip(store))]
pub async fn set_context_window<S: ConfigStore + Sync>(
    store: &S,
    agent: Agent,
    size: i64,
) -> Result<()> {
    if !(i64::from(MIN_CONTEXT_WINDOW)..=i64::from(MAX_CONTEXT_WINDOW)).contains(&size) {
        return Err(Error::validation(format!(
            "Context window must be between {MIN_CONTEXT_WINDOW} and {MAX_CONTEXT_WINDOW}"
        )));
    }

    store
        .set(OptionKey::ContextWindow(agent), size.to_string())
        .await?;
    info!("Context window for {} set to {}", agent, size);
    Ok(())
}

/// Reads an agent's learning rate, defaulting to [`DEFAULT_LEARNING_RATE`].
pub async fn learning_rate<S: ConfigStore + Sync>(store: &S, agent: Agent) -> Result<f64> {
    Ok(store
        .get(OptionKey::LearningRate(agent))
        .await?
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_LEARNING_RATE))
}

/// Reads an agent's context window, defaulting to [`DEFAULT_CONTEXT_WINDOW`].
pub async fn context_window<S: ConfigStore + Sync>(store: &S, agent: Agent) -> Result<u32> {
    Ok(store
        .get(OptionKey::ContextWindow(agent))
        .await?
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_CONTEXT_WINDOW))
}

/// Sets the learning rate, logging instead of propagating failures.
///
/// Returns whether the value was stored.
pub async fn apply_learning_rate<S: ConfigStore + Sync>(store: &S, agent: Agent, rate: f64) -> bool {
    set_learning_rate(store, agent, rate)
        .await
        .inspect_err(|e| warn!("Failed to set learning rate for {}: {}", agent, e))
        .is_ok()
}

/// Sets the context window, logging instead of propagating failures.
///
/// Returns whether the value was stored.
pub async fn apply_context_window<S: ConfigStore + Sync>(
    store: &S,
    agent: Agent,
    size: i64,
) -> bool {
    set_context_window(store, agent, size)
        .await
        .inspect_err(|e| warn!("Failed to set context window for {}: {}", agent, e))
        .is_ok()
}
