//! API key verification for the HTTP surface.

use crate::config::store::{ConfigStore, OptionKey};
use crate::errors::Result;
use subtle::ConstantTimeEq;
use tracing::{instrument, warn};

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-Vortex-API-Key";

/// Checks a presented API key against the configured one.
///
/// Access is denied when no key is presented, the key is empty, or no key
/// has been configured.
#[instrument(skip_all)]
pub async fn check_api_key<S: ConfigStore + Sync>(store: &S, presented: Option<&str>) -> Result<bool> {
    let Some(presented) = presented.filter(|key| !key.is_empty()) else {
        return Ok(false);
    };

    let Some(expected) = store.get(OptionKey::ApiKey).await? else {
        warn!("API key presented but none is configured");
        return Ok(false);
    };

    Ok(!expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes())))
}
