//! Response formatting.
//!
//! Every report is handed back as a [`Response`]: on success the payload's
//! keys sit next to `"status": "success"`, on failure the body is just
//! `"status": "error"` and a `message`. Failures are logged at debug level
//! and never propagated past this point.

use crate::errors::Result;
use serde::Serialize;
use tracing::debug;

/// Outcome of a report in its wire shape.
///
/// The success payload must serialize as a map (a struct), since its fields
/// are merged into the response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response<T> {
    /// The report ran; its fields follow `status`
    Success(T),
    /// The report failed
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl<T> Response<T> {
    /// Whether the report succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T: Serialize> Response<T> {
    /// Pretty-printed JSON body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Wrapper placing a payload under the `data` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Data<T> {
    /// The report payload
    pub data: T,
}

/// Builds a response whose success payload is merged into the top level.
pub fn respond<T>(result: Result<T>) -> Response<T> {
    match result {
        Ok(payload) => Response::Success(payload),
        Err(e) => {
            debug!("Report failed: {}", e);
            Response::Error {
                message: e.public_message(),
            }
        }
    }
}

/// Builds a response with the success payload under `data`.
pub fn respond_data<T>(result: Result<T>) -> Response<Data<T>> {
    respond(result.map(|data| Data { data }))
}

/// Formats a percentage with one decimal, e.g. `"12.5%"`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Formats a signed growth percentage, e.g. `"+12.5%"` or `"-3.0%"`.
#[must_use]
pub fn format_growth(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("-{:.1}%", value.abs())
    }
}

/// Formats a dollar amount, e.g. `"$1250.00"` or `"-$25.50"`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if amount >= 0.0 {
        format!("${amount:.2}")
    } else {
        format!("-${:.2}", amount.abs())
    }
}
