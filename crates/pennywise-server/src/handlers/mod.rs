//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod ai;
pub mod health;
pub mod import;
pub mod predictions;
pub mod transactions;

// Re-export all handlers for use in router
pub use accounts::*;
pub use ai::*;
pub use health::*;
pub use import::*;
pub use predictions::*;
pub use transactions::*;

use axum::body::Bytes;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;

use crate::AppError;

/// Today's date in UTC, the reference point for lookback windows
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse an optional JSON body
///
/// An empty body yields the type's default, matching clients that post
/// `{}` or nothing at all.
pub(crate) fn parse_json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON"))
}
