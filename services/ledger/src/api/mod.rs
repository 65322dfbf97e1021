//! Ledger HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules and the small input helpers they share.
pub mod code_login;
pub mod cron;
pub mod error;
pub mod referees;
pub mod system;
pub mod types;
pub mod visits;

use error::{api_method_not_allowed, api_not_found, ApiError};

/// JSON-shaped 405 for known paths hit with the wrong method.
pub(crate) async fn method_not_allowed() -> ApiError {
    api_method_not_allowed()
}

/// JSON-shaped 404 for unknown paths.
pub(crate) async fn route_not_found() -> ApiError {
    api_not_found("Not found")
}

/// Mandatory-field check: present and non-blank after trimming.
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Optional fields collapse blank input to `None`, matching the store's
/// nullable columns.
pub(crate) fn clean_optional(field: Option<String>) -> Option<String> {
    required(field)
}
