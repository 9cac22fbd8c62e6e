//! Admin-key check for the administrative delete.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Check the request headers against the configured admin key.
///
/// With no key configured every caller is admitted (dev mode).
pub fn authorize_admin(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            // Also accept the key as a bearer token
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        });

    match provided {
        Some(key) if constant_time_compare(key, expected) => Ok(()),
        Some(_) => Err(AppError::Unauthorized("Invalid API key".to_string())),
        None => Err(AppError::Unauthorized("Missing API key".to_string())),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
