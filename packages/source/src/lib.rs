#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Health data fetcher.
//!
//! Each statistics backend implements the [`HealthDataFetcher`] trait to
//! retrieve the location-scoped and nationwide record collections for a
//! resolved [`LocationIdentity`]. Records are returned untyped; coercion
//! happens in the merger.

pub mod endpoint;
pub mod request;
pub mod statistics;

use async_trait::async_trait;
use caring_hand_health_models::{HealthDataResponse, LocationIdentity};

/// Errors that can occur while fetching health data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The service answered, but both collections were empty.
    #[error("No health data found for {location}")]
    NoData {
        /// The location that was queried.
        location: LocationIdentity,
    },
}

impl FetchError {
    /// Returns `true` for network, status, and parse failures, as opposed
    /// to a well-formed empty answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::NoData { .. })
    }
}

/// A source of health measure records.
#[async_trait]
pub trait HealthDataFetcher: Send + Sync {
    /// Fetches both record collections for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NoData`] when both collections are empty, or
    /// another [`FetchError`] variant when the request or parsing fails.
    async fn fetch(&self, location: &LocationIdentity) -> Result<HealthDataResponse, FetchError>;
}

/// Rejects a response whose collections are both empty.
///
/// # Errors
///
/// Returns [`FetchError::NoData`] if `response` holds no records.
pub fn ensure_not_empty(
    location: &LocationIdentity,
    response: HealthDataResponse,
) -> Result<HealthDataResponse, FetchError> {
    if response.is_empty() {
        return Err(FetchError::NoData {
            location: location.clone(),
        });
    }
    Ok(response)
}
