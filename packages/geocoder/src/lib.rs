#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location resolution for health data queries.
//!
//! Turns either an explicit city/state pair or a coordinate pair into a
//! [`LocationIdentity`](caring_hand_health_models::LocationIdentity):
//!
//! 1. **Explicit** input is trimmed and checked for emptiness only.
//! 2. **Coordinates** are sent to a reverse geocoding provider configured
//!    via TOML files in `services/`. The provider's compound subdivision
//!    code (`"US-AL"`) is split to recover the state abbreviation.
//!
//! Coordinate lookups are bounded by a timeout; expiry is reported as a
//! [`LocationError`], the same as any other lookup failure.

pub mod bigdatacloud;
pub mod resolver;
pub mod service_registry;

use std::time::Duration;

use async_trait::async_trait;
use caring_hand_health_models::Coordinates;
use thiserror::Error;

/// The raw answer from a reverse geocoding provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReversePlace {
    /// City name. Often empty for rural coordinates.
    pub city: String,
    /// Finer-grained locality, used when `city` is empty.
    pub locality: String,
    /// Compound subdivision code, e.g. `"US-AL"`.
    pub principal_subdivision_code: String,
}

/// Errors from location resolution.
#[derive(Debug, Error)]
pub enum LocationError {
    /// HTTP request to the geocoding provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoding provider answered with a non-success status.
    #[error("Reverse geocoding returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed or required fields were missing.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The subdivision code had no `-` separator or an empty state segment.
    #[error("Malformed subdivision code {code:?}: expected \"<country>-<state>\"")]
    MalformedSubdivision {
        /// The code as returned by the provider.
        code: String,
    },

    /// The lookup did not finish in time.
    #[error("Location lookup timed out after {after:?}")]
    Timeout {
        /// The timeout that expired.
        after: Duration,
    },

    /// Explicit input was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the blank field (`"city"` or `"state"`).
        field: &'static str,
    },

    /// No reverse geocoding service is enabled in the registry.
    #[error("No reverse geocoding service is enabled")]
    NoService,
}

impl LocationError {
    /// Returns `true` for failures of the external lookup itself, as
    /// opposed to invalid user input.
    #[must_use]
    pub const fn is_lookup_failure(&self) -> bool {
        !matches!(self, Self::EmptyField { .. })
    }
}

/// A reverse geocoding provider.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Looks up the place containing `coordinates`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the request or response parsing fails.
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReversePlace, LocationError>;
}
