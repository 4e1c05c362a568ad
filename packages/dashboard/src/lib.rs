#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Health data pipeline orchestration and dashboard session state.
//!
//! [`pipeline::Pipeline`] runs resolve → fetch → merge for one query.
//! [`session::Dashboard`] holds the latest committed dataset and the
//! user's filters, and uses a [`guard::RequestGuard`] so that a slow
//! response can never overwrite the result of a later request.

pub mod guard;
pub mod pipeline;
pub mod session;

use caring_hand_geocoder::LocationError;
use caring_hand_source::FetchError;
use strum_macros::{AsRefStr, Display};

/// Errors from running the pipeline for a query.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Location input was invalid or the lookup failed.
    #[error("Location lookup failed: {0}")]
    Location(#[from] LocationError),

    /// Fetching health data failed or returned nothing.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Coarse classification of a [`PipelineError`] for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Blank city or state.
    InvalidInput,
    /// Reverse geocoding failed, timed out, or returned a malformed place.
    LocationLookup,
    /// Network, HTTP status, or parse failure talking to the statistics
    /// service.
    Transport,
    /// The statistics service returned no records for the location.
    NoData,
}

impl PipelineError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Location(e) if e.is_lookup_failure() => ErrorKind::LocationLookup,
            Self::Location(_) => ErrorKind::InvalidInput,
            Self::Fetch(e) if e.is_transport() => ErrorKind::Transport,
            Self::Fetch(_) => ErrorKind::NoData,
        }
    }
}
