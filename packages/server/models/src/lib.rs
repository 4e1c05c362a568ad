#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the CaringHand server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics types so the API contract can evolve independently.

use caring_hand_analytics::estimate::{PopulationInput, PopulationProfile};
use caring_hand_analytics::table::TableRow;
use caring_hand_health_models::{
    AgeSplitError, ChartData, Coordinates, LocationIdentity, LocationQuery, Selection,
};
use serde::{Deserialize, Serialize};

/// Errors turning query parameters into a pipeline query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsError {
    /// Neither a city/state pair nor a coordinate pair was given.
    #[error("Provide either city and state, or latitude and longitude")]
    MissingLocation,

    /// A coordinate was outside its valid range or not finite.
    #[error("Invalid coordinates")]
    InvalidCoordinates,

    /// The adults percentage was out of range.
    #[error(transparent)]
    AgeSplit(#[from] AgeSplitError),
}

/// Query parameters for the location endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQueryParams {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl LocationQueryParams {
    /// Validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::InvalidCoordinates`] if either value is out
    /// of range.
    pub fn coordinates(&self) -> Result<Coordinates, ParamsError> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Query parameters for the measures endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuresQueryParams {
    /// City name. Takes precedence over coordinates when set with `state`.
    pub city: Option<String>,
    /// State abbreviation.
    pub state: Option<String>,
    /// Latitude for reverse geocoding.
    pub latitude: Option<f64>,
    /// Longitude for reverse geocoding.
    pub longitude: Option<f64>,
    /// Measure filter. Absent or `"All"` matches everything.
    pub measure: Option<String>,
    /// Category filter. Absent or `"All"` matches everything.
    pub category: Option<String>,
    /// Total attendance.
    pub attendance: Option<u64>,
    /// Adults percentage, 0-100.
    pub adults_percent: Option<u32>,
}

impl MeasuresQueryParams {
    /// The location to load.
    ///
    /// City and state are passed through untrimmed; blank values are
    /// rejected by the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError`] if no usable location was given.
    pub fn location_query(&self) -> Result<LocationQuery, ParamsError> {
        match (&self.city, &self.state, self.latitude, self.longitude) {
            (Some(city), Some(state), _, _) => Ok(LocationQuery::Explicit {
                city: city.clone(),
                state: state.clone(),
            }),
            (_, _, Some(latitude), Some(longitude)) => Ok(LocationQuery::Coordinates(
                validate_coordinates(latitude, longitude)?,
            )),
            _ => Err(ParamsError::MissingLocation),
        }
    }

    /// Attendance and age split, defaulting to zero attendance and a 70%
    /// adult split.
    ///
    /// # Errors
    ///
    /// Returns [`ParamsError::AgeSplit`] if `adults_percent` exceeds 100.
    pub fn population(&self) -> Result<PopulationProfile, ParamsError> {
        let mut input = PopulationInput::default();
        if let Some(attendance) = self.attendance {
            input.attendance = attendance;
        }
        if let Some(adults_percent) = self.adults_percent {
            input.adults_percent = adults_percent;
        }
        Ok(PopulationProfile::try_from(input)?)
    }

    /// The measure filter.
    #[must_use]
    pub fn measure_filter(&self) -> Selection {
        selection(self.measure.as_deref())
    }

    /// The category filter.
    #[must_use]
    pub fn category_filter(&self) -> Selection {
        selection(self.category.as_deref())
    }
}

fn selection(value: Option<&str>) -> Selection {
    value.map_or(Selection::All, |v| Selection::from(v.to_string()))
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<Coordinates, ParamsError> {
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(Coordinates {
            latitude,
            longitude,
        })
    } else {
        Err(ParamsError::InvalidCoordinates)
    }
}

/// A resolved location as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocation {
    /// City name.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// `"City, ST"`.
    pub label: String,
}

impl From<LocationIdentity> for ApiLocation {
    fn from(location: LocationIdentity) -> Self {
        let label = location.to_string();
        Self {
            city: location.city,
            state: location.state,
            label,
        }
    }
}

/// A dropped record as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDroppedRecord {
    /// Position in the local record list.
    pub index: usize,
    /// Measure name as received.
    pub measure: String,
    /// Why the record was dropped.
    pub reason: String,
}

/// The dashboard for one location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDashboard {
    /// The location the data is for.
    pub location: ApiLocation,
    /// Table rows after filtering, sorted by prevalence descending.
    pub rows: Vec<TableRow>,
    /// Chart series for the measure filter.
    pub chart: ChartData,
    /// Measure dropdown options, without `"All"`.
    pub measures: Vec<String>,
    /// Category dropdown options, without `"All"`.
    pub categories: Vec<String>,
    /// Local records dropped as malformed.
    pub dropped_records: Vec<ApiDroppedRecord>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is up.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error classification.
    pub kind: String,
}
