#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Health measure types shared across the caring-hand dashboard pipeline.
//!
//! Raw records arrive from the statistics service as untyped JSON and are
//! kept string-typed in [`HealthRecord`]. The merger coerces them into
//! [`MergedMeasure`], which is what every downstream view and chart is
//! built from.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A raw health measure record as returned by the statistics service.
///
/// Every field is kept as a string. Numeric fields are coerced (and
/// validated) later by the merger, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Health indicator name (e.g. `"Obesity"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub measure: String,
    /// Prevalence percentage as a numeric string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub data_value: String,
    /// Four-digit year.
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    /// Lower bound of the confidence interval.
    #[serde(default, deserialize_with = "lenient_string")]
    pub low_confidence_limit: String,
    /// Upper bound of the confidence interval.
    #[serde(default, deserialize_with = "lenient_string")]
    pub high_confidence_limit: String,
    /// Grouping label (e.g. `"Health Outcomes"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
}

/// Accepts any JSON value and stores it as a string.
///
/// Strings are kept as-is, `null` becomes empty, and every other value is
/// stored as its JSON text. A field of the wrong type never fails the
/// whole response; the merger rejects the record it belongs to.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Ok(other.to_string()),
    }
}

/// The two record collections returned by the statistics service for a
/// single city/state query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDataResponse {
    /// Measures scoped to the queried location.
    #[serde(default)]
    pub city_state_data: Vec<HealthRecord>,
    /// Nationwide baseline measures.
    #[serde(default)]
    pub nationwide_data: Vec<HealthRecord>,
}

impl HealthDataResponse {
    /// Returns `true` when both collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city_state_data.is_empty() && self.nationwide_data.is_empty()
    }
}

/// Composite lookup key pairing a measure with a year.
///
/// Kept as a struct rather than a joined string so that a measure name
/// containing the separator can never collide with another pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeasureKey {
    /// Measure name.
    pub measure: String,
    /// Year string.
    pub year: String,
}

impl MeasureKey {
    /// Creates a key from a measure and a year.
    #[must_use]
    pub fn new(measure: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            measure: measure.into(),
            year: year.into(),
        }
    }
}

impl std::fmt::Display for MeasureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.measure, self.year)
    }
}

/// A validated local measure paired with its nationwide baseline.
///
/// At most one `MergedMeasure` exists per `measure` within a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedMeasure {
    /// Measure name, unique within a dataset.
    pub measure: String,
    /// Four-digit year.
    pub year: String,
    /// Local prevalence percentage.
    pub value: f64,
    /// Lower confidence limit.
    pub confidence_low: f64,
    /// Upper confidence limit.
    pub confidence_high: f64,
    /// Grouping label.
    pub category: String,
    /// Nationwide prevalence for the same measure and year, if any.
    pub nationwide_value: Option<f64>,
    /// User-entered annotation. Only the UI sets this.
    pub community_input: Option<f64>,
}

impl MergedMeasure {
    /// Returns the `(measure, year)` key for this entry.
    #[must_use]
    pub fn key(&self) -> MeasureKey {
        MeasureKey::new(self.measure.clone(), self.year.clone())
    }

    /// Compares the local value against the nationwide baseline.
    #[must_use]
    pub fn trend(&self) -> Option<Trend> {
        self.nationwide_value
            .map(|national| Trend::compare(self.value, national))
    }
}

/// A resolved location used as the query key for health data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationIdentity {
    /// City or county name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
}

impl std::fmt::Display for LocationIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.city, self.state)
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// How the user asked for a location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// City and state typed into the form.
    Explicit {
        /// City or county name.
        city: String,
        /// State abbreviation.
        state: String,
    },
    /// Coordinates from the browser's geolocation.
    Coordinates(Coordinates),
}

/// A filter choice for a dropdown: everything, or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    /// Matches every value.
    #[default]
    All,
    /// Matches exactly this value.
    Only(String),
}

/// The literal used by the UI for the match-everything option.
pub const ALL: &str = "All";

impl Selection {
    /// Returns `true` if `value` passes this filter.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        if value == ALL {
            Self::All
        } else {
            Self::Only(value)
        }
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        match value {
            Selection::All => ALL.to_string(),
            Selection::Only(s) => s,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(s) => f.write_str(s),
        }
    }
}

/// Which part of the attending population a measure applies to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgeSegment {
    /// Everyone in attendance.
    #[default]
    All,
    /// Adults only.
    Adults,
    /// Children only.
    Children,
}

/// Error returned when an adults percentage is outside 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid adults percentage {value}: expected 0-100")]
pub struct AgeSplitError {
    /// The rejected percentage.
    pub value: u32,
}

/// Adult/child split of the attending population.
///
/// Children always make up the remainder, so the two always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeSplit {
    adults_percent: u8,
}

impl AgeSplit {
    /// Adults percentage used when the user has not moved the slider.
    pub const DEFAULT_ADULTS_PERCENT: u8 = 70;

    /// Creates a split from the adults percentage.
    ///
    /// # Errors
    ///
    /// Returns [`AgeSplitError`] if `adults_percent` is greater than 100.
    pub fn new(adults_percent: u32) -> Result<Self, AgeSplitError> {
        u8::try_from(adults_percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(|adults_percent| Self { adults_percent })
            .ok_or(AgeSplitError {
                value: adults_percent,
            })
    }

    /// Percentage of adults.
    #[must_use]
    pub const fn adults_percent(self) -> u8 {
        self.adults_percent
    }

    /// Percentage of children (`100 - adults`).
    #[must_use]
    pub const fn children_percent(self) -> u8 {
        100 - self.adults_percent
    }

    /// Percentage of the population covered by `segment`.
    #[must_use]
    pub const fn percent_for(self, segment: AgeSegment) -> u8 {
        match segment {
            AgeSegment::All => 100,
            AgeSegment::Adults => self.adults_percent(),
            AgeSegment::Children => self.children_percent(),
        }
    }
}

impl Default for AgeSplit {
    fn default() -> Self {
        Self {
            adults_percent: Self::DEFAULT_ADULTS_PERCENT,
        }
    }
}

/// Direction of a local value relative to the nationwide baseline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    /// Local prevalence is higher than nationwide.
    Above,
    /// Local prevalence is lower than nationwide.
    Below,
    /// Local and nationwide prevalence are equal.
    Same,
}

impl Trend {
    /// Compares a local value with a nationwide value.
    #[must_use]
    pub fn compare(local: f64, national: f64) -> Self {
        match local.total_cmp(&national) {
            std::cmp::Ordering::Greater => Self::Above,
            std::cmp::Ordering::Less => Self::Below,
            std::cmp::Ordering::Equal => Self::Same,
        }
    }

    /// Arrow glyph shown next to the prevalence column.
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Above => "\u{2191}",
            Self::Below => "\u{2193}",
            Self::Same => "=",
        }
    }
}

/// One line on the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSeries {
    /// Measure name.
    pub label: String,
    /// CSS hex color (e.g. `"#ff6384"`).
    pub color: String,
    /// One entry per chart category (year). `None` where no value exists.
    pub points: Vec<Option<f64>>,
}

/// Chart-ready time series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Distinct years, ascending.
    pub categories: Vec<String>,
    /// One series per measure.
    pub series: Vec<NamedSeries>,
}
