//! Population-scaled estimates.
//!
//! All rounding is half-up: `x.5` rounds to the next integer. Inputs are
//! non-negative, and a negative or non-finite product clamps to zero.

use caring_hand_health_models::{AgeSegment, AgeSplit};
use serde::{Deserialize, Serialize};

/// The attending population the estimates are scaled against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationProfile {
    /// Total attendance.
    pub attendance: u64,
    /// Adult/child split.
    pub split: AgeSplit,
}

impl PopulationProfile {
    /// Population base for `segment`.
    #[must_use]
    pub fn base_for(&self, segment: AgeSegment) -> u64 {
        population_base(self.attendance, self.split, segment)
    }

    /// Estimated number affected in `segment` at `prevalence_percent`.
    #[must_use]
    pub fn affected(&self, prevalence_percent: f64, segment: AgeSegment) -> u64 {
        segmented_estimate(prevalence_percent, self.attendance, self.split, segment)
    }
}

/// Estimated number of people affected, given a prevalence percentage.
///
/// `round(prevalence_percent / 100 * population_base)`, rounding half-up.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate(prevalence_percent: f64, population_base: u64) -> u64 {
    round_half_up(prevalence_percent / 100.0 * population_base as f64)
}

/// Size of the `segment` sub-population of `attendance`, rounding half-up.
#[must_use]
pub fn population_base(attendance: u64, split: AgeSplit, segment: AgeSegment) -> u64 {
    let scaled = u128::from(attendance) * u128::from(split.percent_for(segment));
    u64::try_from((scaled + 50) / 100).unwrap_or(u64::MAX)
}

/// Estimated number of people affected within the `segment`
/// sub-population of `attendance`.
///
/// `round(attendance * prevalence_percent / 100 * segment_percent / 100)`,
/// rounded once at the end. The sub-population itself is not rounded
/// first, so this can differ from `estimate(p, population_base(..))`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn segmented_estimate(
    prevalence_percent: f64,
    attendance: u64,
    split: AgeSplit,
    segment: AgeSegment,
) -> u64 {
    let segment_share = f64::from(split.percent_for(segment)) / 100.0;
    round_half_up(attendance as f64 * prevalence_percent / 100.0 * segment_share)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_half_up(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

/// Wire form of [`PopulationProfile`], validated on conversion.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationInput {
    /// Total attendance.
    #[serde(default)]
    pub attendance: u64,
    /// Adults percentage, 0-100.
    #[serde(default = "default_adults_percent")]
    pub adults_percent: u32,
}

const fn default_adults_percent() -> u32 {
    AgeSplit::DEFAULT_ADULTS_PERCENT as u32
}

impl Default for PopulationInput {
    fn default() -> Self {
        Self {
            attendance: 0,
            adults_percent: default_adults_percent(),
        }
    }
}

impl TryFrom<PopulationInput> for PopulationProfile {
    type Error = caring_hand_health_models::AgeSplitError;

    fn try_from(input: PopulationInput) -> Result<Self, Self::Error> {
        Ok(Self {
            attendance: input.attendance,
            split: AgeSplit::new(input.adults_percent)?,
        })
    }
}
