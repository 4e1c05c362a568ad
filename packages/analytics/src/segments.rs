//! Measure to age-segment rules.
//!
//! Some measures only apply to adults or to children. The rules are an
//! embedded TOML file (`packages/analytics/segments.toml`); measures with
//! no rule are estimated against everyone in attendance.

use caring_hand_health_models::AgeSegment;
use serde::Deserialize;

const SEGMENTS_TOML: &str = include_str!("../segments.toml");

/// A single measure rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegmentRule {
    /// Measure name, matched case-insensitively after trimming.
    pub measure: String,
    /// Segment the measure applies to.
    pub segment: AgeSegment,
}

/// The full rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SegmentRules {
    /// Rules in file order. The first match wins.
    #[serde(default)]
    pub rules: Vec<SegmentRule>,
}

impl SegmentRules {
    /// Segment for `measure`, or [`AgeSegment::All`] when no rule matches.
    #[must_use]
    pub fn segment_for(&self, measure: &str) -> AgeSegment {
        let measure = measure.trim();
        self.rules
            .iter()
            .find(|rule| rule.measure.trim().eq_ignore_ascii_case(measure))
            .map_or(AgeSegment::All, |rule| rule.segment)
    }
}

/// Parses rules from a TOML string.
///
/// # Errors
///
/// Returns an error string if the TOML is malformed or names an unknown
/// segment.
pub fn parse_segment_rules(toml_str: &str) -> Result<SegmentRules, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns the embedded rules.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn default_rules() -> SegmentRules {
    parse_segment_rules(SEGMENTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded segment rules: {e}"))
}
