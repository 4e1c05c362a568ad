//! Display rows for the measure table.

use caring_hand_health_models::{AgeSegment, MergedMeasure, Trend};
use serde::Serialize;

use crate::estimate::PopulationProfile;
use crate::segments::SegmentRules;

/// One row of the measure table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Measure name.
    pub measure: String,
    /// Year of the local value.
    pub year: String,
    /// Grouping label.
    pub category: String,
    /// Local prevalence percentage.
    pub value: f64,
    /// Lower confidence limit.
    pub confidence_low: f64,
    /// Upper confidence limit.
    pub confidence_high: f64,
    /// Nationwide prevalence, if any.
    pub nationwide_value: Option<f64>,
    /// Local vs. nationwide direction, absent without a nationwide value.
    pub trend: Option<Trend>,
    /// User-entered annotation.
    pub community_input: Option<f64>,
    /// Population segment the estimate is scaled against.
    pub segment: AgeSegment,
    /// Estimated number of affected people in that segment.
    pub estimated_affected: u64,
}

/// Builds table rows in the order given, typically a filtered view.
pub fn build_rows<'a, I>(
    measures: I,
    population: &PopulationProfile,
    rules: &SegmentRules,
) -> Vec<TableRow>
where
    I: IntoIterator<Item = &'a MergedMeasure>,
{
    measures
        .into_iter()
        .map(|m| {
            let segment = rules.segment_for(&m.measure);
            TableRow {
                measure: m.measure.clone(),
                year: m.year.clone(),
                category: m.category.clone(),
                value: m.value,
                confidence_low: m.confidence_low,
                confidence_high: m.confidence_high,
                nationwide_value: m.nationwide_value,
                trend: m.trend(),
                community_input: m.community_input,
                segment,
                estimated_affected: population.affected(m.value, segment),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::default_rules;
    use crate::view::view;
    use caring_hand_health_models::{AgeSplit, Selection};

    fn measure(name: &str, value: f64, nationwide: Option<f64>) -> MergedMeasure {
        MergedMeasure {
            measure: name.to_string(),
            year: "2022".to_string(),
            value,
            confidence_low: value - 0.5,
            confidence_high: value + 0.5,
            category: "Health Outcomes".to_string(),
            nationwide_value: nationwide,
            community_input: None,
        }
    }

    #[test]
    fn rows_follow_view_order_with_estimates() {
        let data = vec![
            measure("Hypertension", 28.1, Some(32.0)),
            measure("Obesity", 33.0, Some(31.2)),
            measure("Asthma", 12.4, None),
        ];
        let population = PopulationProfile {
            attendance: 1000,
            split: AgeSplit::new(70).unwrap(),
        };
        let rows = build_rows(
            view(&data, &Selection::All, &Selection::All),
            &population,
            &default_rules(),
        );

        let names: Vec<&str> = rows.iter().map(|r| r.measure.as_str()).collect();
        assert_eq!(names, vec!["Obesity", "Hypertension", "Asthma"]);

        assert_eq!(rows[0].estimated_affected, 330);
        assert_eq!(rows[0].segment, AgeSegment::All);
        assert_eq!(rows[0].trend, Some(Trend::Above));

        assert_eq!(rows[1].estimated_affected, 197);
        assert_eq!(rows[1].segment, AgeSegment::Adults);
        assert_eq!(rows[1].trend, Some(Trend::Below));

        assert_eq!(rows[2].segment, AgeSegment::Children);
        assert_eq!(rows[2].estimated_affected, 37);
        assert_eq!(rows[2].trend, None);
    }

    #[test]
    fn row_serializes_camel_case() {
        let rows = build_rows(
            &[measure("Obesity", 33.0, None)],
            &PopulationProfile::default(),
            &SegmentRules::default(),
        );
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["estimatedAffected"], 0);
        assert_eq!(json["segment"], "all");
        assert!(json["nationwideValue"].is_null());
    }
}
