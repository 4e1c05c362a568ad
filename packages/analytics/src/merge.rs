//! Merges local and nationwide records into one dataset keyed by measure.
//!
//! Numeric fields arrive as strings and are coerced here. A record whose
//! required fields do not parse is dropped and reported, never zeroed.

use std::collections::HashMap;

use caring_hand_health_models::{HealthRecord, MeasureKey, MergedMeasure};
use strum_macros::{AsRefStr, Display};

/// A required record field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    /// `measure`
    Measure,
    /// `year`
    Year,
    /// `data_value`
    DataValue,
    /// `low_confidence_limit`
    LowConfidenceLimit,
    /// `high_confidence_limit`
    HighConfidenceLimit,
}

/// A local record that was dropped because a required field is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record {index} ({measure:?}): invalid {field} {raw:?}")]
pub struct MalformedRecordError {
    /// Position of the record in the local collection.
    pub index: usize,
    /// The record's measure name (may be empty).
    pub measure: String,
    /// The offending field.
    pub field: RecordField,
    /// The raw field value.
    pub raw: String,
}

/// What the merger skipped or overwrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Local records dropped as malformed.
    pub dropped: Vec<MalformedRecordError>,
    /// Nationwide records skipped because their value is not numeric.
    pub dropped_nationwide: usize,
    /// Local records that replaced an earlier record with the same measure.
    pub duplicates: usize,
}

impl MergeReport {
    /// Number of local records dropped as malformed.
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// The merged dataset and its report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// At most one entry per measure.
    pub measures: Vec<MergedMeasure>,
    /// Dropped and duplicate record accounting.
    pub report: MergeReport,
}

/// Merges local records with their nationwide baselines.
///
/// Each local record is matched to the nationwide record with the same
/// measure and year; a miss leaves `nationwide_value` empty. When two
/// local records share a measure, the later one replaces the earlier one
/// in the earlier one's position.
#[must_use]
pub fn merge(local: &[HealthRecord], nationwide: &[HealthRecord]) -> MergeOutcome {
    let mut report = MergeReport::default();
    let national = nationwide_index(nationwide, &mut report);

    let mut measures: Vec<MergedMeasure> = Vec::with_capacity(local.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, record) in local.iter().enumerate() {
        let mut merged = match coerce(index, record) {
            Ok(merged) => merged,
            Err(e) => {
                log::warn!("Dropping malformed record: {e}");
                report.dropped.push(e);
                continue;
            }
        };

        merged.nationwide_value = national.get(&merged.key()).copied();

        if let Some(&pos) = positions.get(&merged.measure) {
            log::warn!(
                "Duplicate measure {:?} (years {} and {}), keeping the later record",
                merged.measure,
                measures[pos].year,
                merged.year
            );
            report.duplicates += 1;
            measures[pos] = merged;
        } else {
            positions.insert(merged.measure.clone(), measures.len());
            measures.push(merged);
        }
    }

    log::info!(
        "Merged {} measures ({} dropped, {} duplicates, {} nationwide skipped)",
        measures.len(),
        report.dropped_count(),
        report.duplicates,
        report.dropped_nationwide
    );

    MergeOutcome { measures, report }
}

/// Indexes nationwide values by measure and year, last write wins.
fn nationwide_index(
    nationwide: &[HealthRecord],
    report: &mut MergeReport,
) -> HashMap<MeasureKey, f64> {
    let mut index = HashMap::with_capacity(nationwide.len());

    for record in nationwide {
        let Some(value) = parse_number(&record.data_value) else {
            log::warn!(
                "Skipping nationwide {:?} {}: data_value {:?} is not numeric",
                record.measure,
                record.year,
                record.data_value
            );
            report.dropped_nationwide += 1;
            continue;
        };
        index.insert(
            MeasureKey::new(record.measure.clone(), record.year.trim()),
            value,
        );
    }

    index
}

/// Validates and converts a single local record.
fn coerce(index: usize, record: &HealthRecord) -> Result<MergedMeasure, MalformedRecordError> {
    let malformed = |field: RecordField, raw: &str| MalformedRecordError {
        index,
        measure: record.measure.clone(),
        field,
        raw: raw.to_string(),
    };

    if record.measure.trim().is_empty() {
        return Err(malformed(RecordField::Measure, &record.measure));
    }

    let year = record.year.trim();
    if !is_four_digit_year(year) {
        return Err(malformed(RecordField::Year, &record.year));
    }

    let value = parse_number(&record.data_value)
        .ok_or_else(|| malformed(RecordField::DataValue, &record.data_value))?;
    let confidence_low = parse_number(&record.low_confidence_limit)
        .ok_or_else(|| malformed(RecordField::LowConfidenceLimit, &record.low_confidence_limit))?;
    let confidence_high = parse_number(&record.high_confidence_limit).ok_or_else(|| {
        malformed(
            RecordField::HighConfidenceLimit,
            &record.high_confidence_limit,
        )
    })?;

    Ok(MergedMeasure {
        measure: record.measure.clone(),
        year: year.to_string(),
        value,
        confidence_low,
        confidence_high,
        category: record.category.clone(),
        nationwide_value: None,
        community_input: None,
    })
}

/// Parses a finite float. `NaN` and infinities are rejected.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_four_digit_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(measure: &str, value: &str, year: &str) -> HealthRecord {
        HealthRecord {
            measure: measure.to_string(),
            data_value: value.to_string(),
            year: year.to_string(),
            low_confidence_limit: "1.0".to_string(),
            high_confidence_limit: "99.0".to_string(),
            category: "Health Outcomes".to_string(),
        }
    }

    #[test]
    fn attaches_nationwide_value_for_same_measure_and_year() {
        let local = [record("Obesity", "33.0", "2021")];
        let nationwide = [
            record("Obesity", "30.1", "2020"),
            record("Obesity", "31.2", "2021"),
            record("Asthma", "9.7", "2021"),
        ];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures.len(), 1);
        assert_eq!(outcome.measures[0].nationwide_value, Some(31.2));
        assert!((outcome.measures[0].value - 33.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unmatched_year_leaves_nationwide_absent() {
        let local = [record("Obesity", "33.0", "2022")];
        let nationwide = [record("Obesity", "31.2", "2021")];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures[0].nationwide_value, None);
    }

    #[test]
    fn zero_nationwide_value_is_kept() {
        let local = [record("Obesity", "33.0", "2021")];
        let nationwide = [record("Obesity", "0", "2021")];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures[0].nationwide_value, Some(0.0));
    }

    #[test]
    fn separator_in_measure_does_not_cross_match() {
        let local = [record("A_2020", "5.0", "1999")];
        let nationwide = [record("A", "7.0", "2020_1999")];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures[0].nationwide_value, None);
    }

    #[test]
    fn duplicate_measures_keep_one_entry_last_wins() {
        let local = [
            record("Obesity", "30.0", "2019"),
            record("Asthma", "10.0", "2019"),
            record("Obesity", "33.0", "2021"),
        ];
        let outcome = merge(&local, &[]);
        assert_eq!(outcome.measures.len(), 2);
        assert_eq!(outcome.measures[0].measure, "Obesity");
        assert_eq!(outcome.measures[0].year, "2021");
        assert_eq!(outcome.report.duplicates, 1);
    }

    #[test]
    fn non_numeric_value_is_dropped_and_reported() {
        let local = [
            record("Obesity", "n/a", "2021"),
            record("Asthma", "10.2", "2021"),
        ];
        let outcome = merge(&local, &[]);
        assert_eq!(outcome.measures.len(), 1);
        assert_eq!(outcome.report.dropped_count(), 1);
        let dropped = &outcome.report.dropped[0];
        assert_eq!(dropped.index, 0);
        assert_eq!(dropped.field, RecordField::DataValue);
        assert_eq!(dropped.raw, "n/a");
    }

    #[test]
    fn non_scalar_field_text_drops_only_its_record() {
        let mut bad = record("Asthma", "true", "2021");
        bad.low_confidence_limit = r#"{"value":1}"#.to_string();
        let local = [record("Obesity", "33.0", "2021"), bad];
        let outcome = merge(&local, &[]);
        assert_eq!(outcome.measures.len(), 1);
        assert_eq!(outcome.measures[0].measure, "Obesity");
        assert_eq!(outcome.report.dropped[0].index, 1);
        assert_eq!(outcome.report.dropped[0].raw, "true");
    }

    #[test]
    fn nan_and_blank_limits_are_malformed() {
        let mut nan = record("Obesity", "NaN", "2021");
        let outcome = merge(std::slice::from_ref(&nan), &[]);
        assert_eq!(outcome.report.dropped[0].field, RecordField::DataValue);

        nan.data_value = "33.0".to_string();
        nan.high_confidence_limit = String::new();
        let outcome = merge(&[nan], &[]);
        assert_eq!(
            outcome.report.dropped[0].field,
            RecordField::HighConfidenceLimit
        );
    }

    #[test]
    fn invalid_year_and_blank_measure_are_malformed() {
        let outcome = merge(
            &[record("Obesity", "33.0", "21"), record(" ", "1.0", "2021")],
            &[],
        );
        assert!(outcome.measures.is_empty());
        let fields: Vec<RecordField> = outcome.report.dropped.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![RecordField::Year, RecordField::Measure]);
    }

    #[test]
    fn malformed_nationwide_is_skipped_and_counted() {
        let local = [record("Obesity", "33.0", "2021")];
        let nationwide = [record("Obesity", "", "2021")];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures[0].nationwide_value, None);
        assert_eq!(outcome.report.dropped_nationwide, 1);
    }

    #[test]
    fn whitespace_around_numbers_and_year_is_accepted() {
        let local = [record("Obesity", " 33.0 ", " 2021 ")];
        let nationwide = [record("Obesity", "31.2", "2021")];
        let outcome = merge(&local, &nationwide);
        assert_eq!(outcome.measures[0].year, "2021");
        assert_eq!(outcome.measures[0].nationwide_value, Some(31.2));
    }

    #[test]
    fn malformed_error_message_names_field() {
        let e = MalformedRecordError {
            index: 3,
            measure: "Obesity".to_string(),
            field: RecordField::LowConfidenceLimit,
            raw: "x".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "record 3 (\"Obesity\"): invalid low_confidence_limit \"x\""
        );
    }
}
