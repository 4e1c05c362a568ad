//! Filtered, sorted projections of a merged dataset.

use std::collections::HashSet;

use caring_hand_health_models::{MergedMeasure, Selection};

/// Keeps entries matching both filters, sorted by value descending.
///
/// The sort is stable, so entries with equal values keep their input
/// order. The input is never modified; calling this again on its own
/// output with the same filters yields the same sequence.
pub fn view<'a, I>(dataset: I, measure: &Selection, category: &Selection) -> Vec<&'a MergedMeasure>
where
    I: IntoIterator<Item = &'a MergedMeasure>,
{
    let mut retained: Vec<&MergedMeasure> = dataset
        .into_iter()
        .filter(|m| measure.matches(&m.measure) && category.matches(&m.category))
        .collect();
    retained.sort_by(|a, b| b.value.total_cmp(&a.value));
    retained
}

/// Distinct measure names in first-seen order.
#[must_use]
pub fn measure_options(dataset: &[MergedMeasure]) -> Vec<String> {
    distinct(dataset.iter().map(|m| m.measure.as_str()))
}

/// Distinct category names in first-seen order.
#[must_use]
pub fn category_options(dataset: &[MergedMeasure]) -> Vec<String> {
    distinct(dataset.iter().map(|m| m.category.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}
