//! Line chart series built from a merged dataset.
//!
//! Categories are the distinct years, ascending. Each measure becomes one
//! series with a point per year, `None` where the measure has no value for
//! that year. Nothing is interpolated.

use std::collections::HashMap;

use caring_hand_health_models::{ChartData, MeasureKey, MergedMeasure, NamedSeries, Selection};

use crate::view::measure_options;

/// Colors assigned to chart series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

/// Colors used when no palette is configured.
pub const DEFAULT_COLORS: &[&str] = &[
    "#ff6384", "#36a2eb", "#cc65fe", "#ffce56", "#4bc0c0", "#9966ff", "#ff9f40", "#2e7d32",
    "#8d6e63", "#c9cbcf",
];

impl Palette {
    /// Creates a palette. Returns `None` when `colors` is empty.
    #[must_use]
    pub fn new(colors: Vec<String>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    /// Color for the series at `index`, cycling when the palette runs out.
    #[must_use]
    pub fn color_for(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Builds chart series for entries whose measure passes `measure_filter`.
///
/// A series' color depends on its measure's first-seen position in the
/// whole `dataset`, so changing the filter never recolors a line.
#[must_use]
pub fn build(
    dataset: &[MergedMeasure],
    measure_filter: &Selection,
    palette: &Palette,
) -> ChartData {
    let color_index: HashMap<String, usize> = measure_options(dataset)
        .into_iter()
        .enumerate()
        .map(|(i, measure)| (measure, i))
        .collect();

    let filtered: Vec<&MergedMeasure> = dataset
        .iter()
        .filter(|m| measure_filter.matches(&m.measure))
        .collect();

    let mut categories: Vec<String> = Vec::new();
    for m in &filtered {
        if !categories.contains(&m.year) {
            categories.push(m.year.clone());
        }
    }
    categories.sort_by_key(|year| (year.parse::<u32>().unwrap_or(u32::MAX), year.clone()));

    let values: HashMap<MeasureKey, f64> = filtered.iter().map(|m| (m.key(), m.value)).collect();

    let mut labels: Vec<&str> = Vec::new();
    for m in &filtered {
        if !labels.contains(&m.measure.as_str()) {
            labels.push(&m.measure);
        }
    }

    let series = labels
        .into_iter()
        .map(|label| NamedSeries {
            label: label.to_string(),
            color: palette
                .color_for(color_index.get(label).copied().unwrap_or_default())
                .to_string(),
            points: categories
                .iter()
                .map(|year| values.get(&MeasureKey::new(label, year.as_str())).copied())
                .collect(),
        })
        .collect();

    ChartData { categories, series }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(name: &str, year: &str, value: f64) -> MergedMeasure {
        MergedMeasure {
            measure: name.to_string(),
            year: year.to_string(),
            value,
            confidence_low: value,
            confidence_high: value,
            category: "Health Outcomes".to_string(),
            nationwide_value: None,
            community_input: None,
        }
    }

    fn fixed_palette() -> Palette {
        Palette::new(vec!["#000001".to_string(), "#000002".to_string()]).unwrap()
    }

    #[test]
    fn categories_are_distinct_years_ascending() {
        let data = vec![
            measure("Obesity", "2022", 33.0),
            measure("Asthma", "2019", 9.0),
            measure("Smoking", "2020", 14.8),
            measure("Diabetes", "2019", 8.5),
        ];
        let chart = build(&data, &Selection::All, &fixed_palette());
        assert_eq!(chart.categories, vec!["2019", "2020", "2022"]);
    }

    #[test]
    fn every_series_has_one_point_per_category() {
        let data = vec![
            measure("Obesity", "2022", 33.0),
            measure("Asthma", "2019", 9.0),
            measure("Smoking", "2020", 14.8),
        ];
        let chart = build(&data, &Selection::All, &fixed_palette());
        assert_eq!(chart.series.len(), 3);
        for series in &chart.series {
            assert_eq!(series.points.len(), chart.categories.len());
        }
        let obesity = &chart.series[0];
        assert_eq!(obesity.label, "Obesity");
        assert_eq!(obesity.points, vec![None, None, Some(33.0)]);
    }

    #[test]
    fn multi_year_series_is_ordered_by_year() {
        let data = vec![
            measure("Obesity", "2021", 32.5),
            measure("Obesity", "2019", 31.2),
            measure("Obesity", "2020", 32.0),
        ];
        let chart = build(&data, &Selection::All, &fixed_palette());
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points, vec![Some(31.2), Some(32.0), Some(32.5)]);
    }

    #[test]
    fn filter_limits_series_and_categories() {
        let data = vec![
            measure("Obesity", "2022", 33.0),
            measure("Asthma", "2019", 9.0),
        ];
        let chart = build(&data, &Selection::Only("Asthma".to_string()), &fixed_palette());
        assert_eq!(chart.categories, vec!["2019"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points, vec![Some(9.0)]);
    }

    #[test]
    fn colors_are_deterministic_and_stable_under_filter() {
        let data = vec![
            measure("Obesity", "2022", 33.0),
            measure("Asthma", "2019", 9.0),
            measure("Smoking", "2020", 14.8),
        ];
        let palette = fixed_palette();
        let all = build(&data, &Selection::All, &palette);
        let colors: Vec<&str> = all.series.iter().map(|s| s.color.as_str()).collect();
        assert_eq!(colors, vec!["#000001", "#000002", "#000001"]);

        let asthma = build(&data, &Selection::Only("Asthma".to_string()), &palette);
        assert_eq!(asthma.series[0].color, "#000002");
    }

    #[test]
    fn empty_dataset_builds_empty_chart() {
        let chart = build(&[], &Selection::All, &Palette::default());
        assert_eq!(chart, ChartData::default());
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::new()).is_none());
        assert_eq!(Palette::default().color_for(0), "#ff6384");
        assert_eq!(Palette::default().color_for(DEFAULT_COLORS.len()), "#ff6384");
    }
}
