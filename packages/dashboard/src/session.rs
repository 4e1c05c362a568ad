//! Dashboard session state.
//!
//! Holds the form fields, the last committed dataset, the filters, and the
//! population inputs. Every derived output (table rows, chart, dropdown
//! options) is recomputed from the committed dataset on demand.
//!
//! Results are applied with the [`Ticket`] issued when their request
//! started. A result whose ticket is no longer current is dropped, so a
//! slow geolocation lookup cannot overwrite a later manual submission.

use caring_hand_analytics::chart::{self, Palette};
use caring_hand_analytics::estimate::PopulationProfile;
use caring_hand_analytics::segments::SegmentRules;
use caring_hand_analytics::table::{TableRow, build_rows};
use caring_hand_analytics::view;
use caring_hand_health_models::{
    ChartData, LocationIdentity, LocationQuery, MergedMeasure, Selection,
};

use crate::guard::{RequestGuard, Ticket};
use crate::pipeline::LoadedDataset;
use crate::{ErrorKind, PipelineError};

/// Where the dashboard is in its request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Nothing submitted yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The committed dataset is the answer to the latest request.
    Ready,
    /// The latest request failed. Any committed dataset is from an
    /// earlier request.
    Failed {
        /// Error classification.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

/// Whether a result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The result belonged to the latest request and was applied.
    Current,
    /// A newer request had started; the result was discarded.
    Stale,
}

/// What the table area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    /// No dataset has ever been committed.
    NotSubmitted,
    /// The latest request produced no data.
    NoResults,
    /// A dataset is present; `visible` rows pass the current filters.
    Results {
        /// Rows passing the filters. Zero means "filtered to empty".
        visible: usize,
    },
}

/// Errors from editing community input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommunityInputError {
    /// The text is not a finite number.
    #[error("community input {raw:?} is not a number")]
    NotNumeric {
        /// The rejected text.
        raw: String,
    },

    /// No measure with that name exists in the dataset.
    #[error("unknown measure {measure:?}")]
    UnknownMeasure {
        /// The requested measure.
        measure: String,
    },

    /// Nothing has been loaded yet.
    #[error("no dataset loaded")]
    NoDataset,
}

/// Parses community input text. Blank text clears the value.
///
/// # Errors
///
/// Returns [`CommunityInputError::NotNumeric`] if the text is neither
/// blank nor a finite number.
pub fn parse_community_input(raw: &str) -> Result<Option<f64>, CommunityInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| CommunityInputError::NotNumeric {
            raw: raw.to_string(),
        })
}

/// A single user's dashboard.
#[derive(Debug)]
pub struct Dashboard {
    guard: RequestGuard,
    city: String,
    state: String,
    population: PopulationProfile,
    measure_filter: Selection,
    category_filter: Selection,
    dataset: Option<LoadedDataset>,
    status: Status,
    rules: SegmentRules,
    palette: Palette,
}

impl Dashboard {
    /// Creates an empty dashboard.
    #[must_use]
    pub fn new(rules: SegmentRules, palette: Palette) -> Self {
        Self {
            guard: RequestGuard::new(),
            city: String::new(),
            state: String::new(),
            population: PopulationProfile::default(),
            measure_filter: Selection::All,
            category_filter: Selection::All,
            dataset: None,
            status: Status::Idle,
            rules,
            palette,
        }
    }

    /// Current city and state form values.
    #[must_use]
    pub fn form(&self) -> (&str, &str) {
        (&self.city, &self.state)
    }

    /// Updates the city and state form values.
    pub fn set_form(&mut self, city: impl Into<String>, state: impl Into<String>) {
        self.city = city.into();
        self.state = state.into();
    }

    /// A query for the current form values.
    #[must_use]
    pub fn explicit_query(&self) -> LocationQuery {
        LocationQuery::Explicit {
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }

    /// Starts a request, making any in-flight request stale.
    pub fn begin_request(&mut self) -> Ticket {
        self.status = Status::Loading;
        self.guard.begin()
    }

    /// Applies a location lookup result to the form.
    ///
    /// On success the status stays [`Status::Loading`] until the same
    /// ticket's load is applied. On failure the form fields are left
    /// untouched.
    pub fn apply_location(
        &mut self,
        ticket: Ticket,
        result: Result<LocationIdentity, PipelineError>,
    ) -> Applied {
        if !self.guard.is_current(ticket) {
            log::debug!("Discarding stale location result (generation {})", ticket.generation());
            return Applied::Stale;
        }

        match result {
            Ok(location) => {
                self.city = location.city;
                self.state = location.state;
            }
            Err(e) => self.fail(&e),
        }
        Applied::Current
    }

    /// Applies a pipeline result.
    ///
    /// A successful load replaces the dataset wholesale, discarding
    /// community input and resetting filters. A failed load keeps the
    /// previous dataset but marks it stale.
    pub fn apply_load(
        &mut self,
        ticket: Ticket,
        result: Result<LoadedDataset, PipelineError>,
    ) -> Applied {
        if !self.guard.is_current(ticket) {
            log::warn!(
                "Discarding stale dataset response (generation {})",
                ticket.generation()
            );
            return Applied::Stale;
        }

        match result {
            Ok(dataset) => {
                log::info!(
                    "Committed {} measures for {}",
                    dataset.measures.len(),
                    dataset.location
                );
                self.city.clone_from(&dataset.location.city);
                self.state.clone_from(&dataset.location.state);
                self.measure_filter = Selection::All;
                self.category_filter = Selection::All;
                self.dataset = Some(dataset);
                self.status = Status::Ready;
            }
            Err(e) => self.fail(&e),
        }
        Applied::Current
    }

    fn fail(&mut self, error: &PipelineError) {
        log::warn!("Request failed: {error}");
        self.status = Status::Failed {
            kind: error.kind(),
            message: error.to_string(),
        };
    }

    /// Request lifecycle status.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Returns `true` when a dataset is shown but the latest request did
    /// not produce it.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.dataset.is_some() && self.status != Status::Ready
    }

    /// The committed dataset, if any.
    #[must_use]
    pub const fn dataset(&self) -> Option<&LoadedDataset> {
        self.dataset.as_ref()
    }

    fn measures(&self) -> &[MergedMeasure] {
        self.dataset.as_ref().map_or(&[], |d| d.measures.as_slice())
    }

    /// Sets attendance and age split.
    pub fn set_population(&mut self, population: PopulationProfile) {
        self.population = population;
    }

    /// Sets the measure and category filters.
    pub fn set_filters(&mut self, measure: Selection, category: Selection) {
        self.measure_filter = measure;
        self.category_filter = category;
    }

    /// Sets or clears community input for `measure` from raw text.
    ///
    /// # Errors
    ///
    /// Returns [`CommunityInputError`] if the text is not a number, no
    /// dataset is loaded, or the measure is unknown.
    pub fn set_community_input(
        &mut self,
        measure: &str,
        raw: &str,
    ) -> Result<(), CommunityInputError> {
        let value = parse_community_input(raw)?;
        let dataset = self
            .dataset
            .as_mut()
            .ok_or(CommunityInputError::NoDataset)?;
        let entry = dataset
            .measures
            .iter_mut()
            .find(|m| m.measure == measure)
            .ok_or_else(|| CommunityInputError::UnknownMeasure {
                measure: measure.to_string(),
            })?;
        entry.community_input = value;
        Ok(())
    }

    /// Table rows for the current filters, sorted by prevalence.
    #[must_use]
    pub fn rows(&self) -> Vec<TableRow> {
        build_rows(
            view::view(self.measures(), &self.measure_filter, &self.category_filter),
            &self.population,
            &self.rules,
        )
    }

    /// Chart series for the current measure filter.
    #[must_use]
    pub fn chart(&self) -> ChartData {
        chart::build(self.measures(), &self.measure_filter, &self.palette)
    }

    /// Measure dropdown options (without "All").
    #[must_use]
    pub fn measure_options(&self) -> Vec<String> {
        view::measure_options(self.measures())
    }

    /// Category dropdown options (without "All").
    #[must_use]
    pub fn category_options(&self) -> Vec<String> {
        view::category_options(self.measures())
    }

    /// What the table area should show.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        match (&self.dataset, &self.status) {
            (None, Status::Failed { .. }) => TableState::NoResults,
            (None, _) => TableState::NotSubmitted,
            (Some(_), Status::Failed { kind, .. }) if *kind == ErrorKind::NoData => {
                TableState::NoResults
            }
            (Some(dataset), _) if dataset.measures.is_empty() => TableState::NoResults,
            (Some(_), _) => TableState::Results {
                visible: view::view(self.measures(), &self.measure_filter, &self.category_filter)
                    .len(),
            },
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(
            caring_hand_analytics::segments::default_rules(),
            Palette::default(),
        )
    }
}
