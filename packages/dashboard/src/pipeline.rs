//! Resolve → fetch → merge for a single query.

use std::sync::Arc;

use caring_hand_analytics::merge::merge;
use caring_hand_analytics::{MergeOutcome, MergeReport};
use caring_hand_geocoder::resolver::LocationResolver;
use caring_hand_health_models::{LocationIdentity, LocationQuery, MergedMeasure};
use caring_hand_source::HealthDataFetcher;
use caring_hand_source::statistics::HttpHealthDataFetcher;

use crate::PipelineError;

/// A freshly fetched and merged dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    /// The location the data was fetched for.
    pub location: LocationIdentity,
    /// At most one entry per measure.
    pub measures: Vec<MergedMeasure>,
    /// Records dropped or overwritten during the merge.
    pub report: MergeReport,
}

/// Runs the data pipeline against a resolver and a fetcher.
#[derive(Clone)]
pub struct Pipeline {
    resolver: LocationResolver,
    fetcher: Arc<dyn HealthDataFetcher>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(resolver: LocationResolver, fetcher: Arc<dyn HealthDataFetcher>) -> Self {
        Self { resolver, fetcher }
    }

    /// Creates a pipeline from the embedded service configs and
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if either HTTP client cannot be built or
    /// no reverse geocoding service is enabled.
    pub fn from_env() -> Result<Self, PipelineError> {
        let resolver = LocationResolver::from_env()?;
        let fetcher = HttpHealthDataFetcher::from_env()?;
        Ok(Self::new(resolver, Arc::new(fetcher)))
    }

    /// Resolves a location query without fetching data.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Location`] if resolution fails.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<LocationIdentity, PipelineError> {
        Ok(self.resolver.resolve(query).await?)
    }

    /// Resolves the location, fetches both record collections, and merges
    /// them.
    ///
    /// Malformed records do not fail the load; they are listed in the
    /// returned [`MergeReport`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if resolution or fetching fails, including
    /// when the service has no data for the location.
    pub async fn load(&self, query: &LocationQuery) -> Result<LoadedDataset, PipelineError> {
        let location = self.resolver.resolve(query).await?;
        let response = self.fetcher.fetch(&location).await?;

        let MergeOutcome { measures, report } =
            merge(&response.city_state_data, &response.nationwide_data);

        Ok(LoadedDataset {
            location,
            measures,
            report,
        })
    }
}
