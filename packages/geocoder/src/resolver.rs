//! Resolves user location input into a [`LocationIdentity`].

use std::sync::Arc;
use std::time::Duration;

use caring_hand_health_models::{Coordinates, LocationIdentity, LocationQuery};

use crate::bigdatacloud::BigDataCloudGeocoder;
use crate::service_registry::enabled_services;
use crate::{LocationError, ReverseGeocoder, ReversePlace};

/// Timeout applied to coordinate lookups when none is configured.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves explicit or coordinate-based location queries.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn ReverseGeocoder>,
    timeout: Duration,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LocationResolver {
    /// Creates a resolver around a reverse geocoder.
    #[must_use]
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, timeout: Duration) -> Self {
        Self { geocoder, timeout }
    }

    /// Builds a resolver from the highest-priority enabled service.
    ///
    /// `REVERSE_GEOCODE_URL` overrides the service URL and
    /// `LOCATION_TIMEOUT_SECS` overrides [`DEFAULT_LOOKUP_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::NoService`] if no service is enabled, or
    /// [`LocationError::Http`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, LocationError> {
        let service = enabled_services()
            .into_iter()
            .next()
            .ok_or(LocationError::NoService)?;

        let url_override = std::env::var("REVERSE_GEOCODE_URL").ok();
        let timeout = std::env::var("LOCATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(DEFAULT_LOOKUP_TIMEOUT, Duration::from_secs);

        let geocoder = BigDataCloudGeocoder::from_service(&service, url_override)?;
        log::info!(
            "Using {} for reverse geocoding ({}), timeout {timeout:?}",
            service.name,
            geocoder.base_url()
        );

        Ok(Self::new(Arc::new(geocoder), timeout))
    }

    /// Resolves a location query.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if explicit input is blank or the
    /// coordinate lookup fails, times out, or returns a malformed place.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<LocationIdentity, LocationError> {
        match query {
            LocationQuery::Explicit { city, state } => resolve_explicit(city, state),
            LocationQuery::Coordinates(coordinates) => self.resolve_coordinates(*coordinates).await,
        }
    }

    /// Reverse geocodes `coordinates`, bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if the lookup fails, times out, or returns
    /// a malformed place.
    pub async fn resolve_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<LocationIdentity, LocationError> {
        let place = tokio::time::timeout(self.timeout, self.geocoder.reverse(coordinates))
            .await
            .map_err(|_| LocationError::Timeout {
                after: self.timeout,
            })??;

        let identity = identity_from_place(&place)?;
        log::info!(
            "Resolved ({}, {}) to {identity}",
            coordinates.latitude,
            coordinates.longitude
        );
        Ok(identity)
    }
}

/// Builds an identity from typed city/state input.
///
/// Both values are trimmed; no other validation is applied.
///
/// # Errors
///
/// Returns [`LocationError::EmptyField`] if either value is blank.
pub fn resolve_explicit(city: &str, state: &str) -> Result<LocationIdentity, LocationError> {
    let city = city.trim();
    let state = state.trim();

    if city.is_empty() {
        return Err(LocationError::EmptyField { field: "city" });
    }
    if state.is_empty() {
        return Err(LocationError::EmptyField { field: "state" });
    }

    Ok(LocationIdentity {
        city: city.to_string(),
        state: state.to_string(),
    })
}

/// Extracts the state segment from a `"<country>-<state>"` code.
///
/// # Errors
///
/// Returns [`LocationError::MalformedSubdivision`] if the code has no `-`
/// or the state segment is empty.
pub fn parse_subdivision_code(code: &str) -> Result<String, LocationError> {
    code.split('-')
        .nth(1)
        .map(str::trim)
        .filter(|state| !state.is_empty())
        .map(String::from)
        .ok_or_else(|| LocationError::MalformedSubdivision {
            code: code.to_string(),
        })
}

/// Converts a provider answer into an identity, falling back to the
/// locality when the city is empty.
///
/// # Errors
///
/// Returns [`LocationError`] if the subdivision code is malformed or no
/// city or locality name is present.
pub fn identity_from_place(place: &ReversePlace) -> Result<LocationIdentity, LocationError> {
    let state = parse_subdivision_code(&place.principal_subdivision_code)?;

    let city = [place.city.trim(), place.locality.trim()]
        .into_iter()
        .find(|name| !name.is_empty())
        .ok_or_else(|| LocationError::Parse {
            message: "Reverse geocoding response has neither city nor locality".to_string(),
        })?;

    Ok(LocationIdentity {
        city: city.to_string(),
        state,
    })
}
