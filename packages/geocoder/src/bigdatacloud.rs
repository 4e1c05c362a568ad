//! `BigDataCloud` reverse geocoding client.
//!
//! Uses the free client-side endpoint, which needs no API key and answers
//! with the containing city and an ISO 3166-2 subdivision code.
//!
//! See <https://www.bigdatacloud.com/free-api/free-reverse-geocode-to-city-api>

use std::time::Duration;

use async_trait::async_trait;
use caring_hand_health_models::Coordinates;

use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{LocationError, ReverseGeocoder, ReversePlace};

/// Reverse geocodes a coordinate pair.
///
/// # Errors
///
/// Returns [`LocationError`] if the HTTP request fails, the provider
/// answers with a non-success status, or the response cannot be parsed.
pub async fn reverse_geocode(
    client: &reqwest::Client,
    base_url: &str,
    locality_language: &str,
    coordinates: Coordinates,
) -> Result<ReversePlace, LocationError> {
    log::debug!(
        "Reverse geocoding ({}, {}) via {base_url}",
        coordinates.latitude,
        coordinates.longitude
    );

    let resp = client
        .get(base_url)
        .query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("localityLanguage", locality_language.to_string()),
        ])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(LocationError::Status {
            status: status.as_u16(),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a `BigDataCloud` JSON response.
///
/// # Errors
///
/// Returns [`LocationError::Parse`] if the body is not an object or has no
/// `principalSubdivisionCode`.
pub fn parse_response(body: &serde_json::Value) -> Result<ReversePlace, LocationError> {
    if !body.is_object() {
        return Err(LocationError::Parse {
            message: "Reverse geocoding response is not an object".to_string(),
        });
    }

    let principal_subdivision_code = body["principalSubdivisionCode"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| LocationError::Parse {
            message: "Missing principalSubdivisionCode in reverse geocoding response".to_string(),
        })?;

    Ok(ReversePlace {
        city: body["city"].as_str().unwrap_or_default().to_string(),
        locality: body["locality"].as_str().unwrap_or_default().to_string(),
        principal_subdivision_code,
    })
}

/// A configured `BigDataCloud` client.
#[derive(Debug, Clone)]
pub struct BigDataCloudGeocoder {
    client: reqwest::Client,
    base_url: String,
    locality_language: String,
}

impl BigDataCloudGeocoder {
    /// Creates a client for `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: String, locality_language: String) -> Self {
        Self {
            client,
            base_url,
            locality_language,
        }
    }

    /// Builds a client from a registry entry, with `base_url_override`
    /// replacing the configured URL when present.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::Http`] if the HTTP client cannot be built.
    pub fn from_service(
        service: &GeocodingService,
        base_url_override: Option<String>,
    ) -> Result<Self, LocationError> {
        let ProviderConfig::BigDataCloud {
            base_url,
            locality_language,
            timeout_secs,
        } = &service.provider;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*timeout_secs))
            .build()?;

        Ok(Self::new(
            client,
            base_url_override.unwrap_or_else(|| base_url.clone()),
            locality_language.clone(),
        ))
    }

    /// The URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<ReversePlace, LocationError> {
        reverse_geocode(
            &self.client,
            &self.base_url,
            &self.locality_language,
            coordinates,
        )
        .await
    }
}
