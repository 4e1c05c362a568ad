//! HTTP fetcher for the statistics service.
//!
//! Issues a single `GET <base_url>?city=..&state=..` and expects a body of
//! the form `{ "city_state_data": [...], "nationwide_data": [...] }`.

use std::time::Duration;

use async_trait::async_trait;
use caring_hand_health_models::{HealthDataResponse, LocationIdentity};

use crate::endpoint::{HealthDataEndpoint, default_endpoint};
use crate::request::send_json;
use crate::{FetchError, HealthDataFetcher, ensure_not_empty};

/// Fetches health records over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHealthDataFetcher {
    client: reqwest::Client,
    endpoint: HealthDataEndpoint,
}

impl HttpHealthDataFetcher {
    /// Creates a fetcher for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: HealthDataEndpoint) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Creates a fetcher for the embedded endpoint with environment
    /// overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, FetchError> {
        let endpoint = default_endpoint().with_env_overrides();
        log::info!("Using {} at {}", endpoint.name, endpoint.base_url);
        Self::new(endpoint)
    }

    /// The configured endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &HealthDataEndpoint {
        &self.endpoint
    }

    /// Builds the query parameters for `location`.
    #[must_use]
    pub fn query_params(&self, location: &LocationIdentity) -> [(String, String); 2] {
        [
            (self.endpoint.params.city.clone(), location.city.clone()),
            (self.endpoint.params.state.clone(), location.state.clone()),
        ]
    }
}

#[async_trait]
impl HealthDataFetcher for HttpHealthDataFetcher {
    async fn fetch(&self, location: &LocationIdentity) -> Result<HealthDataResponse, FetchError> {
        log::debug!("Fetching health data for {location} from {}", self.endpoint.base_url);

        let body = send_json(
            self.client
                .get(&self.endpoint.base_url)
                .query(&self.query_params(location)),
        )
        .await?;

        let response = parse_response(body)?;
        log::info!(
            "Fetched {} local and {} nationwide records for {location}",
            response.city_state_data.len(),
            response.nationwide_data.len()
        );

        ensure_not_empty(location, response)
    }
}

/// Parses the statistics service response body.
///
/// # Errors
///
/// Returns [`FetchError::Json`] if the body does not have the expected
/// shape.
pub fn parse_response(body: serde_json::Value) -> Result<HealthDataResponse, FetchError> {
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_collections() {
        let body = serde_json::json!({
            "city_state_data": [{
                "measure": "Obesity",
                "data_value": "33.0",
                "year": "2021",
                "low_confidence_limit": "31.9",
                "high_confidence_limit": "34.1",
                "category": "Health Outcomes"
            }],
            "nationwide_data": [{
                "measure": "Obesity",
                "data_value": "31.2",
                "year": "2021",
                "category": "Health Outcomes"
            }]
        });
        let response = parse_response(body).unwrap();
        assert_eq!(response.city_state_data.len(), 1);
        assert_eq!(response.nationwide_data[0].data_value, "31.2");
        assert_eq!(response.nationwide_data[0].low_confidence_limit, "");
    }

    #[test]
    fn wrongly_typed_field_keeps_the_rest_of_the_response() {
        let body = serde_json::json!({
            "city_state_data": [
                {
                    "measure": "Obesity",
                    "data_value": "33.0",
                    "year": "2021",
                    "low_confidence_limit": "31.9",
                    "high_confidence_limit": "34.1",
                    "category": "Health Outcomes"
                },
                {
                    "measure": "Asthma",
                    "data_value": true,
                    "year": "2021",
                    "category": "Health Outcomes"
                }
            ],
            "nationwide_data": []
        });
        let response = parse_response(body).unwrap();
        assert_eq!(response.city_state_data.len(), 2);
        assert_eq!(response.city_state_data[0].measure, "Obesity");
        assert_eq!(response.city_state_data[1].data_value, "true");
    }

    #[test]
    fn rejects_wrong_shape() {
        let body = serde_json::json!({ "city_state_data": "nope" });
        assert!(matches!(parse_response(body), Err(FetchError::Json(_))));
    }

    #[test]
    fn query_params_use_configured_names() {
        let endpoint = crate::endpoint::parse_endpoint_toml(
            r#"
            id = "alt"
            name = "Alt"
            base_url = "http://localhost:5000/measures"

            [params]
            city = "locationname"
            state = "stateabbr"
            "#,
        )
        .unwrap();
        let fetcher = HttpHealthDataFetcher::new(endpoint).unwrap();
        let params = fetcher.query_params(&LocationIdentity {
            city: "Mobile".to_string(),
            state: "AL".to_string(),
        });
        assert_eq!(params[0], ("locationname".to_string(), "Mobile".to_string()));
        assert_eq!(params[1], ("stateabbr".to_string(), "AL".to_string()));
    }
}
