//! Statistics endpoint configuration.
//!
//! The default endpoint lives in `packages/source/sources/cdc_data.toml`
//! and is baked into the binary at compile time. `HEALTH_DATA_URL` and
//! `HEALTH_DATA_TIMEOUT_SECS` override it at runtime.

use serde::Deserialize;

/// Where and how to query the statistics service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthDataEndpoint {
    /// Unique identifier (e.g., `"cdc_data"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Full URL of the query endpoint.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Query parameter names.
    #[serde(default)]
    pub params: QueryParamNames,
}

/// Names of the query parameters the endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryParamNames {
    /// Parameter carrying the city.
    pub city: String,
    /// Parameter carrying the state abbreviation.
    pub state: String,
}

impl Default for QueryParamNames {
    fn default() -> Self {
        Self {
            city: "city".to_string(),
            state: "state".to_string(),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

const DEFAULT_ENDPOINT_TOML: &str = include_str!("../sources/cdc_data.toml");

/// Parses an endpoint definition from a TOML string.
///
/// # Errors
///
/// Returns an error string if the TOML is malformed or missing required
/// fields.
pub fn parse_endpoint_toml(toml_str: &str) -> Result<HealthDataEndpoint, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns the embedded default endpoint.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn default_endpoint() -> HealthDataEndpoint {
    parse_endpoint_toml(DEFAULT_ENDPOINT_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded health data endpoint: {e}"))
}

impl HealthDataEndpoint {
    /// Applies `HEALTH_DATA_URL` and `HEALTH_DATA_TIMEOUT_SECS` overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("HEALTH_DATA_URL").ok(),
            std::env::var("HEALTH_DATA_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        )
    }

    /// Replaces the URL and timeout when values are given.
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }
}
