//! HTTP handler functions for the CaringHand API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use caring_hand_analytics::merge::MalformedRecordError;
use caring_hand_dashboard::session::Dashboard;
use caring_hand_dashboard::{ErrorKind, PipelineError};
use caring_hand_health_models::LocationQuery;
use caring_hand_server_models::{
    ApiDashboard, ApiDroppedRecord, ApiError, ApiHealth, ApiLocation, LocationQueryParams,
    MeasuresQueryParams, ParamsError,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/location`
///
/// Reverse geocodes a coordinate pair to a city and state.
pub async fn location(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    let coordinates = match params.coordinates() {
        Ok(c) => c,
        Err(e) => return params_error(&e),
    };

    match state
        .pipeline
        .resolve(&LocationQuery::Coordinates(coordinates))
        .await
    {
        Ok(location) => HttpResponse::Ok().json(ApiLocation::from(location)),
        Err(e) => pipeline_error(&e),
    }
}

/// `GET /api/measures`
///
/// Loads the merged dataset for a location and returns the filtered table,
/// chart and dropdown options.
pub async fn measures(
    state: web::Data<AppState>,
    params: web::Query<MeasuresQueryParams>,
) -> HttpResponse {
    let (query, population) = match params
        .location_query()
        .and_then(|q| Ok((q, params.population()?)))
    {
        Ok(v) => v,
        Err(e) => return params_error(&e),
    };

    let mut dashboard = Dashboard::new(state.rules.clone(), state.palette.clone());
    dashboard.set_population(population);

    let ticket = dashboard.begin_request();
    match state.pipeline.load(&query).await {
        Ok(loaded) => {
            dashboard.apply_load(ticket, Ok(loaded));
        }
        Err(e) => return pipeline_error(&e),
    }
    dashboard.set_filters(params.measure_filter(), params.category_filter());

    let Some(loaded) = dashboard.dataset() else {
        log::error!("Dataset missing after a successful load");
        return HttpResponse::InternalServerError().json(ApiError {
            error: "Dataset missing after load".to_string(),
            kind: "internal".to_string(),
        });
    };

    HttpResponse::Ok().json(ApiDashboard {
        location: ApiLocation::from(loaded.location.clone()),
        rows: dashboard.rows(),
        chart: dashboard.chart(),
        measures: dashboard.measure_options(),
        categories: dashboard.category_options(),
        dropped_records: loaded.report.dropped.iter().map(dropped_record).collect(),
    })
}

fn dropped_record(error: &MalformedRecordError) -> ApiDroppedRecord {
    ApiDroppedRecord {
        index: error.index,
        measure: error.measure.clone(),
        reason: error.to_string(),
    }
}

/// HTTP status for an error classification.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::LocationLookup => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Transport => StatusCode::BAD_GATEWAY,
        ErrorKind::NoData => StatusCode::NOT_FOUND,
    }
}

fn pipeline_error(e: &PipelineError) -> HttpResponse {
    let kind = e.kind();
    if kind == ErrorKind::Transport {
        log::error!("Pipeline failed: {e}");
    } else {
        log::warn!("Pipeline failed: {e}");
    }
    HttpResponse::build(status_for(kind)).json(ApiError {
        error: e.to_string(),
        kind: kind.to_string(),
    })
}

fn params_error(e: &ParamsError) -> HttpResponse {
    log::debug!("Rejected query parameters: {e}");
    HttpResponse::BadRequest().json(ApiError {
        error: e.to_string(),
        kind: ErrorKind::InvalidInput.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test};
    use async_trait::async_trait;
    use caring_hand_dashboard::pipeline::Pipeline;
    use caring_hand_geocoder::resolver::LocationResolver;
    use caring_hand_geocoder::{LocationError, ReverseGeocoder, ReversePlace};
    use caring_hand_health_models::{
        Coordinates, HealthDataResponse, HealthRecord, LocationIdentity,
    };
    use caring_hand_source::{FetchError, HealthDataFetcher, ensure_not_empty};
    use std::sync::Arc;
    use std::time::Duration;

    struct StubGeocoder;

    #[async_trait]
    impl ReverseGeocoder for StubGeocoder {
        async fn reverse(&self, _: Coordinates) -> Result<ReversePlace, LocationError> {
            Ok(ReversePlace {
                city: "Birmingham".to_string(),
                locality: String::new(),
                principal_subdivision_code: "US-AL".to_string(),
            })
        }
    }

    struct StubFetcher;

    fn record(measure: &str, value: &str, category: &str) -> HealthRecord {
        HealthRecord {
            measure: measure.to_string(),
            data_value: value.to_string(),
            year: "2021".to_string(),
            low_confidence_limit: "1.0".to_string(),
            high_confidence_limit: "50.0".to_string(),
            category: category.to_string(),
        }
    }

    #[async_trait]
    impl HealthDataFetcher for StubFetcher {
        async fn fetch(
            &self,
            location: &LocationIdentity,
        ) -> Result<HealthDataResponse, FetchError> {
            let response = if location.city == "Birmingham" {
                HealthDataResponse {
                    city_state_data: vec![
                        record("Obesity", "33.0", "Health Outcomes"),
                        record("Smoking", "19.5", "Health Risk Behaviors"),
                        record("Asthma", "", "Health Outcomes"),
                    ],
                    nationwide_data: vec![record("Obesity", "31.2", "Health Outcomes")],
                }
            } else {
                HealthDataResponse::default()
            };
            ensure_not_empty(location, response)
        }
    }

    fn state() -> web::Data<AppState> {
        let resolver = LocationResolver::new(Arc::new(StubGeocoder), Duration::from_secs(1));
        web::Data::new(AppState::new(Pipeline::new(resolver, Arc::new(StubFetcher))))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = App::new().app_data(state()).configure(crate::configure);
        let app = actix_test::init_service(app).await;
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        (status, body)
    }

    #[test]
    fn maps_error_kinds_to_status() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::LocationLookup),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::Transport), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::NoData), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
    }

    #[actix_web::test]
    async fn location_resolves_coordinates() {
        let (status, body) = get("/api/location?latitude=33.52&longitude=-86.81").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["label"], "Birmingham, AL");
    }

    #[actix_web::test]
    async fn measures_returns_sorted_rows_and_dropped_records() {
        let (status, body) =
            get("/api/measures?city=Birmingham&state=AL&attendance=1000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"]["label"], "Birmingham, AL");

        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["measure"], "Obesity");
        assert_eq!(rows[0]["estimatedAffected"], 330);
        assert_eq!(rows[0]["trend"], "above");
        assert_eq!(body["droppedRecords"].as_array().unwrap().len(), 1);
        assert_eq!(body["categories"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn filter_matching_nothing_is_ok_and_empty() {
        let (status, body) = get(
            "/api/measures?city=Birmingham&state=AL&measure=Obesity&category=Health%20Risk%20Behaviors",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["rows"].as_array().unwrap().is_empty());
        assert_eq!(body["measures"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn unknown_location_is_not_found() {
        let (status, body) = get("/api/measures?city=Nowhere&state=ZZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "no_data");
    }

    #[actix_web::test]
    async fn blank_or_missing_input_is_bad_request() {
        let (status, body) = get("/api/measures?city=%20&state=AL").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_input");

        let (status, _) = get("/api/measures?attendance=10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/api/measures?city=Birmingham&state=AL&adultsPercent=150").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
