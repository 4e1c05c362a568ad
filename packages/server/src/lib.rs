#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the CaringHand dashboard.
//!
//! Serves location lookup and per-location health measures, with table
//! rows, chart series and dropdown options computed server-side.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use caring_hand_analytics::chart::Palette;
use caring_hand_analytics::segments::{SegmentRules, default_rules};
use caring_hand_dashboard::pipeline::Pipeline;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolve → fetch → merge pipeline.
    pub pipeline: Pipeline,
    /// Measure to population segment rules.
    pub rules: SegmentRules,
    /// Chart series colors.
    pub palette: Palette,
}

impl AppState {
    /// Creates state with the embedded segment rules and default palette.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            rules: default_rules(),
            palette: Palette::default(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/location", web::get().to(handlers::location))
            .route("/measures", web::get().to(handlers::measures)),
    );
}

/// Starts the CaringHand API server.
///
/// Builds the pipeline from the embedded service configs and environment
/// overrides, then serves on `BIND_ADDR:PORT` (default `127.0.0.1:8080`).
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the pipeline cannot be built.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Building data pipeline...");
    let pipeline = Pipeline::from_env().expect("Failed to build data pipeline");
    log::debug!("{pipeline:?}");

    let state = web::Data::new(AppState::new(pipeline));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
