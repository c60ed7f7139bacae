//! # uploadctl: multipart file uploads to local disk
//!
//! `uploadctl` is a small HTTP service that accepts a file in the `file` field of a
//! `multipart/form-data` request, writes it into a configured directory and answers with a JSON
//! result:
//!
//! ```json
//! {"success": true, "msg": "report.pdf uploaded successfully"}
//! ```
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Three upload routes read
//! the same request shape through different parsing layers (the raw request, axum's multipart
//! extractor, and [multer](https://docs.rs/multer) part streams); see [`api::handlers::uploads`].
//! Each of them reduces the request to an [`api::models::uploads::UploadedFile`] and hands it to
//! the [`upload::UploadHandler`] held in [`AppState`], which owns the destination directory and
//! is the only code that touches the filesystem.
//!
//! Failures never change the status code. A request that isn't an upload answers
//! `{"success": false, "msg": "file parsing failed"}`, and a failed write answers
//! `{"success": false, "msg": "<name> upload failed"}`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use uploadctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = uploadctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     uploadctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
mod openapi;
mod static_assets;
pub mod telemetry;
pub mod upload;

#[cfg(test)]
mod test_utils;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::openapi::ApiDoc;
use crate::upload::UploadHandler;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .uploads(UploadHandler::new(&config.upload.destination_dir))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub uploads: UploadHandler,
}

impl AppState {
    /// State whose upload handler writes into the configured destination directory.
    pub fn from_config(config: Config) -> Self {
        let uploads = UploadHandler::new(config.upload.destination_dir.clone());
        Self::builder().uploads(uploads).config(config).build()
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: &AppState) -> Router {
    let upload_routes = Router::new()
        .route("/upload/page", get(api::handlers::static_assets::upload_page))
        .route("/upload/request", post(api::handlers::uploads::upload_request))
        .route("/upload/multipart", post(api::handlers::uploads::upload_multipart))
        .route("/upload/part", post(api::handlers::uploads::upload_part))
        .layer(DefaultBodyLimit::max(state.config.upload.max_body_size))
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/file", upload_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting upload service with configuration: {:#?}", config);

        let app_state = AppState::from_config(config.clone());
        info!(
            "Uploads will be written to {}",
            app_state.uploads.destination_dir().display()
        );

        let router = build_router(&app_state);

        Ok(Self { router, config })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Upload service listening on http://{}, upload form at http://localhost:{}/file/upload/page",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
