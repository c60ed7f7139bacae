//! Shared helpers for handler and router tests.

use std::path::Path;

use axum_test::TestServer;

use crate::config::{Config, UploadConfig};
use crate::{AppState, build_router};

/// Config writing into `destination_dir`, with metrics off so the global recorder stays free.
pub fn create_test_config(destination_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upload: UploadConfig {
            destination_dir: destination_dir.to_path_buf(),
            ..Default::default()
        },
        enable_metrics: false,
        enable_otel_export: false,
    }
}

pub fn create_test_server(config: Config) -> TestServer {
    let state = AppState::from_config(config);
    TestServer::new(build_router(&state)).expect("Failed to create test server")
}
