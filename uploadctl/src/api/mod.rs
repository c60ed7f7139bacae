//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the upload endpoints and the upload page
//! - **[`models`]**: Request/response data structures
//!
//! # API Structure
//!
//! All upload routes live under `/file/upload/*`:
//!
//! - `GET /file/upload/page`: HTML upload form
//! - `POST /file/upload/request`: raw request, inspected by hand
//! - `POST /file/upload/multipart`: axum multipart extractor
//! - `POST /file/upload/part`: lower-level multipart part stream
//!
//! # OpenAPI Documentation
//!
//! The upload endpoints are documented with `utoipa`. The browsable reference is served at
//! `/docs` when the server is running.

pub mod handlers;
pub mod models;
