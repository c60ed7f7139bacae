//! HTTP request handlers.
//!
//! - [`uploads`]: the three upload routes, one per multipart parsing style
//! - [`static_assets`]: the embedded upload form
//!
//! # Error Handling
//!
//! Upload handlers return [`crate::errors::Result`]. Parse and write failures are rendered as a
//! `200 OK` [`crate::api::models::uploads::UploadResult`] with `success: false`, so clients only
//! ever need to read the body.

pub mod static_assets;
pub mod uploads;
