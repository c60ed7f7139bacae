//! Request and response types for the upload API.

pub mod uploads;
