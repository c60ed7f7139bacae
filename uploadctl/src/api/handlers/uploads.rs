//! Upload endpoints.
//!
//! Three routes accept the same multipart upload (a file in the `file` field) but read it
//! through different layers of the stack:
//!
//! - [`upload_request`] takes the raw request and checks the content type itself
//! - [`upload_multipart`] uses axum's [`Multipart`] extractor
//! - [`upload_part`] drives [`multer`] directly over the request body
//!
//! Each one only turns its request into an [`UploadedFile`]; persisting and building the
//! [`UploadResult`] is left to [`crate::upload::UploadHandler`]. Any request that can't be read as
//! an upload becomes an [`Error::Parse`], which renders as a `200 OK` failure result.

use axum::{
    Json,
    body::Body,
    extract::{FromRequest, Multipart, Request, State, multipart::MultipartRejection},
    http::{HeaderMap, header},
};
use mime_guess::mime;
use tracing::{debug, instrument};

use crate::AppState;
use crate::api::models::uploads::{UploadResult, UploadedFile};
use crate::errors::{Error, Result};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

fn missing_file_field() -> Error {
    Error::Parse {
        message: format!("Missing required field: '{FILE_FIELD}'"),
    }
}

/// The submitted file name, treating an empty name (no file chosen in a form) as absent.
fn submitted_name(file_name: Option<&str>) -> Option<String> {
    file_name.filter(|name| !name.is_empty()).map(str::to_string)
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok())
}

fn is_multipart_form(headers: &HeaderMap) -> bool {
    content_type(headers)
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|mime| mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA)
}

/// Pull the first file-bearing `file` field out of an axum multipart body. Other fields, and
/// text values that share the `file` name, are skipped.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::Parse {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let Some(name) = submitted_name(field.file_name()) else {
            debug!("Skipping '{FILE_FIELD}' field without a file name");
            continue;
        };
        let content = field.bytes().await.map_err(|e| Error::Parse {
            message: format!("Failed to read file content: {}", e),
        })?;

        return Ok(UploadedFile::new(name, content));
    }

    Err(missing_file_field())
}

#[utoipa::path(
    post,
    path = "/file/upload/request",
    tag = "uploads",
    summary = "Upload file (raw request)",
    description = "Upload a file in the `file` field of a multipart/form-data body. The request content type is checked by hand before the body is parsed.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Upload outcome; `success` is false when the request could not be parsed or the write failed", body = UploadResult),
    )
)]
#[instrument(skip_all)]
pub async fn upload_request(State(state): State<AppState>, request: Request) -> Result<Json<UploadResult>> {
    if !is_multipart_form(request.headers()) {
        return Err(Error::Parse {
            message: format!("Unsupported content type {:?}", content_type(request.headers())),
        });
    }

    let multipart = Multipart::from_request(request, &state).await.map_err(|rejection| Error::Parse {
        message: rejection.body_text(),
    })?;
    let file = read_file_field(multipart).await?;

    Ok(Json(state.uploads.save(file).await))
}

#[utoipa::path(
    post,
    path = "/file/upload/multipart",
    tag = "uploads",
    summary = "Upload file (multipart extractor)",
    description = "Upload a file in the `file` field of a multipart/form-data body.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Upload outcome; `success` is false when the request could not be parsed or the write failed", body = UploadResult),
    )
)]
#[instrument(skip_all)]
pub async fn upload_multipart(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResult>> {
    let multipart = multipart.map_err(|rejection| Error::Parse {
        message: rejection.body_text(),
    })?;
    let file = read_file_field(multipart).await?;

    Ok(Json(state.uploads.save(file).await))
}

#[utoipa::path(
    post,
    path = "/file/upload/part",
    tag = "uploads",
    summary = "Upload file (part stream)",
    description = "Upload a file in the `file` field of a multipart/form-data body, read part by part. \
The file is stored under the final segment of its submitted name unless `upload.legacy_part_names` is enabled.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Upload outcome; `success` is false when the request could not be parsed or the write failed", body = UploadResult),
    )
)]
#[instrument(skip_all)]
pub async fn upload_part(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Result<Json<UploadResult>> {
    let boundary = content_type(&headers)
        .ok_or_else(|| Error::Parse {
            message: "Missing content type".to_string(),
        })
        .and_then(|value| {
            multer::parse_boundary(value).map_err(|e| Error::Parse {
                message: format!("Invalid multipart boundary: {}", e),
            })
        })?;

    // Raw bodies bypass DefaultBodyLimit, so the same cap is enforced on the part stream.
    let constraints =
        multer::Constraints::new().size_limit(multer::SizeLimit::new().whole_stream(state.config.upload.max_body_size as u64));
    let mut parts = multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    while let Some(part) = parts.next_field().await.map_err(|e| Error::Parse {
        message: format!("Failed to read multipart part: {}", e),
    })? {
        if part.name() != Some(FILE_FIELD) {
            debug!(field = ?part.name(), "Skipping multipart part");
            continue;
        }

        let Some(name) = submitted_name(part.file_name()) else {
            debug!("Skipping '{FILE_FIELD}' part without a file name");
            continue;
        };
        let content = part.bytes().await.map_err(|e| Error::Parse {
            message: format!("Failed to read file content: {}", e),
        })?;
        let file = UploadedFile::new(name, content);

        let result = if state.config.upload.legacy_part_names {
            state.uploads.save_raw(file).await
        } else {
            state.uploads.save(file).await
        };
        return Ok(Json(result));
    }

    Err(missing_file_field())
}
