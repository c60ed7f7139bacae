//! OpenAPI documentation for the upload API.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "uploadctl",
        description = "Accepts multipart file uploads and writes them to the server's upload directory."
    ),
    paths(
        api::handlers::static_assets::upload_page,
        api::handlers::uploads::upload_request,
        api::handlers::uploads::upload_multipart,
        api::handlers::uploads::upload_part,
    ),
    components(schemas(api::models::uploads::UploadResult)),
    tags(
        (name = "uploads", description = "File upload endpoints"),
    )
)]
pub struct ApiDoc;
