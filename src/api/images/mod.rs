pub mod get;
pub mod upload;

use crate::AppState;
use axum::routing::{get as get_route, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for authenticated image endpoints (mounted at /api/images)
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload::upload_image))
}

/// Image bytes are served without auth: their URLs are the public
/// references embedded in recipe records.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/images/{id}", get_route(get::get_image))
}

#[derive(OpenApi)]
#[openapi(
    paths(upload::upload_image, get::get_image),
    components(schemas(upload::UploadImageRequest, upload::UploadImageResponse))
)]
pub struct ApiDoc;
