// HTTP handlers for post management operations

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{error::ApiError, models::post::PostRequest, service::PostService};

/// Path ids that fail to parse as `i64` are reported as validation errors.
fn post_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::validation(format!("Invalid post id: {}", rejection.body_text())))
}

/// Every JSON body rejection, including missing fields and wrong content type, is a 400.
fn post_body(body: Result<Json<PostRequest>, JsonRejection>) -> Result<PostRequest, ApiError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// GET /posts
pub async fn list_posts(State(service): State<PostService>) -> Result<impl IntoResponse, ApiError> {
    info!("Fetching all posts");

    let posts = service.list_all().await?;

    info!("Retrieved {} posts", posts.len());
    Ok((StatusCode::OK, Json(posts)))
}

/// GET /posts/:id
pub async fn get_post(
    State(service): State<PostService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(path)?;
    info!("Fetching post with id: {}", id);

    let post = service.get_by_id(id).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// POST /posts
pub async fn create_post(
    State(service): State<PostService>,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = post_body(body)?;
    info!("Creating new post with title: {}", request.title);

    let post = service.create(request).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /posts/:id
pub async fn update_post(
    State(service): State<PostService>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(path)?;
    let request = post_body(body)?;
    info!("Updating post with id: {}", id);

    let post = service.update(id, request).await?;

    Ok((StatusCode::OK, Json(post)))
}

/// DELETE /posts/:id
pub async fn delete_post(
    State(service): State<PostService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = post_id(path)?;
    info!("Deleting post with id: {}", id);

    service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
