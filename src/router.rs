use std::time::Duration;

use axum::{routing::get, Router};

use crate::{
    handlers::{
        health_check,
        posts::{create_post, delete_post, get_post, list_posts, update_post},
    },
    middleware::create_middleware_stack,
    service::PostService,
};

/// Create the Axum router with all endpoints and middleware
pub fn create_router(service: PostService, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .with_state(service)
        .layer(create_middleware_stack(request_timeout))
}
