//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod response;

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::{FromRequest, FromRequestParts},
    routing::{delete, get, post, put},
    BoxError, Router,
};
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// JSON body extractor answering malformed payloads with the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor answering unparseable parameters with the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_v1 = Router::new()
        .route("/books", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id", put(books::update_book))
        .route("/books/:id", delete(books::delete_book))
        .route("/books/isbn/:isbn", get(books::get_book_by_isbn))
        .with_state(state);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router());

    with_request_timeout(app, request_timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bound every request by `timeout`, answering overruns with the error envelope
fn with_request_timeout(app: Router, timeout: Duration) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout_error))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_timeout_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request exceeded its deadline");
        AppError::Timeout
    } else {
        AppError::Internal(err.to_string())
    }
}
