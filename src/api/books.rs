//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::{
    response::{ApiResponse, BookEnvelope, BookListEnvelope},
    ApiJson, ApiPath, ApiQuery,
};

/// Listing metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct ListMeta {
    /// Number of books matching the filter
    pub total: i64,
    /// Number of books in this response
    pub count: usize,
}

/// Book list payload
#[derive(Debug, Serialize, ToSchema)]
pub struct BookList {
    pub books: Vec<Book>,
    pub meta: ListMeta,
}

/// List books with optional filters
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books matching the filters, newest first", body = BookListEnvelope),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<ApiResponse<BookList>>> {
    let filter = BookFilter::from(query);
    let books = state.services.books.list_books(&filter).await?;

    let total = match state.services.books.count_books(&filter).await {
        Ok(total) => total,
        Err(e) => {
            tracing::warn!("Failed to count books: {}", e);
            books.len() as i64
        }
    };

    let count = books.len();
    Ok(Json(ApiResponse::success(
        "Books retrieved successfully",
        BookList {
            books,
            meta: ListMeta { total, count },
        },
    )))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookEnvelope),
        (status = 400, description = "Invalid input or duplicate ISBN")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = state.services.books.create_book(data).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Book created successfully", book)),
    ))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookEnvelope),
        (status = 400, description = "Invalid book ID"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.get_book(id).await?;
    Ok(Json(ApiResponse::success("Book retrieved successfully", book)))
}

/// Partially update a book
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookEnvelope),
        (status = 400, description = "Invalid input or duplicate ISBN"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(data): ApiJson<UpdateBook>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.update_book(id, data).await?;
    Ok(Json(ApiResponse::success("Book updated successfully", book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.books.delete_book(id).await?;
    Ok(Json(ApiResponse::message("Book deleted successfully")))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/api/v1/books/isbn/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "Exact ISBN")),
    responses(
        (status = 200, description = "Book details", body = BookEnvelope),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<AppState>,
    ApiPath(isbn): ApiPath<String>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.books.get_book_by_isbn(&isbn).await?;
    Ok(Json(ApiResponse::success("Book retrieved successfully", book)))
}
