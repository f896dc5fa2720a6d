//! Repository layer for book storage

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, NewBook},
};

pub use books::PgBookRepository;
pub use memory::MemoryBookRepository;

/// Data access for books, independent of the storage backend.
///
/// Lookups of absent rows return `AppError::NotFound`; an ISBN already held
/// by another row is reported as `AppError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book and return it with its assigned id
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Books matching `filter`, newest first
    async fn get_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    /// Persist every field of `book` (matched by id)
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book>;

    async fn count(&self, filter: &BookFilter) -> AppResult<i64>;
}
