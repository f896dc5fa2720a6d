//! In-memory book repository
//!
//! Keeps the same contract as the PostgreSQL backend, including the ISBN
//! uniqueness constraint. Used by tests and for running without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, NewBook},
};

#[derive(Default)]
struct Store {
    books: BTreeMap<i32, Book>,
    next_id: i32,
}

impl Store {
    fn isbn_taken(&self, isbn: &str, except_id: Option<i32>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != except_id)
    }
}

#[derive(Default)]
pub struct MemoryBookRepository {
    store: RwLock<Store>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if store.isbn_taken(&book.isbn, None) {
            return Err(AppError::Conflict(format!(
                "book with ISBN {} already exists",
                book.isbn
            )));
        }

        store.next_id += 1;
        let created = Book {
            id: store.next_id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            publish_year: book.publish_year,
            genre: book.genre.clone(),
            pages: book.pages,
            available: book.available,
            description: book.description.clone(),
            created_at: book.created_at,
            updated_at: book.updated_at,
        };
        store.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.store
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("book with ID {} not found", id)))
    }

    async fn get_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let store = self.store.read().await;
        let mut books: Vec<Book> = store
            .books
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(books)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if !store.books.contains_key(&book.id) {
            return Err(AppError::NotFound(format!("book with ID {} not found", book.id)));
        }
        if store.isbn_taken(&book.isbn, Some(book.id)) {
            return Err(AppError::Conflict(format!(
                "book with ISBN {} already exists",
                book.isbn
            )));
        }
        store.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.store
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("book with ID {} not found", id)))
    }

    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.store
            .read()
            .await
            .books
            .values()
            .find(|b| b.isbn == isbn)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("book with ISBN {} not found", isbn)))
    }

    async fn count(&self, filter: &BookFilter) -> AppResult<i64> {
        let store = self.store.read().await;
        Ok(store.books.values().filter(|b| filter.matches(b)).count() as i64)
    }
}
