//! PostgreSQL book repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, NewBook},
};

const BOOK_COLUMNS: &str = "id, title, author, isbn, publisher, publish_year, genre, \
                            pages, available, description, created_at, updated_at";

/// One condition of a list/count query
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    AuthorContains(String),
    GenreEquals(String),
    Available(bool),
    Search(String),
}

/// Ordered predicates for the present filter fields
fn predicates(filter: &BookFilter) -> Vec<Predicate> {
    [
        filter.author.as_deref().map(|a| Predicate::AuthorContains(like_pattern(a))),
        filter.genre.clone().map(Predicate::GenreEquals),
        filter.available.map(Predicate::Available),
        filter.search.as_deref().map(|s| Predicate::Search(like_pattern(s))),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// `%value%` with LIKE metacharacters escaped so user input matches literally
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append `WHERE p1 AND p2 ...` with every value bound as a parameter
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    for (i, predicate) in predicates(filter).into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::AuthorContains(pattern) => {
                builder
                    .push("LOWER(author) LIKE LOWER(")
                    .push_bind(pattern)
                    .push(") ESCAPE '\\'");
            }
            Predicate::GenreEquals(genre) => {
                builder.push("LOWER(genre) = LOWER(").push_bind(genre).push(")");
            }
            Predicate::Available(available) => {
                builder.push("available = ").push_bind(available);
            }
            Predicate::Search(pattern) => {
                builder
                    .push("(LOWER(title) LIKE LOWER(")
                    .push_bind(pattern.clone())
                    .push(") ESCAPE '\\' OR LOWER(author) LIKE LOWER(")
                    .push_bind(pattern.clone())
                    .push(") ESCAPE '\\' OR LOWER(COALESCE(description, '')) LIKE LOWER(")
                    .push_bind(pattern)
                    .push(") ESCAPE '\\')");
            }
        }
    }
}

/// Translate constraint violations raised on insert/update
fn map_write_error(error: sqlx::Error, isbn: &str) -> AppError {
    if let sqlx::Error::Database(ref db_error) = error {
        if db_error.is_unique_violation() {
            return AppError::Conflict(format!("book with ISBN {} already exists", isbn));
        }
        if db_error.is_check_violation() {
            return AppError::Validation(format!(
                "book violates constraint {}",
                db_error.constraint().unwrap_or("unknown")
            ));
        }
    }
    AppError::Storage(error)
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (title, author, isbn, publisher, publish_year, genre,
                               pages, available, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.publisher)
            .bind(book.publish_year)
            .bind(&book.genre)
            .bind(book.pages)
            .bind(book.available)
            .bind(&book.description)
            .bind(book.created_at)
            .bind(book.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &book.isbn))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book with ID {} not found", id)))
    }

    async fn get_all(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC, id DESC");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, publisher = $5, publish_year = $6,
                genre = $7, pages = $8, available = $9, description = $10, updated_at = $11
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.publisher)
            .bind(book.publish_year)
            .bind(&book.genre)
            .bind(book.pages)
            .bind(book.available)
            .bind(&book.description)
            .bind(book.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &book.isbn))?
            .ok_or_else(|| AppError::NotFound(format!("book with ID {} not found", book.id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("book with ID {} not found", id)));
        }
        Ok(())
    }

    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE isbn = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book with ISBN {} not found", isbn)))
    }

    async fn count(&self, filter: &BookFilter) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
