//! Book catalog service

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook, UpdateBook},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Create a new book.
    ///
    /// The ISBN pre-check gives an early, readable rejection; the storage
    /// uniqueness constraint remains authoritative for concurrent creates.
    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.ensure_isbn_available(&data.isbn, None).await?;

        let created = self.repository.create(&data.into_new_book(Utc::now())).await?;
        tracing::info!("Created book id={} isbn={}", created.id, created.isbn);
        Ok(created)
    }

    /// Get a book by its ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        check_id(id)?;
        self.repository.get_by_id(id).await
    }

    /// List books matching the filter, most recently created first
    pub async fn list_books(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.repository.get_all(filter).await
    }

    /// Apply a partial update to an existing book
    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        check_id(id)?;
        let mut book = self.repository.get_by_id(id).await?;
        data.validate()?;

        if let Some(ref isbn) = data.isbn {
            if *isbn != book.isbn {
                self.ensure_isbn_available(isbn, Some(id)).await?;
            }
        }

        data.apply_to(&mut book, Utc::now());
        let updated = self.repository.update(&book).await?;
        tracing::info!("Updated book id={}", updated.id);
        Ok(updated)
    }

    /// Permanently delete a book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        check_id(id)?;
        self.repository.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Get a book by its exact ISBN
    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        if isbn.is_empty() {
            return Err(AppError::InvalidArgument("ISBN cannot be empty".to_string()));
        }
        self.repository.get_by_isbn(isbn).await
    }

    /// Count books matching the filter
    pub async fn count_books(&self, filter: &BookFilter) -> AppResult<i64> {
        self.repository.count(filter).await
    }

    /// Fails with `Conflict` if a book other than `except_id` holds `isbn`
    async fn ensure_isbn_available(&self, isbn: &str, except_id: Option<i32>) -> AppResult<()> {
        match self.repository.get_by_isbn(isbn).await {
            Ok(existing) if Some(existing.id) != except_id => {
                tracing::warn!("Rejected duplicate ISBN {} (held by book id={})", isbn, existing.id);
                Err(AppError::Conflict(format!("book with ISBN {} already exists", isbn)))
            }
            Ok(_) | Err(AppError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn check_id(id: i32) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::InvalidArgument(format!("invalid book ID: {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryBookRepository, MockBookRepository};
    use chrono::{DateTime, Duration};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn create_request(isbn: &str) -> CreateBook {
        CreateBook {
            title: "Test Book".to_string(),
            author: "Test Author".to_string(),
            isbn: isbn.to_string(),
            publisher: "Test Publisher".to_string(),
            publish_year: 2023,
            genre: "Fiction".to_string(),
            pages: 200,
            description: Some("A test book".to_string()),
        }
    }

    fn stored_book(id: i32, isbn: &str, at: DateTime<Utc>) -> Book {
        Book {
            id,
            title: "Stored".to_string(),
            author: "Author".to_string(),
            isbn: isbn.to_string(),
            publisher: "Publisher".to_string(),
            publish_year: 2000,
            genre: "Fiction".to_string(),
            pages: 10,
            available: true,
            description: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn memory_service() -> BookService {
        BookService::new(Arc::new(MemoryBookRepository::new()))
    }

    #[tokio::test]
    async fn test_create_book_defaults() {
        let service = memory_service();

        let book = service.create_book(create_request("978-1234567890")).await.unwrap();

        assert!(book.id > 0);
        assert!(book.available);
        assert_eq!(book.created_at, book.updated_at);
        assert!(book.created_at.timestamp() > 0);
        assert_eq!(book.title, "Test Book");
    }

    #[tokio::test]
    async fn test_create_duplicate_isbn_conflicts() {
        let service = memory_service();
        assert_ok!(service.create_book(create_request("978-1234567890")).await);

        let err = service
            .create_book(create_request("978-1234567890"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.count_books(&BookFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_invalid_never_writes() {
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_isbn().never();
        repo.expect_create().never();
        let service = BookService::new(Arc::new(repo));

        let mut request = create_request("978-1");
        request.title = String::new();

        let err = service.create_book(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_propagates_lookup_failure() {
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_isbn()
            .returning(|_| Err(AppError::Storage(sqlx::Error::PoolTimedOut)));
        repo.expect_create().never();
        let service = BookService::new(Arc::new(repo));

        let err = service.create_book(create_request("978-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_get_book_invalid_id() {
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id().never();
        let service = BookService::new(Arc::new(repo));

        assert!(matches!(service.get_book(0).await, Err(AppError::InvalidArgument(_))));
        assert!(matches!(service.get_book(-1).await, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_get_book_not_found() {
        let service = memory_service();
        assert!(matches!(service.get_book(999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_books_empty_is_empty_vec() {
        let service = memory_service();
        let books = service.list_books(&BookFilter::default()).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_update_only_available() {
        let service = memory_service();
        let created = service.create_book(create_request("978-1")).await.unwrap();

        let update = UpdateBook {
            available: Some(false),
            ..Default::default()
        };
        let updated = service.update_book(created.id, update).await.unwrap();

        assert!(!updated.available);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.author, created.author);
        assert_eq!(updated.isbn, created.isbn);
        assert_eq!(updated.publisher, created.publisher);
        assert_eq!(updated.publish_year, created.publish_year);
        assert_eq!(updated.genre, created.genre);
        assert_eq!(updated.pages, created.pages);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let service = memory_service();
        let err = service.update_book(999, UpdateBook::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_isbn_conflict() {
        let service = memory_service();
        service.create_book(create_request("978-1")).await.unwrap();
        let second = service.create_book(create_request("978-2")).await.unwrap();

        let update = UpdateBook {
            isbn: Some("978-1".to_string()),
            ..Default::default()
        };
        let err = service.update_book(second.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let unchanged = service.get_book(second.id).await.unwrap();
        assert_eq!(unchanged.isbn, "978-2");
    }

    #[tokio::test]
    async fn test_update_same_isbn_skips_uniqueness_check() {
        let now = Utc::now();
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id()
            .with(eq(7))
            .returning(move |_| Ok(stored_book(7, "978-7", now)));
        repo.expect_get_by_isbn().never();
        repo.expect_update().returning(|book| Ok(book.clone()));
        let service = BookService::new(Arc::new(repo));

        let update = UpdateBook {
            isbn: Some("978-7".to_string()),
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = service.update_book(7, update).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.updated_at > now);
    }

    #[tokio::test]
    async fn test_update_advances_timestamp_past_future_value() {
        let future = Utc::now() + Duration::hours(1);
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id()
            .returning(move |id| Ok(stored_book(id, "978-7", future)));
        repo.expect_update().returning(|book| Ok(book.clone()));
        let service = BookService::new(Arc::new(repo));

        let updated = service.update_book(3, UpdateBook::default()).await.unwrap();
        assert!(updated.updated_at > future);
    }

    #[tokio::test]
    async fn test_update_invalid_fields() {
        let now = Utc::now();
        let mut repo = MockBookRepository::new();
        repo.expect_get_by_id()
            .returning(move |id| Ok(stored_book(id, "978-1", now)));
        repo.expect_update().never();
        let service = BookService::new(Arc::new(repo));

        let update = UpdateBook {
            publish_year: Some(3000),
            ..Default::default()
        };
        let err = service.update_book(1, update).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_book_wins_over_invalid_fields() {
        let service = memory_service();

        let update = UpdateBook {
            title: Some(String::new()),
            pages: Some(0),
            ..Default::default()
        };
        let err = service.update_book(999, update).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = memory_service();
        let created = service.create_book(create_request("978-1")).await.unwrap();

        assert_ok!(service.delete_book(created.id).await);
        assert!(matches!(service.get_book(created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete_book(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_invalid_id() {
        let service = memory_service();
        assert!(matches!(service.delete_book(0).await, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_get_by_isbn() {
        let service = memory_service();
        let created = service.create_book(create_request("978-1")).await.unwrap();

        assert_eq!(service.get_book_by_isbn("978-1").await.unwrap().id, created.id);
        assert_err!(service.get_book_by_isbn("9781").await);
        assert!(matches!(
            service.get_book_by_isbn("").await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_genre_filter_and_count_agree() {
        let service = memory_service();
        for (isbn, genre) in [("1", "Programming"), ("2", "programming"), ("3", "Architecture")] {
            let mut request = create_request(isbn);
            request.genre = genre.to_string();
            service.create_book(request).await.unwrap();
        }

        let filter = BookFilter {
            genre: Some("Programming".to_string()),
            ..Default::default()
        };
        let books = service.list_books(&filter).await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(books.iter().all(|b| b.genre.eq_ignore_ascii_case("programming")));
        assert_eq!(service.count_books(&filter).await.unwrap(), 2);
    }
}
