//! Book model and request types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Unique across the catalog, compared exactly
    pub isbn: String,
    pub publisher: String,
    pub publish_year: i32,
    pub genre: String,
    pub pages: i32,
    pub available: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book ready to be inserted; the id is assigned by storage
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publish_year: i32,
    pub genre: String,
    pub pages: i32,
    pub available: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
///
/// Missing fields decode to their empty value so that they are reported by
/// validation instead of failing JSON decoding.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "title is required and must be at most 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "author is required and must be at most 255 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 20, message = "ISBN is required and must be at most 20 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 255, message = "publisher is required and must be at most 255 characters"))]
    pub publisher: String,
    #[validate(range(min = 1000, max = 2030, message = "publish year must be between 1000 and 2030"))]
    pub publish_year: i32,
    #[validate(length(min = 1, max = 100, message = "genre is required and must be at most 100 characters"))]
    pub genre: String,
    #[validate(range(min = 1, message = "pages must be greater than 0"))]
    pub pages: i32,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl CreateBook {
    /// Build the record to insert: available by default, both timestamps at `now`
    pub fn into_new_book(self, now: DateTime<Utc>) -> NewBook {
        NewBook {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publisher: self.publisher,
            publish_year: self.publish_year,
            genre: self.genre,
            pages: self.pages,
            available: true,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "author must be between 1 and 255 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 20, message = "ISBN must be between 1 and 20 characters"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, max = 255, message = "publisher must be between 1 and 255 characters"))]
    pub publisher: Option<String>,
    #[validate(range(min = 1000, max = 2030, message = "publish year must be between 1000 and 2030"))]
    pub publish_year: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "genre must be between 1 and 100 characters"))]
    pub genre: Option<String>,
    #[validate(range(min = 1, message = "pages must be greater than 0"))]
    pub pages: Option<i32>,
    pub available: Option<bool>,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl UpdateBook {
    /// Merge the present fields onto `book` and stamp `updated_at`.
    ///
    /// `updated_at` always moves forward, even if the clock has not advanced
    /// past the stored value.
    pub fn apply_to(&self, book: &mut Book, now: DateTime<Utc>) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(ref publisher) = self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(publish_year) = self.publish_year {
            book.publish_year = publish_year;
        }
        if let Some(ref genre) = self.genre {
            book.genre = genre.clone();
        }
        if let Some(pages) = self.pages {
            book.pages = pages;
        }
        if let Some(available) = self.available {
            book.available = available;
        }
        if let Some(ref description) = self.description {
            book.description = Some(description.clone());
        }

        // Storage keeps microsecond precision
        let floor = book.updated_at + Duration::microseconds(1);
        book.updated_at = if now >= floor { now } else { floor };
    }
}

/// Conjunctive filter for listing and counting books
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    /// Case-insensitive exact genre
    pub genre: Option<String>,
    pub available: Option<bool>,
    /// Case-insensitive substring of title, author or description
    pub search: Option<String>,
}

impl BookFilter {
    /// In-process evaluation of the filter, equivalent to the SQL predicates
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(ref author) = self.author {
            if !contains_ignore_case(&book.author, author) {
                return false;
            }
        }
        if let Some(ref genre) = self.genre {
            if book.genre.to_lowercase() != genre.to_lowercase() {
                return false;
            }
        }
        if let Some(available) = self.available {
            if book.available != available {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let in_description = book
                .description
                .as_deref()
                .map(|d| contains_ignore_case(d, search))
                .unwrap_or(false);
            if !(contains_ignore_case(&book.title, search)
                || contains_ignore_case(&book.author, search)
                || in_description)
            {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Book list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Author substring (case-insensitive)
    pub author: Option<String>,
    /// Exact genre (case-insensitive)
    pub genre: Option<String>,
    /// Availability (true/false, 1/0, t/f, yes/no)
    pub available: Option<String>,
    /// Search in title, author and description
    pub search: Option<String>,
}

impl From<BookQuery> for BookFilter {
    fn from(query: BookQuery) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        BookFilter {
            author: non_empty(query.author),
            genre: non_empty(query.genre),
            available: query.available.as_deref().and_then(parse_bool),
            search: non_empty(query.search),
        }
    }
}

/// Lenient boolean parsing for query strings; unknown values yield None
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Some(true),
        "0" | "f" | "false" | "no" => Some(false),
        _ => None,
    }
}
