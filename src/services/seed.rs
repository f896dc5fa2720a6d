//! Sample catalog loaded into an empty store

use super::books::BookService;
use crate::{
    error::AppResult,
    models::book::{BookFilter, CreateBook},
};

/// (title, author, isbn, publisher, publish_year, genre, pages, description)
const SAMPLE_BOOKS: &[(&str, &str, &str, &str, i32, &str, i32, &str)] = &[
    (
        "The Go Programming Language",
        "Alan Donovan, Brian Kernighan",
        "978-0134190440",
        "Addison-Wesley",
        2015,
        "Programming",
        380,
        "The authoritative resource to writing clear and idiomatic Go to solve real-world problems.",
    ),
    (
        "Clean Code",
        "Robert C. Martin",
        "978-0132350884",
        "Prentice Hall",
        2008,
        "Programming",
        464,
        "A handbook of agile software craftsmanship.",
    ),
    (
        "Design Patterns",
        "Gang of Four",
        "978-0201633610",
        "Addison-Wesley",
        1994,
        "Programming",
        395,
        "Elements of reusable object-oriented software.",
    ),
    (
        "The Pragmatic Programmer",
        "David Thomas, Andrew Hunt",
        "978-0135957059",
        "Addison-Wesley",
        2019,
        "Programming",
        352,
        "Your journey to mastery.",
    ),
    (
        "Microservices Patterns",
        "Chris Richardson",
        "978-1617294549",
        "Manning Publications",
        2018,
        "Architecture",
        520,
        "With examples in Java.",
    ),
    (
        "Building Microservices",
        "Sam Newman",
        "978-1491950357",
        "O'Reilly Media",
        2015,
        "Architecture",
        280,
        "Designing fine-grained systems.",
    ),
    (
        "Domain-Driven Design",
        "Eric Evans",
        "978-0321125217",
        "Addison-Wesley",
        2003,
        "Architecture",
        560,
        "Tackling complexity in the heart of software.",
    ),
    (
        "The Art of Computer Programming",
        "Donald Knuth",
        "978-0201896831",
        "Addison-Wesley",
        1997,
        "Computer Science",
        650,
        "Volume 1: Fundamental Algorithms.",
    ),
];

/// Insert the sample books when the catalog is empty.
///
/// Returns the number of books inserted. Books that fail to insert are
/// logged and skipped.
pub async fn seed_sample_books(service: &BookService) -> AppResult<usize> {
    let existing = service.count_books(&BookFilter::default()).await?;
    if existing > 0 {
        tracing::info!("Found {} existing books, skipping sample data", existing);
        return Ok(0);
    }

    let mut inserted = 0;
    for &(title, author, isbn, publisher, publish_year, genre, pages, description) in SAMPLE_BOOKS {
        let request = CreateBook {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
            publisher: publisher.to_string(),
            publish_year,
            genre: genre.to_string(),
            pages,
            description: Some(description.to_string()),
        };
        match service.create_book(request).await {
            Ok(_) => inserted += 1,
            Err(e) => tracing::warn!("Failed to insert sample book '{}': {}", title, e),
        }
    }

    tracing::info!("Sample data inserted ({} books)", inserted);
    Ok(inserted)
}
