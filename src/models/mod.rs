//! Data models

pub mod book;

pub use book::{Book, BookFilter, BookQuery, CreateBook, NewBook, UpdateBook};
