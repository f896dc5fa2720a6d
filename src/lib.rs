//! Library Book Catalog Server
//!
//! A REST JSON API for managing a catalog of books: creation with ISBN
//! uniqueness, filtered listing and counting, partial updates and deletion.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
