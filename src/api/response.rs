//! Standard response envelope

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::book::Book;

use super::books::BookList;
use super::health::HealthStatus;

/// Uniform wrapper returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    BookEnvelope = ApiResponse<Book>,
    BookListEnvelope = ApiResponse<BookList>,
    HealthEnvelope = ApiResponse<HealthStatus>
)]
pub struct ApiResponse<T> {
    /// "success" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Success without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }
}
