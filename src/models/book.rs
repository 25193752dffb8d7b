//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: i32,
    pub stock: i32,
    /// Relative path of the cover blob, if any
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Attach a resolved public cover URL for API responses
    pub fn into_details(self, cover_url: Option<String>) -> BookDetails {
        BookDetails {
            id: self.id,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            year: self.year,
            stock: self.stock,
            cover_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Book representation returned by the API, with resolved cover URL
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub year: i32,
    pub stock: i32,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a book (cover handled separately as a blob)
#[derive(Debug, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    #[validate(length(max = 255, message = "Publisher must be at most 255 characters"))]
    pub publisher: Option<String>,
    pub year: i32,
    #[validate(range(min = 0, message = "Stock must be non-negative"))]
    pub stock: i32,
    pub cover: Option<String>,
}

/// Partial update of a book; absent fields are left untouched
#[derive(Debug, Default, Validate)]
pub struct BookUpdate {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: Option<String>,
    #[validate(length(max = 255, message = "Publisher must be at most 255 characters"))]
    pub publisher: Option<String>,
    pub year: Option<i32>,
    #[validate(range(min = 0, message = "Stock must be non-negative"))]
    pub stock: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn new_book_rejects_negative_stock() {
        let book = NewBook {
            title: "Laskar Pelangi".to_string(),
            author: "Andrea Hirata".to_string(),
            publisher: None,
            year: 2005,
            stock: -1,
            cover: None,
        };
        assert!(book.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(BookUpdate::default().validate().is_ok());
    }
}
