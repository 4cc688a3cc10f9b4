use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Result, ShelfmateError};
use crate::models::{Book, BookCategory, MaturityRating};

/// One entry of a corpus export: a JSON array of these is accepted by
/// `shelfmate import`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub category: BookCategory,
    #[serde(default)]
    pub maturity_rating: MaturityRating,
}

impl BookRecord {
    pub fn into_book(self) -> Result<Book> {
        if self.title.trim().is_empty() {
            return Err(ShelfmateError::ValidationError(
                "book title must not be empty".to_string(),
            ));
        }

        Ok(Book {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            title: self.title,
            authors: self.authors,
            description: self.description,
            thumbnail: self.thumbnail,
            category: self.category,
            maturity_rating: self.maturity_rating,
            updated_at: Utc::now(),
        })
    }
}

/// Parse a JSON array of book records.
pub fn parse_records(json: &str) -> Result<Vec<Book>> {
    let records: Vec<BookRecord> = serde_json::from_str(json)?;
    records.into_iter().map(BookRecord::into_book).collect()
}

/// Load a JSON array of book records from disk.
pub fn load_records(path: &Path) -> Result<Vec<Book>> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}
