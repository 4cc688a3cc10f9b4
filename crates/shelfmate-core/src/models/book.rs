use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookCategory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaturityRating {
    #[default]
    NotMature,
    Mature,
}

impl std::fmt::Display for MaturityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMature => write!(f, "NOT_MATURE"),
            Self::Mature => write!(f, "MATURE"),
        }
    }
}

impl std::str::FromStr for MaturityRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_MATURE" => Ok(Self::NotMature),
            "MATURE" => Ok(Self::Mature),
            _ => Err(format!("Invalid MaturityRating: {s}")),
        }
    }
}

/// A book in the shared corpus. Read-only from the point of view of the
/// interest pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    pub category: BookCategory,

    #[serde(default)]
    pub maturity_rating: MaturityRating,

    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn new(title: impl Into<String>, category: BookCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            authors: Vec::new(),
            description: None,
            thumbnail: None,
            category,
            maturity_rating: MaturityRating::default(),
            updated_at: Utc::now(),
        }
    }

    /// Whether the book may appear in any recommendation batch: not rated
    /// mature and carrying a non-empty description.
    pub fn is_recommendable(&self) -> bool {
        self.maturity_rating != MaturityRating::Mature
            && self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary::from(self)
    }
}

/// Projection of a book returned to recommendation callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub book_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            book_id: book.id.to_string(),
            title: book.title.clone(),
            authors: book.authors.clone(),
            description: book.description.clone(),
            thumbnail: book.thumbnail.clone(),
        }
    }
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.id.to_string(),
            title: book.title,
            authors: book.authors,
            description: book.description,
            thumbnail: book.thumbnail,
        }
    }
}
