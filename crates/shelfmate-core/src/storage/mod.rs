//! Storage contracts used by the interest pool, and their SQLite backing.

pub mod database;
pub mod import;
pub mod repositories;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Book, BookCategory, InterestPool};

/// Read/write access to per-user interest pools.
pub trait PoolStore {
    fn load_pool(&self, user_id: &Uuid) -> Result<Option<InterestPool>>;

    /// Insert or fully replace the stored pool for `pool.user_id`.
    fn upsert_pool(&self, pool: &InterestPool) -> Result<()>;

    /// Load (or synthesize) the user's pool, apply `mutate`, and upsert it.
    ///
    /// The default runs the three steps independently, so two concurrent
    /// calls for one user may lose an update. Stores that can hold a lock
    /// across the sequence should override it.
    fn update_pool(
        &self,
        user_id: &Uuid,
        mutate: &mut dyn FnMut(&mut InterestPool),
    ) -> Result<InterestPool> {
        let mut pool = self
            .load_pool(user_id)?
            .unwrap_or_else(|| InterestPool::new(*user_id));
        mutate(&mut pool);
        self.upsert_pool(&pool)?;
        Ok(pool)
    }
}

/// Resolves a book to the category it is filed under.
pub trait CategoryLookup {
    /// `None` when the book does not exist.
    fn category_of(&self, book_id: &Uuid) -> Result<Option<BookCategory>>;
}

/// Random draws from the book corpus.
pub trait BookCorpus {
    /// Draw up to `size` distinct recommendable books matching `filter`,
    /// uniformly at random. Fewer are returned when the corpus runs short.
    fn sample(&self, filter: &SampleFilter, size: usize) -> Result<Vec<Book>>;
}

/// Facet restriction for a corpus draw. Maturity and description checks
/// always apply on top of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleFilter {
    pub category: Option<BookCategory>,
}

impl SampleFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn in_category(category: BookCategory) -> Self {
        Self {
            category: Some(category),
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        book.is_recommendable() && self.category.is_none_or(|c| c == book.category)
    }
}
