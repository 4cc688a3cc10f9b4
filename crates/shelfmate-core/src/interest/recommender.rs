use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use super::SampleAllocator;
use crate::config::PoolSettings;
use crate::error::Result;
use crate::models::{BookCategory, BookSummary};
use crate::storage::{BookCorpus, PoolStore, SampleFilter};

/// Entry point for the recommendations endpoint.
///
/// An explicit category bypasses personalization. Otherwise the
/// [`SampleAllocator`] is consulted, and a flat random draw is used when it
/// has nothing to offer.
pub struct Recommender<'a, S: ?Sized, C: ?Sized> {
    allocator: SampleAllocator<'a, S, C>,
    corpus: &'a C,
    settings: &'a PoolSettings,
}

impl<'a, S, C> Recommender<'a, S, C>
where
    S: PoolStore + ?Sized,
    C: BookCorpus + ?Sized,
{
    pub fn new(store: &'a S, corpus: &'a C, settings: &'a PoolSettings) -> Self {
        Self {
            allocator: SampleAllocator::new(store, corpus, settings),
            corpus,
            settings,
        }
    }

    pub fn recommend(
        &self,
        user_id: &Uuid,
        category: Option<BookCategory>,
    ) -> Result<Vec<BookSummary>> {
        self.recommend_with(user_id, category, &mut rand::rng())
    }

    pub fn recommend_with<R>(
        &self,
        user_id: &Uuid,
        category: Option<BookCategory>,
        rng: &mut R,
    ) -> Result<Vec<BookSummary>>
    where
        R: Rng + ?Sized,
    {
        if let Some(category) = category {
            debug!(user = %user_id, %category, "category browse");
            return self.flat_draw(SampleFilter::in_category(category));
        }

        match self.allocator.personalized_recommendations_with(user_id, rng)? {
            Some(batch) => Ok(batch),
            None => {
                debug!(user = %user_id, "falling back to random recommendations");
                self.flat_draw(SampleFilter::any())
            }
        }
    }

    fn flat_draw(&self, filter: SampleFilter) -> Result<Vec<BookSummary>> {
        let books = self.corpus.sample(&filter, self.settings.sample_size)?;
        Ok(books.into_iter().map(BookSummary::from).collect())
    }
}
