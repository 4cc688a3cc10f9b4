use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use uuid::Uuid;

use super::Allocation;
use crate::config::PoolSettings;
use crate::error::Result;
use crate::models::BookSummary;
use crate::storage::{BookCorpus, PoolStore};

/// Builds a personalized recommendation batch from a user's interest pool.
pub struct SampleAllocator<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    corpus: &'a C,
    settings: &'a PoolSettings,
}

impl<'a, S, C> SampleAllocator<'a, S, C>
where
    S: PoolStore + ?Sized,
    C: BookCorpus + ?Sized,
{
    pub fn new(store: &'a S, corpus: &'a C, settings: &'a PoolSettings) -> Self {
        Self {
            store,
            corpus,
            settings,
        }
    }

    /// Personalized batch for `user_id`, shuffled with the thread rng.
    ///
    /// `None` means no personalization is available: the user has no pool,
    /// or every category weight has decayed to zero.
    pub fn personalized_recommendations(&self, user_id: &Uuid) -> Result<Option<Vec<BookSummary>>> {
        self.personalized_recommendations_with(user_id, &mut rand::rng())
    }

    pub fn personalized_recommendations_with<R>(
        &self,
        user_id: &Uuid,
        rng: &mut R,
    ) -> Result<Option<Vec<BookSummary>>>
    where
        R: Rng + ?Sized,
    {
        let Some(mut pool) = self.store.load_pool(user_id)? else {
            debug!(user = %user_id, "no interest pool");
            return Ok(None);
        };
        pool.clamp_weights(self.settings.weight_limit);
        let Some(allocation) = Allocation::compute(&pool, self.settings) else {
            debug!(user = %user_id, "interest pool carries no weight");
            return Ok(None);
        };

        debug!(
            user = %user_id,
            portion = allocation.personalized_portion,
            personalized = allocation.personalized_count(),
            random = allocation.random_count,
            "allocated sample"
        );

        let mut books = Vec::with_capacity(self.settings.sample_size);
        for (filter, size) in allocation.facets() {
            books.extend(self.corpus.sample(&filter, size)?);
        }
        books.shuffle(rng);

        Ok(Some(books.into_iter().map(BookSummary::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::interest::testing::{MemoryStore, shelf};
    use crate::models::{BookCategory, InterestPool, MaturityRating};
    use crate::storage::SampleFilter;
    use crate::storage::database::Database;

    fn pool_with(user: Uuid, saturation: u32, weights: &[(BookCategory, u32)]) -> InterestPool {
        let mut pool = InterestPool::new(user);
        pool.saturation = saturation;
        pool.categories = weights.iter().copied().collect();
        pool
    }

    #[test]
    fn test_no_pool_means_no_personalization() {
        let settings = PoolSettings::default();
        let store = MemoryStore::with_books(shelf(BookCategory::Drama, 20));
        let allocator = SampleAllocator::new(&store, &store, &settings);

        assert!(allocator.personalized_recommendations(&Uuid::new_v4()).unwrap().is_none());
        assert!(store.draws.borrow().is_empty());
    }

    #[test]
    fn test_zero_weight_pool_means_no_personalization() {
        let settings = PoolSettings::default();
        let store = MemoryStore::with_books(shelf(BookCategory::Drama, 20));
        let user = Uuid::new_v4();
        store
            .upsert_pool(&pool_with(user, 50, &[(BookCategory::Drama, 0)]))
            .unwrap();

        let allocator = SampleAllocator::new(&store, &store, &settings);
        assert!(allocator.personalized_recommendations(&user).unwrap().is_none());
    }

    #[test]
    fn test_draws_follow_the_allocation() {
        let settings = PoolSettings::default();
        let mut books = shelf(BookCategory::Fantasy, 20);
        books.extend(shelf(BookCategory::Horror, 20));
        let store = MemoryStore::with_books(books);
        let user = Uuid::new_v4();
        store
            .upsert_pool(&pool_with(
                user,
                50,
                &[(BookCategory::Fantasy, 80), (BookCategory::Horror, 20)],
            ))
            .unwrap();

        let allocator = SampleAllocator::new(&store, &store, &settings);
        let batch = allocator
            .personalized_recommendations_with(&user, &mut StdRng::seed_from_u64(1))
            .unwrap()
            .unwrap();

        assert_eq!(batch.len(), 10);
        assert_eq!(
            *store.draws.borrow(),
            vec![
                (SampleFilter::any(), 3),
                (SampleFilter::in_category(BookCategory::Fantasy), 6),
                (SampleFilter::in_category(BookCategory::Horror), 1),
            ]
        );
    }

    #[test]
    fn test_stored_weights_above_limit_are_clamped() {
        let settings = PoolSettings {
            weight_limit: 20,
            ..PoolSettings::default()
        };
        let mut books = shelf(BookCategory::Drama, 10);
        books.extend(shelf(BookCategory::Poetry, 10));
        let store = MemoryStore::with_books(books);
        let user = Uuid::new_v4();
        store
            .upsert_pool(&pool_with(
                user,
                50,
                &[(BookCategory::Drama, 100), (BookCategory::Poetry, 20)],
            ))
            .unwrap();

        let allocator = SampleAllocator::new(&store, &store, &settings);
        allocator.personalized_recommendations(&user).unwrap().unwrap();

        assert_eq!(
            *store.draws.borrow(),
            vec![
                (SampleFilter::any(), 2),
                (SampleFilter::in_category(BookCategory::Poetry), 4),
                (SampleFilter::in_category(BookCategory::Drama), 4),
            ]
        );
    }

    #[test]
    fn test_scarce_corpus_returns_short_batch() {
        let settings = PoolSettings::default();
        let store = MemoryStore::with_books(shelf(BookCategory::Poetry, 2));
        let user = Uuid::new_v4();
        store
            .upsert_pool(&pool_with(user, 50, &[(BookCategory::Poetry, 100)]))
            .unwrap();

        let allocator = SampleAllocator::new(&store, &store, &settings);
        let batch = allocator.personalized_recommendations(&user).unwrap().unwrap();

        // 2 from the random bucket, 2 from the poetry bucket.
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_shuffle_is_seeded_and_keeps_every_item() {
        let settings = PoolSettings::default();
        let mut books = shelf(BookCategory::Fantasy, 10);
        books.extend(shelf(BookCategory::Horror, 10));
        let store = MemoryStore::with_books(books);
        let user = Uuid::new_v4();
        store
            .upsert_pool(&pool_with(
                user,
                50,
                &[(BookCategory::Fantasy, 50), (BookCategory::Horror, 50)],
            ))
            .unwrap();
        let allocator = SampleAllocator::new(&store, &store, &settings);

        let first = allocator
            .personalized_recommendations_with(&user, &mut StdRng::seed_from_u64(42))
            .unwrap()
            .unwrap();
        let second = allocator
            .personalized_recommendations_with(&user, &mut StdRng::seed_from_u64(42))
            .unwrap()
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);

        // The fake corpus draws deterministically, so the unshuffled batch
        // can be rebuilt from the recorded draws.
        let mut drawn: Vec<String> = store
            .draws
            .borrow()
            .iter()
            .take(3)
            .flat_map(|(filter, size)| {
                store
                    .books
                    .iter()
                    .filter(move |b| filter.matches(b))
                    .take(*size)
            })
            .map(|b| b.id.to_string())
            .collect();
        let mut returned: Vec<String> = first.iter().map(|b| b.book_id.clone()).collect();
        drawn.sort();
        returned.sort();
        assert_eq!(returned, drawn);
    }

    #[test]
    fn test_only_eligible_books_are_returned() {
        let settings = PoolSettings::default();
        let db = Database::open_in_memory().unwrap();

        let eligible = shelf(BookCategory::Manga, 8);
        let mut mature = shelf(BookCategory::Manga, 8);
        for book in &mut mature {
            book.maturity_rating = MaturityRating::Mature;
        }
        let mut undescribed = shelf(BookCategory::Manga, 8);
        for book in &mut undescribed {
            book.description = None;
        }
        db.import_books(&eligible).unwrap();
        db.import_books(&mature).unwrap();
        db.import_books(&undescribed).unwrap();

        let user = Uuid::new_v4();
        db.upsert_pool(&pool_with(user, 30, &[(BookCategory::Manga, 60)]))
            .unwrap();

        let allocator = SampleAllocator::new(&db, &db, &settings);
        let batch = allocator.personalized_recommendations(&user).unwrap().unwrap();

        let allowed: HashSet<String> = eligible.iter().map(|b| b.id.to_string()).collect();
        assert!(!batch.is_empty());
        assert!(batch.len() <= settings.sample_size);
        assert!(batch.iter().all(|b| allowed.contains(&b.book_id)));
    }
}
