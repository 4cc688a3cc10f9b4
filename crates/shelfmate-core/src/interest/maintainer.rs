use tracing::debug;
use uuid::Uuid;

use crate::config::PoolSettings;
use crate::error::Result;
use crate::storage::{CategoryLookup, PoolStore};

/// Folds engagement signals into users' interest pools.
pub struct PoolMaintainer<'a, S: ?Sized, L: ?Sized> {
    store: &'a S,
    lookup: &'a L,
    settings: &'a PoolSettings,
}

impl<'a, S, L> PoolMaintainer<'a, S, L>
where
    S: PoolStore + ?Sized,
    L: CategoryLookup + ?Sized,
{
    pub fn new(store: &'a S, lookup: &'a L, settings: &'a PoolSettings) -> Self {
        Self {
            store,
            lookup,
            settings,
        }
    }

    /// Record that `user_id` engaged with `book_id`.
    ///
    /// Unknown books are ignored. The user's pool is created on the first
    /// signal; weight is added to the book's category, saturation grows by
    /// one, and a decay pass runs once saturation reaches the threshold.
    pub fn record_engagement(&self, user_id: &Uuid, book_id: &Uuid) -> Result<()> {
        let Some(category) = self.lookup.category_of(book_id)? else {
            debug!(user = %user_id, book = %book_id, "engagement ignored: unknown book");
            return Ok(());
        };

        let mut decayed = false;
        let pool = self.store.update_pool(user_id, &mut |pool| {
            decayed = pool.accumulate(category, self.settings);
        })?;

        debug!(
            user = %user_id,
            %category,
            weight = pool.weight(category),
            saturation = pool.saturation,
            decayed,
            "recorded engagement"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::interest::testing::{MemoryStore, book};
    use crate::models::BookCategory;
    use crate::storage::database::Database;

    #[test]
    fn test_first_engagement_creates_pool() {
        let settings = PoolSettings::default();
        let dune = book("Dune", BookCategory::ScienceFiction);
        let store = MemoryStore::with_books(vec![dune.clone()]);
        let maintainer = PoolMaintainer::new(&store, &store, &settings);
        let user = Uuid::new_v4();

        maintainer.record_engagement(&user, &dune.id).unwrap();

        let pool = store.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.saturation, 2);
        assert_eq!(pool.weight(BookCategory::ScienceFiction), 5);
    }

    #[test]
    fn test_unknown_book_is_a_no_op() {
        let settings = PoolSettings::default();
        let store = MemoryStore::default();
        let maintainer = PoolMaintainer::new(&store, &store, &settings);
        let user = Uuid::new_v4();

        maintainer.record_engagement(&user, &Uuid::new_v4()).unwrap();

        assert!(store.load_pool(&user).unwrap().is_none());
    }

    #[test]
    fn test_unknown_book_on_database_is_a_no_op() {
        let settings = PoolSettings::default();
        let db = Database::open_in_memory().unwrap();
        let odes = book("Odes", BookCategory::Poetry);
        db.import_books(&[odes.clone()]).unwrap();
        let maintainer = PoolMaintainer::new(&db, &db, &settings);
        let user = Uuid::new_v4();

        maintainer.record_engagement(&user, &Uuid::new_v4()).unwrap();
        assert!(db.load_pool(&user).unwrap().is_none());
        assert_eq!(db.count_pools().unwrap(), 0);

        maintainer.record_engagement(&user, &odes.id).unwrap();
        maintainer.record_engagement(&user, &Uuid::new_v4()).unwrap();
        let pool = db.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.saturation, 2);
        assert_eq!(pool.weight(BookCategory::Poetry), 5);
    }

    #[test]
    fn test_engagement_sequence_with_decay() {
        let settings = PoolSettings::default();
        let odes = book("Odes", BookCategory::Poetry);
        let store = MemoryStore::with_books(vec![odes.clone()]);
        let maintainer = PoolMaintainer::new(&store, &store, &settings);
        let user = Uuid::new_v4();

        let mut saturations = Vec::new();
        for _ in 0..53 {
            maintainer.record_engagement(&user, &odes.id).unwrap();
            saturations.push(store.load_pool(&user).unwrap().unwrap().saturation);
        }

        assert_eq!(saturations[0], 2);
        assert_eq!(saturations[48], 50);
        assert_eq!(saturations[49], 51);
        assert_eq!(saturations[50], 50);
        assert_eq!(saturations[51], 51);
        assert_eq!(saturations[52], 50);

        let pool = store.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.weight(BookCategory::Poetry), 99);
    }

    #[test]
    fn test_custom_settings_are_honored() {
        let settings = PoolSettings {
            add_amount: 30,
            weight_limit: 50,
            ..PoolSettings::default()
        };
        let emma = book("Emma", BookCategory::Classics);
        let store = MemoryStore::with_books(vec![emma.clone()]);
        let maintainer = PoolMaintainer::new(&store, &store, &settings);
        let user = Uuid::new_v4();

        maintainer.record_engagement(&user, &emma.id).unwrap();
        maintainer.record_engagement(&user, &emma.id).unwrap();

        let pool = store.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.weight(BookCategory::Classics), 50);
    }

    #[test]
    fn test_concurrent_engagements_are_not_lost() {
        let settings = Arc::new(PoolSettings::default());
        let db = Arc::new(Database::open_in_memory().unwrap());
        let categories = [
            BookCategory::Fantasy,
            BookCategory::Horror,
            BookCategory::Poetry,
            BookCategory::Drama,
        ];
        let books: Vec<_> = categories
            .iter()
            .map(|c| book(&c.to_string(), *c))
            .collect();
        db.import_books(&books).unwrap();
        let user = Uuid::new_v4();

        let handles: Vec<_> = books
            .into_iter()
            .map(|b| {
                let db = Arc::clone(&db);
                let settings = Arc::clone(&settings);
                thread::spawn(move || {
                    let maintainer = PoolMaintainer::new(&*db, &*db, &settings);
                    for _ in 0..10 {
                        maintainer.record_engagement(&user, &b.id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pool = db.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.saturation, 41);
        for category in categories {
            assert_eq!(pool.weight(category), 50);
        }
    }
}
