mod connection;
mod error;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use error::DatabaseError;
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Book, BookCategory, InterestPool};

use super::repositories::{
    BookRepository, PoolRepository, Repository, SqliteBookRepository, SqlitePoolRepository,
};
use super::{BookCorpus, CategoryLookup, PoolStore, SampleFilter};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// SQLite-backed store for books and interest pools.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn path(&self) -> Option<&Path> {
        self.pool.path()
    }

    pub fn schema_versions(&self) -> Result<Vec<u32>> {
        let conn = self.pool.get_connection();
        migrations::get_applied_versions(&conn)
    }

    pub fn upsert_book(&self, book: &Book) -> Result<()> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).save(book)
    }

    /// Upsert a batch of books in one transaction.
    pub fn import_books(&self, books: &[Book]) -> Result<usize> {
        self.pool.immediate(|tx| {
            let repo = SqliteBookRepository::new(tx);
            for book in books {
                repo.save(book)?;
            }
            Ok(books.len())
        })
    }

    pub fn get_book(&self, id: &Uuid) -> Result<Option<Book>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).find_by_id(id)
    }

    pub fn count_books(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).count()
    }

    pub fn count_pools(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        SqlitePoolRepository::new(&conn).count()
    }
}

impl PoolStore for Database {
    fn load_pool(&self, user_id: &Uuid) -> Result<Option<InterestPool>> {
        let conn = self.pool.get_connection();
        SqlitePoolRepository::new(&conn).find_by_id(user_id)
    }

    fn upsert_pool(&self, pool: &InterestPool) -> Result<()> {
        let conn = self.pool.get_connection();
        SqlitePoolRepository::new(&conn).save(pool)
    }

    /// Runs load, mutate and upsert inside one immediate transaction, so
    /// engagements for one user serialize.
    fn update_pool(
        &self,
        user_id: &Uuid,
        mutate: &mut dyn FnMut(&mut InterestPool),
    ) -> Result<InterestPool> {
        self.pool.immediate(|tx| {
            let repo = SqlitePoolRepository::new(tx);
            let mut pool = repo
                .find_by_id(user_id)?
                .unwrap_or_else(|| InterestPool::new(*user_id));
            mutate(&mut pool);
            repo.save(&pool)?;
            Ok(pool)
        })
    }
}

impl CategoryLookup for Database {
    fn category_of(&self, book_id: &Uuid) -> Result<Option<BookCategory>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).find_category(book_id)
    }
}

impl BookCorpus for Database {
    fn sample(&self, filter: &SampleFilter, size: usize) -> Result<Vec<Book>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).sample(filter, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaturityRating;

    fn make_book(title: &str, category: BookCategory) -> Book {
        let mut book = Book::new(title, category);
        book.authors = vec!["Test Author".to_string()];
        book.description = Some(format!("About {title}"));
        book.thumbnail = Some(format!("https://covers.example/{title}.jpg"));
        book
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_books().unwrap(), 0);
        assert_eq!(db.count_pools().unwrap(), 0);
        assert_eq!(db.schema_versions().unwrap(), vec![SCHEMA_VERSION]);
        assert!(db.path().is_none());
    }

    #[test]
    fn test_open_file_runs_migrations_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("shelfmate.db");

        Database::open(&path).unwrap();
        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_versions().unwrap(), vec![1]);
    }

    #[test]
    fn test_upsert_and_get_book() {
        let db = Database::open_in_memory().unwrap();
        let mut book = make_book("Dune", BookCategory::ScienceFiction);
        db.upsert_book(&book).unwrap();

        let loaded = db.get_book(&book.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Dune");
        assert_eq!(loaded.authors, vec!["Test Author"]);
        assert_eq!(loaded.category, BookCategory::ScienceFiction);

        book.title = "Dune Messiah".to_string();
        db.upsert_book(&book).unwrap();
        assert_eq!(db.count_books().unwrap(), 1);
        assert_eq!(db.get_book(&book.id).unwrap().unwrap().title, "Dune Messiah");
    }

    #[test]
    fn test_get_missing_book() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_book(&Uuid::new_v4()).unwrap().is_none());
        assert!(db.category_of(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_category_of() {
        let db = Database::open_in_memory().unwrap();
        let book = make_book("Emma", BookCategory::Classics);
        db.upsert_book(&book).unwrap();
        assert_eq!(db.category_of(&book.id).unwrap(), Some(BookCategory::Classics));
    }

    #[test]
    fn test_sample_applies_eligibility_filter() {
        let db = Database::open_in_memory().unwrap();

        let good = make_book("Good", BookCategory::Fantasy);
        let mut mature = make_book("Mature", BookCategory::Fantasy);
        mature.maturity_rating = MaturityRating::Mature;
        let mut blank = make_book("Blank", BookCategory::Fantasy);
        blank.description = Some(String::new());
        let mut missing = make_book("Missing", BookCategory::Fantasy);
        missing.description = None;

        db.import_books(&[good.clone(), mature, blank, missing]).unwrap();

        let drawn = db.sample(&SampleFilter::any(), 10).unwrap();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].id, good.id);
    }

    #[test]
    fn test_sample_by_category() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.upsert_book(&make_book(&format!("H{i}"), BookCategory::Horror)).unwrap();
            db.upsert_book(&make_book(&format!("P{i}"), BookCategory::Poetry)).unwrap();
        }

        let drawn = db.sample(&SampleFilter::in_category(BookCategory::Poetry), 3).unwrap();
        assert_eq!(drawn.len(), 3);
        assert!(drawn.iter().all(|b| b.category == BookCategory::Poetry));

        let scarce = db.sample(&SampleFilter::in_category(BookCategory::Horror), 50).unwrap();
        assert_eq!(scarce.len(), 5);

        assert!(db.sample(&SampleFilter::any(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_pool_upsert_replaces_whole_record() {
        let db = Database::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        assert!(db.load_pool(&user).unwrap().is_none());

        let mut pool = InterestPool::new(user);
        pool.categories.insert(BookCategory::Drama, 40);
        pool.categories.insert(BookCategory::Poetry, 10);
        db.upsert_pool(&pool).unwrap();

        pool.categories.remove(&BookCategory::Poetry);
        pool.saturation = 9;
        db.upsert_pool(&pool).unwrap();

        let loaded = db.load_pool(&user).unwrap().unwrap();
        assert_eq!(loaded.saturation, 9);
        assert_eq!(loaded.weight(BookCategory::Drama), 40);
        assert_eq!(loaded.weight(BookCategory::Poetry), 0);
        assert_eq!(db.count_pools().unwrap(), 1);
    }

    #[test]
    fn test_update_pool_creates_then_mutates() {
        let db = Database::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        let created = db
            .update_pool(&user, &mut |pool| {
                pool.categories.insert(BookCategory::Manga, 5);
            })
            .unwrap();
        assert_eq!(created.saturation, 1);

        let updated = db
            .update_pool(&user, &mut |pool| {
                pool.saturation += 1;
            })
            .unwrap();
        assert_eq!(updated.saturation, 2);
        assert_eq!(updated.weight(BookCategory::Manga), 5);
        assert_eq!(db.load_pool(&user).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_unknown_pool_tags_are_dropped() {
        let db = Database::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        {
            let conn = db.pool.get_connection();
            conn.execute(
                "INSERT INTO interest_pools (user_id, saturation, categories, updated_at)
                 VALUES (?1, 12, '{\"poetry\": 30, \"retiredTag\": 50}', ?2)",
                rusqlite::params![user.to_string(), chrono::Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        let pool = db.load_pool(&user).unwrap().unwrap();
        assert_eq!(pool.total_weight(), 30);
        assert_eq!(pool.weight(BookCategory::Poetry), 30);
    }
}
