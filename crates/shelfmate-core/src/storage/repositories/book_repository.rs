use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Book, BookCategory, MaturityRating};
use crate::storage::SampleFilter;

use super::{Repository, conversion_error, parse_timestamp, parse_uuid};

pub trait BookRepository: Repository<Entity = Book, Id = Uuid> {
    fn find_category(&self, id: &Uuid) -> Result<Option<BookCategory>>;
    fn sample(&self, filter: &SampleFilter, size: usize) -> Result<Vec<Book>>;
    fn count(&self) -> Result<usize>;
}

const BOOK_COLUMNS: &str =
    "id, title, authors, description, thumbnail, category, maturity_rating, updated_at";

pub struct SqliteBookRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBookRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let id: String = row.get(0)?;
        let authors: String = row.get(2)?;
        let category: String = row.get(5)?;
        let maturity: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(Book {
            id: parse_uuid(0, &id)?,
            title: row.get(1)?,
            authors: serde_json::from_str(&authors).map_err(|e| conversion_error(2, e))?,
            description: row.get(3)?,
            thumbnail: row.get(4)?,
            category: category
                .parse::<BookCategory>()
                .map_err(|e| conversion_error(5, e))?,
            maturity_rating: maturity
                .parse::<MaturityRating>()
                .map_err(|e| conversion_error(6, e))?,
            updated_at: parse_timestamp(7, &updated_at)?,
        })
    }
}

impl Repository for SqliteBookRepository<'_> {
    type Entity = Book;
    type Id = Uuid;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let book = self
            .conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
                params![id.to_string()],
                Self::row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn save(&self, book: &Self::Entity) -> Result<()> {
        let authors_json = serde_json::to_string(&book.authors)?;

        self.conn.execute(
            "INSERT INTO books
                (id, title, authors, description, thumbnail, category, maturity_rating, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                title           = excluded.title,
                authors         = excluded.authors,
                description     = excluded.description,
                thumbnail       = excluded.thumbnail,
                category        = excluded.category,
                maturity_rating = excluded.maturity_rating,
                updated_at      = excluded.updated_at",
            params![
                book.id.to_string(),
                book.title,
                authors_json,
                book.description,
                book.thumbnail,
                book.category.as_str(),
                book.maturity_rating.to_string(),
                book.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_category(&self, id: &Uuid) -> Result<Option<BookCategory>> {
        let category: Option<String> = self
            .conn
            .query_row(
                "SELECT category FROM books WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match category {
            Some(raw) => Ok(Some(
                raw.parse::<BookCategory>()
                    .map_err(|e| conversion_error(0, e))?,
            )),
            None => Ok(None),
        }
    }

    /// Uniform random draw of up to `size` recommendable books.
    fn sample(&self, filter: &SampleFilter, size: usize) -> Result<Vec<Book>> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS}
             FROM books
             WHERE maturity_rating != 'MATURE'
               AND description IS NOT NULL
               AND description != ''
               AND (?1 IS NULL OR category = ?1)
             ORDER BY RANDOM()
             LIMIT ?2"
        ))?;

        let category = filter.category.map(|c| c.as_str());
        let rows = stmt
            .query_map(params![category, size as i64], Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
