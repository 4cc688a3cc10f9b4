use std::collections::BTreeMap;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BookCategory, InterestPool};
use crate::storage::database::DatabaseError;

use super::{Repository, parse_timestamp, parse_uuid};

pub trait PoolRepository: Repository<Entity = InterestPool, Id = Uuid> {
    fn count(&self) -> Result<usize>;
}

pub struct SqlitePoolRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqlitePoolRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Decode the stored category map. Tags outside the catalogue are
    /// dropped with a warning.
    fn decode_categories(user_id: &Uuid, raw: &str) -> Result<BTreeMap<BookCategory, u32>> {
        let tagged: BTreeMap<String, u32> =
            serde_json::from_str(raw).map_err(|e| DatabaseError::CorruptRow {
                table: "interest_pools",
                key: user_id.to_string(),
                message: e.to_string(),
            })?;

        let mut categories = BTreeMap::new();
        for (tag, weight) in tagged {
            match tag.parse::<BookCategory>() {
                Ok(category) => {
                    categories.insert(category, weight);
                }
                Err(e) => warn!(user = %user_id, "dropping pool weight: {e}"),
            }
        }
        Ok(categories)
    }
}

impl Repository for SqlitePoolRepository<'_> {
    type Entity = InterestPool;
    type Id = Uuid;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, saturation, categories, updated_at
                 FROM interest_pools WHERE user_id = ?1",
                params![id.to_string()],
                |row| {
                    let user_id: String = row.get(0)?;
                    let updated_at: String = row.get(3)?;
                    Ok((
                        parse_uuid(0, &user_id)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                        parse_timestamp(3, &updated_at)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, saturation, categories, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(InterestPool {
            categories: Self::decode_categories(&user_id, &categories)?,
            user_id,
            saturation,
            updated_at,
        }))
    }

    /// Full-record upsert: every column is replaced.
    fn save(&self, pool: &Self::Entity) -> Result<()> {
        let categories_json = serde_json::to_string(&pool.categories)?;

        self.conn.execute(
            "INSERT INTO interest_pools (user_id, saturation, categories, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                saturation = excluded.saturation,
                categories = excluded.categories,
                updated_at = excluded.updated_at",
            params![
                pool.user_id.to_string(),
                pool.saturation,
                categories_json,
                pool.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl PoolRepository for SqlitePoolRepository<'_> {
    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM interest_pools", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
