use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 1;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            authors         TEXT NOT NULL DEFAULT '[]',
            description     TEXT,
            thumbnail       TEXT,
            category        TEXT NOT NULL,
            maturity_rating TEXT NOT NULL DEFAULT 'NOT_MATURE'
                            CHECK(maturity_rating IN ('NOT_MATURE', 'MATURE')),
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS interest_pools (
            user_id     TEXT PRIMARY KEY,
            saturation  INTEGER NOT NULL CHECK(saturation >= 0),
            categories  TEXT NOT NULL DEFAULT '{}',
            updated_at  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_books_category        ON books(category);
        CREATE INDEX IF NOT EXISTS idx_books_maturity_rating ON books(maturity_rating);
        ",
    )?;
    Ok(())
}
