use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Migration error at version {version}: {message}")]
    Migration { version: u32, message: String },

    #[error("Corrupt {table} row {key}: {message}")]
    CorruptRow {
        table: &'static str,
        key: String,
        message: String,
    },
}
