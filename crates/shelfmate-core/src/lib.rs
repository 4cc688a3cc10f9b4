pub mod config;
pub mod error;
pub mod interest;
pub mod models;
pub mod storage;

pub use config::{AppConfig, PoolSettings};
pub use error::{ExitCode, Result, ShelfmateError, parse_id};
pub use models::*;

pub use interest::{Allocation, PoolMaintainer, Recommender, SampleAllocator};

pub use storage::database::{ConnectionPool, Database, DatabaseError, open_database, open_in_memory};
pub use storage::import::{BookRecord, load_records, parse_records};
pub use storage::repositories::{
    BookRepository, PoolRepository, Repository, SqliteBookRepository, SqlitePoolRepository,
};
pub use storage::{BookCorpus, CategoryLookup, PoolStore, SampleFilter};
