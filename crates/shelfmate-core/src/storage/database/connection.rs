use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use super::schema::apply_pragmas;
use crate::error::Result;

/// How long a writer waits on another process holding the database lock,
/// e.g. the CLI recording an engagement while the server is running.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Single shared SQLite connection guarded by a mutex.
pub struct ConnectionPool {
    path: Option<PathBuf>,
    connection: Mutex<Connection>,
}

impl ConnectionPool {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_pragmas(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            connection: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;
        Ok(Self {
            path: None,
            connection: Mutex::new(conn),
        })
    }

    /// Lock the shared connection, recovering from a poisoned lock.
    pub fn get_connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `work` inside an immediate transaction, committing on success.
    ///
    /// The write lock is taken up front, so a read-modify-write inside
    /// `work` cannot interleave with another writer.
    pub fn immediate<T>(&self, work: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.get_connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
