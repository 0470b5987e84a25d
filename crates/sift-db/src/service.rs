//! Service layer orchestrating database mutations with audit entries.
//!
//! `ReviewService` wraps `SiftDb` (raw database access) and a write gate.
//! All repo methods are implemented as `impl ReviewService` blocks.

use tokio::sync::{Mutex, MutexGuard};

use crate::SiftDb;
use crate::error::DatabaseError;

/// Orchestrates review-state mutations.
///
/// Every multi-statement mutation follows this protocol:
/// 1. Acquire the write gate
/// 2. Begin transaction
/// 3. Read current state through the transaction
/// 4. Execute SQL (entity rows, ledger delta, projection)
/// 5. Append audit entry (inside transaction)
/// 6. Commit transaction, release the gate
///
/// The gate exists because every statement shares one libSQL connection: a
/// statement issued while another task holds an open transaction would join
/// that transaction.
pub struct ReviewService {
    db: SiftDb,
    write_gate: Mutex<()>,
}

impl ReviewService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = SiftDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `SiftDb`.
    #[must_use]
    pub fn from_db(db: SiftDb) -> Self {
        Self {
            db,
            write_gate: Mutex::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &SiftDb {
        &self.db
    }

    /// Acquire the write gate for a single-statement write.
    pub(crate) async fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, DatabaseError> {
        let gate = self.write_gate.lock().await;
        // A transaction dropped on an error path must not swallow the next write.
        if !self.db.conn().is_autocommit() {
            self.db.conn().execute("ROLLBACK", ()).await?;
        }
        Ok(gate)
    }

    /// Acquire the write gate and open a transaction.
    ///
    /// Bind the guard before the transaction so the transaction is dropped
    /// (and rolled back, if uncommitted) before the gate is released:
    ///
    /// ```ignore
    /// let (_gate, tx) = self.begin_write().await?;
    /// ```
    pub(crate) async fn begin_write(
        &self,
    ) -> Result<(MutexGuard<'_, ()>, libsql::Transaction), DatabaseError> {
        let gate = self.lock_writes().await?;
        let tx = self.db.conn().transaction().await?;
        Ok((gate, tx))
    }
}
