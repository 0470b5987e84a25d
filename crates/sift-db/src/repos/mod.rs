//! Repository modules implementing operations for all Sift entities.
//!
//! Each module adds methods to `ReviewService` via `impl ReviewService` blocks.
//! Functions taking a bare `&libsql::Connection` are the building blocks used
//! inside write transactions (a `libsql::Transaction` derefs to a connection).

pub mod audit;
pub mod candidate;
pub mod included;
pub mod ledger;
pub mod project;
