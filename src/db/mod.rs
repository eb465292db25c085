//! Data-access layer: the lazily created shared pool and statement
//! construction for record writes.
//!
//! The schema lives in `schema.sql` and is applied by operators; the service
//! never creates or alters tables.

pub mod pool;
pub mod update;

pub use pool::{DbPool, PoolError};
pub use update::{BuildError, Field, SqlType, SqlValue, Statement, Table, UpdateOutcome};
