//! Database layer (SQLite via sqlx).

pub mod sqlite;

pub use sqlite::Database;

/// Table names as constants.
pub mod tables {
    pub const CONTACTS: &str = "contacts";
}
