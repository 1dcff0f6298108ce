pub mod repository;
pub mod schema;
pub mod sqlite;

pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: i64 },

    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    #[error("Duplicate {entity_type}: {key} already exists")]
    Duplicate { entity_type: String, key: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

impl DatabaseError {
    /// Map a unique-constraint violation on insert to a `Duplicate` error,
    /// leaving every other SQLite error untouched.
    pub(crate) fn on_insert(err: rusqlite::Error, entity_type: &str, key: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return DatabaseError::Duplicate {
                    entity_type: entity_type.to_string(),
                    key: key.to_string(),
                };
            }
        }
        DatabaseError::Sqlite(err)
    }
}
