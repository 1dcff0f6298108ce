//! Record access layer — entity-scoped database operations.
//!
//! Thin parameterized queries over `&Connection`: inserts return the new
//! rowid, updates and deletes report `NotFound` when nothing was affected,
//! list functions return ordered row sets. Each call is independently
//! transactional (autocommit per statement).

mod appointment;
mod doctor;
mod exam;
mod history;
mod patient;
mod prescription;
mod reference;
mod visit;

pub use appointment::*;
pub use doctor::*;
pub use exam::*;
pub use history::*;
pub use patient::*;
pub use prescription::*;
pub use reference::*;
pub use visit::*;

use super::DatabaseError;

pub(crate) fn require_non_empty(
    value: &str,
    field: &'static str,
) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::EmptyField(field));
    }
    Ok(())
}
