mod cake_repository;
mod ingredient_repository;
mod recipe_repository;
mod report_repository;

pub use cake_repository::CakeRepository;
pub use ingredient_repository::{IngredientRepository, UpsertOutcome};
pub use recipe_repository::RecipeRepository;
pub use report_repository::ReportRepository;

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// Read an RFC3339 timestamp column
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// True when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == rusqlite::ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

/// Same check through an anyhow chain
pub fn is_unique_violation_any(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<rusqlite::Error>())
        .any(is_unique_violation)
}
