use chrono::{DateTime, Utc};
use thiserror::Error;

/// Seeding parameters that are rejected before anything is written
#[derive(Debug, Error, PartialEq)]
pub enum SeedError {
    #[error("quantity range {min}..={max} is empty")]
    InvalidQuantityRange { min: i64, max: i64 },

    #[error("date window starts at {start} after it ends at {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("cannot pick ingredients for a recipe from an empty ingredient pool")]
    EmptyIngredientPool,

    #[error("no unique cake name found after {attempts} attempts")]
    NameAttemptsExhausted { attempts: u32 },
}
