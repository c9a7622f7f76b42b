use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use cakes_types::{Ingredient, NewIngredient};

use super::{is_unique_violation, timestamp_column};
use crate::db::DbPool;

const INGREDIENT_COLUMNS: &str = "ingredient_id, name, created_at, last_seen";

fn map_ingredient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        ingredient_id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
        last_seen: timestamp_column(row, 3)?,
    })
}

/// How an upsert resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

pub struct IngredientRepository {
    pool: DbPool,
}

impl IngredientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Plain insert; a duplicate name is an error
    pub fn insert(&self, ingredient: &NewIngredient) -> Result<Ingredient> {
        let now = Utc::now().to_rfc3339();
        let ingredient_id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO ingredient (name, created_at, last_seen) VALUES (?, ?, ?)",
                (&ingredient.name, &now, &now),
            )
            .with_context(|| format!("Failed to create ingredient '{}'", ingredient.name))?;
            conn.last_insert_rowid()
        };

        self.get_by_id(ingredient_id)?
            .with_context(|| format!("Ingredient {} vanished after insert", ingredient_id))
    }

    /// Insert the ingredient, or update the existing row with the same name.
    ///
    /// The insert is attempted first. Only a UNIQUE violation triggers the
    /// single fallback update, which rewrites the name and refreshes
    /// `last_seen`. Every other error is returned as is.
    pub fn upsert(&self, ingredient: &NewIngredient) -> Result<(Ingredient, UpsertOutcome)> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();

        let outcome = match conn.execute(
            "INSERT INTO ingredient (name, created_at, last_seen) VALUES (?, ?, ?)",
            (&ingredient.name, &now, &now),
        ) {
            Ok(_) => UpsertOutcome::Inserted,
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(name = %ingredient.name, "Ingredient exists, updating instead");
                conn.execute(
                    "UPDATE ingredient SET name = ?, last_seen = ? WHERE name = ?",
                    (&ingredient.name, &now, &ingredient.name),
                )
                .with_context(|| format!("Failed to update ingredient '{}'", ingredient.name))?;
                UpsertOutcome::Updated
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to upsert ingredient '{}'", ingredient.name))
            }
        };

        let stored = conn
            .query_row(
                &format!("SELECT {} FROM ingredient WHERE name = ?", INGREDIENT_COLUMNS),
                [&ingredient.name],
                map_ingredient,
            )
            .with_context(|| format!("Failed to read back ingredient '{}'", ingredient.name))?;

        Ok((stored, outcome))
    }

    /// Get ingredient by ID
    pub fn get_by_id(&self, ingredient_id: i64) -> Result<Option<Ingredient>> {
        let conn = self.pool.get()?;
        let ingredient = conn
            .query_row(
                &format!("SELECT {} FROM ingredient WHERE ingredient_id = ?", INGREDIENT_COLUMNS),
                [ingredient_id],
                map_ingredient,
            )
            .optional()?;
        Ok(ingredient)
    }

    /// Get ingredient by name
    pub fn get_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let conn = self.pool.get()?;
        let ingredient = conn
            .query_row(
                &format!("SELECT {} FROM ingredient WHERE name = ?", INGREDIENT_COLUMNS),
                [name],
                map_ingredient,
            )
            .optional()?;
        Ok(ingredient)
    }

    pub fn list_all(&self) -> Result<Vec<Ingredient>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ingredient ORDER BY name",
            INGREDIENT_COLUMNS
        ))?;
        let ingredients = stmt
            .query_map([], map_ingredient)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM ingredient", [], |row| row.get(0))?;
        Ok(count)
    }
}
