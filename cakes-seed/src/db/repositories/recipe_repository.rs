use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;

use cakes_types::{NewRecipeIngredient, Recipe, RecipeIngredient};

use super::timestamp_column;
use crate::db::DbPool;

const RECIPE_COLUMNS: &str = "recipe_id, cake_id, name, date";

fn map_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        recipe_id: row.get(0)?,
        cake_id: row.get(1)?,
        name: row.get(2)?,
        date: timestamp_column(row, 3)?,
    })
}

pub struct RecipeRepository {
    pool: DbPool,
}

impl RecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a recipe together with its ingredient rows, committed as one unit
    pub fn create_with_ingredients(
        &self,
        cake_id: i64,
        name: &str,
        ingredients: &[NewRecipeIngredient],
    ) -> Result<Recipe> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin recipe transaction")?;

        tx.execute(
            "INSERT INTO recipe (cake_id, name, date) VALUES (?, ?, ?)",
            (cake_id, name, Utc::now().to_rfc3339()),
        )
        .with_context(|| format!("Failed to create recipe '{}' for cake {}", name, cake_id))?;
        let recipe_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO recipe_ingredient (recipe_id, ingredient_id, quantity) VALUES (?, ?, ?)",
            )?;
            for item in ingredients {
                stmt.execute((recipe_id, item.ingredient_id, item.quantity))
                    .with_context(|| {
                        format!(
                            "Failed to link ingredient {} to recipe {}",
                            item.ingredient_id, recipe_id
                        )
                    })?;
            }
        }

        let recipe = tx.query_row(
            &format!("SELECT {} FROM recipe WHERE recipe_id = ?", RECIPE_COLUMNS),
            [recipe_id],
            map_recipe,
        )?;

        tx.commit().context("Failed to commit recipe")?;
        Ok(recipe)
    }

    /// Get recipe by ID
    pub fn get_by_id(&self, recipe_id: i64) -> Result<Option<Recipe>> {
        let conn = self.pool.get()?;
        let recipe = conn
            .query_row(
                &format!("SELECT {} FROM recipe WHERE recipe_id = ?", RECIPE_COLUMNS),
                [recipe_id],
                map_recipe,
            )
            .optional()?;
        Ok(recipe)
    }

    /// Recipes belonging to a cake
    pub fn list_by_cake(&self, cake_id: i64) -> Result<Vec<Recipe>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recipe WHERE cake_id = ? ORDER BY recipe_id",
            RECIPE_COLUMNS
        ))?;
        let recipes = stmt
            .query_map([cake_id], map_recipe)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Join rows of a recipe
    pub fn ingredients_for(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT recipe_ingredient_id, recipe_id, ingredient_id, quantity
             FROM recipe_ingredient
             WHERE recipe_id = ?
             ORDER BY recipe_ingredient_id",
        )?;
        let rows = stmt
            .query_map([recipe_id], |row| {
                Ok(RecipeIngredient {
                    recipe_ingredient_id: row.get(0)?,
                    recipe_id: row.get(1)?,
                    ingredient_id: row.get(2)?,
                    quantity: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM recipe", [], |row| row.get(0))?;
        Ok(count)
    }
}
