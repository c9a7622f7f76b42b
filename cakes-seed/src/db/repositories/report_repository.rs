use anyhow::{Context, Result};

use cakes_types::DatabaseSummary;

use crate::db::DbPool;

/// Read-only statistics over a seeded database
pub struct ReportRepository {
    pool: DbPool,
}

impl ReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn summary(&self) -> Result<DatabaseSummary> {
        let conn = self.pool.get()?;
        let count = |sql: &str| -> Result<i64> {
            conn.query_row(sql, [], |row| row.get(0))
                .with_context(|| format!("Failed to run summary query: {}", sql))
        };

        let shared_ingredients = count(
            "SELECT COUNT(*) FROM (
                 SELECT ingredient_id FROM recipe_ingredient
                 GROUP BY ingredient_id
                 HAVING COUNT(DISTINCT recipe_id) > 1
             )",
        )?;

        let average_quantity: Option<f64> = conn
            .query_row("SELECT AVG(quantity) FROM recipe_ingredient", [], |row| row.get(0))
            .context("Failed to compute average quantity")?;

        Ok(DatabaseSummary {
            cakes: count("SELECT COUNT(*) FROM cake")?,
            recipes: count("SELECT COUNT(*) FROM recipe")?,
            ingredients: count("SELECT COUNT(*) FROM ingredient")?,
            recipe_ingredients: count("SELECT COUNT(*) FROM recipe_ingredient")?,
            shared_ingredients,
            orphan_recipes: count("SELECT COUNT(*) FROM recipe WHERE cake_id IS NULL")?,
            average_quantity,
        })
    }

    /// Ingredient names with how many recipes use them, most used first
    pub fn ingredient_usage(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT i.name, COUNT(DISTINCT ri.recipe_id) AS uses
             FROM ingredient i
             LEFT JOIN recipe_ingredient ri ON ri.ingredient_id = i.ingredient_id
             GROUP BY i.ingredient_id
             ORDER BY uses DESC, i.name",
        )?;
        let usage = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_summary_of_empty_database() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let summary = ReportRepository::new(db.pool.clone()).summary().unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.average_quantity, None);
    }

    #[test]
    fn test_summary_counts_shared_ingredients() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        {
            let conn = db.connection().expect("Failed to get connection");
            conn.execute_batch(
                "INSERT INTO cake (name) VALUES ('Opera');
                 INSERT INTO recipe (cake_id, name) VALUES (1, 'Sponge');
                 INSERT INTO recipe (cake_id, name) VALUES (1, 'Ganache');
                 INSERT INTO recipe (cake_id, name) VALUES (NULL, 'Loose');
                 INSERT INTO ingredient (name) VALUES ('cocoa');
                 INSERT INTO ingredient (name) VALUES ('cream');
                 INSERT INTO recipe_ingredient (recipe_id, ingredient_id, quantity) VALUES (1, 1, 100);
                 INSERT INTO recipe_ingredient (recipe_id, ingredient_id, quantity) VALUES (2, 1, 200);
                 INSERT INTO recipe_ingredient (recipe_id, ingredient_id, quantity) VALUES (2, 2, 300);",
            )
            .expect("Failed to insert fixtures");
        }

        let reports = ReportRepository::new(db.pool.clone());
        let summary = reports.summary().unwrap();
        assert_eq!(summary.cakes, 1);
        assert_eq!(summary.recipes, 3);
        assert_eq!(summary.ingredients, 2);
        assert_eq!(summary.recipe_ingredients, 3);
        assert_eq!(summary.shared_ingredients, 1);
        assert_eq!(summary.orphan_recipes, 1);
        assert_eq!(summary.average_quantity, Some(200.0));

        let usage = reports.ingredient_usage().unwrap();
        assert_eq!(usage, vec![("cocoa".to_string(), 2), ("cream".to_string(), 1)]);
    }
}
