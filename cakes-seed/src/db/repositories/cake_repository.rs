use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use cakes_types::{Cake, NewCake, CAKE_NAME_MAX_LEN};

use super::timestamp_column;
use crate::db::DbPool;

const CAKE_COLUMNS: &str = "cake_id, name, created_at";

fn map_cake(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cake> {
    Ok(Cake {
        cake_id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
    })
}

pub struct CakeRepository {
    pool: DbPool,
}

impl CakeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a cake and read it back with its assigned id.
    ///
    /// A duplicate name fails with the underlying UNIQUE violation in the
    /// error chain, see [`super::is_unique_violation_any`].
    pub fn create(&self, cake: &NewCake) -> Result<Cake> {
        if cake.name.chars().count() > CAKE_NAME_MAX_LEN {
            anyhow::bail!("Cake name longer than {} characters", CAKE_NAME_MAX_LEN);
        }

        let cake_id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO cake (name, created_at) VALUES (?, ?)",
                (&cake.name, cake.created_at.to_rfc3339()),
            )
            .with_context(|| format!("Failed to create cake '{}'", cake.name))?;
            conn.last_insert_rowid()
        };

        self.get_by_id(cake_id)?
            .with_context(|| format!("Cake {} vanished after insert", cake_id))
    }

    /// Get cake by ID
    pub fn get_by_id(&self, cake_id: i64) -> Result<Option<Cake>> {
        let conn = self.pool.get()?;
        let cake = conn
            .query_row(
                &format!("SELECT {} FROM cake WHERE cake_id = ?", CAKE_COLUMNS),
                [cake_id],
                map_cake,
            )
            .optional()?;
        Ok(cake)
    }

    /// Get cake by name
    pub fn get_by_name(&self, name: &str) -> Result<Option<Cake>> {
        let conn = self.pool.get()?;
        let cake = conn
            .query_row(
                &format!("SELECT {} FROM cake WHERE name = ?", CAKE_COLUMNS),
                [name],
                map_cake,
            )
            .optional()?;
        Ok(cake)
    }

    /// All cakes in insertion order
    pub fn list_all(&self) -> Result<Vec<Cake>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cake ORDER BY cake_id",
            CAKE_COLUMNS
        ))?;
        let cakes = stmt
            .query_map([], map_cake)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cakes)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM cake", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::is_unique_violation_any;
    use crate::db::Database;
    use chrono::{TimeZone, Utc};

    fn setup() -> CakeRepository {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        CakeRepository::new(db.pool.clone())
    }

    fn new_cake(name: &str) -> NewCake {
        NewCake {
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2022, 6, 10, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_refreshes_row() {
        let repo = setup();
        let cake = repo.create(&new_cake("Victoria Sponge")).expect("Failed to create cake");

        assert_eq!(cake.cake_id, 1);
        assert_eq!(cake.name, "Victoria Sponge");
        assert_eq!(cake.created_at, Utc.with_ymd_and_hms(2022, 6, 10, 8, 0, 0).unwrap());

        let fetched = repo.get_by_name("Victoria Sponge").expect("Query failed");
        assert_eq!(fetched, Some(cake));
    }

    #[test]
    fn test_duplicate_name_is_unique_violation() {
        let repo = setup();
        repo.create(&new_cake("Black Forest")).expect("Failed to create cake");

        let err = repo.create(&new_cake("Black Forest")).unwrap_err();
        assert!(is_unique_violation_any(&err), "unexpected error: {:#}", err);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        let repo = setup();
        for name in ["A", "B", "C"] {
            repo.create(&new_cake(name)).expect("Failed to create cake");
        }

        let names: Vec<String> = repo.list_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_overlong_name_rejected() {
        let repo = setup();
        let err = repo.create(&new_cake(&"x".repeat(256))).unwrap_err();
        assert!(!is_unique_violation_any(&err));
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_missing_cake() {
        let repo = setup();
        assert_eq!(repo.get_by_id(42).unwrap(), None);
    }
}
