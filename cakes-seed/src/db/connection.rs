use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{SCHEMA, TABLES_IN_DELETE_ORDER};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Pragmas applied to every pooled connection
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// Each in-memory SQLite connection is its own database, so an in-memory
    /// pool holds exactly one connection.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let in_memory = Self::is_memory_path(path.as_ref());
        let manager = Self::create_connection_manager(path, in_memory)
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        let builder = Pool::<SqliteConnectionManager>::builder();
        let builder = if in_memory { builder.max_size(1) } else { builder };
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;

        tracing::debug!(in_memory, "Database pool created");
        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy()
            .trim()
            .eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create appropriate connection manager based on path
    fn create_connection_manager<P: AsRef<Path>>(
        path: P,
        in_memory: bool,
    ) -> SqliteConnectionManager {
        if in_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema. Safe to run multiple times.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Delete every fixture row and restart the id sequences
    pub fn reset(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("Failed to begin reset transaction")?;

        for table in TABLES_IN_DELETE_ORDER {
            let deleted = tx
                .execute(&format!("DELETE FROM {}", table), [])
                .with_context(|| format!("Failed to clear table {}", table))?;
            tracing::debug!(table, deleted, "Cleared table");
        }

        // sqlite_sequence only exists once an AUTOINCREMENT table has had a row
        let has_sequence: bool = tx.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='sqlite_sequence'",
            [],
            |row| row.get::<_, i32>(0).map(|count| count > 0),
        )?;
        if has_sequence {
            tx.execute("DELETE FROM sqlite_sequence", [])
                .context("Failed to reset id sequences")?;
        }

        tx.commit().context("Failed to commit reset")?;
        tracing::info!("Database reset");
        Ok(())
    }

    /// Check that all fixture tables exist
    pub fn validate_schema(&self) -> Result<()> {
        let conn = self.connection()?;
        for table in TABLES_IN_DELETE_ORDER {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get::<_, i32>(0).map(|count| count > 0),
                )
                .with_context(|| format!("Failed to check for {} table", table))?;

            if !exists {
                anyhow::bail!("Database schema is invalid - {} table not found", table);
            }
        }
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let conn = db.connection().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");

        let tables = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect tables");
        tables
    }

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let tables = table_names(&db);
        assert!(tables.contains(&"cake".to_string()));
        assert!(tables.contains(&"recipe".to_string()));
        assert!(tables.contains(&"ingredient".to_string()));
        assert!(tables.contains(&"recipe_ingredient".to_string()));
        db.validate_schema().expect("Schema should validate");
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("First initialize failed");
        db.initialize().expect("Second initialize failed");
    }

    #[test]
    fn test_validate_schema_on_empty_database() {
        let db = Database::in_memory().expect("Failed to create database");
        let err = db.validate_schema().unwrap_err();
        assert!(err.to_string().contains("table not found"));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("Failed to read pragma");
        assert_eq!(enabled, 1);

        let result = conn.execute(
            "INSERT INTO recipe (cake_id, name) VALUES (?, ?)",
            (999, "Orphan"),
        );
        assert!(result.is_err(), "Insert with dangling cake_id must fail");
    }

    #[test]
    fn test_timestamp_defaults_are_rfc3339() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        conn.execute("INSERT INTO ingredient (name) VALUES ('flour')", [])
            .expect("Failed to insert ingredient");
        let last_seen: String = conn
            .query_row("SELECT last_seen FROM ingredient", [], |row| row.get(0))
            .expect("Failed to read last_seen");

        assert!(last_seen.parse::<chrono::DateTime<chrono::Utc>>().is_ok());
    }

    #[test]
    fn test_reset_clears_rows_and_sequences() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        {
            let conn = db.connection().expect("Failed to get connection");
            conn.execute("INSERT INTO cake (name) VALUES ('Sponge')", [])
                .expect("Failed to insert cake");
            conn.execute("INSERT INTO recipe (cake_id, name) VALUES (1, 'Base')", [])
                .expect("Failed to insert recipe");
        }

        db.reset().expect("Failed to reset");

        let conn = db.connection().expect("Failed to get connection");
        let cakes: i64 = conn
            .query_row("SELECT COUNT(*) FROM cake", [], |row| row.get(0))
            .expect("Failed to count cakes");
        assert_eq!(cakes, 0);

        conn.execute("INSERT INTO cake (name) VALUES ('Sponge')", [])
            .expect("Failed to insert cake after reset");
        assert_eq!(conn.last_insert_rowid(), 1);
    }

    #[test]
    fn test_reset_on_fresh_schema() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        db.reset().expect("Reset of an empty database should succeed");
    }

    #[test]
    fn test_memory_database_detection() {
        let memory_paths = [":memory:", " :memory: ", ":MEMORY:", " :Memory: "];

        for path in &memory_paths {
            assert!(Database::is_memory_path(Path::new(path)));
            let db = Database::new(path).expect("Failed to create memory database");
            db.initialize().expect("Failed to initialize schema");
        }

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file_path = dir.path().join("cakes.db");
        assert!(!Database::is_memory_path(&file_path));

        let db = Database::new(&file_path).expect("Failed to create file database");
        db.initialize().expect("Failed to initialize file schema");
        assert!(file_path.exists());
    }
}
