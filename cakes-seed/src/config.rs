use chrono::{DateTime, Utc};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

/// Shape of one seeding run
#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub cakes: usize,
    /// Distinct ingredient names; each one is drafted twice
    pub ingredients: usize,
    pub recipes_per_cake: usize,
    pub ingredients_per_recipe: usize,
    pub quantity_min: i64,
    pub quantity_max: i64,
    /// Window for cake creation timestamps
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub max_name_attempts: u32,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub seed: Seed,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        // 1. Optional settings.toml
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Running from the workspace root during development
        let dev_path = PathBuf::from("cakes-seed").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // 2. Environment variables (highest priority before CLI flags)
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(seed) = std::env::var("SEED_RNG_SEED") {
            builder = builder.set_override("seed.rng_seed", seed)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and the environment
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.path", "cakes.db")?
            .set_default("seed.cakes", 2)?
            .set_default("seed.ingredients", 2)?
            .set_default("seed.recipes_per_cake", 2)?
            .set_default("seed.ingredients_per_recipe", 10)?
            .set_default("seed.quantity_min", 10)?
            .set_default("seed.quantity_max", 500)?
            .set_default("seed.window_start", "2022-06-01T00:00:00Z")?
            .set_default("seed.window_end", "2022-06-30T23:59:59Z")?
            .set_default("seed.max_name_attempts", 5)?
            .set_default("seed.reset", false)
    }
}
