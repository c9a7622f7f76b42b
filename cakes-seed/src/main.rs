use anyhow::{Context, Result};
use clap::Parser;

use cakes_seed::config::Settings;
use cakes_seed::db::Database;
use cakes_seed::{seed_database, telemetry, SeedPlan};
use cakes_types::SeedReport;

/// Cake Fixture Seeder
///
/// Fills the cake, recipe, ingredient and recipe_ingredient tables with
/// randomized records for development and testing.
#[derive(Parser, Debug)]
#[command(name = "cakes-seed")]
#[command(about = "Seed a SQLite database with fake cakes, recipes and ingredients", long_about = None)]
struct Args {
    /// Path to the SQLite database file (":memory:" for a throwaway run)
    #[arg(short, long)]
    database: Option<String>,

    /// Number of cakes to create
    #[arg(long)]
    cakes: Option<usize>,

    /// Number of distinct ingredient names (each is drafted twice)
    #[arg(long)]
    ingredients: Option<usize>,

    /// Recipes created for every cake
    #[arg(long)]
    recipes_per_cake: Option<usize>,

    /// Ingredient picks per recipe
    #[arg(long)]
    ingredients_per_recipe: Option<usize>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long, env = "SEED_RNG_SEED")]
    seed: Option<u64>,

    /// Delete existing fixture rows before seeding
    #[arg(long)]
    reset: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Args {
    /// CLI flags take precedence over settings.toml and the environment
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.database {
            settings.database.path = path.clone();
        }
        if let Some(cakes) = self.cakes {
            settings.seed.cakes = cakes;
        }
        if let Some(ingredients) = self.ingredients {
            settings.seed.ingredients = ingredients;
        }
        if let Some(recipes) = self.recipes_per_cake {
            settings.seed.recipes_per_cake = recipes;
        }
        if let Some(per_recipe) = self.ingredients_per_recipe {
            settings.seed.ingredients_per_recipe = per_recipe;
        }
        if self.seed.is_some() {
            settings.seed.rng_seed = self.seed;
        }
        if self.reset {
            settings.seed.reset = true;
        }
    }
}

fn display_report(report: &SeedReport) {
    println!();
    println!("Seed Summary");
    println!("============");
    println!();
    println!("Cakes created: {}", report.cakes_created);
    println!("Recipes created: {}", report.recipes_created);
    println!("Recipe ingredients created: {}", report.recipe_ingredients_created);
    println!("Ingredients inserted: {}", report.ingredients_inserted);
    println!("Ingredients updated on conflict: {}", report.ingredients_updated);
    println!("Ingredient picks reused: {}", report.ingredients_reused);
    if report.cake_name_retries > 0 {
        println!("Cake names redrawn: {}", report.cake_name_retries);
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init("cakes_seed=info");

    let args = Args::parse();
    let mut settings = Settings::new().context("Failed to load settings")?;
    args.apply(&mut settings);

    let plan = SeedPlan::from(&settings.seed);
    tracing::info!(
        database = %settings.database.path,
        cakes = plan.cakes,
        ingredients = plan.ingredients,
        recipes_per_cake = plan.recipes_per_cake,
        ingredients_per_recipe = plan.ingredients_per_recipe,
        "Seeding database"
    );

    let db = Database::new(&settings.database.path)
        .with_context(|| format!("Failed to open database {}", settings.database.path))?;

    let report = seed_database(&db, &plan, settings.seed.rng_seed, settings.seed.reset)?;
    tracing::info!("Seeding completed");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_settings() {
        let args = Args::parse_from([
            "cakes-seed",
            "--database",
            ":memory:",
            "--cakes",
            "7",
            "--ingredients-per-recipe",
            "3",
            "--seed",
            "99",
            "--reset",
        ]);
        let mut settings = Settings::from_defaults().unwrap();
        args.apply(&mut settings);

        assert_eq!(settings.database.path, ":memory:");
        assert_eq!(settings.seed.cakes, 7);
        assert_eq!(settings.seed.ingredients, 2);
        assert_eq!(settings.seed.ingredients_per_recipe, 3);
        assert_eq!(settings.seed.rng_seed, Some(99));
        assert!(settings.seed.reset);
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let args = Args::parse_from(["cakes-seed"]);
        let mut settings = Settings::from_defaults().unwrap();
        args.apply(&mut settings);

        assert_eq!(settings.database.path, "cakes.db");
        assert!(!settings.seed.reset);
    }
}
