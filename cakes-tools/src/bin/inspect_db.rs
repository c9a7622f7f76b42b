// Report what a seeded database contains
use anyhow::{Context, Result};
use clap::Parser;

use cakes_seed::db::repositories::{CakeRepository, RecipeRepository, ReportRepository};
use cakes_seed::db::Database;
use cakes_seed::telemetry;

#[derive(Parser, Debug)]
#[command(name = "inspect-db")]
#[command(about = "Show row counts and ingredient usage of a seeded cake database", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "./cakes.db", env = "DATABASE_PATH")]
    database: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn connect_database(path: &str) -> Result<Database> {
    if !std::path::Path::new(path).exists() {
        anyhow::bail!("Database file not found: {}", path);
    }

    let db = Database::new(path).context("Failed to open database connection")?;
    db.validate_schema()?;
    tracing::debug!(path, "Database schema validated");
    Ok(db)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init("inspect_db=info,cakes_seed=warn");

    let args = Args::parse();
    let db = connect_database(&args.database)?;

    let reports = ReportRepository::new(db.pool.clone());
    let summary = reports.summary()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== Database: {} ===\n", args.database);
    println!("Cakes: {}", summary.cakes);
    println!("Recipes: {} ({} without a cake)", summary.recipes, summary.orphan_recipes);
    println!("Ingredients: {}", summary.ingredients);
    println!("Recipe ingredients: {}", summary.recipe_ingredients);
    println!("Ingredients shared by several recipes: {}", summary.shared_ingredients);
    match summary.average_quantity {
        Some(avg) => println!("Average quantity: {:.1}", avg),
        None => println!("Average quantity: n/a"),
    }

    if summary.is_empty() {
        println!("\nDatabase is empty - run cakes-seed first.");
        return Ok(());
    }

    println!("\n=== Cakes ===");
    let recipes = RecipeRepository::new(db.pool.clone());
    for cake in CakeRepository::new(db.pool.clone()).list_all()? {
        let cake_recipes = recipes.list_by_cake(cake.cake_id)?;
        println!(
            "  {}. {} (created {}, {} recipes)",
            cake.cake_id,
            cake.name,
            cake.created_at.format("%Y-%m-%d %H:%M:%S"),
            cake_recipes.len()
        );
        for recipe in cake_recipes {
            let items = recipes.ingredients_for(recipe.recipe_id)?;
            let total: i64 = items.iter().map(|i| i.quantity).sum();
            println!(
                "     - {} ({} ingredients, total quantity {})",
                recipe.name,
                items.len(),
                total
            );
        }
    }

    println!("\n=== Ingredient usage ===");
    for (i, (name, uses)) in reports.ingredient_usage()?.iter().enumerate() {
        println!("  {}. {} - used by {} recipes", i + 1, name, uses);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("absent.db");

        let err = connect_database(path.to_str().unwrap()).err().expect("Should fail");
        assert!(err.to_string().contains("Database file not found"));
    }

    #[test]
    fn test_unseeded_file_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("blank.db");
        std::fs::write(&path, b"").expect("Failed to create file");

        let err = connect_database(path.to_str().unwrap()).err().expect("Should fail");
        assert!(err.to_string().contains("table not found"));
    }

    #[test]
    fn test_initialized_file_accepted() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("cakes.db");
        Database::new(&path).unwrap().initialize().unwrap();

        assert!(connect_database(path.to_str().unwrap()).is_ok());
    }
}
