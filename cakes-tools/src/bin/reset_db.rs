// Wipe all fixture rows from a cake database
use anyhow::{Context, Result};
use clap::Parser;

use cakes_seed::db::repositories::ReportRepository;
use cakes_seed::db::Database;
use cakes_seed::telemetry;

#[derive(Parser, Debug)]
#[command(name = "reset-db")]
#[command(about = "Delete every cake, recipe and ingredient row", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "./cakes.db", env = "DATABASE_PATH")]
    database: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init("reset_db=info,cakes_seed=info");

    let args = Args::parse();
    if !std::path::Path::new(&args.database).exists() {
        anyhow::bail!("Database file not found: {}", args.database);
    }

    let db = Database::new(&args.database).context("Failed to open database connection")?;
    db.validate_schema()?;

    let summary = ReportRepository::new(db.pool.clone()).summary()?;
    if summary.is_empty() {
        println!("Database is already empty - nothing to reset.");
        return Ok(());
    }

    if !args.yes {
        println!(
            "This will delete {} cakes, {} recipes and {} ingredients.",
            summary.cakes, summary.recipes, summary.ingredients
        );
        println!("Do you want to continue? (y/N): ");

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read user input")?;

        if !is_yes(&input) {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    db.reset()?;
    println!("Database reset.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }
}
