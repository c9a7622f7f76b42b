// Library exports for cakes-seed
// The tools crate opens databases through these modules

pub mod config;
pub mod db;
pub mod error;
pub mod fake;
pub mod seeder;
pub mod telemetry;

pub use error::SeedError;
pub use seeder::{seed_database, SeedPlan, Seeder};
