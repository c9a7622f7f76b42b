use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::ops::RangeInclusive;

use cakes_types::{Cake, NewCake, NewIngredient, NewRecipeIngredient, Recipe, SeedReport};

use crate::config;
use crate::db::repositories::{
    is_unique_violation_any, CakeRepository, IngredientRepository, RecipeRepository, UpsertOutcome,
};
use crate::db::Database;
use crate::error::SeedError;
use crate::fake::Faker;

/// Everything a seeding run needs to know, validated before any write
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub cakes: usize,
    pub ingredients: usize,
    pub recipes_per_cake: usize,
    pub ingredients_per_recipe: usize,
    pub quantity: RangeInclusive<i64>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub max_name_attempts: u32,
}

impl SeedPlan {
    pub fn validate(&self) -> Result<(), SeedError> {
        if self.quantity.is_empty() {
            return Err(SeedError::InvalidQuantityRange {
                min: *self.quantity.start(),
                max: *self.quantity.end(),
            });
        }
        if self.window_start > self.window_end {
            return Err(SeedError::InvalidWindow {
                start: self.window_start,
                end: self.window_end,
            });
        }
        let picks_ingredients =
            self.cakes > 0 && self.recipes_per_cake > 0 && self.ingredients_per_recipe > 0;
        if self.ingredients == 0 && picks_ingredients {
            return Err(SeedError::EmptyIngredientPool);
        }
        Ok(())
    }
}

impl From<&config::Seed> for SeedPlan {
    fn from(seed: &config::Seed) -> Self {
        Self {
            cakes: seed.cakes,
            ingredients: seed.ingredients,
            recipes_per_cake: seed.recipes_per_cake,
            ingredients_per_recipe: seed.ingredients_per_recipe,
            quantity: seed.quantity_min..=seed.quantity_max,
            window_start: seed.window_start,
            window_end: seed.window_end,
            max_name_attempts: seed.max_name_attempts,
        }
    }
}

/// An ingredient waiting to be picked. Duplicate drafts share a name and
/// resolve to the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientDraft {
    pub ingredient: NewIngredient,
    /// Set once this draft has been written during the run
    pub ingredient_id: Option<i64>,
}

impl IngredientDraft {
    fn new(name: String) -> Self {
        Self {
            ingredient: NewIngredient::new(name),
            ingredient_id: None,
        }
    }
}

/// Writes fake cakes, ingredients and recipes through the repositories
pub struct Seeder {
    cakes: CakeRepository,
    ingredients: IngredientRepository,
    recipes: RecipeRepository,
    faker: Faker,
    report: SeedReport,
}

impl Seeder {
    pub fn new(db: &Database, faker: Faker) -> Self {
        Self {
            cakes: CakeRepository::new(db.pool.clone()),
            ingredients: IngredientRepository::new(db.pool.clone()),
            recipes: RecipeRepository::new(db.pool.clone()),
            faker,
            report: SeedReport::new(),
        }
    }

    pub fn report(&self) -> &SeedReport {
        &self.report
    }

    /// Insert `count` cakes one at a time, each with a fake name and a
    /// creation time inside the window.
    pub fn create_cakes(
        &mut self,
        count: usize,
        window: (DateTime<Utc>, DateTime<Utc>),
        max_name_attempts: u32,
    ) -> Result<Vec<Cake>> {
        let mut cakes = Vec::with_capacity(count);

        for _ in 0..count {
            let created_at = self.faker.date_time_between(window.0, window.1)?;
            let cake = self.create_cake(created_at, max_name_attempts)?;
            tracing::debug!(cake_id = cake.cake_id, name = %cake.name, "Created cake");
            cakes.push(cake);
        }

        self.report.cakes_created += cakes.len();
        Ok(cakes)
    }

    fn create_cake(&mut self, created_at: DateTime<Utc>, max_name_attempts: u32) -> Result<Cake> {
        for attempt in 1..=max_name_attempts.max(1) {
            let draft = NewCake {
                name: self.faker.name(),
                created_at,
            };
            match self.cakes.create(&draft) {
                Ok(cake) => return Ok(cake),
                Err(e) if is_unique_violation_any(&e) => {
                    tracing::debug!(
                        name = %draft.name,
                        attempt,
                        "Cake name taken, drawing another"
                    );
                    self.report.cake_name_retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Err(SeedError::NameAttemptsExhausted {
            attempts: max_name_attempts.max(1),
        }
        .into())
    }

    /// Draft `count` fake ingredient names, each one pushed twice so that
    /// later picks hit the upsert path.
    pub fn get_ingredients(&mut self, count: usize) -> Vec<IngredientDraft> {
        let mut drafts = Vec::new();
        for _ in 0..count {
            let draft = IngredientDraft::new(self.faker.name());
            drafts.push(draft.clone());
            drafts.push(draft);
        }
        drafts
    }

    pub fn shuffle_ingredients(&mut self, drafts: &mut [IngredientDraft]) {
        self.faker.shuffle(drafts);
    }

    /// Pick `count` ingredients at random (repeats allowed), make sure each
    /// exists in the database, and pair it with a random quantity.
    pub fn get_recipe_ingredients(
        &mut self,
        cake: &Cake,
        pool: &mut [IngredientDraft],
        count: usize,
        quantity: RangeInclusive<i64>,
    ) -> Result<Vec<NewRecipeIngredient>> {
        let mut items = Vec::with_capacity(count);

        for _ in 0..count {
            let index = self
                .faker
                .choose_index(pool.len())
                .ok_or(SeedError::EmptyIngredientPool)?;
            let draft = &mut pool[index];
            tracing::debug!(
                ingredient = %draft.ingredient.name,
                cake_id = cake.cake_id,
                "Picked ingredient"
            );

            let ingredient_id = match draft.ingredient_id {
                Some(id) => {
                    self.report.ingredients_reused += 1;
                    id
                }
                None => {
                    let (stored, outcome) = self.ingredients.upsert(&draft.ingredient)?;
                    match outcome {
                        UpsertOutcome::Inserted => self.report.ingredients_inserted += 1,
                        UpsertOutcome::Updated => self.report.ingredients_updated += 1,
                    }
                    draft.ingredient_id = Some(stored.ingredient_id);
                    stored.ingredient_id
                }
            };

            items.push(NewRecipeIngredient {
                ingredient_id,
                quantity: self.faker.quantity(quantity.clone())?,
            });
        }

        Ok(items)
    }

    /// Create `by_cake` recipes for every cake, each committed with its
    /// ingredient rows.
    pub fn create_recipes(
        &mut self,
        cakes: &[Cake],
        pool: &mut [IngredientDraft],
        by_cake: usize,
        per_recipe: usize,
        quantity: RangeInclusive<i64>,
    ) -> Result<Vec<Recipe>> {
        let mut recipes = Vec::new();

        for cake in cakes {
            for _ in 0..by_cake {
                let name = self.faker.name();
                let items = self.get_recipe_ingredients(cake, pool, per_recipe, quantity.clone())?;
                let recipe = self
                    .recipes
                    .create_with_ingredients(cake.cake_id, &name, &items)
                    .with_context(|| format!("Failed to seed recipe for cake {}", cake.cake_id))?;

                self.report.recipes_created += 1;
                self.report.recipe_ingredients_created += items.len();
                tracing::debug!(
                    recipe_id = recipe.recipe_id,
                    cake_id = cake.cake_id,
                    ingredients = items.len(),
                    "Created recipe"
                );
                recipes.push(recipe);
            }
        }

        Ok(recipes)
    }

    /// Full run: cakes, then a shuffled ingredient pool, then recipes
    pub fn run(&mut self, plan: &SeedPlan) -> Result<SeedReport> {
        plan.validate()?;

        let cakes = self.create_cakes(
            plan.cakes,
            (plan.window_start, plan.window_end),
            plan.max_name_attempts,
        )?;
        tracing::info!(count = cakes.len(), "Cakes created");

        let mut pool = self.get_ingredients(plan.ingredients);
        self.shuffle_ingredients(&mut pool);

        let recipes = self.create_recipes(
            &cakes,
            &mut pool,
            plan.recipes_per_cake,
            plan.ingredients_per_recipe,
            plan.quantity.clone(),
        )?;
        tracing::info!(count = recipes.len(), "Recipes created");

        Ok(self.report.clone())
    }
}

/// Seed `db` according to `plan`, optionally clearing it first
pub fn seed_database(
    db: &Database,
    plan: &SeedPlan,
    rng_seed: Option<u64>,
    reset: bool,
) -> Result<SeedReport> {
    plan.validate()?;
    db.initialize()?;
    if reset {
        db.reset()?;
    }

    let mut seeder = Seeder::new(db, Faker::from_seed(rng_seed));
    seeder.run(plan)
}
