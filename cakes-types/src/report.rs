use serde::{Deserialize, Serialize};

/// What a single seeding run wrote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedReport {
    pub cakes_created: usize,
    pub recipes_created: usize,
    pub recipe_ingredients_created: usize,
    /// Ingredient rows inserted for the first time
    pub ingredients_inserted: usize,
    /// Inserts that hit the unique name constraint and were turned into updates
    pub ingredients_updated: usize,
    /// Picks that reused an ingredient already persisted during this run
    pub ingredients_reused: usize,
    /// Cake names that had to be redrawn after a collision
    pub cake_name_retries: usize,
}

impl SeedReport {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Row counts and usage statistics for an existing database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    pub cakes: i64,
    pub recipes: i64,
    pub ingredients: i64,
    pub recipe_ingredients: i64,
    /// Ingredients referenced by more than one recipe
    pub shared_ingredients: i64,
    /// Recipes whose cake_id is NULL
    pub orphan_recipes: i64,
    pub average_quantity: Option<f64>,
}

impl DatabaseSummary {
    pub fn is_empty(&self) -> bool {
        self.cakes == 0
            && self.recipes == 0
            && self.ingredients == 0
            && self.recipe_ingredients == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = DatabaseSummary::default();
        assert!(summary.is_empty());

        let summary = DatabaseSummary {
            ingredients: 1,
            ..Default::default()
        };
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_report_json_field_names() {
        let report = SeedReport {
            cakes_created: 2,
            recipes_created: 4,
            ..SeedReport::new()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cakes_created"], 2);
        assert_eq!(json["recipes_created"], 4);
        assert_eq!(json["ingredients_updated"], 0);
    }
}
