use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// RFC3339 strings on the wire, matching how the rows are stored
pub(crate) mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// Maximum length of a cake name, enforced by the schema
pub const CAKE_NAME_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cake {
    pub cake_id: i64,
    pub name: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A cake that has not been inserted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCake {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: i64,
    /// Owning cake; nullable in the schema for rows written by other tools
    #[serde(default)]
    pub cake_id: Option<i64>,
    pub name: String,
    #[serde(with = "datetime_format")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub ingredient_id: i64,
    pub name: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    /// Refreshed every time the row is touched by an upsert
    #[serde(with = "datetime_format")]
    pub last_seen: DateTime<Utc>,
}

/// An ingredient draft. Two drafts with the same name map to the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewIngredient {
    pub name: String,
}

impl NewIngredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Join row between a recipe and one of its ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRecipeIngredient {
    pub ingredient_id: i64,
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cake_serializes_rfc3339() {
        let cake = Cake {
            cake_id: 1,
            name: "Ada Lovelace".to_string(),
            created_at: Utc.with_ymd_and_hms(2022, 6, 15, 12, 30, 0).unwrap(),
        };

        let json = serde_json::to_value(&cake).unwrap();
        assert_eq!(json["created_at"], "2022-06-15T12:30:00+00:00");

        let back: Cake = serde_json::from_value(json).unwrap();
        assert_eq!(back, cake);
    }

    #[test]
    fn test_recipe_without_cake_id_deserializes() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"recipe_id": 3, "name": "Grace Hopper", "date": "2022-06-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(recipe.cake_id, None);
        assert_eq!(recipe.date, Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let result: Result<Ingredient, _> = serde_json::from_str(
            r#"{"ingredient_id": 1, "name": "x", "created_at": "yesterday", "last_seen": "2022-06-01T00:00:00Z"}"#,
        );
        assert!(result.is_err());
    }
}
