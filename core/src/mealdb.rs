use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Recipe, RecipeSummary, decode_tags, pair_ingredients};

/// TheMealDB exposes 20 numbered ingredient/measure slots per meal.
pub const INGREDIENT_SLOTS: usize = 20;

/// Every endpoint wraps its payload in `{"meals": [...]}`; no match is `null`.
#[derive(Debug, Deserialize)]
pub struct MealsResponse<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealsResponse<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MealData {
    #[serde(rename = "idMeal")]
    pub id: Option<String>,
    #[serde(rename = "strMeal")]
    pub name: Option<String>,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb")]
    pub thumbnail: Option<String>,
    #[serde(rename = "strYoutube")]
    pub youtube: Option<String>,
    #[serde(rename = "strTags")]
    pub tags: Option<String>,
    // strIngredientN / strMeasureN and anything else the API adds
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MealData {
    fn slot(&self, prefix: &str, n: usize) -> &str {
        self.extra
            .get(&format!("{prefix}{n}"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    #[must_use]
    pub fn ingredient_names(&self) -> Vec<&str> {
        (1..=INGREDIENT_SLOTS)
            .map(|n| self.slot("strIngredient", n))
            .collect()
    }

    #[must_use]
    pub fn measures(&self) -> Vec<&str> {
        (1..=INGREDIENT_SLOTS)
            .map(|n| self.slot("strMeasure", n))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryEntry {
    #[serde(rename = "strCategory")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AreaEntry {
    #[serde(rename = "strArea")]
    pub name: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Convert a full meal record. Records without an id or name are dropped.
#[must_use]
pub fn meal_to_recipe(m: MealData) -> Option<Recipe> {
    let ingredients = pair_ingredients(m.ingredient_names(), m.measures());
    let id = non_blank(m.id)?;
    let name = non_blank(m.name)?;

    Some(Recipe {
        id,
        name,
        image_url: m.thumbnail.unwrap_or_default(),
        category: m.category.unwrap_or_default(),
        area: m.area.unwrap_or_default(),
        instructions: m.instructions.unwrap_or_default(),
        ingredients,
        youtube_url: non_blank(m.youtube),
        tags: decode_tags(m.tags.as_deref().unwrap_or("")),
        is_favorite: false,
    })
}

/// Convert a filter-endpoint record, which only carries id, name and thumbnail.
#[must_use]
pub fn meal_to_summary(m: MealData) -> Option<RecipeSummary> {
    Some(RecipeSummary {
        id: non_blank(m.id)?,
        name: non_blank(m.name)?,
        image_url: m.thumbnail.unwrap_or_default(),
    })
}

#[must_use]
pub fn category_names(entries: Vec<CategoryEntry>) -> Vec<String> {
    entries.into_iter().filter_map(|e| non_blank(e.name)).collect()
}

#[must_use]
pub fn area_names(entries: Vec<AreaEntry>) -> Vec<String> {
    entries.into_iter().filter_map(|e| non_blank(e.name)).collect()
}
