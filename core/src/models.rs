use serde::{Deserialize, Serialize};

/// Separates ingredient pairs in the persisted `ingredients` column.
pub const PAIR_DELIMITER: char = '|';
/// Separates an ingredient's name from its measure inside one pair.
pub const FIELD_DELIMITER: char = ':';
/// Separates tags in both the remote `strTags` field and the `tags` column.
pub const TAG_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measure: measure.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    /// Case-insensitive substring match on name, category, and area.
    #[must_use]
    pub fn matches_keyword(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [&self.name, &self.category, &self.area]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// The three fields the filter endpoints return for each match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            image_url: r.image_url.clone(),
        }
    }
}

/// Pair ingredient names with measures slot by slot.
///
/// Slot N's name goes with slot N's measure. Slots with a blank name are
/// dropped together with their measure, and pairing stops at the end of the
/// shorter list. A blank measure is kept as an empty string; only the name
/// decides whether a slot counts.
pub fn pair_ingredients<N, M>(names: N, measures: M) -> Vec<Ingredient>
where
    N: IntoIterator,
    N::Item: AsRef<str>,
    M: IntoIterator,
    M::Item: AsRef<str>,
{
    names
        .into_iter()
        .zip(measures)
        .filter_map(|(name, measure)| {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return None;
            }
            Some(Ingredient::new(name, measure.as_ref().trim()))
        })
        .collect()
}

#[must_use]
pub fn encode_ingredients(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(|i| format!("{}{FIELD_DELIMITER}{}", i.name, i.measure))
        .collect::<Vec<_>>()
        .join(&PAIR_DELIMITER.to_string())
}

#[must_use]
pub fn decode_ingredients(encoded: &str) -> Vec<Ingredient> {
    if encoded.trim().is_empty() {
        return Vec::new();
    }
    encoded
        .split(PAIR_DELIMITER)
        .filter_map(|pair| {
            let (name, measure) = pair.split_once(FIELD_DELIMITER)?;
            Some(Ingredient::new(name, measure))
        })
        .collect()
}

#[must_use]
pub fn encode_tags(tags: &[String]) -> String {
    tags.join(&TAG_DELIMITER.to_string())
}

/// Split a comma-separated tag string, dropping blank entries.
#[must_use]
pub fn decode_tags(encoded: &str) -> Vec<String> {
    encoded
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
