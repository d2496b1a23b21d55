use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use larder_core::mealdb::{
    AreaEntry, CategoryEntry, MealData, MealsResponse, area_names, category_names, meal_to_recipe,
    meal_to_summary,
};
use larder_core::models::{Recipe, RecipeSummary};
use larder_core::repository::RecipeSource;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1/";

pub struct MealDbClient {
    client: reqwest::Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "larder-cli/{} (recipe browser)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.endpoint(path);
        debug!(%url, ?query, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .context("Failed to reach TheMealDB")?
            .error_for_status()
            .context("TheMealDB returned an error status")?;

        resp.json()
            .await
            .with_context(|| format!("Failed to parse TheMealDB {path} response"))
    }

    async fn recipes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Recipe>> {
        let data: MealsResponse<MealData> = self.get(path, query).await?;
        Ok(data
            .into_items()
            .into_iter()
            .filter_map(meal_to_recipe)
            .collect())
    }

    async fn summaries(&self, query: &[(&str, &str)]) -> Result<Vec<RecipeSummary>> {
        let data: MealsResponse<MealData> = self.get("filter.php", query).await?;
        Ok(data
            .into_items()
            .into_iter()
            .filter_map(meal_to_summary)
            .collect())
    }
}

#[async_trait]
impl RecipeSource for MealDbClient {
    async fn search(&self, query: &str) -> Result<Vec<Recipe>> {
        self.recipes("search.php", &[("s", query)]).await
    }

    async fn lookup(&self, id: &str) -> Result<Option<Recipe>> {
        Ok(self
            .recipes("lookup.php", &[("i", id)])
            .await?
            .into_iter()
            .next())
    }

    async fn random(&self) -> Result<Vec<Recipe>> {
        self.recipes("random.php", &[]).await
    }

    async fn filter_by_category(&self, category: &str) -> Result<Vec<RecipeSummary>> {
        self.summaries(&[("c", category)]).await
    }

    async fn filter_by_area(&self, area: &str) -> Result<Vec<RecipeSummary>> {
        self.summaries(&[("a", area)]).await
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let data: MealsResponse<CategoryEntry> = self.get("list.php", &[("c", "list")]).await?;
        Ok(category_names(data.into_items()))
    }

    async fn list_areas(&self) -> Result<Vec<String>> {
        let data: MealsResponse<AreaEntry> = self.get("list.php", &[("a", "list")]).await?;
        Ok(area_names(data.into_items()))
    }
}
