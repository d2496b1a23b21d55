use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::RepositoryError;
use crate::models::{Recipe, RecipeSummary};

/// Read-only client for the remote recipe database.
///
/// An empty result is a successful empty list. Any `Err` means the remote
/// is unavailable: transport failure, timeout, non-2xx status, or a payload
/// that could not be parsed.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Recipe>>;
    async fn lookup(&self, id: &str) -> Result<Option<Recipe>>;
    async fn random(&self) -> Result<Vec<Recipe>>;
    async fn filter_by_category(&self, category: &str) -> Result<Vec<RecipeSummary>>;
    async fn filter_by_area(&self, area: &str) -> Result<Vec<RecipeSummary>>;
    async fn list_categories(&self) -> Result<Vec<String>>;
    async fn list_areas(&self) -> Result<Vec<String>>;
}

/// Offline-first access to recipes and favorites.
///
/// The local store is authoritative for anything already seen. Remote
/// results are written through before they are returned, so a later offline
/// session sees the same data. Favorites never leave the local store.
pub struct RecipeRepository {
    db: Database,
    source: Box<dyn RecipeSource>,
}

impl RecipeRepository {
    pub fn new(db: Database, source: Box<dyn RecipeSource>) -> Self {
        Self { db, source }
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Remote-first with fallback ---

    /// Search the remote and cache the results; on remote failure return the
    /// best local match instead.
    pub async fn search_by_keyword(&self, query: &str) -> Result<Vec<Recipe>> {
        match self.source.search(query).await {
            Ok(recipes) => {
                debug!(query, count = recipes.len(), "remote search succeeded");
                self.db.cache_recipes(&recipes)
            }
            Err(e) => {
                info!(query, error = %format!("{e:#}"), "remote search failed, using local cache");
                self.db.search_recipes_local(query)
            }
        }
    }

    pub async fn random_recipe(&self) -> Result<Recipe, RepositoryError> {
        let recipes = self.source.random().await.map_err(|e| {
            debug!(error = %format!("{e:#}"), "random recipe fetch failed");
            RepositoryError::server(&e)
        })?;
        let stored = self.db.cache_recipes(&recipes)?;
        stored.into_iter().next().ok_or(RepositoryError::NotFound)
    }

    /// Local copy first; the remote is only asked on a local miss.
    ///
    /// Returns `None` when neither side has the recipe or the remote is
    /// unreachable.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Recipe>> {
        if let Some(cached) = self.db.get_recipe(id)? {
            debug!(id, "recipe served from local cache");
            return Ok(Some(cached));
        }

        match self.source.lookup(id).await {
            Ok(Some(recipe)) => {
                let stored = self.db.cache_recipes(std::slice::from_ref(&recipe))?;
                Ok(stored.into_iter().next())
            }
            Ok(None) => Ok(None),
            Err(e) => {
                info!(id, error = %format!("{e:#}"), "remote lookup failed");
                Ok(None)
            }
        }
    }

    /// Filter results are partial records, so they are returned as summaries
    /// and never written over complete cached recipes.
    pub async fn browse_category(&self, category: &str) -> Result<Vec<RecipeSummary>> {
        match self.source.filter_by_category(category).await {
            Ok(summaries) => Ok(summaries),
            Err(e) => {
                info!(category, error = %format!("{e:#}"), "remote category filter failed, using local cache");
                Ok(summarize(&self.db.recipes_in_category(category)?))
            }
        }
    }

    pub async fn browse_area(&self, area: &str) -> Result<Vec<RecipeSummary>> {
        match self.source.filter_by_area(area).await {
            Ok(summaries) => Ok(summaries),
            Err(e) => {
                info!(area, error = %format!("{e:#}"), "remote area filter failed, using local cache");
                Ok(summarize(&self.db.recipes_in_area(area)?))
            }
        }
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        match self.source.list_categories().await {
            Ok(names) => Ok(names),
            Err(e) => {
                info!(error = %format!("{e:#}"), "remote category list failed, using local cache");
                self.db.distinct_categories()
            }
        }
    }

    pub async fn areas(&self) -> Result<Vec<String>> {
        match self.source.list_areas().await {
            Ok(names) => Ok(names),
            Err(e) => {
                info!(error = %format!("{e:#}"), "remote area list failed, using local cache");
                self.db.distinct_areas()
            }
        }
    }

    // --- Favorites (local only) ---

    pub fn list_favorites(&self) -> Result<Vec<Recipe>> {
        self.db.list_favorites()
    }

    pub fn subscribe_favorites(&self) -> Result<watch::Receiver<Vec<Recipe>>> {
        self.db.subscribe_favorites()
    }

    /// Returns false (and changes nothing) when the id is not cached.
    pub fn toggle_favorite(&self, id: &str, is_favorite: bool) -> Result<bool> {
        self.db.set_favorite(id, is_favorite)
    }

    pub fn add_to_favorites(&self, recipe: &Recipe) -> Result<Recipe> {
        let favorite = Recipe {
            is_favorite: true,
            ..recipe.clone()
        };
        self.db.save_recipe(&favorite)
    }

    /// Clears the flag only; the cached row stays.
    pub fn remove_from_favorites(&self, id: &str) -> Result<bool> {
        self.db.set_favorite(id, false)
    }

    // --- Cache ---

    pub fn list_all_cached(&self) -> Result<Vec<Recipe>> {
        self.db.list_recipes()
    }

    pub fn subscribe_cached(&self) -> Result<watch::Receiver<Vec<Recipe>>> {
        self.db.subscribe_cached()
    }

    pub fn search_cached(&self, query: &str) -> Result<Vec<Recipe>> {
        self.db.search_recipes_local(query)
    }

    pub fn delete_cached(&self, id: &str) -> Result<bool> {
        self.db.delete_recipe(id)
    }

    pub fn purge_non_favorites(&self) -> Result<usize> {
        self.db.delete_non_favorites()
    }
}

fn summarize(recipes: &[Recipe]) -> Vec<RecipeSummary> {
    recipes.iter().map(RecipeSummary::from).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;

    use super::*;
    use crate::models::{Ingredient, decode_tags};

    /// In-memory stand-in for the remote, counting every call.
    #[derive(Default)]
    pub(crate) struct MockSource {
        pub recipes: Vec<Recipe>,
        pub categories: Vec<String>,
        pub offline: bool,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockSource {
        pub(crate) fn with(recipes: Vec<Recipe>) -> Self {
            Self {
                recipes,
                ..Self::default()
            }
        }

        pub(crate) fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        fn hit(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                bail!("connection refused");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RecipeSource for MockSource {
        async fn search(&self, query: &str) -> Result<Vec<Recipe>> {
            self.hit()?;
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.name.to_lowercase().contains(&query.to_lowercase()))
                .cloned()
                .collect())
        }

        async fn lookup(&self, id: &str) -> Result<Option<Recipe>> {
            self.hit()?;
            Ok(self.recipes.iter().find(|r| r.id == id).cloned())
        }

        async fn random(&self) -> Result<Vec<Recipe>> {
            self.hit()?;
            Ok(self.recipes.iter().take(1).cloned().collect())
        }

        async fn filter_by_category(&self, category: &str) -> Result<Vec<RecipeSummary>> {
            self.hit()?;
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.category == category)
                .map(RecipeSummary::from)
                .collect())
        }

        async fn filter_by_area(&self, area: &str) -> Result<Vec<RecipeSummary>> {
            self.hit()?;
            Ok(self
                .recipes
                .iter()
                .filter(|r| r.area == area)
                .map(RecipeSummary::from)
                .collect())
        }

        async fn list_categories(&self) -> Result<Vec<String>> {
            self.hit()?;
            Ok(self.categories.clone())
        }

        async fn list_areas(&self) -> Result<Vec<String>> {
            self.hit()?;
            Ok(vec!["British".to_string(), "Indian".to_string()])
        }
    }

    pub(crate) fn sample_recipe(id: &str, name: &str, tags: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: name.to_string(),
            image_url: format!("https://example.test/{id}.jpg"),
            category: "Chicken".to_string(),
            area: "British".to_string(),
            instructions: "Simmer for an hour.".to_string(),
            ingredients: vec![
                Ingredient::new("Chicken", "1 whole"),
                Ingredient::new("Carrot", "2"),
            ],
            youtube_url: None,
            tags: decode_tags(tags),
            is_favorite: false,
        }
    }

    fn repo(source: MockSource) -> RecipeRepository {
        RecipeRepository::new(Database::open_in_memory().unwrap(), Box::new(source))
    }

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_writes_through_and_favorites_follow() {
        let source = MockSource::with(vec![
            sample_recipe("52940", "Chicken Soup", "Soup,Easy"),
            sample_recipe("52941", "Chick Pea Stew", ""),
        ]);
        let repo = repo(source);

        let results = repo.search_by_keyword("chick").await.unwrap();
        assert_eq!(results.len(), 2);

        let cached = repo.list_all_cached().unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cached.iter().all(|r| !r.is_favorite));
        let soup = cached.iter().find(|r| r.id == "52940").unwrap();
        assert_eq!(soup.tags, vec!["Soup", "Easy"]);
        let stew = cached.iter().find(|r| r.id == "52941").unwrap();
        assert!(stew.tags.is_empty());

        assert!(repo.toggle_favorite("52940", true).unwrap());
        assert_eq!(names(&repo.list_favorites().unwrap()), vec!["Chicken Soup"]);
    }

    #[tokio::test]
    async fn test_remote_results_match_stored_rows() {
        let repo = repo(MockSource::with(vec![
            sample_recipe("1", "Chicken Soup", "Soup"),
            sample_recipe("2", "Chicken Pie", "Pie"),
        ]));

        for recipe in repo.search_by_keyword("chicken").await.unwrap() {
            let stored = repo.database().get_recipe(&recipe.id).unwrap().unwrap();
            assert_eq!(stored, recipe);
        }

        let random = repo.random_recipe().await.unwrap();
        assert_eq!(repo.database().get_recipe(&random.id).unwrap().unwrap(), random);
    }

    #[tokio::test]
    async fn test_search_falls_back_to_local_match() {
        let db = Database::open_in_memory().unwrap();
        let mut beef = sample_recipe("3", "Beef Wellington", "");
        beef.category = "Beef".to_string();
        beef.area = "British".to_string();
        let mut curry = sample_recipe("4", "Lamb Curry", "");
        curry.category = "Lamb".to_string();
        curry.area = "Indian".to_string();
        db.cache_recipes(&[sample_recipe("1", "Chicken Soup", ""), beef, curry])
            .unwrap();

        let repo = RecipeRepository::new(db, Box::new(MockSource::offline()));

        let by_name = repo.search_by_keyword("SOUP").await.unwrap();
        assert_eq!(names(&by_name), vec!["Chicken Soup"]);

        let by_area = repo.search_by_keyword("indian").await.unwrap();
        assert_eq!(names(&by_area), vec!["Lamb Curry"]);

        // "Chicken" category and "British" area both hit
        let mut british = names(&repo.search_by_keyword("brit").await.unwrap())
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        british.sort();
        assert_eq!(british, vec!["Beef Wellington", "Chicken Soup"]);

        assert!(repo.search_by_keyword("sushi").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_fallback_ignores_accented_case() {
        let db = Database::open_in_memory().unwrap();
        let mut creme = sample_recipe("7", "Crème Brûlée", "");
        creme.category = "Dessert".to_string();
        creme.area = "French".to_string();
        db.cache_recipes(&[creme, sample_recipe("8", "Chicken Soup", "")])
            .unwrap();
        let repo = RecipeRepository::new(db, Box::new(MockSource::offline()));

        let hits = repo.search_by_keyword("CRÈME").await.unwrap();
        assert_eq!(names(&hits), vec!["Crème Brûlée"]);
        assert_eq!(names(&repo.search_cached("BRÛLÉE").unwrap()), vec!["Crème Brûlée"]);
    }

    #[tokio::test]
    async fn test_search_empty_remote_is_not_a_failure() {
        let db = Database::open_in_memory().unwrap();
        db.cache_recipes(&[sample_recipe("1", "Chicken Soup", "")]).unwrap();
        let repo = RecipeRepository::new(db, Box::new(MockSource::default()));

        // Remote answered with nothing, so the cached match is not used
        assert!(repo.search_by_keyword("chicken").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_existing_favorite_flag() {
        let repo = repo(MockSource::with(vec![sample_recipe("1", "Chicken Soup", "")]));
        repo.search_by_keyword("chicken").await.unwrap();
        repo.toggle_favorite("1", true).unwrap();

        let again = repo.search_by_keyword("chicken").await.unwrap();
        assert!(again[0].is_favorite);
        assert_eq!(repo.list_favorites().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_random_not_found_vs_server_error() {
        let empty = repo(MockSource::default());
        assert!(matches!(
            empty.random_recipe().await,
            Err(RepositoryError::NotFound)
        ));

        let offline = repo(MockSource::offline());
        match offline.random_recipe().await {
            Err(RepositoryError::Server(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_prefers_local() {
        let db = Database::open_in_memory().unwrap();
        let local = sample_recipe("1", "Local Soup", "");
        db.cache_recipes(std::slice::from_ref(&local)).unwrap();

        let source = MockSource::with(vec![sample_recipe("1", "Remote Soup", "")]);
        let calls = Arc::clone(&source.calls);
        let repo = RecipeRepository::new(db, Box::new(source));

        let found = repo.get_by_id("1").await.unwrap().unwrap();
        assert_eq!(found, local);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_by_id_remote_miss_then_cached() {
        let source = MockSource::with(vec![sample_recipe("7", "Remote Pie", "Pie")]);
        let calls = Arc::clone(&source.calls);
        let repo = repo(source);

        let found = repo.get_by_id("7").await.unwrap().unwrap();
        assert_eq!(found.name, "Remote Pie");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second lookup is served locally
        repo.get_by_id("7").await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(repo.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_offline_is_none() {
        let repo = repo(MockSource::offline());
        assert!(repo.get_by_id("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_favorites_add_toggle_remove() {
        let repo = repo(MockSource::default());
        let recipe = sample_recipe("1", "Chicken Soup", "");

        let saved = repo.add_to_favorites(&recipe).unwrap();
        assert!(saved.is_favorite);
        assert_eq!(names(&repo.list_favorites().unwrap()), vec!["Chicken Soup"]);

        assert!(repo.toggle_favorite("1", false).unwrap());
        assert!(repo.list_favorites().unwrap().is_empty());

        assert!(repo.toggle_favorite("1", true).unwrap());
        assert!(repo.remove_from_favorites("1").unwrap());
        assert!(repo.list_favorites().unwrap().is_empty());
        // Row survives un-favoriting
        assert_eq!(repo.list_all_cached().unwrap().len(), 1);

        assert!(!repo.toggle_favorite("missing", true).unwrap());
    }

    #[tokio::test]
    async fn test_favorites_subscription_is_live() {
        let repo = repo(MockSource::with(vec![sample_recipe("1", "Chicken Soup", "")]));
        let mut favorites = repo.subscribe_favorites().unwrap();
        assert!(favorites.borrow_and_update().is_empty());

        repo.search_by_keyword("soup").await.unwrap();
        repo.toggle_favorite("1", true).unwrap();
        assert!(favorites.has_changed().unwrap());
        assert_eq!(names(&favorites.borrow_and_update()), vec!["Chicken Soup"]);

        repo.remove_from_favorites("1").unwrap();
        assert!(favorites.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_purge_keeps_favorites() {
        let repo = repo(MockSource::with(vec![
            sample_recipe("1", "Chicken Soup", ""),
            sample_recipe("2", "Chicken Pie", ""),
        ]));
        repo.search_by_keyword("chicken").await.unwrap();
        repo.toggle_favorite("2", true).unwrap();

        assert_eq!(repo.purge_non_favorites().unwrap(), 1);
        assert_eq!(names(&repo.list_all_cached().unwrap()), vec!["Chicken Pie"]);
        assert!(repo.delete_cached("2").unwrap());
        assert!(repo.list_all_cached().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_browse_remote_and_fallback() {
        let mut pie = sample_recipe("2", "Beef Pie", "");
        pie.category = "Beef".to_string();
        let online = repo(MockSource::with(vec![sample_recipe("1", "Chicken Soup", ""), pie]));
        let beef = online.browse_category("Beef").await.unwrap();
        assert_eq!(beef.len(), 1);
        assert_eq!(beef[0].name, "Beef Pie");
        // Summaries are not written to the store
        assert!(online.list_all_cached().unwrap().is_empty());

        let db = Database::open_in_memory().unwrap();
        db.cache_recipes(&[sample_recipe("1", "Chicken Soup", "")]).unwrap();
        let offline = RecipeRepository::new(db, Box::new(MockSource::offline()));
        assert_eq!(offline.browse_category("chicken").await.unwrap().len(), 1);
        assert_eq!(offline.browse_area("BRITISH").await.unwrap().len(), 1);
        assert!(offline.browse_area("Thai").await.unwrap().is_empty());
        assert_eq!(offline.categories().await.unwrap(), vec!["Chicken"]);
        assert_eq!(offline.areas().await.unwrap(), vec!["British"]);
    }

    #[tokio::test]
    async fn test_category_list_from_remote() {
        let source = MockSource {
            categories: vec!["Beef".to_string(), "Dessert".to_string()],
            ..MockSource::default()
        };
        let repo = repo(source);
        assert_eq!(repo.categories().await.unwrap(), vec!["Beef", "Dessert"]);
        assert_eq!(repo.areas().await.unwrap(), vec!["British", "Indian"]);
    }
}
