use anyhow::Result;

use larder_core::models::Recipe;
use larder_core::repository::RecipeRepository;
use larder_core::screen::{Screen, ScreenState, load_search};

use super::helpers::{exit_empty, print_json, print_recipe_table};

pub(crate) async fn cmd_search(repo: &RecipeRepository, query: &str, json: bool) -> Result<()> {
    let screen = Screen::new();
    load_search(repo, &screen, query).await;

    let recipes = match screen.current() {
        ScreenState::Success(recipes) => recipes,
        ScreenState::Error(message) => anyhow::bail!("{message}"),
        ScreenState::Loading => anyhow::bail!("Search for '{query}' did not complete"),
    };

    if recipes.is_empty() {
        exit_empty(&format!("No recipes found for '{query}'"), json);
    }

    if json {
        print_json(&recipes)
    } else {
        let refs: Vec<&Recipe> = recipes.iter().collect();
        print_recipe_table(&refs);
        Ok(())
    }
}
