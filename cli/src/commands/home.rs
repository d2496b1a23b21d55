use anyhow::{Result, bail};

use larder_core::models::Recipe;
use larder_core::repository::RecipeRepository;
use larder_core::screen::{
    DETAIL_NOT_FOUND_MESSAGE, HomeFeed, Screen, ScreenState, load_detail, load_home,
};

use super::helpers::{exit_not_found, print_json, print_recipe_detail, print_recipe_table};

pub(crate) async fn cmd_home(repo: &RecipeRepository, json: bool) -> Result<()> {
    let screen: Screen<HomeFeed> = Screen::new();
    load_home(repo, &screen).await;

    match screen.current() {
        ScreenState::Success(feed) => {
            if json {
                return print_json(&feed);
            }
            if feed.offline {
                eprintln!("Offline: showing recently cached recipes");
                let refs: Vec<&Recipe> = feed.recipes.iter().collect();
                print_recipe_table(&refs);
            } else {
                for recipe in &feed.recipes {
                    print_recipe_detail(recipe);
                }
            }
            Ok(())
        }
        ScreenState::Error(message) => bail!("{message} Run `larder home` to retry."),
        ScreenState::Loading => bail!("Home feed did not finish loading"),
    }
}

pub(crate) async fn cmd_random(repo: &RecipeRepository, json: bool) -> Result<()> {
    match repo.random_recipe().await {
        Ok(recipe) => {
            if json {
                print_json(&recipe)
            } else {
                print_recipe_detail(&recipe);
                Ok(())
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "random recipe failed");
            bail!("{}. Run `larder random` to retry.", e.user_message())
        }
    }
}

pub(crate) async fn cmd_show(repo: &RecipeRepository, id: &str, json: bool) -> Result<()> {
    let screen: Screen<Recipe> = Screen::new();
    load_detail(repo, &screen, id).await;

    match screen.current() {
        ScreenState::Success(recipe) => {
            if json {
                print_json(&recipe)
            } else {
                print_recipe_detail(&recipe);
                Ok(())
            }
        }
        ScreenState::Error(message) if message == DETAIL_NOT_FOUND_MESSAGE => {
            exit_not_found(&format!("Recipe '{id}' not found"), json)
        }
        ScreenState::Error(message) => bail!("{message}"),
        ScreenState::Loading => bail!("Recipe '{id}' did not finish loading"),
    }
}
