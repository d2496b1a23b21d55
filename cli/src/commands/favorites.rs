use anyhow::Result;

use larder_core::models::Recipe;
use larder_core::repository::RecipeRepository;
use larder_core::screen::{Screen, ScreenState, load_favorites};

use super::helpers::{exit_empty, exit_not_found, print_json, print_recipe_table};

pub(crate) fn cmd_favorites_list(repo: &RecipeRepository, json: bool) -> Result<()> {
    let screen = Screen::new();
    load_favorites(repo, &screen);

    let favorites = match screen.current() {
        ScreenState::Success(favorites) => favorites,
        ScreenState::Error(message) => anyhow::bail!("{message}"),
        ScreenState::Loading => anyhow::bail!("Favorites did not finish loading"),
    };

    if favorites.is_empty() {
        exit_empty("No favorites yet. Add one with: larder favorites add <id>", json);
    }

    if json {
        print_json(&favorites)
    } else {
        let refs: Vec<&Recipe> = favorites.iter().collect();
        print_recipe_table(&refs);
        Ok(())
    }
}

/// Looks the recipe up (fetching it if it is not cached yet) and stores it
/// as a favorite.
pub(crate) async fn cmd_favorites_add(repo: &RecipeRepository, id: &str, json: bool) -> Result<()> {
    let Some(recipe) = repo.get_by_id(id).await? else {
        exit_not_found(&format!("Recipe '{id}' not found"), json);
    };
    let saved = repo.add_to_favorites(&recipe)?;

    if json {
        print_json(&saved)
    } else {
        println!("Added to favorites: {} ({})", saved.name, saved.id);
        Ok(())
    }
}

pub(crate) fn cmd_favorites_remove(repo: &RecipeRepository, id: &str, json: bool) -> Result<()> {
    if !repo.remove_from_favorites(id)? {
        exit_not_found(&format!("Recipe '{id}' is not cached"), json);
    }

    if json {
        println!("{}", serde_json::json!({ "id": id, "is_favorite": false }));
    } else {
        println!("Removed {id} from favorites");
    }
    Ok(())
}

pub(crate) fn cmd_favorites_toggle(repo: &RecipeRepository, id: &str, json: bool) -> Result<()> {
    let Some(current) = repo.database().get_recipe(id)? else {
        exit_not_found(&format!("Recipe '{id}' is not cached"), json);
    };
    let is_favorite = !current.is_favorite;
    repo.toggle_favorite(id, is_favorite)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "is_favorite": is_favorite }));
    } else if is_favorite {
        println!("Marked {} as favorite", current.name);
    } else {
        println!("Unmarked {} as favorite", current.name);
    }
    Ok(())
}
