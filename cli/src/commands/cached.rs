use anyhow::Result;

use larder_core::models::Recipe;
use larder_core::repository::RecipeRepository;

use super::helpers::{exit_empty, exit_not_found, print_json, print_recipe_table};

fn print_recipes(recipes: &[Recipe], empty_message: &str, json: bool) -> Result<()> {
    if recipes.is_empty() {
        exit_empty(empty_message, json);
    }
    if json {
        print_json(recipes)
    } else {
        let refs: Vec<&Recipe> = recipes.iter().collect();
        print_recipe_table(&refs);
        Ok(())
    }
}

pub(crate) fn cmd_cached_list(repo: &RecipeRepository, json: bool) -> Result<()> {
    let recipes = repo.list_all_cached()?;
    print_recipes(&recipes, "Nothing cached yet", json)
}

pub(crate) fn cmd_cached_search(repo: &RecipeRepository, query: &str, json: bool) -> Result<()> {
    let recipes = repo.search_cached(query)?;
    print_recipes(&recipes, &format!("No cached recipes match '{query}'"), json)
}

pub(crate) fn cmd_cached_delete(repo: &RecipeRepository, id: &str, json: bool) -> Result<()> {
    if !repo.delete_cached(id)? {
        exit_not_found(&format!("Recipe '{id}' is not cached"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted {id} from the cache");
    }
    Ok(())
}

pub(crate) fn cmd_cached_purge(repo: &RecipeRepository, json: bool) -> Result<()> {
    let removed = repo.purge_non_favorites()?;
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("Removed {removed} cached recipe(s); favorites kept");
    }
    Ok(())
}
