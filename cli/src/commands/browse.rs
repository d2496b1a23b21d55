use anyhow::Result;

use larder_core::models::RecipeSummary;
use larder_core::repository::RecipeRepository;

use super::helpers::{exit_empty, print_json, print_names, print_summary_table};

fn show_names(names: &[String], empty_message: &str, json: bool) -> Result<()> {
    if names.is_empty() {
        exit_empty(empty_message, json);
    }
    if json {
        print_json(names)
    } else {
        print_names(names);
        Ok(())
    }
}

fn show_summaries(summaries: &[RecipeSummary], empty_message: &str, json: bool) -> Result<()> {
    if summaries.is_empty() {
        exit_empty(empty_message, json);
    }
    if json {
        print_json(summaries)
    } else {
        print_summary_table(summaries);
        Ok(())
    }
}

pub(crate) async fn cmd_categories(repo: &RecipeRepository, json: bool) -> Result<()> {
    let names = repo.categories().await?;
    show_names(&names, "No categories available", json)
}

pub(crate) async fn cmd_areas(repo: &RecipeRepository, json: bool) -> Result<()> {
    let names = repo.areas().await?;
    show_names(&names, "No areas available", json)
}

pub(crate) async fn cmd_category(repo: &RecipeRepository, name: &str, json: bool) -> Result<()> {
    let summaries = repo.browse_category(name).await?;
    show_summaries(&summaries, &format!("No recipes in category '{name}'"), json)
}

pub(crate) async fn cmd_area(repo: &RecipeRepository, name: &str, json: bool) -> Result<()> {
    let summaries = repo.browse_area(name).await?;
    show_summaries(&summaries, &format!("No recipes from '{name}'"), json)
}
