use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::models::{Recipe, RecipeSummary};

pub(crate) fn print_recipe_table(recipes: &[&Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Area")]
        area: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Fav")]
        favorite: &'static str,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .enumerate()
        .map(|(i, r)| RecipeRow {
            idx: i + 1,
            id: r.id.clone(),
            name: truncate(&r.name, 35),
            category: truncate(&r.category, 15),
            area: truncate(&r.area, 15),
            ingredients: r.ingredients.len(),
            favorite: if r.is_favorite { "*" } else { "" },
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_summary_table(summaries: &[RecipeSummary]) {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    let rows: Vec<SummaryRow> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| SummaryRow {
            idx: i + 1,
            id: s.id.clone(),
            name: truncate(&s.name, 50),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_detail(recipe: &Recipe) {
    let star = if recipe.is_favorite { " *" } else { "" };
    println!("{} [{}]{star}", recipe.name, recipe.id);

    let origin: Vec<&str> = [recipe.category.as_str(), recipe.area.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !origin.is_empty() {
        println!("{}", origin.join(" / "));
    }
    if !recipe.tags.is_empty() {
        println!("Tags: {}", recipe.tags.join(", "));
    }
    if !recipe.image_url.is_empty() {
        println!("Image: {}", recipe.image_url);
    }
    if let Some(video) = &recipe.youtube_url {
        println!("Video: {video}");
    }

    if !recipe.ingredients.is_empty() {
        #[derive(Tabled)]
        struct IngredientRow {
            #[tabled(rename = "Ingredient")]
            name: String,
            #[tabled(rename = "Measure")]
            measure: String,
        }

        let rows: Vec<IngredientRow> = recipe
            .ingredients
            .iter()
            .map(|i| IngredientRow {
                name: i.name.clone(),
                measure: i.measure.clone(),
            })
            .collect();
        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!();
        println!("{table}");
    }

    if !recipe.instructions.trim().is_empty() {
        println!();
        println!("{}", recipe.instructions.trim());
    }
}

pub(crate) fn print_names(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// Report a miss and exit with status 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    std::process::exit(2);
}

/// Report an empty listing and exit with status 2.
pub(crate) fn exit_empty(message: &str, json: bool) -> ! {
    if json {
        println!("[]");
    } else {
        eprintln!("{message}");
    }
    std::process::exit(2);
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
