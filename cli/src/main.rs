mod commands;
mod config;
mod mealdb;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_area, cmd_areas, cmd_cached_delete, cmd_cached_list, cmd_cached_purge, cmd_cached_search,
    cmd_categories, cmd_category, cmd_favorites_add, cmd_favorites_list, cmd_favorites_remove,
    cmd_favorites_toggle, cmd_home, cmd_random, cmd_search, cmd_show, json_error,
};
use crate::config::Config;
use crate::mealdb::MealDbClient;
use larder_core::db::Database;
use larder_core::repository::RecipeRepository;

const DEFAULT_LOG_FILTER: &str = "larder=warn,larder_core=warn";

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "An offline-first recipe browser",
    long_about = "Browse recipes from TheMealDB. Everything you look at is cached locally, \
                  so search, favorites and recent recipes keep working without a connection."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recipes by name (falls back to the local cache when offline)
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a random recipe
    Random {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Home feed: a random recipe, or recently cached ones when offline
    Home {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe by ID
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommands,
    },
    /// Inspect and prune the local recipe cache
    Cached {
        #[command(subcommand)]
        action: CachedCommands,
    },
    /// List recipe categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cuisines (areas)
    Areas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes in a category
    Category {
        /// Category name (e.g. "Seafood")
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes from a cuisine
    Area {
        /// Area name (e.g. "Japanese")
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoritesCommands {
    /// List favorite recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a recipe as favorite (fetches it if not cached)
    Add {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unmark a favorite (the recipe stays cached)
    Remove {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Flip the favorite flag of a cached recipe
    Toggle {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CachedCommands {
    /// List every cached recipe, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search cached recipes by name, category or area
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe from the cache
    Delete {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every cached recipe that is not a favorite
    Purge {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the chosen subcommand asked for JSON output.
    fn json(&self) -> bool {
        match self {
            Commands::Search { json, .. }
            | Commands::Random { json }
            | Commands::Home { json }
            | Commands::Show { json, .. }
            | Commands::Categories { json }
            | Commands::Areas { json }
            | Commands::Category { json, .. }
            | Commands::Area { json, .. } => *json,
            Commands::Favorites { action } => match action {
                FavoritesCommands::List { json }
                | FavoritesCommands::Add { json, .. }
                | FavoritesCommands::Remove { json, .. }
                | FavoritesCommands::Toggle { json, .. } => *json,
            },
            Commands::Cached { action } => match action {
                CachedCommands::List { json }
                | CachedCommands::Search { json, .. }
                | CachedCommands::Delete { json, .. }
                | CachedCommands::Purge { json } => *json,
            },
        }
    }
}

/// Failure text for a top-level error: a JSON object on stdout when the
/// command ran with `--json`, plain text on stderr otherwise.
fn render_error(err: &anyhow::Error, json: bool) -> String {
    if json {
        json_error(&format!("{err:#}"))
    } else {
        format!("Error: {err:#}")
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    let json = cli.command.json();

    if let Err(e) = run(cli).await {
        let message = render_error(&e, json);
        if json {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!(
        data_dir = %config.data_dir.display(),
        db = %config.db_path.display(),
        api = %config.api_base,
        "loaded config"
    );
    let db = Database::open(&config.db_path)?;
    let client = MealDbClient::new(&config.api_base)?;
    let repo = RecipeRepository::new(db, Box::new(client));

    match cli.command {
        Commands::Search { query, json } => cmd_search(&repo, &query, json).await,
        Commands::Random { json } => cmd_random(&repo, json).await,
        Commands::Home { json } => cmd_home(&repo, json).await,
        Commands::Show { id, json } => cmd_show(&repo, &id, json).await,
        Commands::Favorites { action } => match action {
            FavoritesCommands::List { json } => cmd_favorites_list(&repo, json),
            FavoritesCommands::Add { id, json } => cmd_favorites_add(&repo, &id, json).await,
            FavoritesCommands::Remove { id, json } => cmd_favorites_remove(&repo, &id, json),
            FavoritesCommands::Toggle { id, json } => cmd_favorites_toggle(&repo, &id, json),
        },
        Commands::Cached { action } => match action {
            CachedCommands::List { json } => cmd_cached_list(&repo, json),
            CachedCommands::Search { query, json } => cmd_cached_search(&repo, &query, json),
            CachedCommands::Delete { id, json } => cmd_cached_delete(&repo, &id, json),
            CachedCommands::Purge { json } => cmd_cached_purge(&repo, json),
        },
        Commands::Categories { json } => cmd_categories(&repo, json).await,
        Commands::Areas { json } => cmd_areas(&repo, json).await,
        Commands::Category { name, json } => cmd_category(&repo, &name, json).await,
        Commands::Area { name, json } => cmd_area(&repo, &name, json).await,
    }
}
