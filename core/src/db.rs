use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::watch;
use tracing::debug;

use crate::models::{Recipe, decode_ingredients, decode_tags, encode_ingredients, encode_tags};

const RECIPE_COLUMNS: &str = "id, name, image_url, category, area, instructions, ingredients, youtube_url, tags, is_favorite";

// Newest first; rowid breaks ties between rows written in the same millisecond.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";

/// Local recipe cache.
///
/// While anyone holds a receiver from [`Database::subscribe_favorites`] or
/// [`Database::subscribe_cached`], every mutation republishes that view.
/// Views nobody watches are not queried; the first subscriber fills them.
pub struct Database {
    conn: Connection,
    favorites: watch::Sender<Vec<Recipe>>,
    cached: watch::Sender<Vec<Recipe>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let (favorites, _) = watch::channel(Vec::new());
        let (cached, _) = watch::channel(Vec::new());
        let db = Database {
            conn,
            favorites,
            cached,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS recipes (
                    id TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL,
                    image_url TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL DEFAULT '',
                    area TEXT NOT NULL DEFAULT '',
                    instructions TEXT NOT NULL DEFAULT '',
                    ingredients TEXT NOT NULL DEFAULT '',
                    youtube_url TEXT,
                    tags TEXT NOT NULL DEFAULT '',
                    is_favorite INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_recipes_favorite ON recipes(is_favorite);
                CREATE INDEX IF NOT EXISTS idx_recipes_created ON recipes(created_at);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping ---

    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        let ingredients: String = row.get(6)?;
        let tags: String = row.get(8)?;
        Ok(Recipe {
            id: row.get(0)?,
            name: row.get(1)?,
            image_url: row.get(2)?,
            category: row.get(3)?,
            area: row.get(4)?,
            instructions: row.get(5)?,
            ingredients: decode_ingredients(&ingredients),
            youtube_url: row.get(7)?,
            tags: decode_tags(&tags),
            is_favorite: row.get(9)?,
        })
    }

    fn query_recipes(&self, filter: &str, args: impl rusqlite::Params) -> Result<Vec<Recipe>> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes {filter} {NEWEST_FIRST}");
        let mut stmt = self.conn.prepare(&sql)?;
        let recipes = stmt
            .query_map(args, Self::recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    // --- Live views ---

    fn publish(&self) -> Result<()> {
        if self.favorites.receiver_count() > 0 {
            let favorites = self.list_favorites()?;
            debug!(count = favorites.len(), "publishing favorites");
            self.favorites.send_replace(favorites);
        }
        if self.cached.receiver_count() > 0 {
            let cached = self.list_recipes()?;
            debug!(count = cached.len(), "publishing cached recipes");
            self.cached.send_replace(cached);
        }
        Ok(())
    }

    pub fn subscribe_favorites(&self) -> Result<watch::Receiver<Vec<Recipe>>> {
        if self.favorites.receiver_count() == 0 {
            self.favorites.send_replace(self.list_favorites()?);
        }
        Ok(self.favorites.subscribe())
    }

    pub fn subscribe_cached(&self) -> Result<watch::Receiver<Vec<Recipe>>> {
        if self.cached.receiver_count() == 0 {
            self.cached.send_replace(self.list_recipes()?);
        }
        Ok(self.cached.subscribe())
    }

    // --- Writes ---

    /// Write-through upsert for freshly fetched recipes.
    ///
    /// Content columns are replaced; the favorite flag and creation time of
    /// an existing row are kept. Returns the rows as stored.
    pub fn cache_recipes(&self, recipes: &[Recipe]) -> Result<Vec<Recipe>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now().timestamp_millis();
        let tx = self.conn.unchecked_transaction()?;
        for recipe in recipes {
            tx.execute(
                "INSERT INTO recipes (id, name, image_url, category, area, instructions, ingredients, youtube_url, tags, is_favorite, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    image_url = excluded.image_url,
                    category = excluded.category,
                    area = excluded.area,
                    instructions = excluded.instructions,
                    ingredients = excluded.ingredients,
                    youtube_url = excluded.youtube_url,
                    tags = excluded.tags",
                params![
                    recipe.id,
                    recipe.name,
                    recipe.image_url,
                    recipe.category,
                    recipe.area,
                    recipe.instructions,
                    encode_ingredients(&recipe.ingredients),
                    recipe.youtube_url,
                    encode_tags(&recipe.tags),
                    recipe.is_favorite,
                    now,
                ],
            )
            .with_context(|| format!("Failed to cache recipe {}", recipe.id))?;
        }
        tx.commit()?;
        self.publish()?;

        let mut stored = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            let row = self
                .get_recipe(&recipe.id)?
                .with_context(|| format!("Recipe {} vanished after caching", recipe.id))?;
            stored.push(row);
        }
        Ok(stored)
    }

    /// Insert or replace a recipe including its favorite flag.
    pub fn save_recipe(&self, recipe: &Recipe) -> Result<Recipe> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO recipes (id, name, image_url, category, area, instructions, ingredients, youtube_url, tags, is_favorite, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    image_url = excluded.image_url,
                    category = excluded.category,
                    area = excluded.area,
                    instructions = excluded.instructions,
                    ingredients = excluded.ingredients,
                    youtube_url = excluded.youtube_url,
                    tags = excluded.tags,
                    is_favorite = excluded.is_favorite",
                params![
                    recipe.id,
                    recipe.name,
                    recipe.image_url,
                    recipe.category,
                    recipe.area,
                    recipe.instructions,
                    encode_ingredients(&recipe.ingredients),
                    recipe.youtube_url,
                    encode_tags(&recipe.tags),
                    recipe.is_favorite,
                    now,
                ],
            )
            .with_context(|| format!("Failed to save recipe {}", recipe.id))?;
        self.publish()?;
        self.get_recipe(&recipe.id)?
            .with_context(|| format!("Recipe {} vanished after saving", recipe.id))
    }

    /// Returns false when no row has this id.
    pub fn set_favorite(&self, id: &str, is_favorite: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE recipes SET is_favorite = ?1 WHERE id = ?2",
            params![is_favorite, id],
        )?;
        if changed > 0 {
            self.publish()?;
        }
        Ok(changed > 0)
    }

    pub fn delete_recipe(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![id])?;
        if changed > 0 {
            self.publish()?;
        }
        Ok(changed > 0)
    }

    pub fn delete_non_favorites(&self) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM recipes WHERE is_favorite = 0", [])?;
        if changed > 0 {
            self.publish()?;
        }
        Ok(changed)
    }

    // --- Reads ---

    pub fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1");
        let recipe = self
            .conn
            .query_row(&sql, params![id], Self::recipe_from_row)
            .optional()?;
        Ok(recipe)
    }

    /// Substring match on name, category, or area, ignoring case.
    ///
    /// SQLite `LIKE` folds ASCII only, so this filters decoded rows.
    pub fn search_recipes_local(&self, query: &str) -> Result<Vec<Recipe>> {
        Ok(self
            .list_recipes()?
            .into_iter()
            .filter(|r| r.matches_keyword(query))
            .collect())
    }

    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        self.query_recipes("", [])
    }

    pub fn list_favorites(&self) -> Result<Vec<Recipe>> {
        self.query_recipes("WHERE is_favorite = 1", [])
    }

    pub fn recipes_in_category(&self, category: &str) -> Result<Vec<Recipe>> {
        self.query_recipes("WHERE category = ?1 COLLATE NOCASE", params![category])
    }

    pub fn recipes_in_area(&self, area: &str) -> Result<Vec<Recipe>> {
        self.query_recipes("WHERE area = ?1 COLLATE NOCASE", params![area])
    }

    fn distinct_column(&self, column: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {column} FROM recipes WHERE {column} <> '' ORDER BY {column} COLLATE NOCASE, {column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }

    pub fn distinct_categories(&self) -> Result<Vec<String>> {
        self.distinct_column("category")
    }

    pub fn distinct_areas(&self) -> Result<Vec<String>> {
        self.distinct_column("area")
    }
}
