//! Per-view fetch state.
//!
//! Each view (home, search, detail, favorites) moves through
//! `Loading -> Success | Error` and goes back to `Loading` on every new
//! fetch. Fetches are tagged with a [`Ticket`]; a result that arrives after
//! a newer fetch has started is dropped instead of overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::Recipe;
use crate::repository::RecipeRepository;

/// How many cached recipes the home view shows when the remote is down.
pub const OFFLINE_FEED_SIZE: usize = 5;

pub const OFFLINE_MESSAGE: &str = "Unable to connect. Please check your internet connection.";
pub const DETAIL_NOT_FOUND_MESSAGE: &str = "Recipe not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ScreenState<T> {
    Loading,
    Success(T),
    Error(String),
}

/// Identifies one fetch on a [`Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct Screen<T> {
    state: watch::Sender<ScreenState<T>>,
    generation: AtomicU64,
}

impl<T> Default for Screen<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Screen<T> {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(ScreenState::Loading);
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScreenState<T>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> ScreenState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// Start a fetch: bump the generation and reset to `Loading`.
    pub fn begin(&self) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ScreenState::Loading);
        Ticket(generation)
    }

    /// Publish a fetch result. Returns false if a newer fetch has begun since
    /// `ticket` was issued, in which case the result is discarded.
    pub fn finish(&self, ticket: Ticket, result: Result<T, String>) -> bool {
        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.0 {
                return false;
            }
            *state = match result {
                Ok(value) => ScreenState::Success(value),
                Err(message) => ScreenState::Error(message),
            };
            true
        });
        if !published {
            debug!(ticket = ticket.0, "discarding superseded result");
        }
        published
    }

    /// Mirror a live local view until its sender goes away or another fetch
    /// takes over this screen.
    pub async fn follow(&self, mut source: watch::Receiver<T>)
    where
        T: Clone,
    {
        let ticket = self.begin();
        loop {
            let value = source.borrow_and_update().clone();
            if !self.finish(ticket, Ok(value)) {
                return;
            }
            if source.changed().await.is_err() {
                return;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeFeed {
    pub recipes: Vec<Recipe>,
    /// True when the remote was unreachable and these come from the cache.
    pub offline: bool,
}

/// Random recipe from the remote, or a handful of cached ones when offline.
pub async fn load_home(repo: &RecipeRepository, screen: &Screen<HomeFeed>) -> bool {
    let ticket = screen.begin();
    let result = match repo.random_recipe().await {
        Ok(recipe) => Ok(HomeFeed {
            recipes: vec![recipe],
            offline: false,
        }),
        Err(e) => {
            info!(error = %e, "home feed falling back to cache");
            match repo.list_all_cached() {
                Ok(cached) if !cached.is_empty() => Ok(HomeFeed {
                    recipes: cached.into_iter().take(OFFLINE_FEED_SIZE).collect(),
                    offline: true,
                }),
                Ok(_) => Err(OFFLINE_MESSAGE.to_string()),
                Err(store) => Err(format!("{store:#}")),
            }
        }
    };
    screen.finish(ticket, result)
}

pub async fn load_search(
    repo: &RecipeRepository,
    screen: &Screen<Vec<Recipe>>,
    query: &str,
) -> bool {
    let ticket = screen.begin();
    let result = repo
        .search_by_keyword(query)
        .await
        .map_err(|e| format!("{e:#}"));
    screen.finish(ticket, result)
}

pub async fn load_detail(repo: &RecipeRepository, screen: &Screen<Recipe>, id: &str) -> bool {
    let ticket = screen.begin();
    let result = match repo.get_by_id(id).await {
        Ok(Some(recipe)) => Ok(recipe),
        Ok(None) => Err(DETAIL_NOT_FOUND_MESSAGE.to_string()),
        Err(e) => Err(format!("{e:#}")),
    };
    screen.finish(ticket, result)
}

pub fn load_favorites(repo: &RecipeRepository, screen: &Screen<Vec<Recipe>>) -> bool {
    let ticket = screen.begin();
    let result = repo.list_favorites().map_err(|e| format!("{e:#}"));
    screen.finish(ticket, result)
}
