use thiserror::Error;

/// Errors the repository raises where no fallback makes sense.
///
/// Remote failures on browsing paths never show up here; those fall back to
/// the local cache instead.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The remote answered successfully but returned no recipe.
    #[error("No recipe found")]
    NotFound,

    /// Transport failure, timeout, non-2xx status, or an unreadable payload.
    #[error("Could not retrieve recipe from server: {0}")]
    Server(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl RepositoryError {
    /// Wrap a remote failure, keeping the full context chain as text.
    #[must_use]
    pub fn server(err: &anyhow::Error) -> Self {
        Self::Server(format!("{err:#}"))
    }

    /// Short message suitable for showing next to a retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "No recipe found".to_string(),
            Self::Server(_) => "Could not retrieve recipe from server".to_string(),
            Self::Store(e) => format!("Local storage error: {e}"),
        }
    }
}
