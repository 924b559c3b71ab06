use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    constants::storage::FAVORITES_LIMIT,
    models::{
        favorites::{FavoriteRecord, NewFavorite},
        quotes::Quote,
    },
};

pub mod device;
pub mod events;
pub mod local;
pub mod remote;

use events::{EventBus, FavoritesEvent, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("request to the remote backend failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote backend answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("couldn't encode or decode favorites: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("stored favorites are corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("favorite has no remote id")]
    MissingId,
    #[error("local storage error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("local storage migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("value for {key} is {len} bytes, over the local storage quota")]
    QuotaExceeded { key: String, len: usize },
}

/// one place favorites can live.
#[async_trait]
pub trait FavoritesProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// whether this provider is worth trying at all.
    async fn is_available(&self) -> bool;

    /// newest first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<FavoriteRecord>, StorageError>;

    /// adding a quote that is already a favorite does nothing.
    async fn add(&self, favorite: &NewFavorite) -> Result<(), StorageError>;

    /// removing a favorite that doesn't exist does nothing.
    async fn remove(&self, favorite: &FavoriteRecord) -> Result<(), StorageError>;

    async fn contains(&self, quote: &Quote) -> Result<bool, StorageError>;
}

/// favorites with a remote-first, local-fallback policy.
///
/// every remote failure is logged and retried against the local provider.
/// only local write failures make it back to the caller.
#[derive(Clone)]
pub struct FavoritesStore {
    remote: Option<Arc<dyn FavoritesProvider>>,
    local: Arc<dyn FavoritesProvider>,
    events: EventBus,
}

impl FavoritesStore {
    pub fn new(
        remote: Option<Arc<dyn FavoritesProvider>>,
        local: Arc<dyn FavoritesProvider>,
        events: EventBus,
    ) -> Self {
        FavoritesStore {
            remote,
            local,
            events,
        }
    }

    async fn available_remote(&self) -> Option<&Arc<dyn FavoritesProvider>> {
        match &self.remote {
            Some(remote) if remote.is_available().await => Some(remote),
            _ => None,
        }
    }

    pub async fn backend_name(&self) -> &'static str {
        match self.available_remote().await {
            Some(remote) => remote.name(),
            None => self.local.name(),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    #[tracing::instrument(skip_all)]
    pub async fn list(&self) -> Vec<FavoriteRecord> {
        if let Some(remote) = self.available_remote().await {
            match remote.list(FAVORITES_LIMIT).await {
                Ok(favorites) => return favorites,
                Err(e) => {
                    tracing::warn!(err = ?e, backend = remote.name(), "couldn't list favorites, falling back to local")
                }
            }
        }

        self.local
            .list(FAVORITES_LIMIT)
            .await
            .inspect_err(|e| tracing::warn!(err = ?e, "couldn't list local favorites"))
            .unwrap_or_default()
    }

    #[tracing::instrument(skip_all, fields(text = %favorite.quote.text, author = %favorite.quote.author))]
    pub async fn add(&self, favorite: &NewFavorite) -> Result<(), StorageError> {
        if let Some(remote) = self.available_remote().await {
            match remote.add(favorite).await {
                Ok(()) => {
                    self.events.publish(FavoritesEvent::Updated);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(err = ?e, backend = remote.name(), "couldn't add favorite, falling back to local")
                }
            }
        }

        self.local
            .add(favorite)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when saving a local favorite"))?;
        self.events.publish(FavoritesEvent::Updated);

        Ok(())
    }

    #[tracing::instrument(skip_all, fields(id = ?favorite.id, text = %favorite.text))]
    pub async fn remove(&self, favorite: &FavoriteRecord) -> Result<(), StorageError> {
        if favorite.id.is_some() {
            if let Some(remote) = self.available_remote().await {
                match remote.remove(favorite).await {
                    Ok(()) => {
                        self.events.publish(FavoritesEvent::Updated);
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::warn!(err = ?e, backend = remote.name(), "couldn't remove favorite, falling back to local")
                    }
                }
            }
        }

        self.local
            .remove(favorite)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when removing a local favorite"))?;
        self.events.publish(FavoritesEvent::Updated);

        Ok(())
    }

    /// the stored record for a quote, if it is a favorite.
    pub async fn find(&self, quote: &Quote) -> Option<FavoriteRecord> {
        self.list()
            .await
            .into_iter()
            .find(|record| record.matches(quote))
    }

    #[tracing::instrument(skip_all, fields(text = %quote.text))]
    pub async fn contains(&self, quote: &Quote) -> bool {
        if let Some(remote) = self.available_remote().await {
            match remote.contains(quote).await {
                Ok(found) => return found,
                Err(e) => {
                    tracing::debug!(err = ?e, backend = remote.name(), "couldn't check favorite, falling back to local")
                }
            }
        }

        self.local.contains(quote).await.unwrap_or(false)
    }
}
