use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use time::OffsetDateTime;

use crate::{
    constants::storage::{FAVORITES_KEY, LOCAL_QUOTA_BYTES},
    models::{
        favorites::{FavoriteRecord, NewFavorite},
        quotes::Quote,
    },
    storage::{
        events::{EventBus, FavoritesEvent},
        FavoritesProvider, StorageError,
    },
};

/// string key-value storage on top of sqlite, the bot's stand-in for a
/// browser's local storage.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    db: Pool<Sqlite>,
    events: EventBus,
}

impl LocalStorage {
    pub fn new(db: Pool<Sqlite>, events: EventBus) -> Self {
        LocalStorage { db, events }
    }

    pub async fn connect(db_url: &str, events: EventBus) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let db = SqlitePoolOptions::new()
            .max_connections(20)
            .connect_with(opts)
            .await?;

        tracing::info!("running migrations...");
        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("finished running migrations!");

        Ok(LocalStorage::new(db, events))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
                SELECT
                    value
                FROM local_storage
                WHERE key = $1;
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, key = %key, "an error occurred when reading local storage"),
        )?;

        Ok(value)
    }

    #[tracing::instrument(skip(self, value), fields(len = value.len()))]
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.len() > LOCAL_QUOTA_BYTES {
            tracing::warn!(key = %key, len = value.len(), "local storage quota exceeded");
            return Err(StorageError::QuotaExceeded {
                key: key.to_owned(),
                len: value.len(),
            });
        }

        sqlx::query(
            r#"
                INSERT INTO
                    local_storage (key, value)
                VALUES
                    ($1, $2)
                ON CONFLICT (key)
                DO UPDATE SET
                    value = excluded.value;
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, key = %key, "an error occurred when writing local storage"),
        )?;

        self.events.publish(FavoritesEvent::StorageChanged {
            key: key.to_owned(),
        });

        Ok(())
    }
}

/// favorites kept as one JSON list under [`FAVORITES_KEY`], newest first.
#[derive(Clone, Debug)]
pub struct LocalFavorites {
    storage: LocalStorage,
}

impl LocalFavorites {
    pub fn new(storage: LocalStorage) -> Self {
        LocalFavorites { storage }
    }

    /// strict read for mutations: a list we can't parse is never overwritten.
    async fn load(&self) -> Result<Vec<FavoriteRecord>, StorageError> {
        match self.storage.get(FAVORITES_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(StorageError::Corrupt),
            None => Ok(vec![]),
        }
    }

    /// lenient read: anything unreadable counts as no favorites.
    async fn load_or_empty(&self) -> Vec<FavoriteRecord> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!(err = ?e, "couldn't read local favorites, treating as empty");
            vec![]
        })
    }

    async fn store(&self, favorites: &[FavoriteRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(favorites).map_err(StorageError::Decode)?;

        self.storage.set(FAVORITES_KEY, &raw).await
    }
}

#[async_trait]
impl FavoritesProvider for LocalFavorites {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn list(&self, limit: usize) -> Result<Vec<FavoriteRecord>, StorageError> {
        let mut favorites = self.load_or_empty().await;
        favorites.truncate(limit);

        Ok(favorites)
    }

    async fn add(&self, favorite: &NewFavorite) -> Result<(), StorageError> {
        let mut favorites = self.load().await?;

        if favorites.iter().any(|record| record.matches(&favorite.quote)) {
            tracing::debug!(text = %favorite.quote.text, "quote is already a local favorite");
            return Ok(());
        }

        favorites.insert(
            0,
            favorite.clone().into_record(OffsetDateTime::now_utc()),
        );

        self.store(&favorites).await
    }

    async fn remove(&self, favorite: &FavoriteRecord) -> Result<(), StorageError> {
        let mut favorites = self.load().await?;
        let before = favorites.len();

        favorites.retain(|record| !(record.text == favorite.text && record.author == favorite.author));

        if favorites.len() == before {
            return Ok(());
        }

        self.store(&favorites).await
    }

    async fn contains(&self, quote: &Quote) -> Result<bool, StorageError> {
        Ok(self
            .load_or_empty()
            .await
            .iter()
            .any(|record| record.matches(quote)))
    }
}

#[cfg(test)]
pub(crate) async fn memory_storage(events: EventBus) -> LocalStorage {
    // one connection, otherwise every connection gets its own empty database
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&db).await.unwrap();

    LocalStorage::new(db, events)
}

#[cfg(test)]
impl LocalStorage {
    /// stores bytes that `get` can't read back as text.
    pub(crate) async fn set_blob(&self, key: &str, value: &[u8]) {
        sqlx::query("INSERT INTO local_storage (key, value) VALUES ($1, $2);")
            .bind(key)
            .bind(value)
            .execute(&self.db)
            .await
            .unwrap();
    }

    pub(crate) async fn raw_value(&self, key: &str) -> Option<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT CAST(value AS BLOB) FROM local_storage WHERE key = $1;")
            .bind(key)
            .fetch_optional(&self.db)
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frost() -> Quote {
        Quote::new("The only way out is through.", "Robert Frost")
    }

    #[tokio::test]
    async fn get_returns_what_set_stored() {
        let storage = memory_storage(EventBus::default()).await;

        assert_eq!(storage.get("deviceId").await.unwrap(), None);

        storage.set("deviceId", "first").await.unwrap();
        storage.set("deviceId", "second").await.unwrap();

        assert_eq!(storage.get("deviceId").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn set_publishes_storage_changed() {
        let events = EventBus::default();
        let storage = memory_storage(events.clone()).await;
        let mut subscription = events.subscribe();

        storage.set(FAVORITES_KEY, "[]").await.unwrap();

        assert_eq!(
            subscription.recv().await,
            Some(FavoritesEvent::StorageChanged {
                key: FAVORITES_KEY.to_owned()
            })
        );
    }

    #[tokio::test]
    async fn oversized_values_are_rejected() {
        let storage = memory_storage(EventBus::default()).await;
        storage.set(FAVORITES_KEY, "[]").await.unwrap();

        let huge = "x".repeat(LOCAL_QUOTA_BYTES + 1);
        let result = storage.set(FAVORITES_KEY, &huge).await;

        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(storage.get(FAVORITES_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn adding_twice_keeps_one_record() {
        let favorites = LocalFavorites::new(memory_storage(EventBus::default()).await);
        let favorite = NewFavorite::new(frost(), Some("Sad"));

        favorites.add(&favorite).await.unwrap();
        favorites.add(&favorite).await.unwrap();

        let listed = favorites.list(100).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].matches(&frost()));
        assert_eq!(listed[0].mood.as_deref(), Some("Sad"));
        assert!(listed[0].id.is_none());
        assert!(listed[0].created_at.is_some());
    }

    #[tokio::test]
    async fn newest_favorites_come_first_and_limit_applies() {
        let favorites = LocalFavorites::new(memory_storage(EventBus::default()).await);

        for n in 0..5 {
            favorites
                .add(&NewFavorite::new(Quote::new(format!("quote {n}"), "someone"), None))
                .await
                .unwrap();
        }

        let listed = favorites.list(3).await.unwrap();
        let texts: Vec<_> = listed.iter().map(|record| record.text.as_str()).collect();

        assert_eq!(texts, ["quote 4", "quote 3", "quote 2"]);
    }

    #[tokio::test]
    async fn remove_matches_on_text_and_author() {
        let favorites = LocalFavorites::new(memory_storage(EventBus::default()).await);
        favorites.add(&NewFavorite::new(frost(), None)).await.unwrap();

        // same text, different author
        let impostor = FavoriteRecord {
            author: "Someone Else".into(),
            ..favorites.list(100).await.unwrap()[0].clone()
        };
        favorites.remove(&impostor).await.unwrap();
        assert!(favorites.contains(&frost()).await.unwrap());

        let record = favorites.list(100).await.unwrap().remove(0);
        favorites.remove(&record).await.unwrap();
        assert!(!favorites.contains(&frost()).await.unwrap());
        assert!(favorites.list(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_a_missing_favorite_is_a_no_op() {
        let favorites = LocalFavorites::new(memory_storage(EventBus::default()).await);

        let missing = NewFavorite::new(frost(), None).into_record(OffsetDateTime::now_utc());
        favorites.remove(&missing).await.unwrap();

        // nothing was written
        assert_eq!(favorites.storage.get(FAVORITES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_list_reads_as_empty_but_is_not_overwritten() {
        let storage = memory_storage(EventBus::default()).await;
        storage.set(FAVORITES_KEY, "{not json").await.unwrap();
        let favorites = LocalFavorites::new(storage.clone());

        assert!(favorites.list(100).await.unwrap().is_empty());
        assert!(!favorites.contains(&frost()).await.unwrap());

        let result = favorites.add(&NewFavorite::new(frost(), None)).await;
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
        assert_eq!(storage.get(FAVORITES_KEY).await.unwrap().as_deref(), Some("{not json"));
    }
}
