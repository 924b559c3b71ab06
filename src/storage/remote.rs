use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Request,
};
use serde::{
    de::{DeserializeOwned, IgnoredAny},
    Deserialize, Serialize,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    constants::storage::FAVORITES_TABLE,
    models::{
        favorites::{FavoriteRecord, NewFavorite},
        quotes::Quote,
    },
    storage::{device::DeviceId, FavoritesProvider, StorageError},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    /// reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`. both must be set and non-empty.
    pub fn from_env() -> Option<Self> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|value| !value.trim().is_empty());

        match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(RemoteConfig { url, anon_key }),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_string(self) -> String {
        match self {
            RowId::Text(id) => id,
            RowId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct FavoriteRow {
    id: RowId,
    text: String,
    author: String,
    mood: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl FavoriteRow {
    fn into_record(self) -> FavoriteRecord {
        FavoriteRecord {
            id: Some(self.id.into_string()),
            text: self.text,
            author: self.author,
            mood: self.mood,
            // columns without a time zone don't parse; the order already came from the server
            created_at: self
                .created_at
                .and_then(|created_at| OffsetDateTime::parse(&created_at, &Rfc3339).ok()),
        }
    }
}

#[derive(Serialize)]
struct NewFavoriteRow<'a> {
    device_id: &'a str,
    text: &'a str,
    author: &'a str,
    mood: Option<&'a str>,
}

/// favorites in a hosted PostgREST table, scoped by device.
///
/// upserts rely on a unique constraint over `(device_id, text, author)`,
/// which has to exist on the table already.
#[derive(Clone, Debug)]
pub struct RemoteFavorites {
    client: reqwest::Client,
    table_url: String,
    device_id: DeviceId,
}

impl RemoteFavorites {
    pub fn new(config: &RemoteConfig, device_id: DeviceId) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("apikey", HeaderValue::from_str(&config.anon_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.anon_key))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(RemoteFavorites {
            client,
            table_url: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                FAVORITES_TABLE
            ),
            device_id,
        })
    }

    fn device_filter(&self) -> String {
        format!("eq.{}", self.device_id)
    }

    fn list_request(&self, limit: usize) -> reqwest::Result<Request> {
        let device = self.device_filter();
        let limit = limit.to_string();

        self.client
            .get(&self.table_url)
            .query(&[
                ("select", "id,text,author,mood,created_at"),
                ("device_id", device.as_str()),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .build()
    }

    fn add_request(&self, favorite: &NewFavorite) -> reqwest::Result<Request> {
        let row = NewFavoriteRow {
            device_id: self.device_id.as_str(),
            text: &favorite.quote.text,
            author: &favorite.quote.author,
            mood: favorite.mood.as_deref(),
        };

        self.client
            .post(&self.table_url)
            .query(&[("on_conflict", "device_id,text,author")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&[row])
            .build()
    }

    fn remove_request(&self, id: &str) -> reqwest::Result<Request> {
        self.client
            .delete(&self.table_url)
            .query(&[("id", format!("eq.{id}"))])
            .build()
    }

    fn contains_request(&self, quote: &Quote) -> reqwest::Result<Request> {
        self.client
            .get(&self.table_url)
            .query(&[
                ("select", "id".to_owned()),
                ("device_id", self.device_filter()),
                ("text", format!("eq.{}", quote.text)),
                ("author", format!("eq.{}", quote.author)),
                ("limit", "1".to_owned()),
            ])
            .build()
    }

    async fn execute(&self, request: Request) -> Result<String, StorageError> {
        let method = request.method().clone();
        let resp = self.client.execute(request).await.inspect_err(
            |e| tracing::debug!(err = ?e, %method, "an error occurred when sending request to the remote backend"),
        )?;

        let status = resp.status();
        let body = resp.text().await.inspect_err(
            |e| tracing::debug!(err = ?e, "an error occurred when receiving response text"),
        )?;

        if !status.is_success() {
            return Err(StorageError::Status { status, body });
        }

        Ok(body)
    }
}

fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, StorageError> {
    serde_json::from_str(body)
        .inspect_err(
            |e| tracing::debug!(err = ?e, body = %body, "an error occurred when parsing response body"),
        )
        .map_err(StorageError::Decode)
}

#[async_trait]
impl FavoritesProvider for RemoteFavorites {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn is_available(&self) -> bool {
        // only ever built from a complete config
        true
    }

    async fn list(&self, limit: usize) -> Result<Vec<FavoriteRecord>, StorageError> {
        let body = self.execute(self.list_request(limit)?).await?;
        let rows: Vec<FavoriteRow> = parse_rows(&body)?;

        Ok(rows.into_iter().map(FavoriteRow::into_record).collect())
    }

    async fn add(&self, favorite: &NewFavorite) -> Result<(), StorageError> {
        self.execute(self.add_request(favorite)?).await?;

        Ok(())
    }

    async fn remove(&self, favorite: &FavoriteRecord) -> Result<(), StorageError> {
        let id = favorite.id.as_deref().ok_or(StorageError::MissingId)?;
        self.execute(self.remove_request(id)?).await?;

        Ok(())
    }

    async fn contains(&self, quote: &Quote) -> Result<bool, StorageError> {
        let body = self.execute(self.contains_request(quote)?).await?;
        let rows: Vec<IgnoredAny> = parse_rows(&body)?;

        Ok(!rows.is_empty())
    }
}
