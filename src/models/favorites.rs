use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::quotes::Quote;

/// a saved quote, as stored in either backend.
///
/// local records never carry an `id`; remote rows always do.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl FavoriteRecord {
    pub fn matches(&self, quote: &Quote) -> bool {
        self.text == quote.text && self.author == quote.author
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFavorite {
    pub quote: Quote,
    pub mood: Option<String>,
}

impl NewFavorite {
    pub fn new(quote: Quote, mood: Option<&str>) -> Self {
        NewFavorite {
            quote,
            mood: mood.map(str::to_owned),
        }
    }

    pub fn into_record(self, created_at: OffsetDateTime) -> FavoriteRecord {
        FavoriteRecord {
            id: None,
            text: self.quote.text,
            author: self.quote.author,
            mood: self.mood,
            created_at: Some(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_records_use_the_browser_field_names() {
        let raw = r#"[{"text":"The only way out is through.","author":"Robert Frost","mood":"Sad"}]"#;
        let records: Vec<FavoriteRecord> = serde_json::from_str(raw).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, None);
        assert_eq!(records[0].mood.as_deref(), Some("Sad"));
        assert_eq!(records[0].created_at, None);
        assert!(records[0].matches(&Quote::new("The only way out is through.", "Robert Frost")));
    }

    #[test]
    fn created_at_is_written_as_rfc3339() {
        let record = NewFavorite::new(Quote::new("a", "b"), None)
            .into_record(time::macros::datetime!(2026-10-17 12:00 UTC));
        let json = serde_json::to_string(&record).unwrap();

        assert_eq!(
            json,
            r#"{"text":"a","author":"b","createdAt":"2026-10-17T12:00:00Z"}"#
        );
    }
}
