use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ItemId, String);
id_newtype!(PosterId, i64);

impl ItemId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for PosterId {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(PosterId)
            .map_err(|_| ParseValueError::new("poster id", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Movie,
    Series,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Movie => f.write_str("Movie"),
            ItemKind::Series => f.write_str("Series"),
        }
    }
}

/// A movie or series as listed by the media server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(
        rename = "ProviderIds",
        default,
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub provider_ids: HashMap<String, String>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(id),
            title: title.into(),
            year: None,
            kind,
            thumbnail_url: None,
            date_created: None,
            provider_ids: HashMap::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn has_poster(&self) -> bool {
        self.thumbnail_url.is_some()
    }
}

fn default_poster_title() -> String {
    "Poster".to_string()
}

fn default_uploader() -> String {
    "Unknown".to_string()
}

/// One poster option scraped for an item. Only lives as long as the poster picker that shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterCandidate {
    pub id: PosterId,
    pub url: String,
    /// Inline preview as a `data:` URI. Absent when the backend could not fetch the image.
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default = "default_poster_title")]
    pub title: String,
    #[serde(default = "default_uploader")]
    pub uploader: String,
    #[serde(default)]
    pub likes: Option<u32>,
}

impl PosterCandidate {
    pub fn inline_image(&self) -> Option<&str> {
        self.base64.as_deref().filter(|payload| !payload.is_empty())
    }
}

/// Outcome of one upload attempt, as reported by the batch endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl UploadResult {
    pub fn succeeded(item_id: impl Into<String>, item_title: impl Into<String>) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            item_title: Some(item_title.into()),
            success: true,
            error: None,
            poster_url: None,
        }
    }

    pub fn failed(
        item_id: impl Into<String>,
        item_title: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            item_title,
            success: false,
            error: Some(error.into()),
            poster_url: None,
        }
    }

    pub fn label(&self) -> &str {
        self.item_title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(self.item_id.as_str())
    }
}

/// Content filter persisted in the page query as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentFilter {
    #[default]
    All,
    Movies,
    Series,
}

impl ContentFilter {
    /// Query value understood by the item listing endpoint; `None` lists everything.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            ContentFilter::All => None,
            ContentFilter::Movies => Some("movies"),
            ContentFilter::Series => Some("series"),
        }
    }
}

impl FromStr for ContentFilter {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "movie" | "movies" => Ok(Self::Movies),
            "series" | "show" | "shows" => Ok(Self::Series),
            _ => Err(ParseValueError::new("content filter", s)),
        }
    }
}

impl fmt::Display for ContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value().unwrap_or("all"))
    }
}

/// Listing order persisted in the page query as `sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Name,
    Year,
    DateAdded,
}

impl SortOrder {
    pub fn query_value(self) -> &'static str {
        match self {
            SortOrder::Name => "name",
            SortOrder::Year => "year",
            SortOrder::DateAdded => "date_added",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "name" => Ok(Self::Name),
            "year" => Ok(Self::Year),
            "date_added" | "date-added" | "added" => Ok(Self::DateAdded),
            _ => Err(ParseValueError::new("sort order", s)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

/// Which items the server-side search-and-upload pipeline should process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoBatchFilter {
    NoPoster,
    All,
    Movies,
    Series,
}

impl AutoBatchFilter {
    pub const ALL: [AutoBatchFilter; 4] = [
        AutoBatchFilter::NoPoster,
        AutoBatchFilter::All,
        AutoBatchFilter::Movies,
        AutoBatchFilter::Series,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AutoBatchFilter::NoPoster => "no-poster",
            AutoBatchFilter::All => "all",
            AutoBatchFilter::Movies => "movies",
            AutoBatchFilter::Series => "series",
        }
    }
}

impl FromStr for AutoBatchFilter {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == wanted)
            .ok_or_else(|| ParseValueError::new("batch filter", s))
    }
}

impl fmt::Display for AutoBatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub id: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "Jellyfin Server".to_string(),
            version: String::new(),
            id: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub jellyfin_status: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub server_version: Option<String>,
    #[serde(default)]
    pub selenium_active: bool,
    #[serde(default)]
    pub active_sessions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_reads_media_server_shape() {
        let item: Item = serde_json::from_value(serde_json::json!({
            "id": "a1b2",
            "title": "Heat",
            "year": 1995,
            "type": "Movie",
            "thumbnail_url": null,
            "date_created": "",
            "ProviderIds": {"Tmdb": "949"}
        }))
        .expect("item");

        assert_eq!(item.id, ItemId::new("a1b2"));
        assert_eq!(item.kind, ItemKind::Movie);
        assert_eq!(item.year, Some(1995));
        assert!(!item.has_poster());
        assert_eq!(item.provider_ids.get("Tmdb").map(String::as_str), Some("949"));
    }

    #[test]
    fn candidate_defaults_optional_metadata() {
        let poster: PosterCandidate = serde_json::from_value(serde_json::json!({
            "id": 3,
            "url": "https://posters.example/p/3",
            "base64": ""
        }))
        .expect("poster");

        assert_eq!(poster.title, "Poster");
        assert_eq!(poster.uploader, "Unknown");
        assert_eq!(poster.likes, None);
        assert_eq!(poster.inline_image(), None);
    }

    #[test]
    fn batch_filter_uses_kebab_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(AutoBatchFilter::NoPoster).expect("json"),
            serde_json::json!("no-poster")
        );
        assert_eq!("Series".parse::<AutoBatchFilter>(), Ok(AutoBatchFilter::Series));
        assert!("posterless".parse::<AutoBatchFilter>().is_err());
    }

    #[test]
    fn content_filter_accepts_singular_and_plural() {
        assert_eq!("movie".parse::<ContentFilter>(), Ok(ContentFilter::Movies));
        assert_eq!("movies".parse::<ContentFilter>(), Ok(ContentFilter::Movies));
        assert_eq!("".parse::<ContentFilter>(), Ok(ContentFilter::All));
        assert_eq!(ContentFilter::All.query_value(), None);
    }

    #[test]
    fn result_label_falls_back_to_item_id() {
        let result = UploadResult::failed("x9", None, "Download failed");
        assert_eq!(result.label(), "x9");
        assert_eq!(UploadResult::succeeded("x9", "Alien").label(), "Alien");
    }
}
