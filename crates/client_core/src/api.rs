//! Client for the poster backend's JSON endpoints.
//!
//! [`PosterApi`] normalizes every answer: a transport failure, a non-2xx status, a present
//! `error` field or `success = false` all come back as a [`ClientError`], so callers only
//! ever see domain values on the happy path.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AutoBatchFilter, HealthReport, Item, ItemId, PosterCandidate, ServerInfo, UploadResult},
    error::ErrorBody,
    protocol::{
        AckResponse, AutoBatchRequest, AutoBatchResponse, DirectUploadRequest, ItemListResponse,
        ItemPostersResponse, SelectPosterRequest, UploadAllResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ClientError, ClientResult},
    session::BrowseQuery,
};

#[derive(Debug, Clone)]
pub struct ItemListing {
    pub items: Vec<Item>,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone)]
pub struct PosterLookup {
    pub item: Item,
    pub posters: Vec<PosterCandidate>,
}

#[derive(Debug, Clone, Default)]
pub struct AutoBatchReport {
    pub message: Option<String>,
    pub results: Vec<UploadResult>,
    pub total_items: usize,
}

#[async_trait]
pub trait PosterApi: Send + Sync {
    /// Reloads the backend session for `query` (discarding its selections) and lists its items.
    async fn list_items(&self, query: &BrowseQuery) -> ClientResult<ItemListing>;
    async fn item_posters(&self, item_id: &ItemId) -> ClientResult<PosterLookup>;
    async fn select_poster(&self, item_id: &ItemId, poster_url: &str) -> ClientResult<()>;
    async fn upload(&self, item_id: &ItemId) -> ClientResult<()>;
    async fn upload_all(&self) -> ClientResult<Vec<UploadResult>>;
    async fn batch_auto_poster(&self, filter: AutoBatchFilter) -> ClientResult<AutoBatchReport>;
    async fn upload_direct(&self, item_id: &ItemId, poster_url: &str) -> ClientResult<Option<String>>;
    async fn health(&self) -> ClientResult<HealthReport>;
}

pub struct HttpPosterApi {
    http: Client,
    base: Url,
}

impl HttpPosterApi {
    pub fn new(server_url: &str) -> ClientResult<Self> {
        Self::with_client(server_url, Client::builder().cookie_store(true).build()?)
    }

    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::with_client(&settings.server_url, builder.build()?)
    }

    /// The backend keys every workflow endpoint on its session cookie, so `http` needs a
    /// cookie store.
    pub fn with_client(server_url: &str, http: Client) -> ClientResult<Self> {
        let base = Url::parse(server_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(ClientError::precondition(format!(
                "server url cannot be used as a base: {server_url}"
            )));
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint<I, S>(&self, segments: I) -> ClientResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::precondition("server url cannot be used as a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Loads the browse page, which opens the backend session (cookie) and stores the listing
    /// that the poster, select and upload endpoints look items up in. It also resets that
    /// session's selections.
    async fn open_session(&self, query: &BrowseQuery) -> ClientResult<()> {
        let mut url = self.endpoint([""])?;
        append_browse_query(&mut url, query);
        debug!(%url, "opening backend session");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::with_status(
                status.as_u16(),
                format!("failed to open backend session: status {status}"),
            ));
        }
        Ok(())
    }
}

fn append_browse_query(url: &mut Url, query: &BrowseQuery) {
    let mut pairs = url.query_pairs_mut();
    if let Some(kind) = query.filter.query_value() {
        pairs.append_pair("type", kind);
    }
    pairs.append_pair("sort", query.sort.query_value());
}

/// Non-2xx answers carry an `{error}` body; its message wins over the endpoint's own shape.
async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(&body) {
            return Err(ClientError::with_status(status.as_u16(), error));
        }
    }
    decode(status, &body)
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    serde_json::from_slice::<T>(body).map_err(|err| {
        if status.is_success() {
            ClientError::Decode(err)
        } else {
            ClientError::with_status(
                status.as_u16(),
                format!("server responded with status {status}"),
            )
        }
    })
}

fn check_ack(response: AckResponse, fallback: &str) -> ClientResult<AckResponse> {
    match response.error {
        Some(error) => Err(ClientError::application(error)),
        None if !response.success => Err(ClientError::application(fallback)),
        None => Ok(response),
    }
}

#[async_trait]
impl PosterApi for HttpPosterApi {
    async fn list_items(&self, query: &BrowseQuery) -> ClientResult<ItemListing> {
        self.open_session(query).await?;

        let mut url = self.endpoint(["jellyfin-items"])?;
        append_browse_query(&mut url, query);
        debug!(%url, "listing items");

        let body: ItemListResponse = read_json(self.http.get(url).send().await?).await?;
        if let Some(error) = body.error {
            return Err(ClientError::application(error));
        }
        Ok(ItemListing {
            items: body.items,
            server_info: body.server_info.unwrap_or_default(),
        })
    }

    async fn item_posters(&self, item_id: &ItemId) -> ClientResult<PosterLookup> {
        let url = self.endpoint(["item", item_id.as_str(), "posters"])?;
        let body: ItemPostersResponse = read_json(self.http.get(url).send().await?).await?;
        if let Some(error) = body.error {
            return Err(ClientError::application(error));
        }
        let item = body
            .item
            .ok_or_else(|| ClientError::application("response did not include the item"))?;
        Ok(PosterLookup {
            item,
            posters: body.posters,
        })
    }

    async fn select_poster(&self, item_id: &ItemId, poster_url: &str) -> ClientResult<()> {
        let url = self.endpoint(["item", item_id.as_str(), "select"])?;
        let response = self
            .http
            .post(url)
            .json(&SelectPosterRequest {
                poster_url: poster_url.to_string(),
            })
            .send()
            .await?;
        check_ack(read_json(response).await?, "Failed to select poster")?;
        Ok(())
    }

    async fn upload(&self, item_id: &ItemId) -> ClientResult<()> {
        let url = self.endpoint(["upload", item_id.as_str()])?;
        let response = self.http.post(url).send().await?;
        check_ack(read_json(response).await?, "Upload failed")?;
        Ok(())
    }

    async fn upload_all(&self) -> ClientResult<Vec<UploadResult>> {
        let url = self.endpoint(["upload-all"])?;
        let body: UploadAllResponse = read_json(self.http.post(url).send().await?).await?;
        match (body.results, body.error) {
            (Some(results), _) => Ok(results),
            (None, Some(error)) => Err(ClientError::application(error)),
            (None, None) => Err(ClientError::application("Batch upload failed")),
        }
    }

    async fn batch_auto_poster(&self, filter: AutoBatchFilter) -> ClientResult<AutoBatchReport> {
        let url = self.endpoint(["batch-auto-poster"])?;
        let response = self
            .http
            .post(url)
            .json(&AutoBatchRequest { filter })
            .send()
            .await?;
        let body: AutoBatchResponse = read_json(response).await?;
        if !body.success {
            return Err(ClientError::application(
                body.error
                    .unwrap_or_else(|| "Automatic batch failed".to_string()),
            ));
        }
        let total_items = body.total_items.unwrap_or(body.results.len());
        Ok(AutoBatchReport {
            message: body.message,
            results: body.results,
            total_items,
        })
    }

    async fn upload_direct(&self, item_id: &ItemId, poster_url: &str) -> ClientResult<Option<String>> {
        let url = self.endpoint(["upload-poster"])?;
        let response = self
            .http
            .post(url)
            .json(&DirectUploadRequest {
                item_id: item_id.clone(),
                poster_url: poster_url.to_string(),
            })
            .send()
            .await?;
        let ack = check_ack(read_json(response).await?, "Upload failed")?;
        Ok(ack.message)
    }

    async fn health(&self) -> ClientResult<HealthReport> {
        let url = self.endpoint(["health"])?;
        let response = self.http.get(url).send().await?;
        // An unhealthy backend answers 500 with a full report.
        let status = response.status();
        decode(status, &response.bytes().await?)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
