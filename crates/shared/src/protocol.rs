//! Request and response bodies of the poster backend's JSON endpoints.
//!
//! Every field the backend may leave out is defaulted so that an error-only body such as
//! `{"error": "Session not found"}` still decodes into the endpoint's response type.

use serde::{Deserialize, Serialize};

use crate::domain::{AutoBatchFilter, Item, ItemId, PosterCandidate, ServerInfo, UploadResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemListResponse {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPostersResponse {
    #[serde(default)]
    pub item: Option<Item>,
    #[serde(default)]
    pub posters: Vec<PosterCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPosterRequest {
    pub poster_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectUploadRequest {
    pub item_id: ItemId,
    pub poster_url: String,
}

/// `{success, message?, error?}` answer shared by select, upload and direct upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadAllResponse {
    #[serde(default)]
    pub results: Option<Vec<UploadResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoBatchRequest {
    pub filter: AutoBatchFilter,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoBatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<UploadResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub total_items: Option<usize>,
    #[serde(default)]
    pub processed: Option<usize>,
    #[serde(default)]
    pub successful: Option<usize>,
    #[serde(default)]
    pub failed: Option<usize>,
}
