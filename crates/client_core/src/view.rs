//! View model: per-item status, the upload-all control, modals and batch progress.

use std::collections::HashMap;

use shared::domain::{Item, ItemId, ItemKind};
use tracing::{debug, warn};

use crate::render::{BatchSummary, PosterGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    None,
    Selected,
    Uploading,
    Uploaded,
    Error,
}

/// Button shown next to an item's badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    UploadNow,
    RetryUpload,
}

impl StatusAction {
    pub fn label(self) -> &'static str {
        match self {
            StatusAction::UploadNow => "Upload Now",
            StatusAction::RetryUpload => "Retry Upload",
        }
    }
}

impl ItemStatus {
    /// `Selected` is reachable from anywhere because a new selection restarts the cycle.
    /// An upload starts from `Selected` or, as a retry, from `Error`. `Uploaded` and `Error`
    /// are only reachable from `Uploading`, and `None` is never re-entered.
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        use ItemStatus::*;
        match (self, next) {
            (_, Selected) => true,
            (Selected | Error, Uploading) => true,
            (Uploading, Uploaded | Error) => true,
            _ => false,
        }
    }

    pub fn badge(self) -> Option<&'static str> {
        match self {
            ItemStatus::None => None,
            ItemStatus::Selected => Some("Selected"),
            ItemStatus::Uploading => Some("Uploading..."),
            ItemStatus::Uploaded => Some("Uploaded!"),
            ItemStatus::Error => Some("Error"),
        }
    }

    pub fn action(self) -> Option<StatusAction> {
        match self {
            ItemStatus::Selected => Some(StatusAction::UploadNow),
            ItemStatus::Error => Some(StatusAction::RetryUpload),
            _ => None,
        }
    }

    /// True while a request for this item is outstanding.
    pub fn is_busy(self) -> bool {
        self == ItemStatus::Uploading
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub item_id: ItemId,
    pub title: String,
    pub year: Option<i32>,
    pub kind: ItemKind,
    pub has_poster: bool,
    pub status: ItemStatus,
}

impl ItemView {
    pub fn from_item(item: &Item) -> Self {
        Self {
            item_id: item.id.clone(),
            title: item.title.clone(),
            year: item.year,
            kind: item.kind,
            has_poster: item.has_poster(),
            status: ItemStatus::None,
        }
    }

    /// The card keeps its highlight from selection until the poster is uploaded.
    pub fn highlighted(&self) -> bool {
        matches!(
            self.status,
            ItemStatus::Selected | ItemStatus::Uploading | ItemStatus::Error
        )
    }
}

/// Item id to view handle mapping, in listing order.
#[derive(Debug, Default, Clone)]
pub struct ViewRegistry {
    views: HashMap<ItemId, ItemView>,
    order: Vec<ItemId>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every handle; all items start out without status.
    pub fn rebuild(&mut self, items: &[Item]) {
        self.views.clear();
        self.order.clear();
        for item in items {
            self.insert(ItemView::from_item(item));
        }
    }

    pub fn register(&mut self, item: &Item) {
        if !self.views.contains_key(&item.id) {
            self.insert(ItemView::from_item(item));
        }
    }

    fn insert(&mut self, view: ItemView) {
        if !self.views.contains_key(&view.item_id) {
            self.order.push(view.item_id.clone());
        }
        self.views.insert(view.item_id.clone(), view);
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&ItemView> {
        self.views.get(item_id)
    }

    pub fn status(&self, item_id: &ItemId) -> Option<ItemStatus> {
        self.views.get(item_id).map(|view| view.status)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemView> {
        self.order.iter().filter_map(|id| self.views.get(id))
    }

    /// Applies a transition. A missing handle or an illegal transition leaves the view alone.
    pub fn set_status(&mut self, item_id: &ItemId, next: ItemStatus) -> bool {
        let Some(view) = self.views.get_mut(item_id) else {
            debug!(%item_id, status = ?next, "no view handle for item; skipping status update");
            return false;
        };
        if !view.status.can_advance_to(next) {
            warn!(%item_id, from = ?view.status, to = ?next, "ignoring illegal status transition");
            return false;
        }
        view.status = next;
        true
    }

    /// Marks an upload the backend runs on its own (automatic batch, direct upload). Such
    /// items were never selected, so the selection precondition of `set_status` is skipped.
    pub fn begin_server_upload(&mut self, item_id: &ItemId) -> bool {
        let Some(view) = self.views.get_mut(item_id) else {
            debug!(%item_id, "no view handle for item; skipping status update");
            return false;
        };
        if view.status.is_busy() {
            return false;
        }
        view.status = ItemStatus::Uploading;
        true
    }

    /// Lands an upload outcome. Views that never showed the optimistic phase pass through
    /// `Uploading` first.
    pub fn finish_upload(&mut self, item_id: &ItemId, success: bool) -> bool {
        self.begin_server_upload(item_id);
        let next = if success {
            ItemStatus::Uploaded
        } else {
            ItemStatus::Error
        };
        self.set_status(item_id, next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAllControl {
    pub enabled: bool,
    pub busy: bool,
    pub selected_count: usize,
    pub label: String,
}

impl UploadAllControl {
    pub fn for_count(count: usize) -> Self {
        let label = if count > 0 {
            format!("Upload All Selected ({count})")
        } else {
            "Upload All Selected".to_string()
        };
        Self {
            enabled: count > 0,
            busy: false,
            selected_count: count,
            label,
        }
    }

    pub fn busy(count: usize) -> Self {
        Self {
            enabled: false,
            busy: true,
            selected_count: count,
            label: "Uploading...".to_string(),
        }
    }
}

impl Default for UploadAllControl {
    fn default() -> Self {
        Self::for_count(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchProgress {
    pub visible: bool,
    pub percent: u8,
}

impl BatchProgress {
    pub fn start(&mut self) {
        self.visible = true;
        self.percent = 0;
    }

    pub fn complete(&mut self) {
        self.visible = true;
        self.percent = 100;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

#[derive(Debug, Clone)]
pub struct PosterModal {
    pub item: Item,
    pub grid: PosterGrid,
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    loading: Option<String>,
    posters: Option<PosterModal>,
    results: Option<BatchSummary>,
}

impl ModalState {
    pub fn show_loading(&mut self, text: impl Into<String>) {
        self.loading = Some(text.into());
    }

    pub fn hide_loading(&mut self) {
        self.loading = None;
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    pub fn open_posters(&mut self, item: Item, grid: PosterGrid) {
        self.posters = Some(PosterModal { item, grid });
    }

    pub fn close_posters(&mut self) -> bool {
        self.posters.take().is_some()
    }

    pub fn posters(&self) -> Option<&PosterModal> {
        self.posters.as_ref()
    }

    pub fn posters_mut(&mut self) -> Option<&mut PosterModal> {
        self.posters.as_mut()
    }

    /// The poster modal, only if it is showing `item_id`.
    pub fn posters_for_mut(&mut self, item_id: &ItemId) -> Option<&mut PosterModal> {
        self.posters
            .as_mut()
            .filter(|modal| &modal.item.id == item_id)
    }

    pub fn show_results(&mut self, summary: BatchSummary) {
        self.results = Some(summary);
    }

    pub fn close_results(&mut self) -> bool {
        self.results.take().is_some()
    }

    pub fn results(&self) -> Option<&BatchSummary> {
        self.results.as_ref()
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
