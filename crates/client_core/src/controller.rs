//! Workflow controller: the request/response cycles of the poster workflow and how each
//! outcome lands in the session's view model.
//!
//! Operations never return errors. Every failure is logged, turned into a notification and
//! leaves the session usable; the return value only says what happened.

use std::sync::Arc;

use async_trait::async_trait;
use shared::domain::{AutoBatchFilter, HealthReport, ItemId, PosterId, UploadResult};
use tracing::{debug, error, info, warn, Instrument};

use crate::{
    api::PosterApi,
    error::{ClientError, ErrorKind},
    render,
    session::{BrowseQuery, SessionContext},
    view::ItemStatus,
};

pub const LOADING_POSTERS_TEXT: &str = "Searching and converting posters...";
pub const LOADING_ITEMS_TEXT: &str = "Loading library...";
pub const LOADING_AUTO_BATCH_TEXT: &str = "Searching and uploading posters automatically...";

/// Asks the user to confirm an action before it is sent.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; for unattended runs.
pub struct AlwaysConfirm;

#[async_trait]
impl Confirm for AlwaysConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Nothing was pending; no request was sent.
    NothingSelected,
    /// The user declined the confirmation.
    Declined,
    Completed { successful: usize, failed: usize },
    Failed(String),
}

pub struct WorkflowController {
    api: Arc<dyn PosterApi>,
    confirm: Arc<dyn Confirm>,
    session: SessionContext,
}

impl WorkflowController {
    pub fn new(api: Arc<dyn PosterApi>, confirm: Arc<dyn Confirm>, session: SessionContext) -> Self {
        info!(session_id = %session.id(), "poster session started");
        Self {
            api,
            confirm,
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    fn report_failure(&mut self, context: &str, err: &ClientError) {
        let message = format!("{context}: {err}");
        match err.kind() {
            ErrorKind::Precondition => {
                warn!(error = %err, "{context}");
                self.session.notifications.warning(message);
            }
            ErrorKind::Network | ErrorKind::Application => {
                error!(error = %err, status = ?err.status(), "{context}");
                self.session.notifications.danger(message);
            }
        }
    }

    pub async fn list_items(&mut self, query: BrowseQuery) -> bool {
        let span = tracing::info_span!(
            "list_items",
            session_id = %self.session.id(),
            filter = %query.filter,
            sort = %query.sort
        );
        self.session.modals.show_loading(LOADING_ITEMS_TEXT);
        let result = self.api.list_items(&query).instrument(span).await;
        self.session.modals.hide_loading();

        match result {
            Ok(listing) => {
                info!(count = listing.items.len(), server = %listing.server_info.name, "listed items");
                self.session.query = query;
                self.session.replace_items(listing.items, listing.server_info);
                true
            }
            Err(err) => {
                self.report_failure("Failed to load items", &err);
                false
            }
        }
    }

    /// Switching filter or sort re-lists from the backend.
    pub async fn apply_browse_query(&mut self, query: BrowseQuery) -> bool {
        if query == self.session.query && !self.session.views.is_empty() {
            debug!("browse query unchanged; keeping current listing");
            return true;
        }
        self.list_items(query).await
    }

    pub async fn request_poster_candidates(&mut self, item_id: &ItemId) -> bool {
        self.session.modals.show_loading(LOADING_POSTERS_TEXT);
        let result = self
            .api
            .item_posters(item_id)
            .instrument(tracing::info_span!("item_posters", %item_id))
            .await;
        self.session.modals.hide_loading();

        match result {
            Ok(lookup) => {
                info!(%item_id, count = lookup.posters.len(), "loaded poster candidates");
                let grid = render::poster_grid(&lookup.item, &lookup.posters);
                self.session.views.register(&lookup.item);
                self.session.set_current_item(item_id.clone());
                self.session.modals.open_posters(lookup.item, grid);
                true
            }
            Err(err) => {
                self.report_failure("Failed to load posters", &err);
                false
            }
        }
    }

    pub async fn select_candidate(
        &mut self,
        item_id: &ItemId,
        poster_url: &str,
        candidate_id: &PosterId,
    ) -> bool {
        if let Some(modal) = self.session.modals.posters_for_mut(item_id) {
            modal.grid.select(candidate_id);
        }

        match self.api.select_poster(item_id, poster_url).await {
            Ok(()) => {
                info!(%item_id, %candidate_id, "poster selected");
                self.session.record_selection(item_id.clone(), poster_url);
                self.session.views.set_status(item_id, ItemStatus::Selected);
                self.session.modals.close_posters();
                true
            }
            Err(err) => {
                self.report_failure("Failed to select poster", &err);
                false
            }
        }
    }

    /// Selects a candidate from the open poster picker by its id.
    pub async fn choose_candidate(&mut self, candidate_id: &PosterId) -> bool {
        let chosen = self.session.modals.posters().and_then(|modal| {
            modal
                .grid
                .tile(candidate_id)
                .map(|tile| (modal.item.id.clone(), tile.url.clone()))
        });
        let Some((item_id, poster_url)) = chosen else {
            let err = ClientError::precondition(format!(
                "poster {candidate_id} is not in the open poster list"
            ));
            self.report_failure("Failed to select poster", &err);
            return false;
        };
        self.select_candidate(&item_id, &poster_url, candidate_id)
            .await
    }

    pub async fn upload_one(&mut self, item_id: &ItemId) -> bool {
        if !self.session.selections().contains(item_id) {
            let err = ClientError::precondition("No poster selected for this item");
            self.report_failure("Upload failed", &err);
            return false;
        }
        self.session.views.set_status(item_id, ItemStatus::Uploading);

        match self.api.upload(item_id).await {
            Ok(()) => {
                info!(%item_id, "poster uploaded");
                self.complete_upload(item_id, true);
                self.session
                    .notifications
                    .success("Poster uploaded successfully!");
                true
            }
            Err(err) => {
                self.complete_upload(item_id, false);
                self.report_failure("Upload failed", &err);
                false
            }
        }
    }

    /// One-off upload of `poster_url` that bypasses pending selections.
    pub async fn upload_direct(&mut self, item_id: &ItemId, poster_url: &str) -> bool {
        self.session.views.begin_server_upload(item_id);

        match self.api.upload_direct(item_id, poster_url).await {
            Ok(message) => {
                info!(%item_id, "poster uploaded directly");
                self.session.views.finish_upload(item_id, true);
                self.session.notifications.success(
                    message.unwrap_or_else(|| "Poster uploaded successfully!".to_string()),
                );
                true
            }
            Err(err) => {
                self.session.views.finish_upload(item_id, false);
                self.report_failure("Upload failed", &err);
                false
            }
        }
    }

    fn complete_upload(&mut self, item_id: &ItemId, success: bool) {
        self.session.views.finish_upload(item_id, success);
        if success {
            self.session.forget_selection(item_id);
        }
    }

    fn apply_results(&mut self, results: &[UploadResult]) -> (usize, usize) {
        for result in results {
            if !result.success {
                warn!(item_id = %result.item_id, error = ?result.error, "item upload failed");
            }
            self.complete_upload(&result.item_id, result.success);
        }
        let summary = render::batch_summary(results);
        let counts = (summary.successful, summary.failed);
        self.session.modals.show_results(summary);
        counts
    }

    pub async fn upload_all_selected(&mut self) -> BatchOutcome {
        let count = self.session.selection_count();
        if count == 0 {
            warn!("upload all requested with nothing selected");
            self.session.notifications.warning("No posters selected");
            return BatchOutcome::NothingSelected;
        }
        if !self
            .confirm
            .confirm(&render::upload_all_prompt(count))
            .await
        {
            debug!(count, "batch upload declined");
            return BatchOutcome::Declined;
        }

        let pending = self.session.selections().item_ids();
        self.session.begin_batch();
        for item_id in &pending {
            self.session.views.set_status(item_id, ItemStatus::Uploading);
        }

        info!(count, "uploading all selected posters");
        let result = self.api.upload_all().await;
        let outcome = match result {
            Ok(results) => {
                self.session.progress.complete();
                let (successful, failed) = self.apply_results(&results);
                // Items the backend did not report on are still pending.
                for item_id in &pending {
                    if self.session.views.status(item_id) == Some(ItemStatus::Uploading) {
                        self.session.views.set_status(item_id, ItemStatus::Selected);
                    }
                }
                info!(successful, failed, "batch upload finished");
                BatchOutcome::Completed { successful, failed }
            }
            Err(err) => {
                // No per-item outcome arrived; every item is still pending.
                self.session.progress.hide();
                for item_id in &pending {
                    self.session.views.set_status(item_id, ItemStatus::Selected);
                }
                self.report_failure("Batch upload failed", &err);
                BatchOutcome::Failed(err.to_string())
            }
        };
        self.session.end_batch();
        outcome
    }

    pub async fn run_automatic_batch(&mut self, filter: AutoBatchFilter) -> BatchOutcome {
        if !self
            .confirm
            .confirm(render::auto_batch_prompt(filter))
            .await
        {
            debug!(%filter, "automatic batch declined");
            return BatchOutcome::Declined;
        }

        self.session.modals.show_loading(LOADING_AUTO_BATCH_TEXT);
        self.session.progress.start();
        info!(%filter, "starting automatic poster batch");
        let result = self.api.batch_auto_poster(filter).await;
        self.session.modals.hide_loading();

        match result {
            Ok(report) => {
                self.session.progress.complete();
                if report.results.is_empty() {
                    self.session.notifications.info(
                        report.message.clone().unwrap_or_else(|| {
                            "No items found matching the filter criteria".to_string()
                        }),
                    );
                }
                let (successful, failed) = self.apply_results(&report.results);
                info!(
                    %filter,
                    total = report.total_items,
                    successful,
                    failed,
                    "automatic batch finished"
                );
                BatchOutcome::Completed { successful, failed }
            }
            Err(err) => {
                self.session.progress.hide();
                self.report_failure("Automatic batch failed", &err);
                BatchOutcome::Failed(err.to_string())
            }
        }
    }

    pub async fn check_health(&mut self) -> Option<HealthReport> {
        match self.api.health().await {
            Ok(report) => {
                if report.is_healthy() {
                    info!(server = ?report.server_name, "backend healthy");
                } else {
                    warn!(error = ?report.error, "backend reports unhealthy");
                    self.session.notifications.warning(format!(
                        "Backend unhealthy: {}",
                        report.error.as_deref().unwrap_or("unknown error")
                    ));
                }
                Some(report)
            }
            Err(err) => {
                self.report_failure("Health check failed", &err);
                None
            }
        }
    }

    pub fn close_poster_modal(&mut self) -> bool {
        self.session.modals.close_posters()
    }

    pub fn close_results(&mut self) -> bool {
        self.session.progress.hide();
        self.session.modals.close_results()
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.session.notifications.dismiss(id)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
