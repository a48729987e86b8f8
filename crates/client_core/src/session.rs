use std::time::Duration;

use shared::domain::{ContentFilter, Item, ItemId, ServerInfo, SortOrder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::ClientSettings,
    notify::NotificationCenter,
    selection::SelectionStore,
    view::{BatchProgress, ModalState, UploadAllControl, ViewRegistry},
};

/// Filter and sort state mirrored in the page query (`type`, `sort`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrowseQuery {
    pub filter: ContentFilter,
    pub sort: SortOrder,
}

impl BrowseQuery {
    pub fn new(filter: ContentFilter, sort: SortOrder) -> Self {
        Self { filter, sort }
    }

    /// Reads `type` and `sort` from a query string; unknown values fall back to defaults.
    pub fn from_query(query: &str) -> Self {
        let mut parsed = Self::default();
        let query = query.trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "type" => parsed.filter = value.parse().unwrap_or_default(),
                "sort" => parsed.sort = value.parse().unwrap_or_default(),
                _ => {}
            }
        }
        parsed
    }

    pub fn to_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(kind) = self.filter.query_value() {
            serializer.append_pair("type", kind);
        }
        serializer.append_pair("sort", self.sort.query_value());
        serializer.finish()
    }

    /// Changing the filter keeps the current sort.
    pub fn with_filter(self, filter: ContentFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_sort(self, sort: SortOrder) -> Self {
        Self { sort, ..self }
    }
}

/// Everything one browsing session owns. Created at session start, never persisted.
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    selections: SelectionStore,
    upload_all: UploadAllControl,
    current_item: Option<ItemId>,
    items: Vec<Item>,
    pub views: ViewRegistry,
    pub notifications: NotificationCenter,
    pub modals: ModalState,
    pub progress: BatchProgress,
    pub query: BrowseQuery,
    pub server_info: Option<ServerInfo>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(crate::config::DEFAULT_NOTIFICATION_TTL_SECS),
            BrowseQuery::default(),
        )
    }
}

impl SessionContext {
    pub fn new(notification_ttl: Duration, query: BrowseQuery) -> Self {
        Self {
            id: Uuid::new_v4(),
            selections: SelectionStore::new(),
            upload_all: UploadAllControl::default(),
            current_item: None,
            items: Vec::new(),
            views: ViewRegistry::new(),
            notifications: NotificationCenter::new(notification_ttl),
            modals: ModalState::default(),
            progress: BatchProgress::default(),
            query,
            server_info: None,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(
            settings.notification_ttl(),
            BrowseQuery::new(settings.default_filter, settings.default_sort),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn selection_count(&self) -> usize {
        self.selections.count()
    }

    pub fn upload_all_control(&self) -> &UploadAllControl {
        &self.upload_all
    }

    /// Every selection mutation goes through here so the upload-all control tracks the count.
    pub fn record_selection(&mut self, item_id: ItemId, poster_url: impl Into<String>) {
        if let Some(previous) = self.selections.set(item_id.clone(), poster_url) {
            debug!(%item_id, %previous, "replaced pending selection");
        }
        self.refresh_upload_all();
    }

    pub fn forget_selection(&mut self, item_id: &ItemId) -> Option<String> {
        let removed = self.selections.remove(item_id);
        self.refresh_upload_all();
        removed
    }

    fn refresh_upload_all(&mut self) {
        if !self.upload_all.busy {
            self.upload_all = UploadAllControl::for_count(self.selections.count());
        }
    }

    pub fn begin_batch(&mut self) {
        self.upload_all = UploadAllControl::busy(self.selections.count());
        self.progress.start();
    }

    pub fn end_batch(&mut self) {
        self.upload_all = UploadAllControl::for_count(self.selections.count());
    }

    pub fn current_item(&self) -> Option<&ItemId> {
        self.current_item.as_ref()
    }

    pub fn set_current_item(&mut self, item_id: ItemId) {
        self.current_item = Some(item_id);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == item_id)
    }

    /// Installs a fresh listing. A listing is a page reload: the backend starts its session
    /// over, so pending selections and the current item are dropped with the old view handles.
    pub fn replace_items(&mut self, items: Vec<Item>, server_info: ServerInfo) {
        let dropped = self.selections.count();
        if dropped > 0 {
            info!(dropped, "reload discarded pending selections");
        }
        self.selections = SelectionStore::new();
        self.current_item = None;
        self.refresh_upload_all();
        self.views.rebuild(&items);
        self.items = items;
        self.server_info = Some(server_info);
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::ItemKind;

    use super::*;

    #[test]
    fn query_round_trips_through_page_url() {
        let query = BrowseQuery::from_query("?type=movie&sort=year&page=2");
        assert_eq!(query, BrowseQuery::new(ContentFilter::Movies, SortOrder::Year));
        assert_eq!(query.to_query(), "type=movies&sort=year");
        assert_eq!(BrowseQuery::default().to_query(), "sort=name");
    }

    #[test]
    fn filter_change_keeps_sort() {
        let query = BrowseQuery::new(ContentFilter::All, SortOrder::DateAdded)
            .with_filter(ContentFilter::Series);
        assert_eq!(query.sort, SortOrder::DateAdded);
        assert_eq!(query.filter, ContentFilter::Series);
    }

    #[test]
    fn unknown_query_values_fall_back_to_defaults() {
        let query = BrowseQuery::from_query("type=music&sort=rating");
        assert_eq!(query, BrowseQuery::default());
    }

    #[test]
    fn upload_all_control_tracks_every_mutation() {
        let mut session = SessionContext::default();
        assert!(!session.upload_all_control().enabled);

        session.record_selection(ItemId::new("a"), "https://p/1");
        session.record_selection(ItemId::new("b"), "https://p/2");
        assert_eq!(session.upload_all_control().label, "Upload All Selected (2)");
        assert!(session.upload_all_control().enabled);

        session.forget_selection(&ItemId::new("a"));
        assert_eq!(session.upload_all_control().selected_count, 1);

        session.forget_selection(&ItemId::new("b"));
        assert_eq!(session.upload_all_control(), &UploadAllControl::for_count(0));
        assert_eq!(session.upload_all_control().label, "Upload All Selected");
    }

    #[test]
    fn relisting_starts_a_fresh_selection_session() {
        let mut session = SessionContext::default();
        session.record_selection(ItemId::new("a"), "https://p/1");
        session.set_current_item(ItemId::new("a"));
        session.replace_items(
            vec![
                Item::new("a", "Alien", ItemKind::Movie),
                Item::new("b", "Andor", ItemKind::Series),
            ],
            ServerInfo::default(),
        );

        assert_eq!(session.selection_count(), 0);
        assert_eq!(session.current_item(), None);
        assert!(!session.upload_all_control().enabled);
        assert_eq!(
            session.views.status(&ItemId::new("a")),
            Some(crate::view::ItemStatus::None)
        );
        assert_eq!(session.views.len(), 2);
    }
}
