use std::collections::BTreeMap;

use shared::domain::ItemId;

/// Posters the backend has confirmed as selected but that are not uploaded yet.
///
/// One pending poster per item: selecting again overwrites.
#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    entries: BTreeMap<ItemId, String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the poster URL that was replaced, if any.
    pub fn set(&mut self, item_id: ItemId, poster_url: impl Into<String>) -> Option<String> {
        self.entries.insert(item_id, poster_url.into())
    }

    pub fn remove(&mut self, item_id: &ItemId) -> Option<String> {
        self.entries.remove(item_id)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&str> {
        self.entries.get(item_id).map(String::as_str)
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.entries.contains_key(item_id)
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &str)> {
        self.entries.iter().map(|(id, url)| (id, url.as_str()))
    }
}
