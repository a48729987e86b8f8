use super::*;
use shared::domain::ItemKind;

fn registry_with(ids: &[&str]) -> ViewRegistry {
    let items: Vec<Item> = ids
        .iter()
        .map(|id| Item::new(*id, format!("Title {id}"), ItemKind::Movie))
        .collect();
    let mut registry = ViewRegistry::new();
    registry.rebuild(&items);
    registry
}

#[test]
fn upload_cycle_follows_two_phase_transitions() {
    let mut registry = registry_with(&["a"]);
    let id = ItemId::new("a");

    assert!(registry.set_status(&id, ItemStatus::Selected));
    assert!(registry.set_status(&id, ItemStatus::Uploading));
    assert!(registry.set_status(&id, ItemStatus::Error));
    assert!(registry.set_status(&id, ItemStatus::Uploading));
    assert!(registry.set_status(&id, ItemStatus::Uploaded));
    assert_eq!(registry.status(&id), Some(ItemStatus::Uploaded));
}

#[test]
fn outcome_without_upload_in_flight_is_rejected() {
    let mut registry = registry_with(&["a"]);
    let id = ItemId::new("a");

    assert!(!registry.set_status(&id, ItemStatus::Uploaded));
    assert!(!registry.set_status(&id, ItemStatus::Error));
    assert_eq!(registry.status(&id), Some(ItemStatus::None));

    registry.set_status(&id, ItemStatus::Selected);
    registry.set_status(&id, ItemStatus::Uploading);
    assert!(!registry.set_status(&id, ItemStatus::Uploading));
    assert!(!registry.set_status(&id, ItemStatus::None));
}

#[test]
fn upload_starts_only_from_selected_or_error() {
    assert!(!ItemStatus::None.can_advance_to(ItemStatus::Uploading));
    assert!(!ItemStatus::Uploaded.can_advance_to(ItemStatus::Uploading));
    assert!(ItemStatus::Selected.can_advance_to(ItemStatus::Uploading));
    assert!(ItemStatus::Error.can_advance_to(ItemStatus::Uploading));

    let mut registry = registry_with(&["a"]);
    let id = ItemId::new("a");
    assert!(!registry.set_status(&id, ItemStatus::Uploading));
    assert_eq!(registry.status(&id), Some(ItemStatus::None));

    registry.set_status(&id, ItemStatus::Selected);
    registry.finish_upload(&id, true);
    assert!(!registry.set_status(&id, ItemStatus::Uploading));
    assert_eq!(registry.status(&id), Some(ItemStatus::Uploaded));
}

#[test]
fn server_driven_upload_enters_uploading_from_idle() {
    let mut registry = registry_with(&["a"]);
    let id = ItemId::new("a");

    assert!(registry.begin_server_upload(&id));
    assert_eq!(registry.status(&id), Some(ItemStatus::Uploading));
    assert!(!registry.begin_server_upload(&id));
    assert!(!registry.begin_server_upload(&ItemId::new("ghost")));
}

#[test]
fn new_selection_restarts_cycle_after_upload() {
    let mut registry = registry_with(&["a"]);
    let id = ItemId::new("a");
    registry.set_status(&id, ItemStatus::Selected);
    registry.finish_upload(&id, true);

    assert!(registry.set_status(&id, ItemStatus::Selected));
    assert!(registry.get(&id).expect("view").highlighted());
}

#[test]
fn missing_view_handle_skips_update() {
    let mut registry = registry_with(&["a"]);
    assert!(!registry.set_status(&ItemId::new("ghost"), ItemStatus::Selected));
    assert_eq!(registry.status(&ItemId::new("ghost")), None);
    assert_eq!(registry.len(), 1);
}

#[test]
fn finish_upload_passes_through_uploading_for_idle_items() {
    let mut registry = registry_with(&["a", "b"]);

    assert!(registry.finish_upload(&ItemId::new("a"), true));
    assert!(registry.finish_upload(&ItemId::new("b"), false));
    assert_eq!(registry.status(&ItemId::new("a")), Some(ItemStatus::Uploaded));
    assert_eq!(registry.status(&ItemId::new("b")), Some(ItemStatus::Error));
}

#[test]
fn badges_and_actions_match_status() {
    assert_eq!(ItemStatus::None.badge(), None);
    assert_eq!(ItemStatus::Uploading.badge(), Some("Uploading..."));
    assert_eq!(ItemStatus::Selected.action(), Some(StatusAction::UploadNow));
    assert_eq!(
        ItemStatus::Error.action().map(StatusAction::label),
        Some("Retry Upload")
    );
    assert_eq!(ItemStatus::Uploaded.action(), None);
    assert!(ItemStatus::Uploading.is_busy());
}

#[test]
fn listing_order_is_preserved() {
    let registry = registry_with(&["c", "a", "b"]);
    let order: Vec<&str> = registry.iter().map(|view| view.item_id.as_str()).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
}

#[test]
fn upload_all_control_labels() {
    let idle = UploadAllControl::for_count(0);
    assert!(!idle.enabled);
    assert_eq!(idle.label, "Upload All Selected");

    let ready = UploadAllControl::for_count(3);
    assert!(ready.enabled);
    assert_eq!(ready.label, "Upload All Selected (3)");

    let busy = UploadAllControl::busy(3);
    assert!(!busy.enabled);
    assert!(busy.busy);
}

#[test]
fn poster_modal_lookup_is_scoped_to_its_item() {
    let item = Item::new("a", "Alien", ItemKind::Movie);
    let grid = crate::render::poster_grid(&item, &[]);
    let mut modals = ModalState::default();
    modals.open_posters(item, grid);

    assert!(modals.posters_for_mut(&ItemId::new("a")).is_some());
    assert!(modals.posters_for_mut(&ItemId::new("b")).is_none());
    assert!(modals.close_posters());
    assert!(!modals.close_posters());
}
