use super::*;
use shared::domain::ItemKind;

fn candidate(id: i64, inline: Option<&str>) -> PosterCandidate {
    PosterCandidate {
        id: PosterId(id),
        url: format!("https://posters.example/p/{id}"),
        base64: inline.map(str::to_string),
        title: "Poster".to_string(),
        uploader: "Unknown".to_string(),
        likes: Some(0),
    }
}

fn heat() -> Item {
    Item::new("h1", "Heat", ItemKind::Movie).with_year(1995)
}

#[test]
fn missing_inline_image_marks_only_that_tile_failed() {
    let posters = vec![
        candidate(1, Some("data:image/jpeg;base64,AAAA")),
        candidate(2, None),
        candidate(3, Some("data:image/jpeg;base64,BBBB")),
    ];
    let grid = poster_grid(&heat(), &posters);

    assert_eq!(grid.tiles.len(), 3);
    assert_eq!(grid.failed_count(), 1);
    let failed = grid.tile(&PosterId(2)).expect("tile");
    assert!(failed.failed_to_load);
    assert_eq!(failed.image_src, placeholder_data_uri());
    assert!(!grid.tile(&PosterId(1)).expect("tile").failed_to_load);
    assert!(grid.to_html().contains("Image failed to load"));
}

#[test]
fn empty_candidate_list_renders_empty_state() {
    let grid = poster_grid(&heat(), &[]);
    assert!(grid.is_empty());
    assert_eq!(
        grid.empty_message.as_deref(),
        Some("No posters were found for \"Heat\"")
    );
    assert!(grid.to_html().contains("No posters found"));
}

#[test]
fn header_describes_item_and_count() {
    let grid = poster_grid(&heat(), &[candidate(1, None)]);
    assert_eq!(grid.header.subtitle, "1995 \u{2022} Movie");
    assert_eq!(grid.header.found_label, "Found 1 poster");

    let no_year = Item::new("s1", "Andor", ItemKind::Series);
    let grid = poster_grid(&no_year, &[candidate(1, None), candidate(2, None)]);
    assert_eq!(grid.header.subtitle, "Unknown Year \u{2022} Series");
    assert_eq!(grid.header.found_label, "Found 2 posters");
}

#[test]
fn selecting_second_candidate_leaves_one_highlight() {
    let mut grid = poster_grid(&heat(), &[candidate(1, None), candidate(2, None)]);
    assert!(grid.select(&PosterId(1)));
    assert!(grid.select(&PosterId(2)));

    assert_eq!(grid.highlighted_count(), 1);
    assert_eq!(grid.selected().map(|tile| &tile.poster_id), Some(&PosterId(2)));
}

#[test]
fn selecting_unknown_candidate_keeps_current_highlight() {
    let mut grid = poster_grid(&heat(), &[candidate(1, None)]);
    grid.select(&PosterId(1));
    assert!(!grid.select(&PosterId(42)));
    assert_eq!(grid.selected().map(|tile| &tile.poster_id), Some(&PosterId(1)));
}

#[test]
fn zero_likes_are_hidden() {
    let mut liked = candidate(2, None);
    liked.likes = Some(12);
    let grid = poster_grid(&heat(), &[candidate(1, None), liked]);
    assert_eq!(grid.tiles[0].likes, None);
    assert_eq!(grid.tiles[1].likes, Some(12));
}

#[test]
fn batch_summary_counts_and_rows() {
    let results = vec![
        UploadResult::succeeded("a", "Alien"),
        UploadResult::succeeded("b", "Brazil"),
        UploadResult::succeeded("c", "Cube"),
        UploadResult::failed("d", Some("Dune".to_string()), "Download failed"),
        UploadResult::failed("e", None, "Item not found"),
    ];
    let summary = batch_summary(&results);

    assert_eq!(summary.successful, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.total(), 5);
    assert_eq!(summary.rows[0].error, "-");
    assert_eq!(summary.rows[4].label, "e");

    let html = summary.to_html();
    assert_eq!(html.matches("<tr><td>").count(), 5);
    assert!(html.contains("Successful"));
}

#[test]
fn empty_batch_has_no_detail_table() {
    let summary = batch_summary(&[]);
    assert_eq!((summary.successful, summary.failed), (0, 0));
    assert!(!summary.to_html().contains("<table"));
}

#[test]
fn interpolated_text_is_escaped() {
    let item = Item::new("x", "<script>alert('x')</script>", ItemKind::Movie);
    let html = poster_grid(&item, &[candidate(1, None)]).to_html();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));

    let row = UploadResult::failed("x", Some("A & B".to_string()), "<bad>");
    let html = batch_summary(&[row]).to_html();
    assert!(html.contains("A &amp; B"));
    assert!(html.contains("&lt;bad&gt;"));
}

#[test]
fn status_badge_offers_retry_after_error() {
    let mut view = ItemView::from_item(&heat());
    assert_eq!(status_badge_html(&view), "");

    view.status = ItemStatus::Error;
    let html = status_badge_html(&view);
    assert!(html.contains("status-error"));
    assert!(html.contains("Retry Upload"));
    assert!(html.contains(r#"data-upload-item="h1""#));
}

#[test]
fn each_batch_filter_has_its_own_prompt() {
    let prompts: std::collections::HashSet<&str> = AutoBatchFilter::ALL
        .into_iter()
        .map(auto_batch_prompt)
        .collect();
    assert_eq!(prompts.len(), AutoBatchFilter::ALL.len());
    assert_eq!(upload_all_prompt(2), "Upload 2 selected poster(s)?");
}
