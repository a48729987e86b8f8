//! Projections from API payloads to display models, plus their HTML and plain-text forms.
//!
//! Nothing here holds state between calls. The session keeps the models it is showing.

use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::{AutoBatchFilter, Item, ItemId, PosterCandidate, PosterId, UploadResult};

use crate::view::{ItemStatus, ItemView};

const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg width="300" height="450" xmlns="http://www.w3.org/2000/svg">"#,
    r##"<rect width="100%" height="100%" fill="#f0f0f0"/>"##,
    r##"<text x="50%" y="50%" font-family="Arial" font-size="16" fill="#666" "##,
    r#"text-anchor="middle" dy=".3em">Image Not Available</text></svg>"#,
);

pub fn placeholder_data_uri() -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(PLACEHOLDER_SVG)
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridHeader {
    pub title: String,
    /// "1995 • Movie", with "Unknown Year" when the year is missing.
    pub subtitle: String,
    pub found_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterTile {
    pub poster_id: PosterId,
    pub url: String,
    pub image_src: String,
    pub alt: String,
    pub failed_to_load: bool,
    pub title: String,
    pub uploader: String,
    pub likes: Option<u32>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterGrid {
    pub header: GridHeader,
    pub tiles: Vec<PosterTile>,
    /// Set instead of tiles when nothing was found.
    pub empty_message: Option<String>,
}

pub fn poster_grid(item: &Item, posters: &[PosterCandidate]) -> PosterGrid {
    let count = posters.len();
    let header = GridHeader {
        title: item.title.clone(),
        subtitle: format!(
            "{} \u{2022} {}",
            item.year
                .map(|year| year.to_string())
                .unwrap_or_else(|| "Unknown Year".to_string()),
            item.kind
        ),
        found_label: format!("Found {count} poster{}", if count == 1 { "" } else { "s" }),
    };

    if posters.is_empty() {
        return PosterGrid {
            header,
            tiles: Vec::new(),
            empty_message: Some(format!("No posters were found for \"{}\"", item.title)),
        };
    }

    let placeholder = placeholder_data_uri();
    let tiles = posters
        .iter()
        .enumerate()
        .map(|(index, poster)| {
            let inline = poster.inline_image();
            PosterTile {
                poster_id: poster.id.clone(),
                url: poster.url.clone(),
                image_src: inline.map(str::to_string).unwrap_or_else(|| placeholder.clone()),
                alt: format!("Poster {}", index + 1),
                failed_to_load: inline.is_none(),
                title: poster.title.clone(),
                uploader: poster.uploader.clone(),
                likes: poster.likes.filter(|likes| *likes > 0),
                selected: false,
            }
        })
        .collect();

    PosterGrid {
        header,
        tiles,
        empty_message: None,
    }
}

impl PosterGrid {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, poster_id: &PosterId) -> Option<&PosterTile> {
        self.tiles.iter().find(|tile| &tile.poster_id == poster_id)
    }

    /// Highlights `poster_id` and clears every other highlight. Unknown ids change nothing.
    pub fn select(&mut self, poster_id: &PosterId) -> bool {
        if self.tile(poster_id).is_none() {
            return false;
        }
        for tile in &mut self.tiles {
            tile.selected = &tile.poster_id == poster_id;
        }
        true
    }

    pub fn selected(&self) -> Option<&PosterTile> {
        self.tiles.iter().find(|tile| tile.selected)
    }

    pub fn highlighted_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.selected).count()
    }

    pub fn failed_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.failed_to_load).count()
    }

    pub fn to_html(&self) -> String {
        if let Some(message) = &self.empty_message {
            return format!(
                concat!(
                    r#"<div class="text-center py-5">"#,
                    r#"<h5 class="text-muted">No posters found</h5>"#,
                    r#"<p class="text-muted">{}</p></div>"#
                ),
                escape_html(message)
            );
        }

        let mut html = format!(
            concat!(
                r#"<div class="mb-3"><h6>{}</h6>"#,
                r#"<small class="text-muted">{}</small> "#,
                r#"<small class="text-muted ms-3">{}</small></div><div class="row">"#
            ),
            escape_html(&self.header.title),
            escape_html(&self.header.subtitle),
            escape_html(&self.header.found_label),
        );

        for tile in &self.tiles {
            let card_class = if tile.selected {
                "card poster-card h-100 selected"
            } else {
                "card poster-card h-100"
            };
            let _ = write!(
                html,
                r#"<div class="col-lg-2 col-md-3 col-sm-4 col-6 mb-3"><div class="{card_class}" data-poster-id="{}" data-poster-url="{}"><div class="poster-container">"#,
                tile.poster_id,
                escape_html(&tile.url),
            );
            if tile.failed_to_load {
                html.push_str(concat!(
                    r#"<div class="poster-loading d-flex align-items-center justify-content-center">"#,
                    r#"<small class="text-muted">Image failed to load</small></div>"#
                ));
            }
            let _ = write!(
                html,
                r#"<img src="{}" class="card-img-top poster-image" alt="{}" loading="lazy"{}></div>"#,
                escape_html(&tile.image_src),
                escape_html(&tile.alt),
                if tile.failed_to_load {
                    r#" style="display: none;""#
                } else {
                    ""
                },
            );
            let _ = write!(
                html,
                r#"<div class="card-body p-2"><small class="text-muted d-block text-truncate" title="{title}">{title}</small><div class="d-flex justify-content-between align-items-center mt-1"><small class="text-muted">{}</small>"#,
                escape_html(&tile.uploader),
                title = escape_html(&tile.title),
            );
            if let Some(likes) = tile.likes {
                let _ = write!(html, r#"<small class="text-muted">&#9829; {likes}</small>"#);
            }
            html.push_str("</div></div></div></div>");
        }

        html.push_str("</div>");
        html
    }

    pub fn to_text(&self) -> String {
        if let Some(message) = &self.empty_message {
            return format!("No posters found\n{message}\n");
        }

        let mut text = format!(
            "{}\n{}  {}\n",
            self.header.title, self.header.subtitle, self.header.found_label
        );
        for tile in &self.tiles {
            let marker = if tile.selected { '*' } else { ' ' };
            let _ = write!(text, "{marker} [{}] {} by {}", tile.poster_id, tile.title, tile.uploader);
            if let Some(likes) = tile.likes {
                let _ = write!(text, " ({likes} likes)");
            }
            if tile.failed_to_load {
                text.push_str(" (image failed to load)");
            }
            let _ = writeln!(text, "\n    {}", tile.url);
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub item_id: ItemId,
    pub label: String,
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub successful: usize,
    pub failed: usize,
    pub rows: Vec<ResultRow>,
}

pub fn batch_summary(results: &[UploadResult]) -> BatchSummary {
    let rows: Vec<ResultRow> = results
        .iter()
        .map(|result| ResultRow {
            item_id: result.item_id.clone(),
            label: result.label().to_string(),
            success: result.success,
            error: result
                .error
                .clone()
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let successful = rows.iter().filter(|row| row.success).count();

    BatchSummary {
        successful,
        failed: rows.len() - successful,
        rows,
    }
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            concat!(
                r#"<div class="row mb-3">"#,
                r#"<div class="col-md-6"><div class="card border-success"><div class="card-body text-center">"#,
                r#"<h4 class="text-success">{}</h4><small class="text-muted">Successful</small></div></div></div>"#,
                r#"<div class="col-md-6"><div class="card border-danger"><div class="card-body text-center">"#,
                r#"<h4 class="text-danger">{}</h4><small class="text-muted">Failed</small></div></div></div>"#,
                r#"</div>"#
            ),
            self.successful, self.failed
        );

        if self.rows.is_empty() {
            return html;
        }

        html.push_str(concat!(
            r#"<h6>Detailed Results:</h6><div class="table-responsive">"#,
            r#"<table class="table table-sm results-table">"#,
            r#"<thead><tr><th>Item</th><th>Status</th><th>Error</th></tr></thead><tbody>"#
        ));
        for row in &self.rows {
            let badge = if row.success {
                r#"<span class="badge bg-success">Success</span>"#
            } else {
                r#"<span class="badge bg-danger">Failed</span>"#
            };
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{badge}</td><td>{}</td></tr>",
                escape_html(&row.label),
                escape_html(&row.error),
            );
        }
        html.push_str("</tbody></table></div>");
        html
    }

    pub fn to_text(&self) -> String {
        let mut text = format!("Successful: {}  Failed: {}\n", self.successful, self.failed);
        let width = self
            .rows
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0)
            .max("Item".len());
        if !self.rows.is_empty() {
            let _ = writeln!(text, "{:<width$}  {:<7}  Error", "Item", "Status");
        }
        for row in &self.rows {
            let status = if row.success { "Success" } else { "Failed" };
            let _ = writeln!(text, "{:<width$}  {status:<7}  {}", row.label, row.error);
        }
        text
    }
}

pub fn status_badge_html(view: &ItemView) -> String {
    let Some(label) = view.status.badge() else {
        return String::new();
    };
    let class = match view.status {
        ItemStatus::Selected => "badge status-selected",
        ItemStatus::Uploading => "badge bg-info",
        ItemStatus::Uploaded => "badge status-uploaded",
        ItemStatus::Error => "badge status-error",
        ItemStatus::None => "badge",
    };
    let mut html = format!(r#"<span class="{class}">{label}</span>"#);
    if let Some(action) = view.status.action() {
        let _ = write!(
            html,
            r#"<button class="btn btn-sm mt-1 w-100" data-upload-item="{}">{}</button>"#,
            escape_html(view.item_id.as_str()),
            action.label()
        );
    }
    html
}

pub fn status_line(view: &ItemView) -> String {
    let mut line = format!(
        "{} {} ({}, {})",
        if view.highlighted() { '*' } else { ' ' },
        view.title,
        view.year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "Unknown Year".to_string()),
        view.kind
    );
    let _ = write!(line, " [{}]", view.item_id);
    if !view.has_poster {
        line.push_str(" no poster");
    }
    if let Some(badge) = view.status.badge() {
        let _ = write!(line, " - {badge}");
    }
    if let Some(action) = view.status.action() {
        let _ = write!(line, " ({})", action.label());
    }
    line
}

pub fn upload_all_prompt(count: usize) -> String {
    format!("Upload {count} selected poster(s)?")
}

pub fn auto_batch_prompt(filter: AutoBatchFilter) -> &'static str {
    match filter {
        AutoBatchFilter::NoPoster => {
            "Find and upload the first available poster for every item that has no poster?"
        }
        AutoBatchFilter::All => {
            "Replace the poster of EVERY item with the first available poster? Existing posters will be overwritten."
        }
        AutoBatchFilter::Movies => {
            "Replace the poster of every movie with the first available poster?"
        }
        AutoBatchFilter::Series => {
            "Replace the poster of every series with the first available poster?"
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
