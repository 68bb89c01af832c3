//! HTML rendering of the music listing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Europe::London;

use crate::error::Result;
use crate::models::{format_size, OutputRecord};

/// File name of the rendered page inside the output directory.
pub const INDEX_FILE: &str = "index.html";

const STYLE: &str = "\
.music-list { padding:0; list-style:none; }
.music-list li { padding:10px 0; border-bottom:1px solid #ddd; }
.meta { color:#666; font-size:0.95em; }
.footer { margin-top:2em; color:#888; font-size:0.85em; }";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format an instant as UK local time (GMT or BST).
pub fn format_uk_time(t: &DateTime<Utc>) -> String {
    t.with_timezone(&London).format("%Y-%m-%d %H:%M UK").to_string()
}

fn format_utc_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn render_item(record: &OutputRecord) -> String {
    format!(
        "<li><div><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></div>\
         <div class=\"meta\">{} &middot; updated {}</div></li>\n",
        escape_html(&record.url),
        escape_html(&record.name),
        format_size(record.size),
        format_uk_time(&record.modified),
    )
}

/// Render records, in the given order, as a standalone HTML page.
///
/// Item times are shown in UK local time; the footer is in UTC.
/// `intro_html` is inserted verbatim below the heading.
pub fn render_page(
    records: &[OutputRecord],
    title: &str,
    intro_html: Option<&str>,
    generated_at: DateTime<Utc>,
) -> String {
    let title = escape_html(title);
    let mut html = format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head><body>\n\
         <header><h1>{title}</h1>"
    );

    if let Some(intro) = intro_html.filter(|s| !s.trim().is_empty()) {
        html.push_str(&format!("<div class=\"blurb\">{}</div>", intro));
    }
    html.push_str("</header><main>\n<ul class=\"music-list\">\n");

    for record in records {
        html.push_str(&render_item(record));
    }

    html.push_str(&format!(
        "</ul>\n</main><div class=\"footer\">Last updated: {}</div>\n</body></html>\n",
        format_utc_time(&generated_at)
    ));
    html
}

/// Write the page to `<output_dir>/index.html`, creating the directory.
pub async fn write_page(output_dir: &Path, html: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(INDEX_FILE);
    tokio::fs::write(&path, html).await?;
    Ok(path)
}
