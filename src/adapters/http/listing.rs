//! Directory listing and HTML page rendering.

use std::io;
use std::path::Path;

/// Names hidden from the listing at the site root only.
pub const ROOT_IGNORED: &[&str] = &[
    "node_modules",
    "Library",
    "package.json",
    "package-lock.json",
    "README.md",
    "microtonalOSCReceiver.maxpat",
    "test-websocket-connection.html",
    "Cargo.toml",
    "Cargo.lock",
    "src",
    "target",
    "tests",
];

/// Names hidden from the listing at any depth.
pub const ALWAYS_IGNORED: &[&str] = &[".git", ".DS_Store", ".gitignore"];

/// What to include in a listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingOptions {
    pub show_hidden: bool,
    pub show_files: bool,
}

/// One row of the listing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryView {
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
}

/// List the entries of `dir`, which must lie under `root`.
///
/// A `..` entry is prepended unless `dir` is the root. Entries are sorted
/// by name.
pub async fn list_directory(
    root: &Path,
    dir: &Path,
    options: ListingOptions,
) -> io::Result<Vec<DirEntryView>> {
    let is_root = dir == root;
    let mut entries = Vec::new();

    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if ALWAYS_IGNORED.contains(&name.as_str())
            || (is_root && ROOT_IGNORED.contains(&name.as_str()))
        {
            continue;
        }

        // follows symlinks, like the file server does
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let is_hidden = name.starts_with('.');

        if (options.show_hidden || !is_hidden) && (options.show_files || is_dir) {
            entries.push(DirEntryView {
                name,
                is_dir,
                is_hidden,
            });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    if !is_root {
        entries.insert(
            0,
            DirEntryView {
                name: "..".to_string(),
                is_dir: true,
                is_hidden: false,
            },
        );
    }
    Ok(entries)
}

/// Wrap a body fragment in the site page template.
pub fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>Microtonal WebSocket-OSC Server</title>
    <link rel="stylesheet" href="/Library/style.css" />
  </head>
  <body>
    {body}
  </body>
</html>"#
    )
}

/// Render the project table. `url_path` is the request path of `entries`.
pub fn render_listing(url_path: &str, entries: &[DirEntryView]) -> String {
    let base = url_path.trim_end_matches('/');
    let rows: Vec<String> = entries
        .iter()
        .map(|e| {
            let href = if e.name == ".." {
                parent_href(base)
            } else {
                format!("{}/{}/", base, e.name)
            };
            format!(
                r#"<tr class="entryRow"><td><a href="{}">{}</a></td></tr>"#,
                escape_html(&href),
                escape_html(&e.name)
            )
        })
        .collect();

    format!(
        r#"<table class="folderTable card">
<tr><th>Available Projects</th></tr>
{}
</table>"#,
        rows.join("\n")
    )
}

/// Render the 404 fragment for a missing URL.
pub fn render_not_found(full_url: &str) -> String {
    format!(
        r#"<div class="card padding text-center">
  <h2>Error!</h2><br>
  The page <b>{}</b> does not exist. Did you type the address correctly?
</div>"#,
        escape_html(full_url)
    )
}

/// Escape text for inclusion in HTML content or attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn parent_href(base: &str) -> String {
    match base.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => format!("{}/", &base[..i]),
    }
}
