//! HTML fragments for the two viewer panels and the flat file listing.
//!
//! Folder headers are indented with `&nbsp;` runs (4 per level); file
//! entries in the left panel use a pixel `margin-left` (20px per level).
//! The two units are independent.

use std::path::Path;

const NBSP: &str = "&nbsp;";
const FOLDER_INDENT_WIDTH: usize = 4;
const FILE_INDENT_PX: usize = 20;
const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

pub const FILE_CLASS: &str = "file";
pub const SPREADSHEET_CLASS: &str = "xlsx-file";

/// Closes the contents container opened by [`left_folder_open`].
pub const LEFT_FOLDER_CLOSE: &str = "</div>\n";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Escapes a value for use as a single-quoted JS string literal inside an
/// HTML attribute.
pub fn escape_js_arg(raw: &str) -> String {
    let mut js = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => js.push_str("\\\\"),
            '\'' => js.push_str("\\'"),
            '\n' => js.push_str("\\n"),
            '\r' => js.push_str("\\r"),
            '<' => js.push_str("\\x3C"),
            _ => js.push(c),
        }
    }
    escape_html(&js)
}

pub fn folder_indent(depth: usize) -> String {
    NBSP.repeat(depth * FOLDER_INDENT_WIDTH)
}

/// Left margin of file entries listed directly inside a folder at `folder_depth`.
pub fn file_margin_px(folder_depth: usize) -> usize {
    (folder_depth + 1) * FILE_INDENT_PX
}

pub fn is_spreadsheet(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn file_class(name: &str) -> String {
    if is_spreadsheet(name) {
        format!("{FILE_CLASS} {SPREADSHEET_CLASS}")
    } else {
        FILE_CLASS.to_string()
    }
}

/// Collapsible folder header for the left panel, followed by the opening tag
/// of its contents container (expanded by default).
pub fn left_folder_open(folder_id: &str, name: &str, depth: usize) -> String {
    let id = escape_html(folder_id);
    let js_id = escape_js_arg(folder_id);
    format!(
        "<div class=\"folder-title\" id=\"left_{id}\" data-depth=\"{depth}\" onclick=\"syncFolders('{js_id}')\">{indent}<span class=\"toggle\" onclick=\"event.stopPropagation(); toggleFolder('{js_id}')\">&#9662;</span> <b>{name}</b></div>\n<div class=\"folder-contents\" id=\"contents_{id}\" style=\"display: block;\">\n",
        indent = folder_indent(depth),
        name = escape_html(name),
    )
}

/// Folder entry for the flat right panel.
pub fn right_folder(folder_id: &str, name: &str, depth: usize) -> String {
    format!(
        "<div class=\"folder\" id=\"right_{id}\" data-depth=\"{depth}\" onclick=\"syncToLeftPanel('{js_id}')\">{indent}<b>{name}</b></div>\n",
        id = escape_html(folder_id),
        js_id = escape_js_arg(folder_id),
        indent = folder_indent(depth),
        name = escape_html(name),
    )
}

/// File leaf inside the left panel. Hovering highlights the owning folder in
/// the right panel; clicking surfaces the full path.
pub fn left_file(folder_id: &str, name: &str, full_path: &str, folder_depth: usize) -> String {
    format!(
        "<div class=\"{class}\" style=\"margin-left: {margin}px;\" onmouseover=\"highlightFolder('{js_folder}')\" onclick=\"showFullPath('{js_path}')\">{dashes}{name}</div>\n",
        class = file_class(name),
        margin = file_margin_px(folder_depth),
        js_folder = escape_js_arg(folder_id),
        js_path = escape_js_arg(full_path),
        dashes = "-".repeat(folder_depth + 1),
        name = escape_html(name),
    )
}

/// Entry in the flat file listing, labelled with the file's full path.
pub fn listing_file(name: &str, full_path: &str) -> String {
    format!(
        "<div class=\"{class}\" title=\"{path}\" onclick=\"showFullPath('{js_path}')\">{path}</div>\n",
        class = file_class(name),
        path = escape_html(full_path),
        js_path = escape_js_arg(full_path),
    )
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}
