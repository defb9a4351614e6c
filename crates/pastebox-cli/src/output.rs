//! Output formatting helpers for the CLI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use pastebox_core::lifecycle::remaining;
use pastebox_core::storage::{Comment, Paste};
use pastebox_core::PasteId;

/// Convert a paste to JSON for output.
pub fn paste_json(paste: &Paste) -> serde_json::Value {
    serde_json::json!({
        "id": paste.id,
        "meta": paste.meta,
        "expires_at": paste.meta.expires_at(),
        "payload": STANDARD.encode(&paste.payload),
    })
}

/// Convert a comment to JSON for output.
pub fn comment_json(comment: &Comment) -> serde_json::Value {
    serde_json::json!({
        "id": comment.id,
        "paste_id": comment.paste_id,
        "parent_id": comment.parent_id,
        "meta": comment.meta,
        "payload": STANDARD.encode(&comment.payload),
    })
}

/// Human-readable summary of a paste's metadata, written to stderr so the
/// payload on stdout stays clean.
pub fn print_paste_summary(paste: &Paste) {
    eprintln!("ID: {}", paste.id);
    eprintln!("Created: {}", paste.meta.created_at);
    match remaining(&paste.meta, chrono::Utc::now()) {
        Some(left) => eprintln!("Expires in: {}s", left.as_secs()),
        None => eprintln!("Expires: never"),
    }
    if let Some(formatter) = &paste.meta.formatter {
        eprintln!("Formatter: {}", formatter);
    }
    if paste.meta.burn_after_reading {
        eprintln!("Burn after reading: yes");
    }
}

/// Render paste IDs as a table.
pub fn ids_table(ids: &[PasteId]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID"]);
    for id in ids {
        table.add_row(vec![id.as_str()]);
    }
    table.to_string()
}

/// Render comments as a table.
pub fn comments_table(comments: &[Comment]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Parent", "Created", "Bytes"]);
    for comment in comments {
        table.add_row(vec![
            comment.id.to_string(),
            comment.parent_id.to_string(),
            comment.meta.created_at.to_rfc3339(),
            comment.payload.len().to_string(),
        ]);
    }
    table.to_string()
}
