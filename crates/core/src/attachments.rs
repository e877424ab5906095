//! Daily-log attachment rules: accepted MIME types, size cap, and naming.

use std::path::{Component, Path};

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum attachment size (8 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 8 * 1024 * 1024;

pub const ATTACHMENT_TOO_LARGE_MESSAGE: &str = "File size must not exceed 8MB";

/// Sub-directory of the uploads root holding daily-log attachments.
pub const LOG_ATTACHMENT_DIR: &str = "logs";

/// Accepted upload content types.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "application/pdf",
    // doc, docx
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    // xls, xlsx
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    // ppt, pptx
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    // zip, rar
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check whether a content type is on the whitelist.
///
/// Parameters such as `; charset=binary` are ignored.
pub fn is_allowed_mime_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MIME_TYPES.contains(&essence.as_str())
}

/// Validate an uploaded attachment's content type and size.
pub fn validate_attachment(content_type: &str, size: usize) -> Result<(), CoreError> {
    if !is_allowed_mime_type(content_type) {
        return Err(CoreError::Validation(
            "File type not allowed (jpeg, jpg, png, gif, pdf, doc, docx, xls, xlsx, ppt, pptx, zip, rar)"
                .into(),
        ));
    }
    if size > MAX_ATTACHMENT_BYTES {
        return Err(CoreError::Validation(ATTACHMENT_TOO_LARGE_MESSAGE.into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Build a collision-resistant file name for a log attachment.
///
/// Format: `logs_<YYYY-MM-DD>_<project_id>_<uuid v4><.ext>` where `.ext` is
/// the original file's extension (omitted when it has none or it is not
/// plain alphanumeric).
pub fn attachment_file_name(log_date: Date, project_id: DbId, original_name: &str) -> String {
    format!(
        "logs_{}_{}_{}{}",
        log_date.format("%Y-%m-%d"),
        project_id,
        Uuid::new_v4(),
        extension_of(original_name)
    )
}

/// Relative path (under the uploads root) for a log attachment file name.
pub fn attachment_relative_path(file_name: &str) -> String {
    format!("{LOG_ATTACHMENT_DIR}/{file_name}")
}

/// Whether a stored relative path stays inside the uploads root.
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn extension_of(original_name: &str) -> String {
    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{ext}")
        }
        _ => String::new(),
    }
}
