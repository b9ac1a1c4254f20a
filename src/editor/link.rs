use md5::{Digest, Md5};

/// Longest base name kept when building editor links and upload names.
pub const MAX_TITLE_CHARS: usize = 190;

/// Splits on the last `.` only: `"a.b.docx" -> ("a.b", "docx")`.
///
/// A name without a dot has no extension. An empty base becomes `"invalid"`.
pub fn split_name(filename: &str) -> (String, String) {
    let (base, extension) = match filename.rsplit_once('.') {
        Some((base, extension)) => (base, extension),
        None => (filename, ""),
    };
    let base = if base.is_empty() { "invalid" } else { base };
    (base.to_string(), extension.to_string())
}

/// First `MAX_TITLE_CHARS` characters of `title`.
pub fn truncate_title(title: &str) -> &str {
    match title.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => &title[..cut],
        None => title,
    }
}

/// Filename with its base truncated, extension preserved.
pub fn display_name(filename: &str) -> String {
    let (base, extension) = split_name(filename);
    let base = truncate_title(&base);
    if extension.is_empty() {
        base.to_string()
    } else {
        format!("{}.{}", base, extension)
    }
}

/// Document key for the editor: MD5 over the file id followed by its update time.
pub fn build_editor_key(file_id: &str, update_time: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(file_id.as_bytes());
    hasher.update(update_time.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Name used when uploading a freshly created document.
pub fn build_upload_filename(title: &str, extension: &str) -> String {
    format!("{}.{}", title, extension)
}
