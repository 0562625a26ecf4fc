use std::path::Path;

/// Display name suggested for an upload when the user does not give one.
pub fn default_upload_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// File name sent as the multipart filename.
pub fn source_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}
