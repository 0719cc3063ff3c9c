//! Upload validation shared by client photos and project files.

/// Default cap on a single uploaded file (20 MiB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Extensions accepted for client photos.
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic", "gif"];

/// Extensions accepted for project files (plans, quotes, moodboards).
pub const FILE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "pdf", "doc", "docx", "xls", "xlsx", "csv", "txt",
    "dwg", "dxf", "skp", "zip",
];

/// Lower-cased extension of `file_name`, if it has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Validate the extension of `file_name` against `allowed`, returning it.
pub fn validate_extension(file_name: &str, allowed: &[&str]) -> Result<String, String> {
    match extension_of(file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(format!(
            "Unsupported file type '.{ext}'. Supported: {}",
            allowed.join(", ")
        )),
        None => Err("File name must have an extension".to_string()),
    }
}

/// Reduce a client-supplied file name to a safe display name.
///
/// Directory components are dropped and anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Best-effort MIME type from an extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Living.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
    }

    #[test]
    fn photos_reject_documents() {
        assert!(validate_extension("plan.pdf", PHOTO_EXTENSIONS).is_err());
        assert_eq!(validate_extension("room.png", PHOTO_EXTENSIONS).unwrap(), "png");
    }

    #[test]
    fn files_accept_plans() {
        assert!(validate_extension("ground-floor.dwg", FILE_EXTENSIONS).is_ok());
        assert!(validate_extension("script.exe", FILE_EXTENSIONS).is_err());
    }

    #[test]
    fn sanitize_strips_directories_and_odd_chars() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\salon final.jpg"), "salon_final.jpg");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("dwg"), "application/octet-stream");
    }
}
