//! Filename extension handling.
//!
//! Storage names are `token + extension`, so everything that must survive
//! from the caller-supplied name is the extension. Multi-part suffixes
//! (`.tar.gz`) and multi-volume suffixes (`.tar.002`) are kept whole so the
//! stored name stays meaningful when downloaded.

/// Image extensions eligible for thumbnail derivation.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".bmp", ".gif", ".png"];

/// Video extensions eligible for thumbnail derivation.
pub const VIDEO_EXTENSIONS: &[&str] = &[".webm", ".mp4", ".wmv", ".avi", ".mov"];

/// Extension appended to derived thumbnails.
pub const THUMBNAIL_EXTENSION: &str = ".png";

/// Derive the storage extension from a caller-supplied filename.
///
/// Always lowercase. A trailing three-digit multi-volume suffix (`.001`,
/// `.002`, ...) is peeled off first and re-appended at the end, then the
/// `preserved` multi-part extensions are matched greedily before falling
/// back to the last dot-segment. Names without a meaningful extension yield
/// an empty string.
pub fn storage_extension(filename: &str, preserved: &[String]) -> String {
    // A meaningful extension needs a dot with at least one character after it.
    let has_extension = filename
        .char_indices()
        .any(|(i, c)| c == '.' && i + 1 < filename.len());
    if !has_extension {
        return String::new();
    }

    let mut lower = filename.to_lowercase();
    let mut multi = String::new();

    // Multi-volume archives: archive.tar.001, archive.tar.002, ...
    if let Some(idx) = lower.rfind('.') {
        let tail = &lower[idx + 1..];
        if tail.len() == 3 && tail.chars().all(|c| c.is_ascii_digit()) {
            multi = lower[idx..].to_string();
            lower.truncate(idx);
        }
    }

    let mut extension = String::new();
    for candidate in preserved {
        if lower.ends_with(candidate.as_str()) {
            extension = candidate.clone();
            break;
        }
    }

    if extension.is_empty() {
        if let Some(idx) = lower.rfind('.') {
            extension = lower[idx..].to_string();
        }
    }

    format!("{}{}", extension, multi)
}

/// Last dot-segment of a name, lowercase, with the dot (empty if none).
///
/// Used on storage names, whose token carries no dots, to test media
/// eligibility; unlike [`storage_extension`] it never peels multi-part
/// suffixes.
pub fn last_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Whether a storage extension is eligible for thumbnail derivation.
pub fn thumbnail_eligible(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension) || VIDEO_EXTENSIONS.contains(&extension)
}

/// Whether a storage extension denotes a video (frame extraction instead of
/// image resizing).
pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension)
}

/// Derive the thumbnail filename from a storage name.
///
/// The mapping is deterministic (token before the first dot, plus `.png`) so
/// the deletion path can reproduce it without consulting the database.
pub fn thumbnail_name(storage_name: &str) -> String {
    let identifier = storage_name
        .split('.')
        .next()
        .unwrap_or(storage_name);
    format!("{}{}", identifier, THUMBNAIL_EXTENSION)
}
