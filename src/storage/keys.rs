//! Object key helpers

use uuid::Uuid;

use crate::error::ServiceError;

/// Normalize a relative object key.
///
/// The result uses `/` separators, drops empty and `.` segments, and rejects
/// absolute keys and parent traversals (`..`).
pub fn normalize_key(key: &str) -> Result<String, ServiceError> {
    let s = key.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ServiceError::invalid_key(key, "keys must be relative"));
    }

    let mut parts = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ServiceError::invalid_key(key, "keys must not contain '..'"));
        }
        parts.push(part);
    }

    if parts.is_empty() {
        return Err(ServiceError::invalid_key(key, "key must contain a name"));
    }

    Ok(parts.join("/"))
}

/// Key for a derived variant stored next to its source.
///
/// `a/b/photo.jpg` with prefix `optimized_` becomes
/// `a/b/optimized_<uuid>.webp`; keys without a directory get no leading slash.
pub fn derived_key(source_key: &str, prefix: &str, extension: &str) -> String {
    let name = format!("{}{}.{}", prefix, Uuid::new_v4(), extension);
    match source_key.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => format!("{}/{}", dir, name),
        _ => name,
    }
}

/// Content type guessed from the key's extension.
pub fn content_type_for_key(key: &str) -> Option<&'static str> {
    let (_, ext) = key.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

/// Whether a key names an image the pipeline can read.
pub fn is_image_key(key: &str) -> bool {
    content_type_for_key(key).is_some()
}
