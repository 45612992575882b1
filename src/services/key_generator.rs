//! Object key construction.
//!
//! Keys are built from the upload time, a fresh v4 UUID and the extension of
//! the client's filename. The rest of the filename never reaches the key, so a
//! crafted name cannot inject path segments.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::models::object::ObjectKey;

/// Fixed segment between the configured prefix and the date folders.
const SCREENSHOTS_SEGMENT: &str = "screenshots";

#[derive(Debug, Clone)]
pub struct KeyGenerator {
    prefix: String,
}

impl KeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Generate a key for a file uploaded now (UTC).
    pub fn generate(&self, original_filename: &str) -> ObjectKey {
        self.generate_at(original_filename, Utc::now())
    }

    /// Generate a key for a file uploaded at `now`.
    pub fn generate_at(&self, original_filename: &str, now: DateTime<Utc>) -> ObjectKey {
        let ext = extension_with_dot(original_filename);
        ObjectKey::new(format!(
            "{}/{}/{:04}/{:02}/{}{}",
            self.prefix,
            SCREENSHOTS_SEGMENT,
            now.year(),
            now.month(),
            Uuid::new_v4(),
            ext
        ))
    }
}

/// Extension of the last path component, dot included (`"shot.PNG"` -> `".PNG"`).
///
/// Returns `""` when there is no extension, including dotfiles such as
/// `".bashrc"`.
pub fn extension_with_dot(filename: &str) -> &str {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    match base.rfind('.') {
        Some(idx) if !base[..idx].chars().all(|c| c == '.') => &base[idx..],
        _ => "",
    }
}
