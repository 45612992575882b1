//! File-type checks against the configured allow-list.
//!
//! The size ceiling is not checked here: it is enforced while the multipart
//! body is read, see `handlers::upload_handlers`.

use super::key_generator::extension_with_dot;

/// Lowercased extension without its leading dot; `""` when there is none.
pub fn normalized_extension(filename: &str) -> String {
    extension_with_dot(filename)
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

/// True when the file's extension is in `allow_list` (lowercase, no dots).
/// Extensionless files never pass unless the list holds `""`.
pub fn is_allowed_extension<S: AsRef<str>>(filename: &str, allow_list: &[S]) -> bool {
    let ext = normalized_extension(filename);
    allow_list.iter().any(|allowed| allowed.as_ref() == ext)
}
