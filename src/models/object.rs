//! Represents an object (file) written to the bucket.

use serde::Serialize;
use std::fmt;

/// Cache directive attached to every stored object (one year).
pub const CACHE_CONTROL: &str = "max-age=31536000";

/// Path-like identifier of an object inside the bucket.
///
/// Shape: `<prefix>/screenshots/<yyyy>/<mm>/<uuid><.ext>`. Built only by the
/// key generator, so no part of it comes from raw client input except the
/// extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, i.e. `<uuid><.ext>`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Everything the bucket needs to know about an object besides its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Destination bucket.
    pub bucket: String,

    /// Generated object key.
    pub key: ObjectKey,

    /// Content type declared by the client.
    pub content_type: String,

    /// Cache-Control header value.
    pub cache_control: String,

    /// Whether the bucket should encrypt the object at rest (AES-256).
    pub server_side_encryption: bool,
}

impl StoredObject {
    /// Object description with the service-wide cache and encryption settings.
    pub fn new(bucket: impl Into<String>, key: ObjectKey, content_type: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key,
            content_type: content_type.into(),
            cache_control: CACHE_CONTROL.to_string(),
            server_side_encryption: true,
        }
    }

    /// Public CDN location of this object.
    pub fn public_url(&self, delivery_domain: &str) -> String {
        format!("https://{}/{}", delivery_domain, self.key)
    }
}
