//! Content-derived entity tags for SCIM resources.
//!
//! Tags are computed deterministically from the serialized resource using
//! SHA-256, so two reads of an unchanged resource always yield the same tag.
//! Only the first 8 bytes of the digest are kept to keep headers short.
//!
//! ```rust
//! use scim_reconciler::resource::{ETag, User};
//!
//! let tag = ETag::for_resource(&User::new("alice")).unwrap();
//! assert!(tag.to_string().starts_with("W/\""));
//! ```

use crate::error::ScimResult;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// A weak entity tag. `Display` renders the HTTP form `W/"<opaque>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag {
    opaque: String,
}

impl ETag {
    /// Compute a tag from raw content.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();

        Self {
            opaque: BASE64.encode(&hash[..8]),
        }
    }

    /// Compute a tag from a resource's JSON serialization.
    pub fn for_resource<T: Serialize>(resource: &T) -> ScimResult<Self> {
        let content = serde_json::to_vec(resource)?;
        Ok(Self::from_content(&content))
    }

    /// The opaque tag value without the weak prefix and quotes.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W/\"{}\"", self.opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::User;

    #[test]
    fn test_tag_is_deterministic() {
        let first = ETag::from_content(br#"{"id":"123"}"#);
        let second = ETag::from_content(br#"{"id":"123"}"#);
        let other = ETag::from_content(br#"{"id":"456"}"#);

        assert_eq!(first, second);
        assert_ne!(first, other);
        // 8 bytes of digest encode to 12 base64 characters
        assert_eq!(first.as_str().len(), 12);
    }

    #[test]
    fn test_weak_format() {
        let tag = ETag::for_resource(&User::new("alice")).unwrap();
        let rendered = tag.to_string();
        assert_eq!(rendered, format!("W/\"{}\"", tag.as_str()));
    }

    #[test]
    fn test_tag_follows_content() {
        let before = ETag::for_resource(&User::new("alice")).unwrap();
        let after = ETag::for_resource(&User::new("alice").with_title("Engineer")).unwrap();
        assert_ne!(before, after);
    }
}
