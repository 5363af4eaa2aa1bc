//! Photo attachments submitted with an event.

use bytes::Bytes;

use crate::id::UserId;
use crate::validation::ValidationError;

/// Largest photo accepted, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Extension used when the original file name has none.
const FALLBACK_EXTENSION: &str = "bin";

/// Accepted MIME types are `image/<subtype>`.
const IMAGE_TYPE_PREFIX: &str = "image/";

/// A photo file received from the client, already size- and type-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

fn is_image_type(content_type: &str) -> bool {
    content_type
        .get(..IMAGE_TYPE_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_TYPE_PREFIX))
        && content_type.len() > IMAGE_TYPE_PREFIX.len()
}

impl PhotoUpload {
    /// Wrap an uploaded file. Rejects files larger than [`MAX_PHOTO_BYTES`] and
    /// anything not declared as an `image/*` type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
    ) -> Result<Self, ValidationError> {
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(ValidationError::PhotoTooLarge { size: bytes.len() });
        }
        let content_type = match content_type {
            Some(ct) if is_image_type(ct.trim()) => ct.trim().to_owned(),
            other => {
                return Err(ValidationError::UnsupportedPhotoType {
                    content_type: other.unwrap_or_default(),
                });
            }
        };
        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `image/*` MIME type declared by the client.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Lowercased extension of the original file name, without the dot.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or(FALLBACK_EXTENSION)
            .to_ascii_lowercase()
    }

    /// Object key namespaced under the owner: `{user_id}/{unique}.{ext}`.
    ///
    /// The unique part is a UUIDv7, so two uploads by the same user in the same
    /// millisecond still get different keys.
    pub fn object_key(&self, user_id: UserId) -> String {
        format!("{}/{}.{}", user_id, uuid::Uuid::now_v7(), self.extension())
    }
}
