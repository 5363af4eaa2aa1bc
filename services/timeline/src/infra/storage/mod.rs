//! Photo blob stores.
//!
//! Exactly one backend is active per deployment. It is picked from configuration at
//! startup and never switched at runtime.

pub mod qiniu;
pub mod supabase;

use url::Url;

use lifeline_domain::id::UserId;
use lifeline_domain::photo::PhotoUpload;

use crate::domain::repository::StorageService;
use crate::error::TimelineServiceError;

pub use qiniu::QiniuStorage;
pub use supabase::SupabaseStorage;

/// Recover the object key (`{user_id}/{file}`) from a public photo URL: the last two
/// path segments.
pub fn key_from_url(photo_url: &str) -> Result<String, TimelineServiceError> {
    let url = Url::parse(photo_url)
        .map_err(|e| TimelineServiceError::Delete(format!("invalid photo URL: {e}")))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    match segments.as_slice() {
        [.., owner, file] => Ok(format!("{owner}/{file}")),
        _ => Err(TimelineServiceError::Delete(format!(
            "cannot derive storage key from {photo_url}"
        ))),
    }
}

/// Storage backend handle held in `AppState`.
#[derive(Clone)]
pub enum StorageBackendHandle {
    Supabase(SupabaseStorage),
    Qiniu(QiniuStorage),
}

impl StorageBackendHandle {
    /// Storage acting for the user behind `access_token`. Supabase Storage without a
    /// service key falls back to the user's token for its policies.
    pub fn for_session(&self, access_token: &str) -> PhotoStorage {
        match self {
            Self::Supabase(storage) => PhotoStorage::Supabase(storage.acting_as(access_token)),
            Self::Qiniu(storage) => PhotoStorage::Qiniu(storage.clone()),
        }
    }
}

/// Request-scoped photo storage.
#[derive(Clone)]
pub enum PhotoStorage {
    Supabase(SupabaseStorage),
    Qiniu(QiniuStorage),
}

impl StorageService for PhotoStorage {
    async fn upload_photo(
        &self,
        photo: &PhotoUpload,
        user_id: UserId,
    ) -> Result<String, TimelineServiceError> {
        match self {
            Self::Supabase(storage) => storage.upload_photo(photo, user_id).await,
            Self::Qiniu(storage) => storage.upload_photo(photo, user_id).await,
        }
    }

    async fn delete_photo(&self, url: &str) -> Result<(), TimelineServiceError> {
        match self {
            Self::Supabase(storage) => storage.delete_photo(url).await,
            Self::Qiniu(storage) => storage.delete_photo(url).await,
        }
    }
}
