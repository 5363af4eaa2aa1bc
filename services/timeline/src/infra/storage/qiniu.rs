//! Qiniu Kodo object storage.
//!
//! Uploads use the form API with an upload token; deletes go through the
//! resource-management API signed with a `QBox` access token. Both tokens are an
//! HMAC-SHA1 over the request, keyed by the secret key and URL-safe base64 encoded.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE};
use hmac::{Hmac, Mac};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use lifeline_domain::id::UserId;
use lifeline_domain::photo::{MAX_PHOTO_BYTES, PhotoUpload};

use crate::config::QiniuSettings;
use crate::domain::repository::StorageService;
use crate::error::TimelineServiceError;
use crate::infra::storage::key_from_url;

/// Lifetime of an upload token in seconds.
const UPLOAD_TOKEN_TTL: u64 = 3600;

/// Status Qiniu returns when deleting a key that does not exist.
const NO_SUCH_ENTRY: u16 = 612;

#[derive(Clone)]
pub struct QiniuStorage {
    http: reqwest::Client,
    settings: Arc<QiniuSettings>,
}

#[derive(Serialize)]
struct PutPolicy {
    scope: String,
    deadline: u64,
    #[serde(rename = "fsizeLimit")]
    fsize_limit: usize,
}

#[derive(Deserialize)]
struct QiniuError {
    #[serde(default)]
    error: Option<String>,
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<QiniuError>()
        .await
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| format!("qiniu responded {status}"))
}

impl QiniuStorage {
    pub fn new(settings: QiniuSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(http: reqwest::Client, settings: QiniuSettings) -> Self {
        Self {
            http,
            settings: Arc::new(settings),
        }
    }

    fn sign(&self, data: &[u8]) -> Result<String, TimelineServiceError> {
        let mut mac = Hmac::<Sha1>::new_from_slice(self.settings.secret_key.as_bytes())
            .map_err(|e| TimelineServiceError::Internal(anyhow::anyhow!("hmac key: {e}")))?;
        mac.update(data);
        Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
    }

    /// `{access_key}:{sign(encoded_policy)}:{encoded_policy}`, scoped to one key.
    pub fn upload_token(&self, key: &str, deadline: u64) -> Result<String, TimelineServiceError> {
        let policy = PutPolicy {
            scope: format!("{}:{key}", self.settings.bucket),
            deadline,
            fsize_limit: MAX_PHOTO_BYTES,
        };
        let policy_json = serde_json::to_vec(&policy)
            .map_err(|e| TimelineServiceError::Internal(e.into()))?;
        let encoded_policy = URL_SAFE.encode(policy_json);
        let signature = self.sign(encoded_policy.as_bytes())?;
        Ok(format!(
            "{}:{signature}:{encoded_policy}",
            self.settings.access_key
        ))
    }

    /// `QBox {access_key}:{sign(path + "\n")}` for a body-less management request.
    pub fn management_token(&self, path: &str) -> Result<String, TimelineServiceError> {
        let signature = self.sign(format!("{path}\n").as_bytes())?;
        Ok(format!("QBox {}:{signature}", self.settings.access_key))
    }

    /// `{domain}/{key}`
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.settings.domain.trim_end_matches('/'))
    }

    fn host(raw: &str) -> &str {
        raw.trim_end_matches('/')
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl StorageService for QiniuStorage {
    async fn upload_photo(
        &self,
        photo: &PhotoUpload,
        user_id: UserId,
    ) -> Result<String, TimelineServiceError> {
        let key = photo.object_key(user_id);
        let token = self.upload_token(&key, unix_now() + UPLOAD_TOKEN_TTL)?;

        let file = Part::bytes(photo.bytes().to_vec())
            .file_name(photo.file_name().to_owned())
            .mime_str(photo.content_type())
            .map_err(|e| TimelineServiceError::Upload(e.to_string()))?;
        let form = Form::new()
            .text("token", token)
            .text("key", key.clone())
            .part("file", file);

        let response = self
            .http
            .post(Self::host(&self.settings.upload_host))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TimelineServiceError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TimelineServiceError::Upload(error_message(response).await));
        }

        tracing::debug!(%key, size = photo.len(), "photo stored");
        Ok(self.public_url(&key))
    }

    async fn delete_photo(&self, url: &str) -> Result<(), TimelineServiceError> {
        let key = key_from_url(url)?;
        let entry = URL_SAFE.encode(format!("{}:{key}", self.settings.bucket));
        let path = format!("/delete/{entry}");
        let authorization = self.management_token(&path)?;

        let response = self
            .http
            .post(format!("{}{path}", Self::host(&self.settings.rs_host)))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .send()
            .await
            .map_err(|e| TimelineServiceError::Delete(e.to_string()))?;

        match response.status().as_u16() {
            200..=299 => {
                tracing::debug!(%key, "photo removed");
                Ok(())
            }
            NO_SUCH_ENTRY => {
                tracing::debug!(%key, "photo already absent");
                Ok(())
            }
            _ => Err(TimelineServiceError::Delete(error_message(response).await)),
        }
    }
}
