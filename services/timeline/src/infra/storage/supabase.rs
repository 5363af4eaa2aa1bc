use std::sync::Arc;

use reqwest::Method;
use url::Url;

use lifeline_domain::id::UserId;
use lifeline_domain::photo::PhotoUpload;

use crate::domain::repository::StorageService;
use crate::error::TimelineServiceError;
use crate::infra::storage::key_from_url;
use crate::infra::supabase::{SupabaseProject, UpstreamError};

/// Photos in a Supabase Storage bucket with public read access.
#[derive(Clone)]
pub struct SupabaseStorage {
    project: SupabaseProject,
    bucket: Arc<str>,
    service_key: Option<Arc<str>>,
    bearer: Option<Arc<str>>,
}

impl SupabaseStorage {
    /// Storage authorized by the service key when set, else by the anon key until
    /// [`acting_as`](Self::acting_as) binds a user token.
    pub fn new(project: SupabaseProject, bucket: &str, service_key: Option<&str>) -> Self {
        let service_key: Option<Arc<str>> = service_key.map(Arc::from);
        let bearer = service_key.clone();
        Self {
            project,
            bucket: Arc::from(bucket),
            service_key,
            bearer,
        }
    }

    /// Copy authorized as the given user unless a service key is configured.
    pub fn acting_as(&self, access_token: &str) -> Self {
        let bearer = self
            .service_key
            .clone()
            .unwrap_or_else(|| Arc::from(access_token));
        Self {
            bearer: Some(bearer),
            ..self.clone()
        }
    }

    /// `{project}/storage/v1/object/public/{bucket}/{key}`
    pub fn public_url(&self, key: &str) -> Result<Url, url::ParseError> {
        self.project
            .endpoint(&format!("storage/v1/object/public/{}/{key}", self.bucket))
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(bearer) => self.project.request(method, url, bearer),
            None => self.project.anon_request(method, url),
        }
    }

    fn object_url(&self, path: &str) -> Result<Url, TimelineServiceError> {
        self.project
            .endpoint(&format!("storage/v1/object/{path}"))
            .map_err(|e| TimelineServiceError::Internal(e.into()))
    }
}

impl StorageService for SupabaseStorage {
    async fn upload_photo(
        &self,
        photo: &PhotoUpload,
        user_id: UserId,
    ) -> Result<String, TimelineServiceError> {
        let key = photo.object_key(user_id);
        let url = self.object_url(&format!("{}/{key}", self.bucket))?;
        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, photo.content_type())
            .header("x-upsert", "false")
            .header("cache-control", "max-age=3600")
            .body(photo.bytes().clone())
            .send()
            .await
            .map_err(|e| TimelineServiceError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            return Err(TimelineServiceError::Upload(err.message));
        }

        tracing::debug!(%key, size = photo.len(), "photo stored");
        let public = self
            .public_url(&key)
            .map_err(|e| TimelineServiceError::Internal(e.into()))?;
        Ok(public.to_string())
    }

    async fn delete_photo(&self, url: &str) -> Result<(), TimelineServiceError> {
        let key = key_from_url(url)?;
        let endpoint = self.object_url(&self.bucket)?;
        let response = self
            .request(Method::DELETE, endpoint)
            .json(&serde_json::json!({ "prefixes": [key] }))
            .send()
            .await
            .map_err(|e| TimelineServiceError::Delete(e.to_string()))?;

        if !response.status().is_success() {
            let err = UpstreamError::from_response(response).await;
            return Err(TimelineServiceError::Delete(err.message));
        }
        tracing::debug!(%key, "photo removed");
        Ok(())
    }
}
