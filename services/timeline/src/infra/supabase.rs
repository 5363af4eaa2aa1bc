//! Shared plumbing for calls to the hosted Supabase-compatible project.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

/// Base URL, anon key and a pooled HTTP client for one hosted project.
///
/// Cheap to clone; every adapter talking to the project holds one.
#[derive(Clone)]
pub struct SupabaseProject {
    http: reqwest::Client,
    base_url: Url,
    anon_key: Arc<str>,
}

impl SupabaseProject {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        anon_key: &str,
    ) -> Result<Self, url::ParseError> {
        // `Url::join` drops the last segment unless the base ends with '/'.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            anon_key: Arc::from(anon_key),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the project root, e.g. `"auth/v1/user"`.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }

    /// Start a request carrying the project `apikey` and a bearer token.
    pub fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &*self.anon_key)
            .bearer_auth(bearer)
    }

    /// Start a request authorized only by the anon key.
    pub fn anon_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request(method, url, &self.anon_key)
    }
}

/// Error body returned by the auth, rest or storage API, normalized.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
}

// The three APIs disagree on field names:
//   auth:    {"code":400,"error_code":"invalid_credentials","msg":"..."}
//            {"error":"invalid_grant","error_description":"..."}
//   rest:    {"code":"42501","message":"...","details":null,"hint":null}
//   storage: {"statusCode":"404","error":"Bucket not found","message":"..."}
#[derive(Debug, Default, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl UpstreamError {
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let raw: RawErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let code = raw.error_code.clone().or_else(|| {
            // `error` is a machine code only when a description accompanies it.
            raw.error_description.as_ref().and(raw.error.clone())
        });
        let message = [raw.msg, raw.message, raw.error_description, raw.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_owned()
            });
        Self {
            status,
            code,
            message,
        }
    }

    /// Drain a non-success response into an error.
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        Self::from_body(status, &body)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}
