use serde::Deserialize;

use lifeline_core::config::Config;

/// Which object store keeps event photos. Env var: `STORAGE_BACKEND`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Supabase,
    Qiniu,
}

/// Where event rows live. Env var: `EVENT_STORE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStoreBackend {
    /// The hosted project's REST interface, called with the user's token.
    #[default]
    Postgrest,
    /// Direct connection to the same Postgres database.
    Postgres,
}

/// Timeline service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct TimelineConfig {
    /// Base URL of the hosted project (e.g. "https://abc.supabase.co").
    pub supabase_url: String,
    /// Public anon key, sent as `apikey` on every upstream call.
    pub supabase_anon_key: String,
    /// HS256 secret the provider signs access tokens with.
    pub supabase_jwt_secret: String,
    /// Service-role key used for storage calls. Falls back to the user's token.
    #[serde(default)]
    pub supabase_service_key: Option<String>,
    /// TCP port to listen on (default 3000). Env var: `TIMELINE_PORT`.
    #[serde(default = "default_port")]
    pub timeline_port: u16,
    #[serde(default)]
    pub storage_backend: StorageBackend,
    /// Bucket holding event photos (default "event-photos").
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
    #[serde(default)]
    pub qiniu_access_key: Option<String>,
    #[serde(default)]
    pub qiniu_secret_key: Option<String>,
    #[serde(default)]
    pub qiniu_bucket: Option<String>,
    /// Public domain bound to the Qiniu bucket (e.g. "https://cdn.example.com").
    #[serde(default)]
    pub qiniu_domain: Option<String>,
    #[serde(default = "default_qiniu_upload_host")]
    pub qiniu_upload_host: String,
    #[serde(default = "default_qiniu_rs_host")]
    pub qiniu_rs_host: String,
    #[serde(default)]
    pub event_store: EventStoreBackend,
    /// PostgreSQL connection URL, required when `EVENT_STORE=postgres`.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Mark session cookies `Secure` (default true; disable for plain-HTTP development).
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

impl Config for TimelineConfig {}

fn default_port() -> u16 {
    3000
}

fn default_photo_bucket() -> String {
    "event-photos".to_owned()
}

fn default_qiniu_upload_host() -> String {
    "https://upload.qiniup.com".to_owned()
}

fn default_qiniu_rs_host() -> String {
    "https://rs.qiniuapi.com".to_owned()
}

fn default_cookie_secure() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set when {when}")]
    Missing {
        var: &'static str,
        when: &'static str,
    },
}

/// Credentials and endpoints of the Qiniu bucket.
#[derive(Debug, Clone)]
pub struct QiniuSettings {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub domain: String,
    pub upload_host: String,
    pub rs_host: String,
}

fn required(
    value: &Option<String>,
    var: &'static str,
    when: &'static str,
) -> Result<String, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
        .ok_or(ConfigError::Missing { var, when })
}

impl TimelineConfig {
    pub fn qiniu(&self) -> Result<QiniuSettings, ConfigError> {
        const WHEN: &str = "STORAGE_BACKEND=qiniu";
        Ok(QiniuSettings {
            access_key: required(&self.qiniu_access_key, "QINIU_ACCESS_KEY", WHEN)?,
            secret_key: required(&self.qiniu_secret_key, "QINIU_SECRET_KEY", WHEN)?,
            bucket: required(&self.qiniu_bucket, "QINIU_BUCKET", WHEN)?,
            domain: required(&self.qiniu_domain, "QINIU_DOMAIN", WHEN)?,
            upload_host: self.qiniu_upload_host.clone(),
            rs_host: self.qiniu_rs_host.clone(),
        })
    }

    pub fn database_url(&self) -> Result<String, ConfigError> {
        required(&self.database_url, "DATABASE_URL", "EVENT_STORE=postgres")
    }
}
