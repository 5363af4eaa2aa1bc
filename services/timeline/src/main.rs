use sea_orm::Database;
use tracing::info;

use lifeline_auth_types::session::JwtSecret;
use lifeline_core::config::Config;
use lifeline_core::tracing::init_tracing;

use lifeline_timeline::config::{EventStoreBackend, StorageBackend, TimelineConfig};
use lifeline_timeline::infra::auth::SupabaseAuthClient;
use lifeline_timeline::infra::events::EventBackend;
use lifeline_timeline::infra::storage::{QiniuStorage, StorageBackendHandle, SupabaseStorage};
use lifeline_timeline::infra::supabase::SupabaseProject;
use lifeline_timeline::router::build_router;
use lifeline_timeline::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = TimelineConfig::try_from_env().expect("invalid timeline configuration");

    let project = SupabaseProject::new(&config.supabase_url, &config.supabase_anon_key)
        .expect("invalid SUPABASE_URL");

    let events = match config.event_store {
        EventStoreBackend::Postgrest => EventBackend::Postgrest(project.clone()),
        EventStoreBackend::Postgres => {
            let database_url = config.database_url().expect("missing database configuration");
            let db = Database::connect(&database_url)
                .await
                .expect("failed to connect to database");
            EventBackend::Postgres(db)
        }
    };

    let storage = match config.storage_backend {
        StorageBackend::Supabase => StorageBackendHandle::Supabase(SupabaseStorage::new(
            project.clone(),
            &config.photo_bucket,
            config.supabase_service_key.as_deref().filter(|k| !k.is_empty()),
        )),
        StorageBackend::Qiniu => {
            let settings = config.qiniu().expect("missing Qiniu configuration");
            StorageBackendHandle::Qiniu(QiniuStorage::new(settings))
        }
    };
    info!(
        storage = ?config.storage_backend,
        event_store = ?config.event_store,
        "backends selected"
    );

    let state = AppState {
        identity: SupabaseAuthClient::new(project),
        events,
        storage,
        jwt_secret: JwtSecret::new(config.supabase_jwt_secret),
        cookie_secure: config.cookie_secure,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.timeline_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("timeline service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
