use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::cache::{
    CacheController, FileSnapshotStore, MemorySnapshotStore, SnapshotStore, SystemClock,
};
use crate::catalog::FileCatalogSource;

use super::api::cache as cache_handlers;
use super::api::snapshot as snapshot_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

/// Controller wired to the configured catalog files and snapshot store.
pub fn build_controller(config: &Config) -> CacheController {
    let catalog = FileCatalogSource::new(config.catalog.groups.clone());
    let store: Arc<dyn SnapshotStore> = match &config.cache.snapshot_dir {
        Some(dir) => Arc::new(FileSnapshotStore::new(
            dir.clone(),
            config.cache.snapshot_key.clone(),
        )),
        None => {
            log::warn!("No cache.snapshot_dir configured; snapshots are kept in memory only");
            Arc::new(MemorySnapshotStore::new())
        }
    };

    CacheController::new(
        config.cache_settings(),
        Arc::new(catalog),
        store,
        Arc::new(SystemClock),
    )
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/snapshot", get(snapshot_handlers::get_snapshot))
        .route("/api/positions", get(snapshot_handlers::positions))
        .route("/api/objects", get(snapshot_handlers::object_names))
        .route("/api/analytics", get(snapshot_handlers::analytics))
        .route("/api/cache/status", get(cache_handlers::status))
        .route("/api/cache/invalidate", post(cache_handlers::invalidate))
        .route("/_ah/warmup", get(cache_handlers::warmup))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState {
        cache: Arc::new(build_controller(&config)),
    };

    // Warm up in the background so the listener is up immediately
    let cache = state.cache.clone();
    tokio::spawn(async move {
        match cache.get_snapshot().await {
            Ok(snapshot) => log::info!("Startup warm-up loaded {} objects", snapshot.len()),
            Err(e) => log::error!("Startup warm-up failed: {}", e),
        }
    });

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
