use axum::{extract::State, http::StatusCode, Json};

use crate::cache::CacheStatus;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/cache/status",
    responses(
        (status = 200, description = "Snapshot cache state and counters", body = CacheStatus)
    ),
    tag = "cache"
)]
pub async fn status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.cache.status())
}

#[utoipa::path(
    post,
    path = "/api/cache/invalidate",
    responses(
        (status = 200, description = "In-memory snapshot dropped", body = CacheStatus)
    ),
    tag = "cache"
)]
pub async fn invalidate(State(state): State<AppState>) -> Json<CacheStatus> {
    state.cache.invalidate();
    Json(state.cache.status())
}

/// Called by the platform before routing traffic to a new instance.
pub async fn warmup(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.cache.refresh().await {
        Ok(snapshot) => {
            log::info!("Warmup loaded {} objects", snapshot.len());
            (StatusCode::OK, "Warmup successful")
        }
        Err(e) => {
            log::error!("Warmup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Warmup failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheState, EntrySource};
    use crate::web::state::testing;

    #[tokio::test]
    async fn test_warmup_then_status() {
        let state = testing::state();
        assert_eq!(status(State(state.clone())).await.0.state, CacheState::Empty);

        let (code, body) = warmup(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body, "Warmup successful");

        let Json(status) = status(State(state)).await;
        assert_eq!(status.state, CacheState::MemoryFresh);
        assert_eq!(status.entry_source, Some(EntrySource::Computed));
        assert_eq!(status.object_count, Some(2));
        assert_eq!(status.excluded_count, Some(1));
        assert_eq!(status.sweeps, 1);
    }

    #[tokio::test]
    async fn test_invalidate_falls_back_to_store() {
        let state = testing::state();
        state.cache.get_snapshot().await.unwrap();

        let Json(status) = invalidate(State(state.clone())).await;
        assert_eq!(status.state, CacheState::Empty);

        state.cache.get_snapshot().await.unwrap();
        let status = state.cache.status();
        assert_eq!(status.entry_source, Some(EntrySource::Persisted));
        assert_eq!(status.sweeps, 1);
    }

    #[tokio::test]
    async fn test_warmup_failure() {
        let (code, body) = warmup(State(testing::failing_state())).await;
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Warmup failed");
    }
}
