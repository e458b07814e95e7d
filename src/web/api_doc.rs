use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::snapshot::AnalyticsResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::snapshot::get_snapshot,
        super::api::snapshot::positions,
        super::api::snapshot::object_names,
        super::api::snapshot::analytics,
        super::api::cache::status,
        super::api::cache::invalidate,
    ),
    components(
        schemas(
            AnalyticsResponse,
            ErrorResponse,
            crate::cache::CatalogSnapshot,
            crate::cache::CacheStatus,
            crate::cache::CacheState,
            crate::cache::EntrySource,
            crate::catalog::analytics::Kpis,
            crate::catalog::analytics::OwnerCount,
            crate::catalog::analytics::HistogramBin,
            crate::catalog::analytics::PositionFrame,
            crate::catalog::analytics::ObjectPosition,
            crate::groundtrack::CatalogObject,
            crate::groundtrack::ExcludedObject,
            crate::groundtrack::GeodeticPoint,
            crate::groundtrack::OrbitClass,
            crate::groundtrack::Trajectory,
            crate::predict::ObjectKind,
            crate::predict::TimeGrid,
        )
    ),
    info(
        title = "Groundtrack API",
        description = "Same-day ground tracks and statistics for the tracked catalog",
        version = "0.1.0"
    ),
    tags(
        (name = "snapshot", description = "Today's catalog snapshot"),
        (name = "cache", description = "Snapshot cache control")
    )
)]
pub struct ApiDoc;
