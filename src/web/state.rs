use std::sync::Arc;

use crate::cache::CacheController;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheController>,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::AppState;
    use crate::cache::clock::manual::ManualClock;
    use crate::cache::{CacheController, CacheSettings, MemorySnapshotStore};
    use crate::catalog::{CatalogError, CatalogSource};
    use crate::predict::{fixtures, OrbitalElementSet};

    struct StaticCatalog(Result<Vec<OrbitalElementSet>, ()>);

    impl CatalogSource for StaticCatalog {
        fn load(&self) -> Result<Vec<OrbitalElementSet>, CatalogError> {
            self.0.clone().map_err(|_| CatalogError::NothingLoaded)
        }
    }

    fn build(catalog: StaticCatalog) -> AppState {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap());
        let settings = CacheSettings {
            sweep_concurrency: 2,
            ..CacheSettings::default()
        };
        AppState {
            cache: Arc::new(CacheController::new(
                settings,
                Arc::new(catalog),
                Arc::new(MemorySnapshotStore::new()),
                Arc::new(clock),
            )),
        }
    }

    /// One LEO, one GEO and one object that cannot be propagated.
    pub fn state() -> AppState {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        build(StaticCatalog(Ok(vec![
            fixtures::leo(25544, day),
            fixtures::geo(40000, day),
            fixtures::broken(99999, day),
        ])))
    }

    pub fn failing_state() -> AppState {
        build(StaticCatalog(Err(())))
    }
}
