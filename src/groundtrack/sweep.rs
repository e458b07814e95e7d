use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::groundtrack::{build_trajectory, CatalogObject, ObjectUnavailable, OrbitClassifier};
use crate::predict::{OrbitalElementSet, TimeGrid};

/// Object that was left out of a sweep, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExcludedObject {
    pub catalog_id: u64,
    pub name: String,
    pub reason: String,
}

impl From<ObjectUnavailable> for ExcludedObject {
    fn from(err: ObjectUnavailable) -> Self {
        ExcludedObject {
            catalog_id: err.catalog_id,
            name: err.name,
            reason: err.reason.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub objects: BTreeMap<u64, CatalogObject>,
    pub excluded: Vec<ExcludedObject>,
}

/// Build every object's trajectory on a pool of at most `concurrency` threads.
///
/// Objects are independent; one failing never stops the others. A catalog id
/// appearing twice keeps the later record.
pub fn sweep_catalog(
    sets: &[OrbitalElementSet],
    grid: &TimeGrid,
    classifier: &OrbitClassifier,
    concurrency: usize,
) -> Result<SweepOutcome, rayon::ThreadPoolBuildError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .thread_name(|i| format!("sweep-{i}"))
        .build()?;

    let results: Vec<_> = pool.install(|| {
        sets.par_iter()
            .map(|set| build_trajectory(set, grid).map(|t| (set, t)))
            .collect()
    });

    let mut outcome = SweepOutcome::default();
    for result in results {
        match result {
            Ok((set, trajectory)) => {
                let object = CatalogObject {
                    catalog_id: set.catalog_id(),
                    name: set.name(),
                    owner: set.owner().to_string(),
                    kind: set.kind(),
                    group: set.group.clone(),
                    inclination_deg: set.inclination_deg(),
                    orbit_class: classifier.classify(trajectory.mean_altitude_km),
                    trajectory,
                };
                outcome.objects.insert(object.catalog_id, object);
            }
            Err(e) => {
                log::warn!("Excluding {}", e);
                outcome.excluded.push(e.into());
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::groundtrack::OrbitClass;
    use crate::predict::{fixtures, Cadence};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_sweep_excludes_only_failed_objects() {
        let sets = vec![
            fixtures::leo(10, day()),
            fixtures::broken(11, day()),
            fixtures::geo(12, day()),
            fixtures::leo(13, day()),
        ];
        let grid = TimeGrid::for_date(day(), Cadence::default());

        let outcome = sweep_catalog(&sets, &grid, &OrbitClassifier::default(), 3).unwrap();

        assert_eq!(outcome.objects.keys().copied().collect::<Vec<_>>(), vec![10, 12, 13]);
        assert_eq!(outcome.excluded.len(), 1);
        assert_eq!(outcome.excluded[0].catalog_id, 11);
        assert_eq!(outcome.objects[&12].orbit_class, OrbitClass::Geo);
        assert_eq!(outcome.objects[&10].orbit_class, OrbitClass::Leo);
        assert_eq!(outcome.objects[&10].owner, "US");
    }

    #[test]
    fn test_sweep_result_independent_of_concurrency() {
        let sets: Vec<_> = (0..8).map(|i| fixtures::leo(100 + i, day())).collect();
        let grid = TimeGrid::for_date(day(), Cadence::default());
        let classifier = OrbitClassifier::default();

        let serial = sweep_catalog(&sets, &grid, &classifier, 1).unwrap();
        let parallel = sweep_catalog(&sets, &grid, &classifier, 4).unwrap();
        assert_eq!(serial.objects, parallel.objects);
        assert_eq!(parallel.objects.len(), 8);
    }

    #[test]
    fn test_duplicate_catalog_id_keeps_last() {
        let mut second = fixtures::geo(7, day());
        second.owner = Some("PRC".into());
        let sets = vec![fixtures::leo(7, day()), second];
        let grid = TimeGrid::for_date(day(), Cadence::default());

        let outcome = sweep_catalog(&sets, &grid, &OrbitClassifier::default(), 2).unwrap();
        assert_eq!(outcome.objects.len(), 1);
        assert_eq!(outcome.objects[&7].owner, "PRC");
    }
}
