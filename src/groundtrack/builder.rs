use thiserror::Error;

use crate::groundtrack::{GeodeticPoint, Trajectory};
use crate::predict::{
    teme_to_geodetic, ElementPropagator, OrbitalElementSet, PropagationError, TimeGrid,
};

/// No sample of the object could be computed; it is left out of the catalog.
#[derive(Debug, Clone, Error)]
#[error("object {catalog_id} ({name}) unavailable: {reason}")]
pub struct ObjectUnavailable {
    pub catalog_id: u64,
    pub name: String,
    pub reason: PropagationError,
}

/// Propagate one element set across the grid.
///
/// Failed instants are skipped; the mean altitude covers only the samples
/// that made it into the trajectory.
pub fn build_trajectory(
    set: &OrbitalElementSet,
    grid: &TimeGrid,
) -> Result<Trajectory, ObjectUnavailable> {
    let unavailable = |reason| ObjectUnavailable {
        catalog_id: set.catalog_id(),
        name: set.name(),
        reason,
    };

    let propagator = ElementPropagator::new(set).map_err(unavailable)?;

    let mut points = Vec::with_capacity(grid.len());
    let mut altitude_sum = 0.0;
    let mut last_error = None;

    for &instant in grid.iter() {
        let sample = propagator
            .propagate(instant)
            .and_then(|state| teme_to_geodetic(state.position_km, instant));

        match sample {
            Ok(geodetic) => {
                altitude_sum += geodetic.altitude_km;
                points.push(GeodeticPoint {
                    timestamp: instant,
                    lat: round2(geodetic.latitude_deg),
                    lon: round2(geodetic.longitude_deg),
                });
            }
            Err(e) => {
                log::debug!(
                    "Dropping sample of {} at {}: {}",
                    set.catalog_id(),
                    instant,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    if points.is_empty() {
        return Err(unavailable(last_error.unwrap_or(
            PropagationError::Propagation("empty time grid".into()),
        )));
    }

    let mean_altitude_km = altitude_sum / points.len() as f64;
    let trajectory = Trajectory {
        points,
        mean_altitude_km,
    };
    if !trajectory.is_complete(grid) {
        log::debug!(
            "Partial trajectory for {}: {} of {} samples",
            set.catalog_id(),
            trajectory.points.len(),
            grid.len()
        );
    }
    Ok(trajectory)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
