use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::cache::CatalogSnapshot;
use crate::groundtrack::OrbitClass;
use crate::predict::ObjectKind;

/// Altitudes at or above this are left out of the altitude histogram.
pub const ALTITUDE_HISTOGRAM_MAX_KM: f64 = 40000.0;
pub const HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Kpis {
    pub total_objects: usize,
    pub payload_count: usize,
    pub debris_count: usize,
    pub debris_ratio_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OwnerCount {
    pub owner: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Where one object is at a given grid index.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ObjectPosition {
    pub catalog_id: u64,
    pub name: String,
    pub owner: String,
    pub orbit_class: OrbitClass,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PositionFrame {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub positions: Vec<ObjectPosition>,
}

pub fn kpis(snapshot: &CatalogSnapshot) -> Kpis {
    let total_objects = snapshot.len();
    let count = |kind| {
        snapshot
            .objects
            .values()
            .filter(|o| o.kind == kind)
            .count()
    };
    let payload_count = count(ObjectKind::Payload);
    let debris_count = count(ObjectKind::Debris);
    let debris_ratio_pct = if total_objects == 0 {
        0.0
    } else {
        debris_count as f64 * 100.0 / total_objects as f64
    };

    Kpis {
        total_objects,
        payload_count,
        debris_count,
        debris_ratio_pct,
    }
}

/// Owners by object count, largest first; ties by owner name.
pub fn owner_distribution(snapshot: &CatalogSnapshot, top_n: usize) -> Vec<OwnerCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for object in snapshot.objects.values() {
        *counts.entry(object.owner.as_str()).or_default() += 1;
    }

    let mut owners: Vec<OwnerCount> = counts
        .into_iter()
        .map(|(owner, count)| OwnerCount {
            owner: owner.to_string(),
            count,
        })
        .collect();
    owners.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.owner.cmp(&b.owner)));
    owners.truncate(top_n);
    owners
}

pub fn altitude_histogram(snapshot: &CatalogSnapshot) -> Vec<HistogramBin> {
    let values: Vec<f64> = snapshot
        .objects
        .values()
        .map(|o| o.trajectory.mean_altitude_km)
        .filter(|alt| *alt < ALTITUDE_HISTOGRAM_MAX_KM)
        .collect();
    histogram(&values, HISTOGRAM_BINS)
}

pub fn inclination_histogram(snapshot: &CatalogSnapshot) -> Vec<HistogramBin> {
    let values: Vec<f64> = snapshot
        .objects
        .values()
        .map(|o| o.inclination_deg)
        .collect();
    histogram(&values, HISTOGRAM_BINS)
}

/// Equal-width bins spanning the data range. The last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }
    result
}

/// Sorted, de-duplicated object names for search.
pub fn object_names(snapshot: &CatalogSnapshot) -> Vec<String> {
    snapshot
        .objects
        .values()
        .map(|o| o.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every object's sub-point at `grid[index]`, optionally only those named
/// `name`. Objects whose sample at that instant was dropped are skipped.
pub fn positions_at(
    snapshot: &CatalogSnapshot,
    index: usize,
    name: Option<&str>,
) -> Option<PositionFrame> {
    let timestamp = snapshot.grid.get(index)?;
    let positions = snapshot
        .objects
        .values()
        .filter(|o| name.is_none_or(|n| o.name == n))
        .filter_map(|o| {
            let point = o.trajectory.point_at(&snapshot.grid, index)?;
            Some(ObjectPosition {
                catalog_id: o.catalog_id,
                name: o.name.clone(),
                owner: o.owner.clone(),
                orbit_class: o.orbit_class,
                lat: point.lat,
                lon: point.lon,
            })
        })
        .collect();

    Some(PositionFrame {
        index,
        timestamp,
        positions,
    })
}
