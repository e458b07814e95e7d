use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::predict::{ObjectKind, TimeGrid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeodeticPoint {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

/// Ground track of one object over the day's grid. Points whose propagation
/// failed are absent, so `points.len() <= grid.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Trajectory {
    pub points: Vec<GeodeticPoint>,
    pub mean_altitude_km: f64,
}

impl Trajectory {
    /// Point sampled at `grid[index]`, if that sample survived.
    pub fn point_at(&self, grid: &TimeGrid, index: usize) -> Option<&GeodeticPoint> {
        let timestamp = grid.get(index)?;
        match self.points.get(index) {
            Some(point) if point.timestamp == timestamp => Some(point),
            _ => self
                .points
                .binary_search_by_key(&timestamp, |p| p.timestamp)
                .ok()
                .map(|i| &self.points[i]),
        }
    }

    pub fn is_complete(&self, grid: &TimeGrid) -> bool {
        self.points.len() == grid.len()
    }
}

/// One object's entry in a catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogObject {
    pub catalog_id: u64,
    pub name: String,
    pub owner: String,
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub inclination_deg: f64,
    pub orbit_class: OrbitClass,
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrbitClass {
    Leo,
    Meo,
    Geo,
    Other,
}

impl OrbitClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitClass::Leo => "LEO",
            OrbitClass::Meo => "MEO",
            OrbitClass::Geo => "GEO",
            OrbitClass::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for OrbitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
