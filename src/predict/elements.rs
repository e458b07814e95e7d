use serde::{Deserialize, Serialize};
use sgp4::Elements;
use utoipa::ToSchema;

/// Catalog object type, as published in the SATCAT `OBJECT_TYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Payload,
    Debris,
    #[serde(rename = "ROCKET BODY")]
    RocketBody,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One tracked object's element set in OMM form, plus the catalog metadata
/// the ground track view needs.
#[derive(Debug, Clone, Deserialize)]
pub struct OrbitalElementSet {
    #[serde(flatten)]
    pub elements: Elements,
    #[serde(rename = "OWNER", default)]
    pub owner: Option<String>,
    #[serde(rename = "OBJECT_TYPE", default)]
    pub kind: Option<ObjectKind>,
    /// Feed group the record was ingested from (e.g. "Active").
    #[serde(skip)]
    pub group: Option<String>,
}

impl OrbitalElementSet {
    /// Parse a JSON array of OMM records.
    #[cfg(test)]
    pub fn from_json(content: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn catalog_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn name(&self) -> String {
        self.elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.elements.norad_id))
    }

    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or("UNKNOWN")
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind.unwrap_or_default()
    }

    pub fn inclination_deg(&self) -> f64 {
        self.elements.inclination
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use super::OrbitalElementSet;

    pub fn omm(
        name: &str,
        norad_id: u64,
        epoch: NaiveDate,
        mean_motion: f64,
        eccentricity: f64,
        inclination: f64,
    ) -> OrbitalElementSet {
        let json = format!(
            r#"[{{
                "OBJECT_NAME": "{name}",
                "OBJECT_ID": "2000-001A",
                "EPOCH": "{epoch}T00:00:00.000000",
                "MEAN_MOTION": {mean_motion},
                "ECCENTRICITY": {eccentricity},
                "INCLINATION": {inclination},
                "RA_OF_ASC_NODE": 120.0,
                "ARG_OF_PERICENTER": 90.0,
                "MEAN_ANOMALY": 45.0,
                "EPHEMERIS_TYPE": 0,
                "CLASSIFICATION_TYPE": "U",
                "NORAD_CAT_ID": {norad_id},
                "ELEMENT_SET_NO": 999,
                "REV_AT_EPOCH": 1000,
                "BSTAR": 0.0001,
                "MEAN_MOTION_DOT": 0.00001,
                "MEAN_MOTION_DDOT": 0,
                "OWNER": "US",
                "OBJECT_TYPE": "PAYLOAD"
            }}]"#,
            epoch = epoch.format("%Y-%m-%d"),
        );
        OrbitalElementSet::from_json(&json)
            .expect("fixture parses")
            .remove(0)
    }

    /// Roughly ISS-like low orbit.
    pub fn leo(norad_id: u64, epoch: NaiveDate) -> OrbitalElementSet {
        omm("LEO SAT", norad_id, epoch, 15.5, 0.0005, 51.6)
    }

    pub fn geo(norad_id: u64, epoch: NaiveDate) -> OrbitalElementSet {
        omm("GEO SAT", norad_id, epoch, 1.00273791, 0.0001, 0.05)
    }

    /// Hyperbolic eccentricity; SGP4 rejects it at every instant.
    pub fn broken(norad_id: u64, epoch: NaiveDate) -> OrbitalElementSet {
        omm("BROKEN", norad_id, epoch, 15.5, 1.5, 51.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_omm_with_catalog_fields() {
        let json = r#"[{
            "OBJECT_NAME": "ISS (ZARYA)",
            "OBJECT_ID": "1998-067A",
            "EPOCH": "2020-06-24T12:48:11.521056",
            "MEAN_MOTION": 15.49438681,
            "ECCENTRICITY": 0.0002419,
            "INCLINATION": 51.6444,
            "RA_OF_ASC_NODE": 254.7207,
            "ARG_OF_PERICENTER": 86.5664,
            "MEAN_ANOMALY": 61.6893,
            "EPHEMERIS_TYPE": 0,
            "CLASSIFICATION_TYPE": "U",
            "NORAD_CAT_ID": 25544,
            "ELEMENT_SET_NO": 999,
            "REV_AT_EPOCH": 23301,
            "BSTAR": -2.3756e-5,
            "MEAN_MOTION_DOT": -1.068e-5,
            "MEAN_MOTION_DDOT": 0,
            "OWNER": "ISS",
            "OBJECT_TYPE": "PAYLOAD"
        }]"#;

        let sets = OrbitalElementSet::from_json(json).unwrap();
        assert_eq!(sets.len(), 1);
        let iss = &sets[0];
        assert_eq!(iss.catalog_id(), 25544);
        assert_eq!(iss.name(), "ISS (ZARYA)");
        assert_eq!(iss.owner(), "ISS");
        assert_eq!(iss.kind(), ObjectKind::Payload);
        assert!((iss.inclination_deg() - 51.6444).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_object_type_and_missing_owner() {
        let json = r#"[{
            "OBJECT_NAME": "FENGYUN 1C DEB",
            "OBJECT_ID": "1999-025A",
            "EPOCH": "2024-01-01T00:00:00.000000",
            "MEAN_MOTION": 14.2,
            "ECCENTRICITY": 0.01,
            "INCLINATION": 98.6,
            "RA_OF_ASC_NODE": 10.0,
            "ARG_OF_PERICENTER": 20.0,
            "MEAN_ANOMALY": 30.0,
            "EPHEMERIS_TYPE": 0,
            "CLASSIFICATION_TYPE": "U",
            "NORAD_CAT_ID": 29000,
            "ELEMENT_SET_NO": 999,
            "REV_AT_EPOCH": 1,
            "BSTAR": 0.0001,
            "MEAN_MOTION_DOT": 0.0,
            "MEAN_MOTION_DDOT": 0,
            "OBJECT_TYPE": "TBA"
        }]"#;

        let set = OrbitalElementSet::from_json(json).unwrap().remove(0);
        assert_eq!(set.kind(), ObjectKind::Unknown);
        assert_eq!(set.owner(), "UNKNOWN");
    }
}
