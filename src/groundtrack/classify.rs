use serde::Deserialize;

use crate::groundtrack::OrbitClass;

fn default_leo_max_km() -> f64 {
    2000.0
}

fn default_meo_max_km() -> f64 {
    35000.0
}

fn default_geo_altitude_km() -> f64 {
    35786.0
}

fn default_geo_tolerance_km() -> f64 {
    500.0
}

/// Altitude thresholds for orbit regimes.
///
/// `alt < leo_max_km` is LEO; `|alt - geo_altitude_km| <= geo_tolerance_km`
/// is GEO; otherwise `alt < meo_max_km` is MEO; anything else is OTHER.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OrbitClassifier {
    #[serde(default = "default_leo_max_km")]
    pub leo_max_km: f64,
    #[serde(default = "default_meo_max_km")]
    pub meo_max_km: f64,
    #[serde(default = "default_geo_altitude_km")]
    pub geo_altitude_km: f64,
    #[serde(default = "default_geo_tolerance_km")]
    pub geo_tolerance_km: f64,
}

impl Default for OrbitClassifier {
    fn default() -> Self {
        Self {
            leo_max_km: default_leo_max_km(),
            meo_max_km: default_meo_max_km(),
            geo_altitude_km: default_geo_altitude_km(),
            geo_tolerance_km: default_geo_tolerance_km(),
        }
    }
}

impl OrbitClassifier {
    pub fn classify(&self, mean_altitude_km: f64) -> OrbitClass {
        if !mean_altitude_km.is_finite() {
            return OrbitClass::Other;
        }
        if mean_altitude_km < self.leo_max_km {
            OrbitClass::Leo
        } else if (mean_altitude_km - self.geo_altitude_km).abs() <= self.geo_tolerance_km {
            OrbitClass::Geo
        } else if mean_altitude_km < self.meo_max_km {
            OrbitClass::Meo
        } else {
            OrbitClass::Other
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let values = [
            self.leo_max_km,
            self.meo_max_km,
            self.geo_altitude_km,
            self.geo_tolerance_km,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("orbit class thresholds must be finite".into());
        }
        if self.geo_tolerance_km < 0.0 {
            return Err("geo_tolerance_km must not be negative".into());
        }
        if self.leo_max_km > self.meo_max_km {
            return Err("leo_max_km must not exceed meo_max_km".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(-50.0, OrbitClass::Leo)]
    #[case(420.0, OrbitClass::Leo)]
    #[case(1999.99, OrbitClass::Leo)]
    #[case(2000.0, OrbitClass::Meo)]
    #[case(20200.0, OrbitClass::Meo)]
    #[case(34999.99, OrbitClass::Meo)]
    #[case(35000.0, OrbitClass::Other)]
    #[case(35285.99, OrbitClass::Other)]
    #[case(35286.0, OrbitClass::Geo)]
    #[case(35786.0, OrbitClass::Geo)]
    #[case(36286.0, OrbitClass::Geo)]
    #[case(36286.01, OrbitClass::Other)]
    #[case(100000.0, OrbitClass::Other)]
    #[case(f64::NAN, OrbitClass::Other)]
    #[case(f64::INFINITY, OrbitClass::Other)]
    fn test_default_thresholds(#[case] altitude: f64, #[case] expected: OrbitClass) {
        assert_eq!(OrbitClassifier::default().classify(altitude), expected);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = OrbitClassifier::default();
        for altitude in [0.0, 1999.99, 2000.0, 35286.0, 36286.01] {
            assert_eq!(classifier.classify(altitude), classifier.classify(altitude));
        }
    }

    #[test]
    fn test_wide_geo_band_takes_precedence_over_meo() {
        let classifier = OrbitClassifier {
            geo_tolerance_km: 1000.0,
            ..Default::default()
        };
        assert_eq!(classifier.classify(34800.0), OrbitClass::Geo);
        assert_eq!(classifier.classify(34700.0), OrbitClass::Meo);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let classifier: OrbitClassifier = serde_yaml::from_str("leo_max_km: 1500").unwrap();
        assert_eq!(classifier.leo_max_km, 1500.0);
        assert_eq!(classifier.meo_max_km, 35000.0);
        assert_eq!(classifier.classify(1600.0), OrbitClass::Meo);
        assert!(classifier.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let negative = OrbitClassifier {
            geo_tolerance_km: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let inverted = OrbitClassifier {
            leo_max_km: 40000.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
