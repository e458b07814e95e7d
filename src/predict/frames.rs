use chrono::{DateTime, Utc};

use crate::predict::PropagationError;

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Position relative to the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Greenwich sidereal angle (radians) at `instant`.
pub fn sidereal_angle(instant: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

/// Inverse of the ground-station ECEF formula, solved by fixed-point iteration
/// on latitude.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> Geodetic {
    let [x, y, z] = ecef;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let next = (z + n * WGS84_E2 * sin_lat).atan2(p);
        let done = (next - lat).abs() < LATITUDE_TOLERANCE_RAD;
        lat = next;
        if done {
            break;
        }
    }

    let sin_lat = lat.sin();
    let altitude_km = p * lat.cos() + z * sin_lat
        - WGS84_A_KM * (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Geodetic {
        latitude_deg: lat.to_degrees(),
        longitude_deg: lon.to_degrees(),
        altitude_km,
    }
}

/// Sub-point of a TEME position at `instant`.
pub fn teme_to_geodetic(
    pos_teme: [f64; 3],
    instant: DateTime<Utc>,
) -> Result<Geodetic, PropagationError> {
    if !pos_teme.iter().all(|v| v.is_finite()) {
        return Err(PropagationError::NonFinite("position"));
    }
    let ecef = teme_to_ecef_position(pos_teme, sidereal_angle(instant));
    let geodetic = ecef_to_geodetic(ecef);
    if !(geodetic.latitude_deg.is_finite()
        && geodetic.longitude_deg.is_finite()
        && geodetic.altitude_km.is_finite())
    {
        return Err(PropagationError::NonFinite("geodetic coordinate"));
    }
    Ok(geodetic)
}
