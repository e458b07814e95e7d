use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::{OrbitalElementSet, PropagationError};

/// TEME state vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// SGP4/SDP4 propagator for one element set.
///
/// The epoch-invariant constants are derived once in [`ElementPropagator::new`];
/// each call to [`ElementPropagator::propagate`] only evaluates the model at the
/// requested instant.
pub struct ElementPropagator<'a> {
    elements: &'a Elements,
    constants: Constants,
}

impl<'a> ElementPropagator<'a> {
    pub fn new(set: &'a OrbitalElementSet) -> Result<Self, PropagationError> {
        let constants = Constants::from_elements(&set.elements)?;
        Ok(Self {
            elements: &set.elements,
            constants,
        })
    }

    pub fn propagate(&self, instant: DateTime<Utc>) -> Result<InertialState, PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| PropagationError::Time(e.to_string()))?;

        let prediction = self.constants.propagate(minutes)?;

        let state = InertialState {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        };
        if !state.position_km.iter().all(|v| v.is_finite()) {
            return Err(PropagationError::NonFinite("position"));
        }
        Ok(state)
    }
}
