mod elements;
mod error;
mod frames;
mod grid;
mod propagator;

pub use elements::{ObjectKind, OrbitalElementSet};
pub use error::PropagationError;
pub use frames::teme_to_geodetic;
pub use grid::{Cadence, TimeGrid};
pub use propagator::ElementPropagator;

#[cfg(test)]
pub(crate) use elements::fixtures;
