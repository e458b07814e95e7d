mod builder;
mod classify;
mod sweep;
mod types;

pub use builder::{build_trajectory, ObjectUnavailable};
pub use classify::OrbitClassifier;
pub use sweep::{sweep_catalog, ExcludedObject};
pub use types::{CatalogObject, GeodeticPoint, OrbitClass, Trajectory};
