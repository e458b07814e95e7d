pub mod clock;
mod controller;
mod error;
mod snapshot;
mod store;

pub use clock::{Clock, SystemClock};
pub use controller::{CacheController, CacheSettings, CacheState, CacheStatus};
pub use error::{DataUnavailable, SnapshotDecodeError, StoreError};
pub use snapshot::{CacheEntry, CatalogSnapshot, EntrySource};
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, DEFAULT_SNAPSHOT_KEY};
