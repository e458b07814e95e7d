use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cache::{
    CacheEntry, CatalogSnapshot, Clock, DataUnavailable, EntrySource, SnapshotStore,
};
use crate::catalog::CatalogSource;
use crate::groundtrack::{sweep_catalog, OrbitClassifier};
use crate::predict::{Cadence, TimeGrid};

const DEFAULT_SWEEP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub cadence: Cadence,
    pub classifier: OrbitClassifier,
    pub sweep_concurrency: usize,
    pub sweep_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cadence: Cadence::default(),
            classifier: OrbitClassifier::default(),
            sweep_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            sweep_timeout: DEFAULT_SWEEP_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Empty,
    MemoryFresh,
    MemoryStale,
    Computing,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStatus {
    pub state: CacheState,
    pub today: NaiveDate,
    pub entry_date: Option<NaiveDate>,
    pub entry_source: Option<EntrySource>,
    pub entry_loaded_at: Option<DateTime<Utc>>,
    pub sweep_id: Option<Uuid>,
    pub object_count: Option<usize>,
    pub excluded_count: Option<usize>,
    pub sweeps: u64,
    pub persisted_loads: u64,
    pub persist_read_failures: u64,
    pub persist_write_failures: u64,
    pub last_persist_error: Option<String>,
    pub last_failure: Option<String>,
}

#[derive(Debug, Default)]
struct Counters {
    sweeps: AtomicU64,
    persisted_loads: AtomicU64,
    read_failures: AtomicU64,
    write_failures: AtomicU64,
}

/// Serves today's [`CatalogSnapshot`] from memory, from the persisted store,
/// or by sweeping the whole catalog, in that order.
///
/// Callers that find no fresh entry queue on a single gate, so at most one
/// sweep runs at a time; whoever gets the gate next re-checks the entry first.
/// The sweep itself also holds `sweep_slot` until its blocking job returns, so
/// a sweep abandoned by a timeout or a dropped caller still blocks the next one.
pub struct CacheController {
    settings: CacheSettings,
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Arc<CacheEntry>>>,
    gate: Mutex<()>,
    sweep_slot: Arc<Mutex<()>>,
    computing: AtomicBool,
    failures: AtomicU64,
    last_failure: StdMutex<Option<DataUnavailable>>,
    last_persist_error: StdMutex<Option<String>>,
    counters: Counters,
}

impl CacheController {
    pub fn new(
        settings: CacheSettings,
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            catalog,
            store,
            clock,
            entry: RwLock::new(None),
            gate: Mutex::new(()),
            sweep_slot: Arc::new(Mutex::new(())),
            computing: AtomicBool::new(false),
            failures: AtomicU64::new(0),
            last_failure: StdMutex::new(None),
            last_persist_error: StdMutex::new(None),
            counters: Counters::default(),
        }
    }

    /// Current time on the controller's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> CacheState {
        if self.computing.load(Ordering::SeqCst) || self.sweep_slot.try_lock().is_err() {
            return CacheState::Computing;
        }
        match self.current() {
            None => CacheState::Empty,
            Some(entry) if entry.is_fresh(self.clock.today()) => CacheState::MemoryFresh,
            Some(_) => CacheState::MemoryStale,
        }
    }

    /// The in-memory entry, fresh or not.
    pub fn current(&self) -> Option<Arc<CacheEntry>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Today's snapshot. Fails only when neither the store nor a sweep could
    /// produce one.
    pub async fn get_snapshot(&self) -> Result<Arc<CatalogSnapshot>, DataUnavailable> {
        if let Some(snapshot) = self.fresh_snapshot(self.clock.today()) {
            return Ok(snapshot);
        }

        let seen_failures = self.failures.load(Ordering::SeqCst);
        let _gate = self.gate.lock().await;

        let today = self.clock.today();
        if let Some(snapshot) = self.fresh_snapshot(today) {
            return Ok(snapshot);
        }
        // An attempt failed while we were queued; share its outcome
        if self.failures.load(Ordering::SeqCst) != seen_failures {
            if let Some(err) = self.last_failure() {
                return Err(err);
            }
        }

        if let Some(snapshot) = self.load_persisted(today).await {
            self.counters.persisted_loads.fetch_add(1, Ordering::SeqCst);
            return Ok(self.publish(snapshot, EntrySource::Persisted));
        }

        let computed = {
            let _computing = ComputingGuard::set(&self.computing);
            self.compute(today).await
        };

        match computed {
            Ok(snapshot) => {
                let published = self.publish(snapshot, EntrySource::Computed);
                self.persist(&published).await;
                Ok(published)
            }
            Err(e) => {
                error!("Critical data load failure: {}", e);
                *self
                    .last_failure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(e.clone());
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    /// Drop the in-memory entry. The next request goes back to the store.
    pub fn invalidate(&self) {
        let previous = self
            .entry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(entry) = previous {
            info!("Invalidated in-memory snapshot from {}", entry.valid_on);
        }
    }

    /// Invalidate, then load again. Used by the warm-up hook.
    pub async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, DataUnavailable> {
        self.invalidate();
        self.get_snapshot().await
    }

    pub fn status(&self) -> CacheStatus {
        let entry = self.current();
        CacheStatus {
            state: self.state(),
            today: self.clock.today(),
            entry_date: entry.as_ref().map(|e| e.valid_on),
            entry_source: entry.as_ref().map(|e| e.source),
            entry_loaded_at: entry.as_ref().map(|e| e.loaded_at),
            sweep_id: entry.as_ref().map(|e| e.snapshot.sweep_id),
            object_count: entry.as_ref().map(|e| e.snapshot.len()),
            excluded_count: entry.as_ref().map(|e| e.snapshot.excluded.len()),
            sweeps: self.counters.sweeps.load(Ordering::SeqCst),
            persisted_loads: self.counters.persisted_loads.load(Ordering::SeqCst),
            persist_read_failures: self.counters.read_failures.load(Ordering::SeqCst),
            persist_write_failures: self.counters.write_failures.load(Ordering::SeqCst),
            last_persist_error: self
                .last_persist_error
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            last_failure: self.last_failure().map(|e| e.to_string()),
        }
    }

    fn fresh_snapshot(&self, today: NaiveDate) -> Option<Arc<CatalogSnapshot>> {
        self.current()
            .filter(|entry| entry.is_fresh(today))
            .map(|entry| entry.snapshot.clone())
    }

    fn last_failure(&self) -> Option<DataUnavailable> {
        self.last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: CatalogSnapshot, source: EntrySource) -> Arc<CatalogSnapshot> {
        let entry = CacheEntry::new(snapshot, source, self.clock.now());
        let snapshot = entry.snapshot.clone();
        info!(
            "Serving snapshot {} for {} ({} objects, {:?})",
            snapshot.sweep_id,
            entry.valid_on,
            snapshot.len(),
            source
        );
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(entry));
        *self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        snapshot
    }

    async fn load_persisted(&self, today: NaiveDate) -> Option<CatalogSnapshot> {
        let store = self.store.clone();
        let key = store.key().to_string();
        info!("Checking persisted snapshot: {}", key);

        let bytes = match tokio::task::spawn_blocking(move || store.read()).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => {
                info!("No persisted snapshot under {}", key);
                return None;
            }
            Ok(Err(e)) => {
                self.record_read_failure(&e.to_string());
                return None;
            }
            Err(e) => {
                self.record_read_failure(&e.to_string());
                return None;
            }
        };

        match CatalogSnapshot::from_bytes(&bytes) {
            Ok(snapshot) if snapshot.is_valid_for(today, self.settings.cadence) => {
                info!("Persisted snapshot is fresh. Loading into memory.");
                Some(snapshot)
            }
            Ok(snapshot) => {
                warn!(
                    "Persisted snapshot from {} is stale. Will recompute.",
                    snapshot.generated_on
                );
                None
            }
            Err(e) => {
                self.record_read_failure(&e.to_string());
                None
            }
        }
    }

    async fn compute(&self, today: NaiveDate) -> Result<CatalogSnapshot, DataUnavailable> {
        let grid = TimeGrid::for_date(today, self.settings.cadence);
        let sweep_grid = grid.clone();
        let catalog = self.catalog.clone();
        let classifier = self.settings.classifier;
        let concurrency = self.settings.sweep_concurrency;
        let timeout = self.settings.sweep_timeout;

        // Wait out any abandoned sweep that is still running
        let deadline = tokio::time::Instant::now() + timeout;
        let slot = tokio::time::timeout_at(deadline, self.sweep_slot.clone().lock_owned())
            .await
            .map_err(|_| {
                warn!("Previous sweep still running; giving up after {:?}", timeout);
                DataUnavailable::Timeout(timeout)
            })?;

        self.counters.sweeps.fetch_add(1, Ordering::SeqCst);
        info!(
            "Computing ground tracks for {} ({} samples, {} threads)",
            today,
            grid.len(),
            concurrency
        );
        let started = Instant::now();

        let job = tokio::task::spawn_blocking(move || {
            let _slot = slot;
            let sets = catalog
                .load()
                .map_err(|e| DataUnavailable::Catalog(e.to_string()))?;
            let outcome = sweep_catalog(&sets, &sweep_grid, &classifier, concurrency)
                .map_err(|e| DataUnavailable::Sweep(e.to_string()))?;
            Ok::<_, DataUnavailable>((sets.len(), outcome))
        });

        // On timeout the blocking job runs to completion in the background,
        // keeping the slot; its result is dropped and nothing is published.
        let (total, outcome) = match tokio::time::timeout_at(deadline, job).await {
            Err(_) => return Err(DataUnavailable::Timeout(timeout)),
            Ok(Err(e)) => return Err(DataUnavailable::Sweep(e.to_string())),
            Ok(Ok(result)) => result?,
        };

        if total > 0 && outcome.objects.is_empty() {
            return Err(DataUnavailable::NoObjects(total));
        }
        if total == 0 {
            warn!("Catalog is empty; publishing an empty snapshot");
        }

        info!(
            "Sweep finished in {:.1?}: {} of {} objects, {} excluded",
            started.elapsed(),
            outcome.objects.len(),
            total,
            outcome.excluded.len()
        );

        Ok(CatalogSnapshot::new(
            self.clock.now(),
            grid,
            outcome.objects,
            outcome.excluded,
        ))
    }

    /// Best effort: a failed write is reported but the snapshot is still served.
    async fn persist(&self, snapshot: &CatalogSnapshot) {
        let bytes = match snapshot.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.record_write_failure(e.to_string());
                return;
            }
        };

        let store = self.store.clone();
        let key = store.key().to_string();
        match tokio::task::spawn_blocking(move || store.write(&bytes)).await {
            Ok(Ok(())) => {
                info!("Snapshot persisted under {}", key);
                *self
                    .last_persist_error
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = None;
            }
            Ok(Err(e)) => self.record_write_failure(e.to_string()),
            Err(e) => self.record_write_failure(e.to_string()),
        }
    }

    fn record_read_failure(&self, message: &str) {
        self.counters.read_failures.fetch_add(1, Ordering::SeqCst);
        error!("Persisted snapshot read error: {}", message);
    }

    fn record_write_failure(&self, message: String) {
        self.counters.write_failures.fetch_add(1, Ordering::SeqCst);
        error!("Persisting snapshot failed: {}", message);
        *self
            .last_persist_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message);
    }
}

/// Marks the controller as computing for as long as it lives, including when
/// the owning future is dropped mid-sweep.
struct ComputingGuard<'a>(&'a AtomicBool);

impl<'a> ComputingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ComputingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
