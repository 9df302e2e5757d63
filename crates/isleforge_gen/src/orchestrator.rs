use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use isleforge_persist::error::PersistError;
use isleforge_shared::coords::ChunkCoord;

use crate::jobs::JobSystem;
use crate::store::ChunkStore;

/// Fans chunk generation out over the worker pool and persists the
/// world exactly once after every task has finished.
pub struct GenerationOrchestrator {
    store: Arc<ChunkStore>,
    jobs: JobSystem,
    cancel: Arc<AtomicBool>,
    timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionReport {
    pub chunks_requested: usize,
    pub chunks_generated: usize,
    pub chunks_saved: usize,
    pub cancelled: bool,
}

impl GenerationOrchestrator {
    pub fn new(store: Arc<ChunkStore>, jobs: JobSystem, cancel: Arc<AtomicBool>) -> Self {
        Self {
            store,
            jobs,
            cancel,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates every chunk in the inclusive rectangle
    /// [0,width]x[0,height]. Tasks complete in no particular order; the
    /// scope join is the barrier before the single save. Cancellation
    /// (Ctrl+C or deadline) skips remaining tasks but still flushes the
    /// partial world.
    pub fn generate_region(&self, width: u32, height: u32) -> Result<RegionReport, PersistError> {
        let requested = (width as usize + 1) * (height as usize + 1);
        let before = self.store.generated_count();
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        info!(
            "Generating {requested} chunks ({}x{}) on {} workers",
            width + 1,
            height + 1,
            self.jobs.thread_count()
        );

        self.jobs.scope(|scope| {
            for cx in 0..=width as i32 {
                for cy in 0..=height as i32 {
                    let store = &self.store;
                    let cancel = &self.cancel;
                    scope.spawn(move |_| {
                        if cancel.load(Ordering::SeqCst) {
                            return;
                        }
                        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                            if !cancel.swap(true, Ordering::SeqCst) {
                                warn!("Region generation deadline hit, skipping remaining chunks");
                            }
                            return;
                        }
                        let coord = ChunkCoord::new(cx, cy);
                        store.get(coord);
                        debug!("Generated chunk {coord}");
                    });
                }
            }
        });

        let cancelled = self.cancel.load(Ordering::SeqCst);
        if cancelled {
            warn!("Region generation interrupted, flushing partial world");
        }

        let chunks_saved = self.store.save_all()?;
        Ok(RegionReport {
            chunks_requested: requested,
            chunks_generated: self.store.generated_count() - before,
            chunks_saved,
            cancelled,
        })
    }
}
