use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use isleforge_persist::container::{self, WorldMap};
use isleforge_persist::error::PersistError;
use isleforge_shared::chunk::ChunkData;
use isleforge_shared::coords::ChunkCoord;
use isleforge_shared::worldgen::ChunkGenerator;

/// Max chunks held in the working-set cache before eviction.
pub const CACHE_LIMIT: usize = 50;

struct StoreState {
    /// Every chunk generated or loaded this run. Never evicted.
    world: WorldMap,
    /// Bounded working-set view over `world`, evicted independently.
    cache: FxHashMap<ChunkCoord, ChunkData>,
    cache_order: VecDeque<ChunkCoord>,
    /// Coordinates currently being generated by some thread.
    pending: FxHashSet<ChunkCoord>,
}

/// Owns the generated world and its bounded cache, and mediates
/// get-or-generate. One mutex guards both maps; a condvar parks callers
/// racing on a coordinate another thread is already generating, so each
/// coordinate is generated at most once per process.
pub struct ChunkStore {
    generator: ChunkGenerator,
    capacity: usize,
    container_path: PathBuf,
    state: Mutex<StoreState>,
    generation_done: Condvar,
    generated: AtomicUsize,
    saves: AtomicUsize,
}

impl ChunkStore {
    pub fn new(generator: ChunkGenerator, capacity: usize, container_path: PathBuf) -> Self {
        Self {
            generator,
            capacity,
            container_path,
            state: Mutex::new(StoreState {
                world: WorldMap::default(),
                cache: FxHashMap::default(),
                cache_order: VecDeque::new(),
                pending: FxHashSet::default(),
            }),
            generation_done: Condvar::new(),
            generated: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache hit, world hit, or generate. Generation runs outside the
    /// lock; the pending set keeps concurrent callers from duplicating
    /// it.
    pub fn get(&self, coord: ChunkCoord) -> ChunkData {
        let mut state = self.lock_state();
        loop {
            if let Some(chunk) = state.cache.get(&coord) {
                return chunk.clone();
            }
            if let Some(chunk) = state.world.get(&coord) {
                let chunk = chunk.clone();
                Self::insert_cache(&mut state, self.capacity, coord, chunk.clone());
                return chunk;
            }
            if state.pending.insert(coord) {
                break;
            }
            state = self
                .generation_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(state);

        let chunk = self.generator.generate(coord);
        self.generated.fetch_add(1, Ordering::Relaxed);

        let mut state = self.lock_state();
        state.world.insert(coord, chunk.clone());
        Self::insert_cache(&mut state, self.capacity, coord, chunk.clone());
        state.pending.remove(&coord);
        self.generation_done.notify_all();
        chunk
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.lock_state().world.contains_key(&coord)
    }

    fn insert_cache(
        state: &mut StoreState,
        capacity: usize,
        coord: ChunkCoord,
        chunk: ChunkData,
    ) {
        if state.cache.insert(coord, chunk).is_none() {
            state.cache_order.push_back(coord);
        }
        // Insertion-order eviction: the earliest-inserted entry still
        // present goes first.
        while state.cache.len() > capacity {
            let Some(oldest) = state.cache_order.pop_front() else {
                break;
            };
            if state.cache.remove(&oldest).is_some() {
                debug!("Evicted chunk {oldest} from cache");
            }
        }
    }

    /// Serializes the entire world map (not just the cache) into the
    /// container. Transient I/O failures get one retry.
    pub fn save_all(&self) -> Result<usize, PersistError> {
        let state = self.lock_state();
        let count = state.world.len();
        if let Err(err) = container::save_world(&self.container_path, &state.world) {
            if !matches!(err, PersistError::Io { .. }) {
                return Err(err);
            }
            warn!("World save failed, retrying once: {err}");
            container::save_world(&self.container_path, &state.world)?;
        }
        drop(state);

        self.saves.fetch_add(1, Ordering::Relaxed);
        info!(
            "Saved all {count} chunks to {}",
            self.container_path.display()
        );
        Ok(count)
    }

    /// Populates the world map from a previous save. Absence means a
    /// fresh world; only corruption is an error.
    pub fn load_all(&self) -> Result<usize, PersistError> {
        match container::load_world(&self.container_path) {
            Ok(world) => {
                let count = world.len();
                self.lock_state().world = world;
                info!(
                    "Loaded {count} chunks from {}",
                    self.container_path.display()
                );
                Ok(count)
            }
            Err(err) if err.is_not_found() => {
                debug!(
                    "No existing chunk data at {}",
                    self.container_path.display()
                );
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }

    pub fn world_len(&self) -> usize {
        self.lock_state().world.len()
    }

    pub fn cached_len(&self) -> usize {
        self.lock_state().cache.len()
    }

    /// How many chunks this store has generated (as opposed to loaded).
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}
