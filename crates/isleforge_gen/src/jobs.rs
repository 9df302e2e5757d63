use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Bounded worker pool for chunk generation. Fan-out is capped at the
/// pool size no matter how many coordinates are scheduled.
pub struct JobSystem {
    pool: ThreadPool,
}

impl JobSystem {
    pub fn new(num_threads: Option<usize>) -> Result<Self, ThreadPoolBuildError> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(count) = num_threads {
            builder = builder.num_threads(count);
        }

        let pool = builder.build()?;
        Ok(Self { pool })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn scope<'scope, OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce(&rayon::Scope<'scope>) -> R + Send,
        R: Send,
    {
        self.pool.scope(op)
    }
}

impl Default for JobSystem {
    fn default() -> Self {
        let pool = ThreadPoolBuilder::new()
            .build()
            .expect("failed to create default rayon thread pool");
        Self { pool }
    }
}

#[cfg(test)]
mod tests {
    use super::JobSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn scope_joins_every_spawned_task() {
        let jobs = JobSystem::new(Some(4)).expect("build pool");
        let counter = AtomicUsize::new(0);
        jobs.scope(|scope| {
            for _ in 0..64 {
                let counter = &counter;
                scope.spawn(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn pool_size_is_bounded() {
        let jobs = JobSystem::new(Some(2)).expect("build pool");
        assert_eq!(jobs.thread_count(), 2);
    }
}
