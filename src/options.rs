//! Construction-time configuration surface (spec §5 "worker count is a
//! construction parameter"; §1 notes config-file loading is out of scope —
//! this is an in-memory options struct, not a file format).

use crate::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_WORKERS};

/// Options controlling how a [`crate::reader::LogReader`] plans and
/// dispatches its parallel decode.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    block_size: usize,
    workers: usize,
}

impl ReaderOptions {
    pub fn new() -> Self {
        ReaderOptions::default()
    }

    /// Target block size for the [`crate::block_planner`] (spec §4.3). The
    /// actual block boundary is always snapped forward to the next sync
    /// marker, so this is a target, not an exact size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        assert!(block_size > 0, "block_size must be positive");
        self.block_size = block_size;
        self
    }

    /// Worker thread count for the parallel driver (spec §5).
    pub fn with_workers(mut self, workers: usize) -> Self {
        assert!(workers > 0, "workers must be positive");
        self.workers = workers;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        let hardware_parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        ReaderOptions {
            block_size: DEFAULT_BLOCK_SIZE,
            workers: hardware_parallelism.min(DEFAULT_MAX_WORKERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_worker_count_is_capped() {
        let opts = ReaderOptions::default();
        assert!(opts.workers() <= DEFAULT_MAX_WORKERS);
        assert!(opts.workers() >= 1);
    }

    #[test]
    fn builder_overrides_defaults() {
        let opts = ReaderOptions::new().with_block_size(1024).with_workers(2);
        assert_eq!(opts.block_size(), 1024);
        assert_eq!(opts.workers(), 2);
    }
}
