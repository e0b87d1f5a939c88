//! Reading footers, one file at a time or many in parallel

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{FooterFailure, PlannerError, Result};
use crate::io::{FileStatus, FileSystem};
use crate::metadata::{Footer, ParquetMetadata};

/// Decodes the footer of one file
pub trait FooterReader: Send + Sync {
    fn read_footer(
        &self,
        fs: &dyn FileSystem,
        status: &FileStatus,
    ) -> Result<Arc<ParquetMetadata>>;
}

/// A [`FooterReader`] serving footers registered ahead of time
#[derive(Debug, Default)]
pub struct InMemoryFooterReader {
    footers: RwLock<HashMap<PathBuf, Arc<ParquetMetadata>>>,
    reads: AtomicUsize,
}

impl InMemoryFooterReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, metadata: ParquetMetadata) {
        self.footers.write().insert(path.into(), Arc::new(metadata));
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.footers.write().remove(path).is_some()
    }

    /// Number of `read_footer` calls served so far, failed ones included
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl FooterReader for InMemoryFooterReader {
    fn read_footer(
        &self,
        fs: &dyn FileSystem,
        status: &FileStatus,
    ) -> Result<Arc<ParquetMetadata>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        // the file must still exist even though its footer is held here
        fs.file_status(status.path())?;
        self.footers
            .read()
            .get(status.path())
            .cloned()
            .ok_or_else(|| PlannerError::io(status.path(), "not a parquet file: no footer"))
    }
}

/// Footers read successfully and the paths that failed, both in input order
#[derive(Debug, Default)]
pub struct FooterResolution {
    pub footers: Vec<Footer>,
    pub failures: Vec<FooterFailure>,
}

impl FooterResolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The footers, or every failure as one aggregate error
    pub fn into_result(self) -> Result<Vec<Footer>> {
        if self.failures.is_empty() {
            Ok(self.footers)
        } else {
            Err(PlannerError::FooterResolution(self.failures))
        }
    }
}

/// Runs a [`FooterReader`] over many files on a bounded thread pool
#[derive(Debug)]
pub struct FooterResolver {
    pool: rayon::ThreadPool,
    parallelism: usize,
}

impl FooterResolver {
    pub fn new(parallelism: usize) -> Result<Self> {
        if parallelism == 0 {
            return Err(PlannerError::config("footer parallelism must be at least 1"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .thread_name(|i| format!("footer-reader-{i}"))
            .build()
            .map_err(|e| {
                PlannerError::thread_pool(format!("failed to build footer reader pool: {e}"))
            })?;
        Ok(Self { pool, parallelism })
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Read every footer; one result per status, in input order. A failed
    /// file never stops the others.
    pub fn read_all(
        &self,
        fs: &dyn FileSystem,
        reader: &dyn FooterReader,
        statuses: &[FileStatus],
    ) -> Vec<Result<Footer>> {
        debug!(
            files = statuses.len(),
            threads = self.parallelism,
            "reading footers"
        );
        self.pool.install(|| {
            statuses
                .par_iter()
                .map(|status| {
                    reader
                        .read_footer(fs, status)
                        .map(|metadata| Footer::new(status.path(), metadata))
                })
                .collect()
        })
    }

    pub fn resolve(
        &self,
        fs: &dyn FileSystem,
        reader: &dyn FooterReader,
        statuses: &[FileStatus],
    ) -> FooterResolution {
        let mut resolution = FooterResolution::default();
        for (status, result) in statuses.iter().zip(self.read_all(fs, reader, statuses)) {
            match result {
                Ok(footer) => resolution.footers.push(footer),
                Err(e) => resolution
                    .failures
                    .push(FooterFailure::new(status.path(), e.to_string())),
            }
        }
        resolution
    }
}
