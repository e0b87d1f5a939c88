use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::error::{ErrorContext, FooterFailure, Result};
use crate::footer_cache::{FooterCache, FooterCacheEntry};
use crate::io::{list_files_recursively, FileStatus, FileSystem};
use crate::metadata::{Footer, GlobalMetaData};
use crate::read_support::{InitContext, ReadSupport};
use crate::reader::{FooterReader, FooterResolution, FooterResolver};
use crate::split::{generate_splits, ParquetInputSplit};

/// Plans input splits over a set of files and directories.
///
/// Footers are cached across calls, keyed by path and validated against the
/// modification time the file system reports on each call.
pub struct InputPlanner {
    fs: Arc<dyn FileSystem>,
    footer_reader: Arc<dyn FooterReader>,
    read_support: Arc<dyn ReadSupport>,
    footer_cache: Arc<FooterCache>,
    resolver: FooterResolver,
    config: PlannerConfig,
}

impl InputPlanner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        footer_reader: Arc<dyn FooterReader>,
        read_support: Arc<dyn ReadSupport>,
        config: PlannerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let resolver = FooterResolver::new(config.footer_parallelism)?;
        let footer_cache = Arc::new(FooterCache::new(config.min_footer_cache_size));
        Ok(Self {
            fs,
            footer_reader,
            read_support,
            footer_cache,
            resolver,
            config,
        })
    }

    /// Share a footer cache with other planners
    pub fn with_footer_cache(mut self, footer_cache: Arc<FooterCache>) -> Self {
        self.footer_cache = footer_cache;
        self
    }

    pub fn footer_cache(&self) -> &Arc<FooterCache> {
        &self.footer_cache
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Every non-hidden file under `roots`
    pub fn list_status(&self, roots: &[PathBuf]) -> Result<Vec<FileStatus>> {
        let files = list_files_recursively(self.fs.as_ref(), roots)?;
        info!(files = files.len(), "total input files to process");
        Ok(files)
    }

    /// Footers of `statuses` in input order, from the cache where it is still
    /// current. Newly read footers are cached under the modification time in
    /// `statuses`, observed before reading. Successes are kept even when
    /// other files fail.
    pub fn resolve_footers(&self, statuses: &[FileStatus]) -> FooterResolution {
        self.footer_cache.grow_capacity(statuses.len());

        let mut slots: Vec<Option<std::result::Result<Footer, FooterFailure>>> =
            vec![None; statuses.len()];
        let mut missing = Vec::new();
        for (index, status) in statuses.iter().enumerate() {
            match self
                .footer_cache
                .lookup(status.path(), status.modification_time())
            {
                Some(entry) => {
                    self.footer_cache.touch(status.path());
                    slots[index] = Some(Ok(entry.footer().clone()));
                }
                None => missing.push(index),
            }
        }
        debug!(
            cached = statuses.len() - missing.len(),
            missing = missing.len(),
            "looked up footers in cache"
        );

        if !missing.is_empty() {
            let to_read: Vec<FileStatus> = missing.iter().map(|&i| statuses[i].clone()).collect();
            let results = self.resolver.read_all(
                self.fs.as_ref(),
                self.footer_reader.as_ref(),
                &to_read,
            );
            for ((index, status), result) in missing.iter().zip(&to_read).zip(results) {
                slots[*index] = Some(match result {
                    Ok(footer) => {
                        self.footer_cache.put_if_current(
                            status.path(),
                            FooterCacheEntry::new(status.modification_time(), footer.clone()),
                            status.modification_time(),
                        );
                        Ok(footer)
                    }
                    Err(e) => Err(FooterFailure::new(status.path(), e.to_string())),
                });
            }
        }

        let mut resolution = FooterResolution::default();
        for slot in slots.into_iter().flatten() {
            match slot {
                Ok(footer) => resolution.footers.push(footer),
                Err(failure) => resolution.failures.push(failure),
            }
        }
        resolution
    }

    /// Footers of `statuses` in input order, or one error naming every file
    /// whose footer could not be read
    pub fn footers_for(&self, statuses: &[FileStatus]) -> Result<Vec<Footer>> {
        self.resolve_footers(statuses).into_result()
    }

    pub fn global_metadata(&self, footers: &[Footer]) -> Result<GlobalMetaData> {
        GlobalMetaData::merge(footers)
    }

    /// Splits for every footer, all reading the schema chosen by the read
    /// support over the merged metadata
    pub fn splits(&self, footers: &[Footer]) -> Result<Vec<ParquetInputSplit>> {
        if footers.is_empty() {
            return Ok(Vec::new());
        }
        let global = self.global_metadata(footers)?;
        let read_context = self
            .read_support
            .init(&InitContext::from_global(&global))
            .context("initializing read support")?;

        let mut splits = Vec::new();
        for footer in footers {
            debug!(path = %footer.path().display(), "planning splits");
            let status = self.fs.file_status(footer.path())?;
            let blocks = self.fs.block_locations(&status, 0, status.len())?;
            let metadata = footer.metadata();
            let file_splits = generate_splits(
                metadata.row_groups(),
                blocks,
                &status,
                metadata.file_metadata(),
                &read_context,
            )
            .with_context(|| format!("planning splits for '{}'", footer.path().display()))?;
            splits.extend(file_splits);
        }
        info!(
            files = footers.len(),
            splits = splits.len(),
            "planned input splits"
        );
        Ok(splits)
    }

    /// List, resolve footers and plan splits in one go
    pub fn plan(&self, roots: &[PathBuf]) -> Result<Vec<ParquetInputSplit>> {
        let statuses = self.list_status(roots)?;
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let footers = self.footers_for(&statuses)?;
        self.splits(&footers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InMemoryFileSystem;
    use crate::metadata::ParquetMetadata;
    use crate::read_support::FullSchemaReadSupport;
    use crate::reader::InMemoryFooterReader;
    use crate::test_utils::{document_file_metadata, document_row_group, ts};
    use std::path::Path;

    fn planner(
        files: &[&str],
    ) -> (Arc<InMemoryFileSystem>, Arc<InMemoryFooterReader>, InputPlanner) {
        let fs = Arc::new(InMemoryFileSystem::new());
        let reader = Arc::new(InMemoryFooterReader::new());
        for path in files {
            fs.add_file(*path, 1000, ts(10));
            reader.insert(
                *path,
                ParquetMetadata::new(document_file_metadata(), vec![document_row_group(4)]),
            );
        }
        let config = PlannerConfig::builder()
            .with_footer_parallelism(2)
            .build()
            .unwrap();
        let planner = InputPlanner::new(
            fs.clone(),
            reader.clone(),
            Arc::new(FullSchemaReadSupport),
            config,
        )
        .unwrap();
        (fs, reader, planner)
    }

    #[test]
    fn test_cache_hit_skips_reading() {
        let (fs, reader, planner) = planner(&["/t/a.parquet", "/t/b.parquet"]);
        let statuses = planner.list_status(&[PathBuf::from("/t")]).unwrap();

        planner.footers_for(&statuses).unwrap();
        assert_eq!(reader.reads(), 2);
        planner.footers_for(&statuses).unwrap();
        assert_eq!(reader.reads(), 2);

        fs.set_modification_time(Path::new("/t/b.parquet"), ts(11))
            .unwrap();
        let statuses = planner.list_status(&[PathBuf::from("/t")]).unwrap();
        planner.footers_for(&statuses).unwrap();
        assert_eq!(reader.reads(), 3);
        let entry = planner
            .footer_cache()
            .lookup(Path::new("/t/b.parquet"), ts(11))
            .unwrap();
        assert_eq!(entry.modification_time(), ts(11));
    }

    #[test]
    fn test_cache_grows_with_input() {
        let files: Vec<String> = (0..120).map(|i| format!("/t/part-{i:03}.parquet")).collect();
        let paths: Vec<&str> = files.iter().map(String::as_str).collect();
        let (_, _, planner) = planner(&paths);

        let statuses = planner.list_status(&[PathBuf::from("/t")]).unwrap();
        planner.footers_for(&statuses).unwrap();
        assert_eq!(planner.footer_cache().capacity(), 120);
        assert_eq!(planner.footer_cache().len(), 120);
    }

    #[test]
    fn test_plan_empty_input() {
        let (fs, _, planner) = planner(&[]);
        fs.add_file("/t/_SUCCESS", 0, ts(1));
        assert!(planner.plan(&[PathBuf::from("/t")]).unwrap().is_empty());
        assert!(planner.splits(&[]).unwrap().is_empty());
    }
}
