//! File system abstraction the planner lists and locates files through

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use parking_lot::RwLock;

use crate::error::{PlannerError, Result};

/// Default block size of [`InMemoryFileSystem`] when a file does not declare
/// its own blocks
pub const DEFAULT_BLOCK_SIZE: u64 = 128 * 1024 * 1024;

const LOCAL_HOST: &str = "localhost";

/// What a file system reports about one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    path: PathBuf,
    is_dir: bool,
    len: u64,
    modification_time: Timestamp,
}

impl FileStatus {
    pub fn file(path: impl Into<PathBuf>, len: u64, modification_time: Timestamp) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            len,
            modification_time,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, modification_time: Timestamp) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            len: 0,
            modification_time,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn modification_time(&self) -> Timestamp {
        self.modification_time
    }
}

/// A storage-defined byte range of a file and the hosts holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLocation {
    offset: u64,
    length: u64,
    hosts: Vec<String>,
}

impl BlockLocation {
    pub fn new(offset: u64, length: u64, hosts: Vec<String>) -> Self {
        Self {
            offset,
            length,
            hosts,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn overlaps(&self, start: u64, end: u64) -> bool {
        self.offset < end && self.offset.saturating_add(self.length) > start
    }
}

/// Listing, status and block placement of files
pub trait FileSystem: Send + Sync {
    /// Children of a directory, or the status of `path` itself for a file
    fn list_status(&self, path: &Path) -> Result<Vec<FileStatus>>;

    fn file_status(&self, path: &Path) -> Result<FileStatus>;

    fn modification_time(&self, path: &Path) -> Result<Timestamp> {
        Ok(self.file_status(path)?.modification_time())
    }

    /// Blocks overlapping `[offset, offset + length)` of the file
    fn block_locations(
        &self,
        status: &FileStatus,
        offset: u64,
        length: u64,
    ) -> Result<Vec<BlockLocation>>;
}

/// Files and directories whose name starts with `_` or `.` are metadata or
/// temporary files and never planned over
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('_') || name.starts_with('.'))
        .unwrap_or(false)
}

/// Expand `roots` into the files below them, depth first, skipping hidden
/// entries inside directories
pub fn list_files_recursively(fs: &dyn FileSystem, roots: &[PathBuf]) -> Result<Vec<FileStatus>> {
    let mut files = Vec::new();
    for root in roots {
        let status = fs.file_status(root)?;
        if status.is_dir() {
            add_directory(fs, &status, &mut files)?;
        } else {
            files.push(status);
        }
    }
    Ok(files)
}

fn add_directory(fs: &dyn FileSystem, dir: &FileStatus, files: &mut Vec<FileStatus>) -> Result<()> {
    for child in fs.list_status(dir.path())? {
        if is_hidden(child.path()) {
            continue;
        }
        if child.is_dir() {
            add_directory(fs, &child, files)?;
        } else {
            files.push(child);
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct InMemoryFile {
    len: u64,
    modification_time: Timestamp,
    blocks: Option<Vec<BlockLocation>>,
}

/// A [`FileSystem`] held entirely in memory. Directories exist implicitly as
/// the ancestors of added files.
#[derive(Debug)]
pub struct InMemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, InMemoryFile>>,
    block_size: u64,
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split files without explicit blocks into blocks of `block_size` bytes
    pub fn with_block_size(mut self, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(PlannerError::config("block size must be positive"));
        }
        self.block_size = block_size;
        Ok(self)
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, len: u64, modification_time: Timestamp) {
        self.insert(path.into(), len, modification_time, None);
    }

    /// Add a file with a fixed block layout, in any order
    pub fn add_file_with_blocks(
        &self,
        path: impl Into<PathBuf>,
        len: u64,
        modification_time: Timestamp,
        blocks: Vec<BlockLocation>,
    ) {
        self.insert(path.into(), len, modification_time, Some(blocks));
    }

    fn insert(
        &self,
        path: PathBuf,
        len: u64,
        modification_time: Timestamp,
        blocks: Option<Vec<BlockLocation>>,
    ) {
        self.files.write().insert(
            path,
            InMemoryFile {
                len,
                modification_time,
                blocks,
            },
        );
    }

    /// Record a new modification time, as a rewrite of the file would
    pub fn set_modification_time(&self, path: &Path, modification_time: Timestamp) -> Result<()> {
        let mut files = self.files.write();
        let file = files
            .get_mut(path)
            .ok_or_else(|| PlannerError::not_found(path))?;
        file.modification_time = modification_time;
        Ok(())
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files.write().remove(path).is_some()
    }

    fn split_into_blocks(&self, len: u64) -> Vec<BlockLocation> {
        let mut blocks = Vec::new();
        let mut offset = 0;
        while offset < len {
            let length = self.block_size.min(len - offset);
            blocks.push(BlockLocation::new(offset, length, vec![LOCAL_HOST.to_string()]));
            offset += length;
        }
        blocks
    }
}

impl FileSystem for InMemoryFileSystem {
    fn list_status(&self, path: &Path) -> Result<Vec<FileStatus>> {
        let status = self.file_status(path)?;
        if !status.is_dir() {
            return Ok(vec![status]);
        }

        let files = self.files.read();
        let mut children: BTreeMap<PathBuf, FileStatus> = BTreeMap::new();
        for (file_path, file) in files.range(path.to_path_buf()..) {
            let Ok(relative) = file_path.strip_prefix(path) else {
                break;
            };
            let mut components = relative.components();
            let Some(first) = components.next() else {
                continue;
            };
            let child_path = path.join(first);
            if components.next().is_none() {
                children.insert(
                    child_path.clone(),
                    FileStatus::file(child_path, file.len, file.modification_time),
                );
            } else {
                let entry = children
                    .entry(child_path.clone())
                    .or_insert_with(|| FileStatus::directory(child_path, file.modification_time));
                if file.modification_time > entry.modification_time {
                    entry.modification_time = file.modification_time;
                }
            }
        }
        Ok(children.into_values().collect())
    }

    fn file_status(&self, path: &Path) -> Result<FileStatus> {
        let files = self.files.read();
        if let Some(file) = files.get(path) {
            return Ok(FileStatus::file(path, file.len, file.modification_time));
        }
        files
            .iter()
            .filter(|(file_path, _)| file_path.starts_with(path))
            .map(|(_, file)| file.modification_time)
            .max()
            .map(|modification_time| FileStatus::directory(path, modification_time))
            .ok_or_else(|| PlannerError::not_found(path))
    }

    fn block_locations(
        &self,
        status: &FileStatus,
        offset: u64,
        length: u64,
    ) -> Result<Vec<BlockLocation>> {
        if status.is_dir() {
            return Err(PlannerError::io(status.path(), "not a file"));
        }
        let files = self.files.read();
        let file = files
            .get(status.path())
            .ok_or_else(|| PlannerError::not_found(status.path()))?;

        let end = offset.saturating_add(length);
        let blocks = match &file.blocks {
            Some(blocks) => blocks.clone(),
            None => self.split_into_blocks(file.len),
        };
        Ok(blocks
            .into_iter()
            .filter(|block| block.overlaps(offset, end))
            .collect())
    }
}
