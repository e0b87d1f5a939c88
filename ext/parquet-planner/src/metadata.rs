//! Parsed footer metadata of a file and its merge across many files

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet_schema::{ColumnPath, MessageType};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, PlannerError, Result};

/// Location and size of one column inside one row group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChunkMetaData {
    path: ColumnPath,
    first_data_page_offset: u64,
    dictionary_page_offset: Option<u64>,
    value_count: u64,
    total_size: u64,
    total_uncompressed_size: u64,
}

impl ColumnChunkMetaData {
    pub fn new(path: impl Into<ColumnPath>, first_data_page_offset: u64, total_size: u64) -> Self {
        Self {
            path: path.into(),
            first_data_page_offset,
            dictionary_page_offset: None,
            value_count: 0,
            total_size,
            total_uncompressed_size: total_size,
        }
    }

    pub fn with_dictionary_page_offset(mut self, offset: u64) -> Self {
        self.dictionary_page_offset = Some(offset);
        self
    }

    pub fn with_value_count(mut self, value_count: u64) -> Self {
        self.value_count = value_count;
        self
    }

    pub fn with_total_uncompressed_size(mut self, size: u64) -> Self {
        self.total_uncompressed_size = size;
        self
    }

    pub fn path(&self) -> &ColumnPath {
        &self.path
    }

    pub fn first_data_page_offset(&self) -> u64 {
        self.first_data_page_offset
    }

    pub fn dictionary_page_offset(&self) -> Option<u64> {
        self.dictionary_page_offset
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    /// Compressed size on disk
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn total_uncompressed_size(&self) -> u64 {
        self.total_uncompressed_size
    }

    /// First byte of the chunk: the dictionary page when it precedes the data
    pub fn starting_offset(&self) -> u64 {
        match self.dictionary_page_offset {
            Some(offset) if offset > 0 && offset < self.first_data_page_offset => offset,
            _ => self.first_data_page_offset,
        }
    }
}

/// A horizontal slice of a file with one chunk per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGroupMetaData {
    row_count: u64,
    total_byte_size: u64,
    columns: Vec<ColumnChunkMetaData>,
}

impl RowGroupMetaData {
    pub fn new(row_count: u64, total_byte_size: u64, columns: Vec<ColumnChunkMetaData>) -> Self {
        Self {
            row_count,
            total_byte_size,
            columns,
        }
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn total_byte_size(&self) -> u64 {
        self.total_byte_size
    }

    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    /// Offset used to place this row group on a physical block: the first
    /// data page of its first column chunk
    pub fn anchor_offset(&self) -> Option<u64> {
        self.columns
            .first()
            .map(ColumnChunkMetaData::first_data_page_offset)
    }

    pub fn compressed_size(&self) -> u64 {
        self.columns.iter().map(ColumnChunkMetaData::total_size).sum()
    }
}

/// Schema and application metadata stored in a footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetaData {
    schema: MessageType,
    key_value_metadata: BTreeMap<String, String>,
    created_by: Option<String>,
}

impl FileMetaData {
    pub fn new(schema: MessageType) -> Self {
        Self {
            schema,
            key_value_metadata: BTreeMap::new(),
            created_by: None,
        }
    }

    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key_value_metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn schema(&self) -> &MessageType {
        &self.schema
    }

    pub fn key_value_metadata(&self) -> &BTreeMap<String, String> {
        &self.key_value_metadata
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

/// Everything a footer holds: file metadata plus the row groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetMetadata {
    file_metadata: FileMetaData,
    row_groups: Vec<RowGroupMetaData>,
}

impl ParquetMetadata {
    pub fn new(file_metadata: FileMetaData, row_groups: Vec<RowGroupMetaData>) -> Self {
        Self {
            file_metadata,
            row_groups,
        }
    }

    pub fn file_metadata(&self) -> &FileMetaData {
        &self.file_metadata
    }

    pub fn row_groups(&self) -> &[RowGroupMetaData] {
        &self.row_groups
    }

    pub fn row_count(&self) -> u64 {
        self.row_groups.iter().map(RowGroupMetaData::row_count).sum()
    }
}

/// A file path with its parsed, shared footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    path: PathBuf,
    metadata: Arc<ParquetMetadata>,
}

impl Footer {
    pub fn new(path: impl Into<PathBuf>, metadata: Arc<ParquetMetadata>) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &Arc<ParquetMetadata> {
        &self.metadata
    }
}

/// Metadata merged over the footers of every input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalMetaData {
    schema: MessageType,
    key_value_metadata: BTreeMap<String, BTreeSet<String>>,
    created_by: BTreeSet<String>,
}

impl GlobalMetaData {
    /// Union the schemas and collect every distinct key/value pair and
    /// writer. Fails on an empty input or on schemas that cannot be merged.
    pub fn merge(footers: &[Footer]) -> Result<Self> {
        let (first, rest) = footers
            .split_first()
            .ok_or_else(|| PlannerError::invalid_metadata("no footers to merge"))?;

        let mut global = Self::from_file(first.metadata().file_metadata());
        for footer in rest {
            global
                .add_file(footer.metadata().file_metadata())
                .with_context(|| {
                    format!("merging the schema of '{}'", footer.path().display())
                })?;
        }
        Ok(global)
    }

    fn from_file(file: &FileMetaData) -> Self {
        let mut global = Self {
            schema: file.schema().clone(),
            key_value_metadata: BTreeMap::new(),
            created_by: BTreeSet::new(),
        };
        global.add_key_values(file);
        global
    }

    fn add_file(&mut self, file: &FileMetaData) -> Result<()> {
        self.schema = self.schema.union(file.schema())?;
        self.add_key_values(file);
        Ok(())
    }

    fn add_key_values(&mut self, file: &FileMetaData) {
        for (key, value) in file.key_value_metadata() {
            self.key_value_metadata
                .entry(key.clone())
                .or_default()
                .insert(value.clone());
        }
        if let Some(created_by) = file.created_by() {
            self.created_by.insert(created_by.to_string());
        }
    }

    pub fn schema(&self) -> &MessageType {
        &self.schema
    }

    pub fn key_value_metadata(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.key_value_metadata
    }

    pub fn created_by(&self) -> &BTreeSet<String> {
        &self.created_by
    }
}
