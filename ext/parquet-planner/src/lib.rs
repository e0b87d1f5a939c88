//! Input planning over directories of Parquet files
//!
//! This crate turns a set of input paths into block-aligned splits that can
//! be handed to independent readers.
//!
//! # Overview
//!
//! ## Listing
//!
//! [`InputPlanner::list_status`] expands directories recursively through a
//! [`FileSystem`], skipping names starting with `_` or `.`.
//!
//! ## Footers
//!
//! Footers are read in parallel by a [`FooterResolver`] and kept in a
//! [`FooterCache`]:
//!
//! - LRU bounded, sized to the larger of the input file count and a floor
//! - An entry is only used while the file's modification time has not moved
//!   past the one recorded with it
//! - Failures are collected per file and reported together
//!
//! ## Splits
//!
//! A [`ReadSupport`] picks the requested schema from the merged metadata of
//! all files. Each row group is then placed on the block holding its first
//! data page, and each block with row groups becomes a
//! [`ParquetInputSplit`] whose length counts only the requested columns.

pub mod config;
pub use config::{PlannerConfig, PlannerConfigBuilder, MIN_FOOTER_CACHE_SIZE};

pub mod error;
pub use error::{ErrorContext, FooterFailure, PlannerError, Result};

pub mod footer_cache;
pub use footer_cache::{FooterCache, FooterCacheEntry};

pub mod io;
pub use io::{
    is_hidden, list_files_recursively, BlockLocation, FileStatus, FileSystem, InMemoryFileSystem,
};

pub mod metadata;
pub use metadata::{
    ColumnChunkMetaData, FileMetaData, Footer, GlobalMetaData, ParquetMetadata, RowGroupMetaData,
};

pub mod planner;
pub use planner::InputPlanner;

pub mod read_support;
pub use read_support::{
    FullSchemaReadSupport, InitContext, ProjectionReadSupport, ReadContext, ReadSupport,
};

pub mod reader;
pub use reader::{FooterReader, FooterResolution, FooterResolver, InMemoryFooterReader};

pub mod split;
pub use split::{
    assign_row_groups, generate_splits, locate_block, BlockAssignment, BlockAssignmentAnomaly,
    ParquetInputSplit,
};

#[cfg(test)]
pub mod test_utils;
