//! Turning the row groups of one file into block-aligned input splits
//!
//! Every row group is placed on the physical block containing the first data
//! page of its first column chunk, and each block that received at least one
//! row group becomes one split. A split's length only counts the column
//! chunks the requested schema actually reads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parquet_schema::{parse_message_type, MessageType, SchemaInspector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::io::{BlockLocation, FileStatus};
use crate::metadata::{FileMetaData, RowGroupMetaData};
use crate::read_support::ReadContext;

/// A unit of work: the row groups of one file anchored on one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetInputSplit {
    path: PathBuf,
    start: u64,
    length: u64,
    hosts: Vec<String>,
    row_groups: Vec<RowGroupMetaData>,
    requested_schema: String,
    file_schema: String,
    extra_metadata: BTreeMap<String, String>,
    read_support_metadata: BTreeMap<String, String>,
}

impl ParquetInputSplit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset of the block the split is anchored on
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Bytes of the requested columns in this split's row groups
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn row_groups(&self) -> &[RowGroupMetaData] {
        &self.row_groups
    }

    pub fn row_count(&self) -> u64 {
        self.row_groups.iter().map(RowGroupMetaData::row_count).sum()
    }

    pub fn requested_schema_text(&self) -> &str {
        &self.requested_schema
    }

    pub fn file_schema_text(&self) -> &str {
        &self.file_schema
    }

    pub fn requested_schema(&self) -> Result<MessageType> {
        Ok(parse_message_type(&self.requested_schema)?)
    }

    pub fn file_schema(&self) -> Result<MessageType> {
        Ok(parse_message_type(&self.file_schema)?)
    }

    /// Key/value metadata of the file the split belongs to
    pub fn extra_metadata(&self) -> &BTreeMap<String, String> {
        &self.extra_metadata
    }

    pub fn read_support_metadata(&self) -> &BTreeMap<String, String> {
        &self.read_support_metadata
    }
}

/// A row group whose anchor lies before the first block. It is still
/// assigned to the first block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAssignmentAnomaly {
    pub row_group: usize,
    pub anchor_offset: u64,
    pub first_block_offset: u64,
}

/// Row group indices per block, in block order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAssignment {
    pub groups: Vec<Vec<usize>>,
    pub anomalies: Vec<BlockAssignmentAnomaly>,
}

/// Binary search of `offset` over blocks sorted by offset.
///
/// `Ok(i)` is an exact match on block `i`. `Err(i)` carries the insertion
/// point, the index of the first block starting after `offset`; a classic
/// binary search would encode it as `-(i) - 1`.
pub fn locate_block(
    sorted_blocks: &[BlockLocation],
    offset: u64,
) -> std::result::Result<usize, usize> {
    sorted_blocks.binary_search_by_key(&offset, BlockLocation::offset)
}

/// Place each row group on the block that contains its anchor offset.
/// `sorted_blocks` must be sorted by offset.
pub fn assign_row_groups(
    row_groups: &[RowGroupMetaData],
    sorted_blocks: &[BlockLocation],
) -> Result<BlockAssignment> {
    let mut assignment = BlockAssignment {
        groups: vec![Vec::new(); sorted_blocks.len()],
        anomalies: Vec::new(),
    };
    if row_groups.is_empty() {
        return Ok(assignment);
    }
    let Some(first_block) = sorted_blocks.first() else {
        return Err(PlannerError::invalid_metadata(format!(
            "{} row group(s) but no block locations",
            row_groups.len()
        )));
    };

    for (index, row_group) in row_groups.iter().enumerate() {
        let anchor = row_group.anchor_offset().ok_or_else(|| {
            PlannerError::invalid_metadata(format!("row group {} has no column chunks", index))
        })?;
        let block = match locate_block(sorted_blocks, anchor) {
            Ok(block) => block,
            Err(0) => {
                assignment.anomalies.push(BlockAssignmentAnomaly {
                    row_group: index,
                    anchor_offset: anchor,
                    first_block_offset: first_block.offset(),
                });
                0
            }
            Err(insertion_point) => insertion_point - 1,
        };
        assignment.groups[block].push(index);
    }
    Ok(assignment)
}

/// Splits of one file, one per block holding at least one row group
pub fn generate_splits(
    row_groups: &[RowGroupMetaData],
    mut blocks: Vec<BlockLocation>,
    status: &FileStatus,
    file_metadata: &FileMetaData,
    read_context: &ReadContext,
) -> Result<Vec<ParquetInputSplit>> {
    blocks.sort_by_key(BlockLocation::offset);
    let assignment = assign_row_groups(row_groups, &blocks)?;
    for anomaly in &assignment.anomalies {
        warn!(
            path = %status.path().display(),
            row_group = anomaly.row_group,
            anchor_offset = anomaly.anchor_offset,
            first_block_offset = anomaly.first_block_offset,
            "row group before the first block, assigning it to the first block"
        );
    }

    let requested = read_context.requested_schema();
    let requested_schema = requested.to_string();
    let file_schema = file_metadata.schema().to_string();

    let mut splits = Vec::new();
    for (block, indices) in blocks.iter().zip(assignment.groups) {
        if indices.is_empty() {
            debug!(
                path = %status.path().display(),
                offset = block.offset(),
                length = block.length(),
                "block without row group"
            );
            continue;
        }

        let groups: Vec<RowGroupMetaData> =
            indices.iter().map(|&i| row_groups[i].clone()).collect();
        let length: u64 = groups
            .iter()
            .flat_map(RowGroupMetaData::columns)
            .filter(|column| requested.contains_path(column.path().parts()))
            .map(|column| column.total_size())
            .sum();

        splits.push(ParquetInputSplit {
            path: status.path().to_path_buf(),
            start: block.offset(),
            length,
            hosts: block.hosts().to_vec(),
            row_groups: groups,
            requested_schema: requested_schema.clone(),
            file_schema: file_schema.clone(),
            extra_metadata: file_metadata.key_value_metadata().clone(),
            read_support_metadata: read_context.read_support_metadata().clone(),
        });
    }
    Ok(splits)
}
