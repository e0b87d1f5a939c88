//! Test utilities for parquet-planner

use std::sync::Arc;

use jiff::Timestamp;
use parquet_schema::{parse_message_type, MessageType};

use crate::io::BlockLocation;
use crate::metadata::{ColumnChunkMetaData, FileMetaData, Footer, ParquetMetadata, RowGroupMetaData};

pub const DOCUMENT_SCHEMA: &str = "
message Document {
  required int64 DocId;
  optional group Links {
    repeated int64 Backward;
    repeated int64 Forward;
  }
  repeated group Name {
    repeated group Language {
      required binary Code;
      required binary Country;
    }
    optional binary Url;
  }
}";

pub fn ts(seconds: i64) -> Timestamp {
    Timestamp::from_second(seconds).unwrap()
}

pub fn document_schema() -> MessageType {
    parse_message_type(DOCUMENT_SCHEMA).unwrap()
}

pub fn document_file_metadata() -> FileMetaData {
    FileMetaData::new(document_schema())
}

/// One chunk of 10 bytes per Document column, laid out from `start`
pub fn document_row_group(start: u64) -> RowGroupMetaData {
    let columns = document_schema()
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            ColumnChunkMetaData::new(column.path().clone(), start + 10 * i as u64, 10)
                .with_value_count(5)
        })
        .collect();
    RowGroupMetaData::new(5, 60, columns)
}

pub fn block(offset: u64, length: u64, host: &str) -> BlockLocation {
    BlockLocation::new(offset, length, vec![host.to_string()])
}

pub fn footer(path: &str, file: FileMetaData, row_groups: Vec<RowGroupMetaData>) -> Footer {
    Footer::new(path, Arc::new(ParquetMetadata::new(file, row_groups)))
}

pub fn empty_footer(path: &str) -> Footer {
    footer(path, document_file_metadata(), vec![])
}
