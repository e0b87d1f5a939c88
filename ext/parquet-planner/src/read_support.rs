//! Choosing the schema to read before splits are planned

use std::collections::{BTreeMap, BTreeSet};

use parquet_schema::{parse_message_type, MessageType};

use crate::error::{ErrorContext, PlannerError, Result};
use crate::metadata::GlobalMetaData;

/// What a [`ReadSupport`] sees of the input: the merged schema and every
/// value each metadata key took across files
#[derive(Debug, Clone)]
pub struct InitContext {
    key_value_metadata: BTreeMap<String, BTreeSet<String>>,
    file_schema: MessageType,
}

impl InitContext {
    pub fn new(
        key_value_metadata: BTreeMap<String, BTreeSet<String>>,
        file_schema: MessageType,
    ) -> Self {
        Self {
            key_value_metadata,
            file_schema,
        }
    }

    pub fn from_global(global: &GlobalMetaData) -> Self {
        Self::new(global.key_value_metadata().clone(), global.schema().clone())
    }

    pub fn file_schema(&self) -> &MessageType {
        &self.file_schema
    }

    pub fn key_value_metadata(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.key_value_metadata
    }

    /// One value per key; fails when files disagree on a key
    pub fn merged_key_value_metadata(&self) -> Result<BTreeMap<String, String>> {
        let mut merged = BTreeMap::new();
        for (key, values) in &self.key_value_metadata {
            let mut iter = values.iter();
            match (iter.next(), iter.next()) {
                (Some(value), None) => {
                    merged.insert(key.clone(), value.clone());
                }
                (None, _) => {}
                (Some(_), Some(_)) => {
                    return Err(PlannerError::invalid_metadata(format!(
                        "inconsistent values for key '{}': {:?}",
                        key, values
                    )))
                }
            }
        }
        Ok(merged)
    }
}

/// The schema to read and metadata handed to every split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadContext {
    requested_schema: MessageType,
    read_support_metadata: BTreeMap<String, String>,
}

impl ReadContext {
    pub fn new(requested_schema: MessageType) -> Self {
        Self {
            requested_schema,
            read_support_metadata: BTreeMap::new(),
        }
    }

    pub fn with_read_support_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.read_support_metadata = metadata;
        self
    }

    pub fn requested_schema(&self) -> &MessageType {
        &self.requested_schema
    }

    pub fn read_support_metadata(&self) -> &BTreeMap<String, String> {
        &self.read_support_metadata
    }
}

/// Decides what is read out of the input files
pub trait ReadSupport: Send + Sync {
    fn init(&self, context: &InitContext) -> Result<ReadContext>;
}

/// Reads every column of the merged schema
#[derive(Debug, Clone, Copy, Default)]
pub struct FullSchemaReadSupport;

impl ReadSupport for FullSchemaReadSupport {
    fn init(&self, context: &InitContext) -> Result<ReadContext> {
        Ok(ReadContext::new(context.file_schema().clone()))
    }
}

/// Reads a fixed projection, which must be contained in the merged schema
#[derive(Debug, Clone)]
pub struct ProjectionReadSupport {
    projection: MessageType,
    metadata: BTreeMap<String, String>,
}

impl ProjectionReadSupport {
    pub fn new(projection: MessageType) -> Self {
        Self {
            projection,
            metadata: BTreeMap::new(),
        }
    }

    /// Projection given in the textual schema form
    pub fn from_schema_text(text: &str) -> Result<Self> {
        let projection = parse_message_type(text).context("parsing the requested projection")?;
        Ok(Self::new(projection))
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn projection(&self) -> &MessageType {
        &self.projection
    }
}

impl ReadSupport for ProjectionReadSupport {
    fn init(&self, context: &InitContext) -> Result<ReadContext> {
        context.file_schema().check_contains(&self.projection)?;
        Ok(ReadContext::new(self.projection.clone())
            .with_read_support_metadata(self.metadata.clone()))
    }
}
