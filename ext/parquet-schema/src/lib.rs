//! Schema model for nested columnar files
//!
//! `parquet-schema` describes records the way a Parquet footer does: a
//! message made of primitive leaves and nested groups, each with a
//! repetition (`required`, `optional`, `repeated`) and an optional logical
//! annotation.
//!
//! # Key Components
//!
//! - **Schema**: Immutable tree of [`Type`] nodes under a [`MessageType`]
//!   - Structural, order-sensitive equality
//!   - Children addressable by name and by index
//!
//! - **Builder**: Fluent, validating construction through [`SchemaBuilder`]
//!   - Explicit stack of open groups
//!   - Decimal bounds, annotation compatibility and fixed lengths checked as
//!     each node is finished
//!
//! - **Text form**: `Display` prints the canonical schema text and
//!   [`parse_message_type`] reads it back
//!
//! - **Inspection**: [`traits::SchemaInspector`] answers path containment
//!   questions used for column projection
//!
//! - **Columns**: [`ColumnDescriptor`]s with their max repetition and
//!   definition levels
//!
//! - **Compatibility**: schema union across files and projection checks

pub mod builder;
pub mod column;
pub mod compat;
pub mod error;
pub mod parser;
pub mod schema;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use builder::{FieldSink, PrimitiveBuilder, SchemaBuilder, Standalone, Types};
pub use column::{ColumnDescriptor, ColumnPath};
pub use error::{ErrorContext, ParquetError, Result};
pub use parser::parse_message_type;
pub use schema::{
    max_precision_for_length, DecimalMetadata, Fields, GroupType, LogicalAnnotation, MessageType,
    OriginalType, PrimitiveType, PrimitiveTypeName, Repetition, Type,
};
pub use traits::SchemaInspector;
