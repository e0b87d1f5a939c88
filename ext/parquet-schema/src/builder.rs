//! Fluent, validating construction of schemas
//!
//! A [`SchemaBuilder`] keeps an explicit stack of open group contexts. The
//! bottom of the stack is the message being built. Entering a primitive scope
//! (`required`, `optional`, `repeated`) hands out a [`PrimitiveBuilder`] whose
//! `named` call validates the leaf and appends it to the innermost open group.
//! Entering a group scope pushes a context; `named` on the builder pops it and
//! appends the finished group to its parent, or finalizes the message when the
//! root is popped.
//!
//! ```
//! use parquet_schema::{PrimitiveTypeName::*, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new()
//!     .required(Int64).named("DocId")?
//!     .optional_group()
//!         .repeated(Int64).named("Backward")?
//!         .repeated(Int64).named("Forward")?
//!         .named("Links")?
//!     .named("Document")?
//!     .build()?;
//! assert_eq!(schema.field_count(), 2);
//! # Ok::<(), parquet_schema::ParquetError>(())
//! ```

use crate::schema::{
    Fields, GroupType, LogicalAnnotation, MessageType, OriginalType, PrimitiveType,
    PrimitiveTypeName, Repetition, Type,
};
use crate::{ParquetError, Result};

/// Receives a finished primitive from a [`PrimitiveBuilder`]
pub trait FieldSink {
    type Output;

    fn accept(self, field: PrimitiveType) -> Result<Self::Output>;
}

/// Entry points for standalone primitives and whole messages
pub struct Types;

impl Types {
    pub fn build_message() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn primitive(
        type_name: PrimitiveTypeName,
        repetition: Repetition,
    ) -> PrimitiveBuilder<Standalone> {
        PrimitiveBuilder::new(Standalone, repetition, type_name)
    }

    pub fn required(type_name: PrimitiveTypeName) -> PrimitiveBuilder<Standalone> {
        Self::primitive(type_name, Repetition::Required)
    }

    pub fn optional(type_name: PrimitiveTypeName) -> PrimitiveBuilder<Standalone> {
        Self::primitive(type_name, Repetition::Optional)
    }

    pub fn repeated(type_name: PrimitiveTypeName) -> PrimitiveBuilder<Standalone> {
        Self::primitive(type_name, Repetition::Repeated)
    }
}

/// Sink for primitives built outside of any group
pub struct Standalone;

impl FieldSink for Standalone {
    type Output = PrimitiveType;

    fn accept(self, field: PrimitiveType) -> Result<PrimitiveType> {
        Ok(field)
    }
}

/// Primitive scope: kind, optional length and annotation, then `named`
#[must_use = "a primitive is only added once it is named"]
pub struct PrimitiveBuilder<P> {
    parent: P,
    repetition: Repetition,
    type_name: PrimitiveTypeName,
    length: Option<u32>,
    original_type: Option<OriginalType>,
    precision: Option<u32>,
    scale: Option<u32>,
}

impl<P: FieldSink> PrimitiveBuilder<P> {
    fn new(parent: P, repetition: Repetition, type_name: PrimitiveTypeName) -> Self {
        Self {
            parent,
            repetition,
            type_name,
            length: None,
            original_type: None,
            precision: None,
            scale: None,
        }
    }

    /// Byte length, required for `FixedLenByteArray` and rejected otherwise
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_annotation(mut self, original_type: OriginalType) -> Self {
        self.original_type = Some(original_type);
        self
    }

    /// Decimal precision; only valid together with `OriginalType::Decimal`
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Decimal scale, 0 when not set
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Validate the primitive and hand it to the enclosing scope
    pub fn named(self, name: impl Into<String>) -> Result<P::Output> {
        let name = name.into();
        let annotation = self.annotation(&name)?;
        let field = PrimitiveType::try_new(
            self.repetition,
            self.type_name,
            self.length,
            name,
            annotation,
        )?;
        self.parent.accept(field)
    }

    fn annotation(&self, name: &str) -> Result<Option<LogicalAnnotation>> {
        match self.original_type {
            Some(OriginalType::Decimal) => {
                let precision = self.precision.ok_or_else(|| {
                    ParquetError::invalid_annotation(format!(
                        "DECIMAL field '{}' requires a precision",
                        name
                    ))
                })?;
                LogicalAnnotation::decimal(precision, self.scale.unwrap_or(0)).map(Some)
            }
            other => {
                if self.precision.is_some() || self.scale.is_some() {
                    return Err(ParquetError::invalid_annotation(format!(
                        "precision and scale are only valid on DECIMAL fields, '{}' is not one",
                        name
                    )));
                }
                other.map(LogicalAnnotation::from_original_type).transpose()
            }
        }
    }
}

#[derive(Debug)]
enum ContextKind {
    Message,
    Group(Repetition),
}

#[derive(Debug)]
struct GroupContext {
    kind: ContextKind,
    annotation: Option<OriginalType>,
    fields: Fields,
}

impl GroupContext {
    fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            annotation: None,
            fields: Fields::default(),
        }
    }
}

/// Group scope of the fluent builder; owns the stack of open groups.
///
/// Single use: once the message is named, further additions fail.
#[derive(Debug)]
pub struct SchemaBuilder {
    stack: Vec<GroupContext>,
    finished: Option<MessageType>,
    misuse: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![GroupContext::new(ContextKind::Message)],
            finished: None,
            misuse: None,
        }
    }

    pub fn primitive(
        self,
        type_name: PrimitiveTypeName,
        repetition: Repetition,
    ) -> PrimitiveBuilder<Self> {
        PrimitiveBuilder::new(self, repetition, type_name)
    }

    pub fn required(self, type_name: PrimitiveTypeName) -> PrimitiveBuilder<Self> {
        self.primitive(type_name, Repetition::Required)
    }

    pub fn optional(self, type_name: PrimitiveTypeName) -> PrimitiveBuilder<Self> {
        self.primitive(type_name, Repetition::Optional)
    }

    pub fn repeated(self, type_name: PrimitiveTypeName) -> PrimitiveBuilder<Self> {
        self.primitive(type_name, Repetition::Repeated)
    }

    /// Open a nested group; close it with [`SchemaBuilder::named`]
    pub fn group(mut self, repetition: Repetition) -> Self {
        self.stack
            .push(GroupContext::new(ContextKind::Group(repetition)));
        self
    }

    pub fn required_group(self) -> Self {
        self.group(Repetition::Required)
    }

    pub fn optional_group(self) -> Self {
        self.group(Repetition::Optional)
    }

    pub fn repeated_group(self) -> Self {
        self.group(Repetition::Repeated)
    }

    /// Annotate the innermost open group (`MAP`, `LIST` or `MAP_KEY_VALUE`)
    pub fn with_annotation(mut self, original_type: OriginalType) -> Self {
        match self.stack.last_mut() {
            Some(context) => context.annotation = Some(original_type),
            None => {
                self.misuse.get_or_insert_with(|| {
                    format!(
                        "cannot annotate with {}: the schema is already finalized",
                        original_type
                    )
                });
            }
        }
        self
    }

    /// Append an already constructed node to the innermost open group
    pub fn add_field(mut self, field: impl Into<Type>) -> Result<Self> {
        self.check_usable()?;
        self.append(field.into())?;
        Ok(self)
    }

    /// Close the innermost open group under `name`. Closing the message root
    /// finalizes the schema; retrieve it with [`SchemaBuilder::build`].
    pub fn named(mut self, name: impl Into<String>) -> Result<Self> {
        self.check_usable()?;
        let name = name.into();
        let context = self.stack.pop().ok_or_else(|| {
            ParquetError::malformed_schema(format!(
                "cannot close '{}': the schema is already finalized",
                name
            ))
        })?;

        match context.kind {
            ContextKind::Message => {
                if let Some(original_type) = context.annotation {
                    return Err(ParquetError::invalid_annotation(format!(
                        "{} cannot annotate message '{}'",
                        original_type, name
                    )));
                }
                self.finished = Some(MessageType::from_fields(name, context.fields)?);
            }
            ContextKind::Group(repetition) => {
                let annotation = match context.annotation {
                    None => None,
                    Some(original_type) if original_type.is_group_annotation() => {
                        Some(LogicalAnnotation::from_original_type(original_type)?)
                    }
                    Some(original_type) => {
                        return Err(ParquetError::invalid_annotation(format!(
                            "{} cannot annotate group '{}'",
                            original_type, name
                        )))
                    }
                };
                let group = GroupType::from_fields(repetition, name, annotation, context.fields)?;
                self.append(group.into())?;
            }
        }
        Ok(self)
    }

    /// The finished message. Fails while any group, including the message
    /// root, is still open.
    pub fn build(self) -> Result<MessageType> {
        self.check_usable()?;
        if !self.stack.is_empty() {
            return Err(ParquetError::malformed_schema(format!(
                "{} group(s) still open; name every group and the message before building",
                self.stack.len()
            )));
        }
        self.finished.ok_or_else(|| {
            ParquetError::malformed_schema("the message was never named")
        })
    }

    /// Number of open nested groups, not counting the message root
    pub fn depth(&self) -> usize {
        match self.stack.first() {
            Some(GroupContext {
                kind: ContextKind::Message,
                ..
            }) => self.stack.len() - 1,
            _ => self.stack.len(),
        }
    }

    fn check_usable(&self) -> Result<()> {
        match &self.misuse {
            Some(message) => Err(ParquetError::malformed_schema(message.clone())),
            None => Ok(()),
        }
    }

    fn append(&mut self, field: Type) -> Result<()> {
        let context = self.stack.last_mut().ok_or_else(|| {
            ParquetError::malformed_schema(format!(
                "cannot add '{}': the schema is already finalized",
                field.name()
            ))
        })?;
        context.fields.push(field, None)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSink for SchemaBuilder {
    type Output = SchemaBuilder;

    fn accept(mut self, field: PrimitiveType) -> Result<SchemaBuilder> {
        self.check_usable()?;
        self.append(field.into())?;
        Ok(self)
    }
}
