use std::fmt;

use indexmap::IndexMap;
use num::BigInt;

use crate::{ParquetError, Result};

/// Represents how values are repeated in Parquet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Field must have exactly one value
    Required,
    /// Field can have 0 or 1 value
    Optional,
    /// Field can have 0 or more values
    Repeated,
}

impl Repetition {
    /// Keyword used in the textual schema form
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Repetition::Required => "required",
            Repetition::Optional => "optional",
            Repetition::Repeated => "repeated",
        }
    }

    /// Parse a repetition keyword, ignoring case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "required" => Some(Repetition::Required),
            "optional" => Some(Repetition::Optional),
            "repeated" => Some(Repetition::Repeated),
            _ => None,
        }
    }

    /// `Required` is more restrictive than `Optional`, which is more
    /// restrictive than `Repeated`.
    pub fn is_more_restrictive_than(&self, other: Repetition) -> bool {
        self.rank() < other.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Repetition::Required => 0,
            Repetition::Optional => 1,
            Repetition::Repeated => 2,
        }
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Repetition::Required => "REQUIRED",
            Repetition::Optional => "OPTIONAL",
            Repetition::Repeated => "REPEATED",
        })
    }
}

/// Physical types a leaf column can be stored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTypeName {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    Binary,
    FixedLenByteArray,
}

impl PrimitiveTypeName {
    pub const ALL: [PrimitiveTypeName; 8] = [
        PrimitiveTypeName::Boolean,
        PrimitiveTypeName::Int32,
        PrimitiveTypeName::Int64,
        PrimitiveTypeName::Int96,
        PrimitiveTypeName::Float,
        PrimitiveTypeName::Double,
        PrimitiveTypeName::Binary,
        PrimitiveTypeName::FixedLenByteArray,
    ];

    /// Keyword used in the textual schema form
    pub fn as_keyword(&self) -> &'static str {
        match self {
            PrimitiveTypeName::Boolean => "boolean",
            PrimitiveTypeName::Int32 => "int32",
            PrimitiveTypeName::Int64 => "int64",
            PrimitiveTypeName::Int96 => "int96",
            PrimitiveTypeName::Float => "float",
            PrimitiveTypeName::Double => "double",
            PrimitiveTypeName::Binary => "binary",
            PrimitiveTypeName::FixedLenByteArray => "fixed_len_byte_array",
        }
    }

    /// Parse a primitive type keyword, ignoring case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_keyword() == keyword)
    }
}

impl fmt::Display for PrimitiveTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_keyword().to_ascii_uppercase())
    }
}

/// Annotation tags, without their parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginalType {
    Utf8,
    Enum,
    Decimal,
    Map,
    List,
    MapKeyValue,
}

impl OriginalType {
    pub const ALL: [OriginalType; 6] = [
        OriginalType::Utf8,
        OriginalType::Enum,
        OriginalType::Decimal,
        OriginalType::Map,
        OriginalType::List,
        OriginalType::MapKeyValue,
    ];

    pub fn as_keyword(&self) -> &'static str {
        match self {
            OriginalType::Utf8 => "UTF8",
            OriginalType::Enum => "ENUM",
            OriginalType::Decimal => "DECIMAL",
            OriginalType::Map => "MAP",
            OriginalType::List => "LIST",
            OriginalType::MapKeyValue => "MAP_KEY_VALUE",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|original| original.as_keyword() == keyword)
    }

    /// Whether this annotation applies to groups rather than primitives
    pub fn is_group_annotation(&self) -> bool {
        matches!(
            self,
            OriginalType::Map | OriginalType::List | OriginalType::MapKeyValue
        )
    }
}

impl fmt::Display for OriginalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// Precision and scale of a decimal annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalMetadata {
    precision: u32,
    scale: u32,
}

impl DecimalMetadata {
    pub fn try_new(precision: u32, scale: u32) -> Result<Self> {
        if precision == 0 {
            return Err(ParquetError::invalid_annotation(
                "DECIMAL precision must be positive",
            ));
        }
        if scale > precision {
            return Err(ParquetError::invalid_annotation(format!(
                "DECIMAL scale ({}) cannot be greater than precision ({})",
                scale, precision
            )));
        }
        Ok(Self { precision, scale })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

/// Largest decimal precision whose unscaled values always fit in a signed
/// two's-complement integer of `length` bytes: `floor(log10(2^(8*length-1) - 1))`.
/// Saturates at `u32::MAX`.
pub fn max_precision_for_length(length: u32) -> u32 {
    if length == 0 {
        return 0;
    }
    let bits = 8 * u64::from(length) - 1;
    if length <= EXACT_PRECISION_MAX_LENGTH {
        exact_max_precision(bits)
    } else {
        approximate_max_precision(bits)
    }
}

/// Longest length whose bound is computed on the full integer
const EXACT_PRECISION_MAX_LENGTH: u32 = 64;

/// log10(2) scaled by 10^27, rounded down
const LOG10_2_SCALED: u128 = 301_029_995_663_981_195_213_738_894;
const LOG10_2_SCALE: u128 = 1_000_000_000_000_000_000_000_000_000;

fn exact_max_precision(bits: u64) -> u32 {
    let one = BigInt::from(1u8);
    let max_unscaled = (one.clone() << bits as usize) - one;
    // digits(n) - 1 == floor(log10(n)) for n >= 1
    (max_unscaled.to_string().len() - 1) as u32
}

// 2^bits is never a power of ten, so floor(log10(2^bits - 1)) equals
// floor(bits * log10(2)). `bits` stays below 2^35, keeping the product in
// range and the truncation error far below the gap to the next integer.
fn approximate_max_precision(bits: u64) -> u32 {
    let precision = u128::from(bits) * LOG10_2_SCALED / LOG10_2_SCALE;
    u32::try_from(precision).unwrap_or(u32::MAX)
}

/// A logical annotation together with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAnnotation {
    Utf8,
    Enum,
    Decimal(DecimalMetadata),
    Map,
    List,
    MapKeyValue,
}

impl LogicalAnnotation {
    /// Build the parameterless annotation for a tag. Decimals need their
    /// precision, use [`LogicalAnnotation::decimal`] for those.
    pub fn from_original_type(original: OriginalType) -> Result<Self> {
        Ok(match original {
            OriginalType::Utf8 => LogicalAnnotation::Utf8,
            OriginalType::Enum => LogicalAnnotation::Enum,
            OriginalType::Map => LogicalAnnotation::Map,
            OriginalType::List => LogicalAnnotation::List,
            OriginalType::MapKeyValue => LogicalAnnotation::MapKeyValue,
            OriginalType::Decimal => {
                return Err(ParquetError::invalid_annotation(
                    "DECIMAL requires a precision",
                ))
            }
        })
    }

    pub fn decimal(precision: u32, scale: u32) -> Result<Self> {
        DecimalMetadata::try_new(precision, scale).map(LogicalAnnotation::Decimal)
    }

    pub fn original_type(&self) -> OriginalType {
        match self {
            LogicalAnnotation::Utf8 => OriginalType::Utf8,
            LogicalAnnotation::Enum => OriginalType::Enum,
            LogicalAnnotation::Decimal(_) => OriginalType::Decimal,
            LogicalAnnotation::Map => OriginalType::Map,
            LogicalAnnotation::List => OriginalType::List,
            LogicalAnnotation::MapKeyValue => OriginalType::MapKeyValue,
        }
    }

    pub fn decimal_metadata(&self) -> Option<DecimalMetadata> {
        match self {
            LogicalAnnotation::Decimal(meta) => Some(*meta),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalAnnotation::Decimal(meta) => {
                write!(f, "DECIMAL({},{})", meta.precision, meta.scale)
            }
            other => f.write_str(other.original_type().as_keyword()),
        }
    }
}

/// Ordered children of a group or message, addressable by name and index.
///
/// Equality is order sensitive: two groups with the same children in a
/// different order describe different column layouts.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    inner: IndexMap<String, Type>,
}

impl Fields {
    pub fn try_from_types(types: Vec<Type>, parent: &str) -> Result<Self> {
        let mut fields = Fields::default();
        for ty in types {
            fields.push(ty, Some(parent))?;
        }
        Ok(fields)
    }

    /// Append `ty`; `parent` names the enclosing node in the error when it
    /// is already known
    pub(crate) fn push(&mut self, ty: Type, parent: Option<&str>) -> Result<()> {
        if self.inner.contains_key(ty.name()) {
            return Err(ParquetError::malformed_schema(match parent {
                Some(parent) => format!("duplicate field '{}' in '{}'", ty.name(), parent),
                None => format!("duplicate field '{}'", ty.name()),
            }));
        }
        self.inner.insert(ty.name().to_string(), ty);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.inner.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Type> {
        self.inner.get_index(index).map(|(_, ty)| ty)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inner.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.inner.values()
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.inner.len() == other.inner.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Fields {}

/// A leaf column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveType {
    name: String,
    repetition: Repetition,
    type_name: PrimitiveTypeName,
    type_length: Option<u32>,
    annotation: Option<LogicalAnnotation>,
}

impl PrimitiveType {
    /// Create an unannotated primitive. Fails for `FixedLenByteArray`, which
    /// needs a length; use [`PrimitiveType::try_new`] for those.
    pub fn new(
        repetition: Repetition,
        type_name: PrimitiveTypeName,
        name: impl Into<String>,
    ) -> Result<Self> {
        Self::try_new(repetition, type_name, None, name, None)
    }

    pub fn try_new(
        repetition: Repetition,
        type_name: PrimitiveTypeName,
        type_length: Option<u32>,
        name: impl Into<String>,
        annotation: Option<LogicalAnnotation>,
    ) -> Result<Self> {
        let name = name.into();
        validate_primitive(&name, type_name, type_length, annotation.as_ref())?;
        Ok(Self {
            name,
            repetition,
            type_name,
            type_length,
            annotation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn type_name(&self) -> PrimitiveTypeName {
        self.type_name
    }

    /// Byte length, present only for `FixedLenByteArray`
    pub fn type_length(&self) -> Option<u32> {
        self.type_length
    }

    pub fn annotation(&self) -> Option<&LogicalAnnotation> {
        self.annotation.as_ref()
    }

    /// Same physical descriptor (kind, length and annotation), ignoring name
    /// and repetition
    pub fn same_descriptor(&self, other: &PrimitiveType) -> bool {
        self.type_name == other.type_name
            && self.type_length == other.type_length
            && self.annotation == other.annotation
    }

    pub(crate) fn with_repetition(&self, repetition: Repetition) -> Self {
        Self {
            repetition,
            ..self.clone()
        }
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        write!(
            out,
            "{:indent$}{} {}",
            "",
            self.repetition.as_keyword(),
            self.type_name.as_keyword(),
            indent = indent
        )?;
        if let Some(length) = self.type_length {
            write!(out, "({})", length)?;
        }
        write!(out, " {}", self.name)?;
        if let Some(annotation) = &self.annotation {
            write!(out, " ({})", annotation)?;
        }
        out.write_char(';')
    }
}

/// Characters that delimit tokens in the textual schema form
pub(crate) const NAME_DELIMITERS: [char; 6] = ['{', '}', '(', ')', ';', ','];

/// Names must be non-empty and must read back as a single token
pub(crate) fn validate_name(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ParquetError::malformed_schema(format!(
            "{} must have a name",
            kind
        )));
    }
    if let Some(ch) = name
        .chars()
        .find(|ch| ch.is_whitespace() || NAME_DELIMITERS.contains(ch))
    {
        return Err(ParquetError::malformed_schema(format!(
            "{} name '{}' cannot contain {:?}",
            kind, name, ch
        )));
    }
    Ok(())
}

fn validate_primitive(
    name: &str,
    type_name: PrimitiveTypeName,
    type_length: Option<u32>,
    annotation: Option<&LogicalAnnotation>,
) -> Result<()> {
    validate_name(name, &format!("{} field", type_name))?;

    match (type_name, type_length) {
        (PrimitiveTypeName::FixedLenByteArray, None) => {
            return Err(ParquetError::malformed_schema(format!(
                "FIXED_LEN_BYTE_ARRAY field '{}' requires a length",
                name
            )))
        }
        (PrimitiveTypeName::FixedLenByteArray, Some(0)) => {
            return Err(ParquetError::malformed_schema(format!(
                "FIXED_LEN_BYTE_ARRAY field '{}' must have a positive length",
                name
            )))
        }
        (PrimitiveTypeName::FixedLenByteArray, Some(_)) | (_, None) => {}
        (other, Some(length)) => {
            return Err(ParquetError::malformed_schema(format!(
                "{} field '{}' cannot declare a length ({})",
                other, name, length
            )))
        }
    }

    let Some(annotation) = annotation else {
        return Ok(());
    };
    match annotation {
        LogicalAnnotation::Utf8 | LogicalAnnotation::Enum => {
            if type_name != PrimitiveTypeName::Binary {
                return Err(ParquetError::invalid_annotation(format!(
                    "{} can only annotate BINARY fields, '{}' is {}",
                    annotation, name, type_name
                )));
            }
        }
        LogicalAnnotation::Decimal(meta) => {
            match (type_name, type_length) {
                (PrimitiveTypeName::Binary, _) => {}
                (PrimitiveTypeName::FixedLenByteArray, Some(length)) => {
                    let max_precision = max_precision_for_length(length);
                    if meta.precision() > max_precision {
                        return Err(ParquetError::invalid_annotation(format!(
                            "FIXED_LEN_BYTE_ARRAY({}) cannot hold {} digits of precision (max {}) in '{}'",
                            length,
                            meta.precision(),
                            max_precision,
                            name
                        )));
                    }
                }
                _ => {
                    return Err(ParquetError::invalid_annotation(format!(
                        "DECIMAL can only annotate BINARY and FIXED_LEN_BYTE_ARRAY fields, '{}' is {}",
                        name, type_name
                    )))
                }
            }
        }
        LogicalAnnotation::Map | LogicalAnnotation::List | LogicalAnnotation::MapKeyValue => {
            return Err(ParquetError::invalid_annotation(format!(
                "{} can only annotate groups, '{}' is {}",
                annotation, name, type_name
            )))
        }
    }
    Ok(())
}

/// A nested record with ordered, uniquely named children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupType {
    name: String,
    repetition: Repetition,
    annotation: Option<LogicalAnnotation>,
    fields: Fields,
}

impl GroupType {
    pub fn new(repetition: Repetition, name: impl Into<String>, fields: Vec<Type>) -> Result<Self> {
        Self::try_new(repetition, name, None, fields)
    }

    pub fn try_new(
        repetition: Repetition,
        name: impl Into<String>,
        annotation: Option<LogicalAnnotation>,
        fields: Vec<Type>,
    ) -> Result<Self> {
        let name = name.into();
        let fields = Fields::try_from_types(fields, &name)?;
        Self::from_fields(repetition, name, annotation, fields)
    }

    pub(crate) fn from_fields(
        repetition: Repetition,
        name: String,
        annotation: Option<LogicalAnnotation>,
        fields: Fields,
    ) -> Result<Self> {
        validate_name(&name, "group")?;
        if let Some(annotation) = &annotation {
            if !annotation.original_type().is_group_annotation() {
                return Err(ParquetError::invalid_annotation(format!(
                    "{} cannot annotate group '{}'",
                    annotation, name
                )));
            }
        }
        Ok(Self {
            name,
            repetition,
            annotation,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn annotation(&self) -> Option<&LogicalAnnotation> {
        self.annotation.as_ref()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    pub fn field_at(&self, index: usize) -> Option<&Type> {
        self.fields.get_index(index)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn with_fields(&self, repetition: Repetition, fields: Fields) -> Self {
        Self {
            name: self.name.clone(),
            repetition,
            annotation: self.annotation,
            fields,
        }
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        write!(
            out,
            "{:indent$}{} group {}",
            "",
            self.repetition.as_keyword(),
            self.name,
            indent = indent
        )?;
        if let Some(annotation) = &self.annotation {
            write!(out, " ({})", annotation)?;
        }
        out.write_str(" {\n")?;
        write_fields(out, &self.fields, indent + 2)?;
        write!(out, "{:indent$}}}", "", indent = indent)
    }
}

/// A node of the schema tree below the message root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Group(GroupType),
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Primitive(primitive) => primitive.name(),
            Type::Group(group) => group.name(),
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            Type::Primitive(primitive) => primitive.repetition(),
            Type::Group(group) => group.repetition(),
        }
    }

    pub fn is_repetition(&self, repetition: Repetition) -> bool {
        self.repetition() == repetition
    }

    pub fn annotation(&self) -> Option<&LogicalAnnotation> {
        match self {
            Type::Primitive(primitive) => primitive.annotation(),
            Type::Group(group) => group.annotation(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        match self {
            Type::Primitive(primitive) => Some(primitive),
            Type::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupType> {
        match self {
            Type::Group(group) => Some(group),
            Type::Primitive(_) => None,
        }
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => primitive.write_to(out, indent),
            Type::Group(group) => group.write_to(out, indent),
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(primitive: PrimitiveType) -> Self {
        Type::Primitive(primitive)
    }
}

impl From<GroupType> for Type {
    fn from(group: GroupType) -> Self {
        Type::Group(group)
    }
}

/// The root of a schema: one complete record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    name: String,
    fields: Fields,
}

impl MessageType {
    pub fn new(name: impl Into<String>, fields: Vec<Type>) -> Result<Self> {
        let name = name.into();
        let fields = Fields::try_from_types(fields, &name)?;
        Self::from_fields(name, fields)
    }

    pub(crate) fn from_fields(name: String, fields: Fields) -> Result<Self> {
        validate_name(&name, "message")?;
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    pub fn field_at(&self, index: usize) -> Option<&Type> {
        self.fields.get_index(index)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

fn write_fields<W: fmt::Write>(out: &mut W, fields: &Fields, indent: usize) -> fmt::Result {
    for field in fields.iter() {
        field.write_to(out, indent)?;
        out.write_char('\n')?;
    }
    Ok(())
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, 0)
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, 0)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, 0)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name)?;
        write_fields(f, &self.fields, 2)?;
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::document_schema;

    #[test]
    fn test_max_precision_for_length() {
        assert_eq!(max_precision_for_length(1), 2);
        assert_eq!(max_precision_for_length(2), 4);
        assert_eq!(max_precision_for_length(4), 9);
        assert_eq!(max_precision_for_length(8), 18);
        assert_eq!(max_precision_for_length(16), 38);
        assert_eq!(max_precision_for_length(2_000_000), 4_816_479);
        assert_eq!(max_precision_for_length(1_000_000_000), 2_408_239_965);
        assert_eq!(max_precision_for_length(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_approximate_precision_matches_exact() {
        for length in 1..=EXACT_PRECISION_MAX_LENGTH {
            let bits = 8 * u64::from(length) - 1;
            assert_eq!(
                approximate_max_precision(bits),
                exact_max_precision(bits),
                "length {}",
                length
            );
        }
    }

    #[test]
    fn test_fixed_requires_length() {
        let err = PrimitiveType::new(
            Repetition::Required,
            PrimitiveTypeName::FixedLenByteArray,
            "fixed",
        )
        .unwrap_err();
        assert!(err.is_malformed_schema());

        let err = PrimitiveType::try_new(
            Repetition::Required,
            PrimitiveTypeName::Int32,
            Some(4),
            "not_fixed",
            None,
        )
        .unwrap_err();
        assert!(err.is_malformed_schema());
    }

    #[test]
    fn test_group_annotation_on_primitive_rejected() {
        let err = PrimitiveType::try_new(
            Repetition::Required,
            PrimitiveTypeName::Binary,
            None,
            "list",
            Some(LogicalAnnotation::List),
        )
        .unwrap_err();
        assert!(err.is_invalid_annotation());
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let id = PrimitiveType::new(Repetition::Required, PrimitiveTypeName::Int64, "id").unwrap();
        let err = MessageType::new("dup", vec![id.clone().into(), id.into()]).unwrap_err();
        assert!(err.is_malformed_schema());
        assert!(err.to_string().contains("duplicate field 'id'"));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = PrimitiveType::new(Repetition::Required, PrimitiveTypeName::Int32, "a").unwrap();
        let b = PrimitiveType::new(Repetition::Required, PrimitiveTypeName::Int32, "b").unwrap();

        let ab = MessageType::new("m", vec![a.clone().into(), b.clone().into()]).unwrap();
        let ba = MessageType::new("m", vec![b.into(), a.into()]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let schema = document_schema();
        assert_eq!(schema.field_count(), 3);
        assert_eq!(schema.field_at(1).unwrap().name(), "Links");
        assert_eq!(schema.fields().index_of("Name"), Some(2));

        let links = schema.field("Links").unwrap().as_group().unwrap();
        assert_eq!(links.repetition(), Repetition::Optional);
        assert_eq!(links.field_at(0).unwrap().name(), "Backward");
        assert!(links.field("Missing").is_none());
    }

    #[test]
    fn test_display_document() {
        let expected = "\
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
}
";
        assert_eq!(document_schema().to_string(), expected);
    }

    #[test]
    fn test_display_annotated_primitive() {
        let price = PrimitiveType::try_new(
            Repetition::Optional,
            PrimitiveTypeName::FixedLenByteArray,
            Some(4),
            "price",
            Some(LogicalAnnotation::decimal(9, 2).unwrap()),
        )
        .unwrap();
        assert_eq!(
            price.to_string(),
            "optional fixed_len_byte_array(4) price (DECIMAL(9,2));"
        );
    }

    #[test]
    fn test_repetition_restrictiveness() {
        assert!(Repetition::Required.is_more_restrictive_than(Repetition::Optional));
        assert!(Repetition::Optional.is_more_restrictive_than(Repetition::Repeated));
        assert!(!Repetition::Repeated.is_more_restrictive_than(Repetition::Required));
        assert!(!Repetition::Optional.is_more_restrictive_than(Repetition::Optional));
    }
}
