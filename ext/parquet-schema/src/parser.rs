//! Parser for the textual schema form
//!
//! Accepts what `Display` prints for a [`MessageType`]:
//!
//! ```text
//! message Document {
//!   required int64 DocId;
//!   optional group Links {
//!     repeated int64 Backward;
//!   }
//!   required fixed_len_byte_array(4) price (DECIMAL(9,2));
//! }
//! ```
//!
//! Keywords are case-insensitive. Parsing drives a [`SchemaBuilder`], so every
//! construction rule of the builder applies to parsed input as well.

use crate::builder::{PrimitiveBuilder, SchemaBuilder};
use crate::schema::{
    validate_name, MessageType, OriginalType, PrimitiveTypeName, Repetition, NAME_DELIMITERS,
};
use crate::{ErrorContext, ParquetError, Result};

/// Parse the textual form of a message schema
pub fn parse_message_type(input: &str) -> Result<MessageType> {
    let mut tokens = Tokens::new(input);
    tokens.expect("message")?;
    let name = tokens.next_identifier("message name")?;
    tokens.expect("{")?;

    let schema = parse_fields(&mut tokens, SchemaBuilder::new())?
        .named(name)?
        .build()?;

    if let Some(extra) = tokens.peek() {
        return Err(tokens.error(format!(
            "unexpected '{}' after the end of the message",
            extra
        )));
    }
    Ok(schema)
}

impl std::str::FromStr for MessageType {
    type Err = ParquetError;

    fn from_str(s: &str) -> Result<Self> {
        parse_message_type(s)
    }
}

struct Tokens {
    tokens: Vec<String>,
    position: usize,
}

impl Tokens {
    fn new(input: &str) -> Self {
        let mut tokens = Vec::new();
        let mut current = String::new();
        for ch in input.chars() {
            if ch.is_whitespace() || NAME_DELIMITERS.contains(&ch) {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                if !ch.is_whitespace() {
                    tokens.push(ch.to_string());
                }
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn peek_is(&self, literal: &str) -> bool {
        self.peek() == Some(literal)
    }

    fn next(&mut self, expected: &str) -> Result<String> {
        match self.tokens.get(self.position) {
            Some(token) => {
                self.position += 1;
                Ok(token.clone())
            }
            None => Err(self.error(format!("unexpected end of schema, expected {}", expected))),
        }
    }

    fn next_identifier(&mut self, expected: &str) -> Result<String> {
        let position = self.position;
        let token = self.next(expected)?;
        if token.chars().count() == 1 && token.chars().all(|ch| NAME_DELIMITERS.contains(&ch)) {
            return Err(ParquetError::parse(
                position,
                format!("expected {}, found '{}'", expected, token),
            ));
        }
        validate_name(&token, expected)?;
        Ok(token)
    }

    fn next_u32(&mut self, expected: &str) -> Result<u32> {
        let position = self.position;
        let token = self.next(expected)?;
        token
            .parse::<u32>()
            .with_context(|| format!("invalid {} '{}' at token {}", expected, token, position))
    }

    fn expect(&mut self, literal: &str) -> Result<()> {
        let position = self.position;
        let token = self.next(&format!("'{}'", literal))?;
        if token.eq_ignore_ascii_case(literal) {
            Ok(())
        } else {
            Err(ParquetError::parse(
                position,
                format!("expected '{}', found '{}'", literal, token),
            ))
        }
    }

    fn error(&self, message: String) -> ParquetError {
        ParquetError::parse(self.position, message)
    }
}

fn parse_fields(tokens: &mut Tokens, mut builder: SchemaBuilder) -> Result<SchemaBuilder> {
    loop {
        let next = tokens.peek().map(str::to_owned);
        match next.as_deref() {
            Some("}") => {
                tokens.position += 1;
                return Ok(builder);
            }
            Some(_) => builder = parse_field(tokens, builder)?,
            None => return Err(tokens.error("unexpected end of schema, expected '}'".into())),
        }
    }
}

fn parse_field(tokens: &mut Tokens, builder: SchemaBuilder) -> Result<SchemaBuilder> {
    let position = tokens.position;
    let keyword = tokens.next("a repetition")?;
    let repetition = Repetition::from_keyword(&keyword).ok_or_else(|| {
        ParquetError::parse(
            position,
            format!(
                "expected required, optional or repeated, found '{}'",
                keyword
            ),
        )
    })?;

    let position = tokens.position;
    let kind = tokens.next("a type")?;
    if kind.eq_ignore_ascii_case("group") {
        return parse_group(tokens, builder, repetition);
    }

    let type_name = PrimitiveTypeName::from_keyword(&kind).ok_or_else(|| {
        ParquetError::parse(position, format!("unknown primitive type '{}'", kind))
    })?;
    let mut primitive = builder.primitive(type_name, repetition);
    if tokens.peek_is("(") {
        tokens.position += 1;
        primitive = primitive.with_length(tokens.next_u32("length")?);
        tokens.expect(")")?;
    }

    let name = tokens.next_identifier("field name")?;
    if tokens.peek_is("(") {
        primitive = apply_annotation(primitive, parse_annotation(tokens)?);
    }
    tokens.expect(";")?;
    primitive.named(name)
}

fn parse_group(
    tokens: &mut Tokens,
    builder: SchemaBuilder,
    repetition: Repetition,
) -> Result<SchemaBuilder> {
    let name = tokens.next_identifier("group name")?;
    let mut builder = builder.group(repetition);
    if tokens.peek_is("(") {
        let position = tokens.position;
        let annotation = parse_annotation(tokens)?;
        if annotation.precision.is_some() {
            return Err(ParquetError::parse(
                position,
                format!("group annotation {} takes no parameters", annotation.original_type),
            ));
        }
        builder = builder.with_annotation(annotation.original_type);
    }
    tokens.expect("{")?;
    parse_fields(tokens, builder)?.named(name)
}

struct ParsedAnnotation {
    original_type: OriginalType,
    precision: Option<u32>,
    scale: Option<u32>,
}

fn parse_annotation(tokens: &mut Tokens) -> Result<ParsedAnnotation> {
    tokens.expect("(")?;
    let position = tokens.position;
    let keyword = tokens.next("an annotation")?;
    let original_type = OriginalType::from_keyword(&keyword).ok_or_else(|| {
        ParquetError::parse(position, format!("unknown annotation '{}'", keyword))
    })?;

    let mut precision = None;
    let mut scale = None;
    if tokens.peek_is("(") {
        tokens.position += 1;
        precision = Some(tokens.next_u32("precision")?);
        if tokens.peek_is(",") {
            tokens.position += 1;
            scale = Some(tokens.next_u32("scale")?);
        }
        tokens.expect(")")?;
    }
    tokens.expect(")")?;

    Ok(ParsedAnnotation {
        original_type,
        precision,
        scale,
    })
}

fn apply_annotation(
    primitive: PrimitiveBuilder<SchemaBuilder>,
    annotation: ParsedAnnotation,
) -> PrimitiveBuilder<SchemaBuilder> {
    let mut primitive = primitive.with_annotation(annotation.original_type);
    if let Some(precision) = annotation.precision {
        primitive = primitive.with_precision(precision);
    }
    if let Some(scale) = annotation.scale {
        primitive = primitive.with_scale(scale);
    }
    primitive
}
