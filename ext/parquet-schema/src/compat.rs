//! Merging schemas of several files and checking projections against them

use crate::column::ColumnPath;
use crate::schema::{Fields, MessageType, Type};
use crate::traits::SchemaInspector;
use crate::{ParquetError, Result};

impl MessageType {
    /// Merge `other` into this schema.
    ///
    /// Fields keep this schema's order; fields only present in `other` are
    /// appended. A field present in both must have the same shape and the
    /// same primitive descriptor, and `other` may relax its repetition but
    /// never tighten it.
    pub fn union(&self, other: &MessageType) -> Result<MessageType> {
        let fields = merge_fields(self.fields(), other.fields(), self.name())?;
        MessageType::from_fields(self.name().to_string(), fields)
    }

    /// Check that every column of `projection` exists in this schema with the
    /// same primitive descriptor
    pub fn check_contains(&self, projection: &MessageType) -> Result<()> {
        for column in projection.columns() {
            let path = column.path();
            match self
                .get_field_by_path(path.parts())
                .and_then(Type::as_primitive)
            {
                Some(primitive) if primitive.same_descriptor(column.primitive()) => {}
                Some(primitive) => {
                    return Err(ParquetError::incompatible_schema(format!(
                        "column '{}' is '{}' in schema '{}' but '{}' in the projection",
                        path,
                        primitive,
                        self.name(),
                        column.primitive()
                    )))
                }
                None => {
                    return Err(ParquetError::incompatible_schema(format!(
                        "column '{}' is not a column of schema '{}'",
                        path,
                        self.name()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Keep only the nodes on the way to `paths`. A path naming a group keeps
    /// the whole group.
    pub fn project(&self, paths: &[ColumnPath]) -> Result<MessageType> {
        if let Some(missing) = paths
            .iter()
            .find(|path| self.get_field_by_path(path.parts()).is_none())
        {
            return Err(ParquetError::incompatible_schema(format!(
                "cannot project '{}': not a field of schema '{}'",
                missing,
                self.name()
            )));
        }
        let fields = project_fields(self.fields(), &mut Vec::new(), paths, self.name())?;
        MessageType::from_fields(self.name().to_string(), fields)
    }
}

fn merge_fields(left: &Fields, right: &Fields, parent: &str) -> Result<Fields> {
    let mut merged = Fields::default();
    for field in left.iter() {
        let field = match right.get(field.name()) {
            Some(other) => merge_type(field, other)?,
            None => field.clone(),
        };
        merged.push(field, Some(parent))?;
    }
    for field in right.iter() {
        if left.get(field.name()).is_none() {
            merged.push(field.clone(), Some(parent))?;
        }
    }
    Ok(merged)
}

fn merge_type(left: &Type, right: &Type) -> Result<Type> {
    if right.repetition().is_more_restrictive_than(left.repetition()) {
        return Err(ParquetError::incompatible_schema(format!(
            "'{}' cannot be narrowed from {} to {}",
            left.name(),
            left.repetition(),
            right.repetition()
        )));
    }
    let repetition = right.repetition();

    match (left, right) {
        (Type::Primitive(l), Type::Primitive(r)) => {
            if !l.same_descriptor(r) {
                return Err(ParquetError::incompatible_schema(format!(
                    "cannot merge '{}' with '{}'",
                    l, r
                )));
            }
            Ok(Type::Primitive(l.with_repetition(repetition)))
        }
        (Type::Group(l), Type::Group(r)) => {
            if l.annotation() != r.annotation() {
                return Err(ParquetError::incompatible_schema(format!(
                    "group '{}' has conflicting annotations",
                    l.name()
                )));
            }
            let fields = merge_fields(l.fields(), r.fields(), l.name())?;
            Ok(Type::Group(l.with_fields(repetition, fields)))
        }
        _ => Err(ParquetError::incompatible_schema(format!(
            "'{}' is a group in one schema and a primitive in the other",
            left.name()
        ))),
    }
}

fn project_fields(
    fields: &Fields,
    prefix: &mut Vec<String>,
    paths: &[ColumnPath],
    parent: &str,
) -> Result<Fields> {
    let mut projected = Fields::default();
    for field in fields.iter() {
        prefix.push(field.name().to_string());
        let kept = if paths.iter().any(|path| path.parts() == prefix.as_slice()) {
            Some(field.clone())
        } else {
            match field {
                Type::Group(group)
                    if paths
                        .iter()
                        .any(|path| path.parts().starts_with(prefix.as_slice())) =>
                {
                    let children = project_fields(group.fields(), prefix, paths, group.name())?;
                    Some(Type::Group(group.with_fields(group.repetition(), children)))
                }
                _ => None,
            }
        };
        prefix.pop();

        if let Some(field) = kept {
            projected.push(field, Some(parent))?;
        }
    }
    Ok(projected)
}
