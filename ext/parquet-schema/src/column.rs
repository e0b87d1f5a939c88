//! Leaf columns of a schema and their repetition/definition levels

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{MessageType, PrimitiveType, Repetition, Type};

/// Field names from the message root down to a leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPath {
    parts: Vec<String>,
}

impl ColumnPath {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// Split a dot-separated path such as `Links.Backward`
    pub fn from_dotted(path: &str) -> Self {
        Self {
            parts: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut parts = self.parts.clone();
        parts.push(name.to_string());
        Self { parts }
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl From<&str> for ColumnPath {
    fn from(path: &str) -> Self {
        Self::from_dotted(path)
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A leaf column as it is shredded on disk.
///
/// The max repetition level counts the `repeated` nodes on the path, the max
/// definition level counts every node that is not `required`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    path: ColumnPath,
    primitive: PrimitiveType,
    max_repetition_level: u16,
    max_definition_level: u16,
}

impl ColumnDescriptor {
    pub fn path(&self) -> &ColumnPath {
        &self.path
    }

    pub fn primitive(&self) -> &PrimitiveType {
        &self.primitive
    }

    pub fn max_repetition_level(&self) -> u16 {
        self.max_repetition_level
    }

    pub fn max_definition_level(&self) -> u16 {
        self.max_definition_level
    }
}

impl MessageType {
    /// Leaf columns in on-disk order
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        let mut columns = Vec::new();
        for field in self.fields().iter() {
            collect_columns(field, &ColumnPath::new(Vec::new()), 0, 0, &mut columns);
        }
        columns
    }

    pub fn column(&self, path: &ColumnPath) -> Option<ColumnDescriptor> {
        self.columns()
            .into_iter()
            .find(|column| column.path() == path)
    }
}

fn collect_columns(
    ty: &Type,
    parent: &ColumnPath,
    repetition_level: u16,
    definition_level: u16,
    columns: &mut Vec<ColumnDescriptor>,
) {
    let path = parent.child(ty.name());
    let (repetition_level, definition_level) = match ty.repetition() {
        Repetition::Required => (repetition_level, definition_level),
        Repetition::Optional => (repetition_level, definition_level + 1),
        Repetition::Repeated => (repetition_level + 1, definition_level + 1),
    };

    match ty {
        Type::Primitive(primitive) => columns.push(ColumnDescriptor {
            path,
            primitive: primitive.clone(),
            max_repetition_level: repetition_level,
            max_definition_level: definition_level,
        }),
        Type::Group(group) => {
            for field in group.fields().iter() {
                collect_columns(field, &path, repetition_level, definition_level, columns);
            }
        }
    }
}
