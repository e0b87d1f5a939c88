use crate::column::ColumnPath;
use crate::schema::{Fields, GroupType, MessageType, Type};

/// Trait for schema introspection
///
/// This trait provides methods for examining and querying schemas
/// without modifying them.
pub trait SchemaInspector {
    /// Get the total number of fields, nested groups and their children
    /// included
    fn total_field_count(&self) -> usize;

    /// Get the node at a path of field names, group or leaf
    fn get_field_by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Type>;

    /// Whether `path` names a leaf column of this schema.
    ///
    /// Walks child by child and answers `false` as soon as a name is missing
    /// at the current level or the path continues past a leaf. A path that
    /// stops on a group is not a column and is not contained either.
    fn contains_path<S: AsRef<str>>(&self, path: &[S]) -> bool;

    /// Get all leaf column paths in the schema
    fn all_column_paths(&self) -> Vec<ColumnPath>;
}

impl SchemaInspector for MessageType {
    fn total_field_count(&self) -> usize {
        count_fields(self.fields())
    }

    fn get_field_by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Type> {
        get_field_by_path(self.fields(), path)
    }

    fn contains_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        fields_contain_path(self.fields(), path)
    }

    fn all_column_paths(&self) -> Vec<ColumnPath> {
        let mut paths = Vec::new();
        collect_column_paths(self.fields(), &mut Vec::new(), &mut paths);
        paths
    }
}

impl SchemaInspector for GroupType {
    fn total_field_count(&self) -> usize {
        count_fields(self.fields())
    }

    fn get_field_by_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Type> {
        get_field_by_path(self.fields(), path)
    }

    fn contains_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        fields_contain_path(self.fields(), path)
    }

    fn all_column_paths(&self) -> Vec<ColumnPath> {
        let mut paths = Vec::new();
        collect_column_paths(self.fields(), &mut Vec::new(), &mut paths);
        paths
    }
}

// Helper functions for schema inspection
fn count_fields(fields: &Fields) -> usize {
    fields
        .iter()
        .map(|field| match field {
            Type::Primitive(_) => 1,
            Type::Group(group) => 1 + count_fields(group.fields()),
        })
        .sum()
}

fn get_field_by_path<'a, S: AsRef<str>>(fields: &'a Fields, path: &[S]) -> Option<&'a Type> {
    let (first, rest) = path.split_first()?;
    let field = fields.get(first.as_ref())?;
    if rest.is_empty() {
        return Some(field);
    }
    match field {
        Type::Group(group) => get_field_by_path(group.fields(), rest),
        Type::Primitive(_) => None,
    }
}

fn fields_contain_path<S: AsRef<str>>(fields: &Fields, path: &[S]) -> bool {
    let mut current = fields;
    let mut remaining = path;
    loop {
        let Some((first, rest)) = remaining.split_first() else {
            // ran out of names while still on a group
            return false;
        };
        match current.get(first.as_ref()) {
            None => return false,
            Some(Type::Primitive(_)) => return rest.is_empty(),
            Some(Type::Group(group)) => {
                current = group.fields();
                remaining = rest;
            }
        }
    }
}

fn collect_column_paths(fields: &Fields, prefix: &mut Vec<String>, paths: &mut Vec<ColumnPath>) {
    for field in fields.iter() {
        prefix.push(field.name().to_string());
        match field {
            Type::Primitive(_) => paths.push(ColumnPath::new(prefix.clone())),
            Type::Group(group) => collect_column_paths(group.fields(), prefix, paths),
        }
        prefix.pop();
    }
}
