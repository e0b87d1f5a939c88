//! Test utilities for parquet-schema

use crate::schema::PrimitiveTypeName::{Binary, Int64};
use crate::{GroupType, MessageType, PrimitiveType, Repetition, Type};

fn leaf(repetition: Repetition, type_name: crate::PrimitiveTypeName, name: &str) -> Type {
    PrimitiveType::new(repetition, type_name, name)
        .unwrap()
        .into()
}

fn group(repetition: Repetition, name: &str, fields: Vec<Type>) -> Type {
    GroupType::new(repetition, name, fields).unwrap().into()
}

/// The `Document` record from the Dremel paper, built node by node
pub fn document_schema() -> MessageType {
    MessageType::new(
        "Document",
        vec![
            leaf(Repetition::Required, Int64, "DocId"),
            group(
                Repetition::Optional,
                "Links",
                vec![
                    leaf(Repetition::Repeated, Int64, "Backward"),
                    leaf(Repetition::Repeated, Int64, "Forward"),
                ],
            ),
            group(
                Repetition::Repeated,
                "Name",
                vec![
                    group(
                        Repetition::Repeated,
                        "Language",
                        vec![
                            leaf(Repetition::Required, Binary, "Code"),
                            leaf(Repetition::Required, Binary, "Country"),
                        ],
                    ),
                    leaf(Repetition::Optional, Binary, "Url"),
                ],
            ),
        ],
    )
    .unwrap()
}
