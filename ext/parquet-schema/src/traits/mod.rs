//! Read-only views over schemas

pub mod schema;

pub use schema::SchemaInspector;
