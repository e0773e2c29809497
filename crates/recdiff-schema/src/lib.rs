//! Diff schemas for recdiff.
//!
//! A diff schema says which fields of a record type take part in comparison,
//! how each is labelled and formatted, and which field identifies elements of
//! the type inside lists. Schemas are registered explicitly, either from Rust
//! through [`DiffSchema`] or from a TOML file.
//!
//! # Key Types
//!
//! - [`FieldDescriptor`] -- Name, label, format pattern, identity flag, declared type
//! - [`FieldType`] / [`ScalarKind`] -- Declared field types
//! - [`TypeSchema`] -- Ordered comparable fields of one type
//! - [`SchemaRegistry`] -- Resolves comparable and identity fields by type name

pub mod error;
pub mod field;
pub mod file;
pub mod registry;
pub mod schema;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDescriptor, FieldType, ScalarKind};
pub use registry::SchemaRegistry;
pub use schema::{DiffSchema, TypeSchema};
