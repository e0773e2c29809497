use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::field::FieldDescriptor;
use crate::registry::SchemaRegistry;

/// The diff schema of one record type: its comparable fields in declaration
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Name other schemas use to reference this type.
    pub name: String,
    fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    /// Create a schema with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    ///
    /// A field whose name was already declared replaces the earlier
    /// descriptor in place.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.push(field);
        self
    }

    /// Append a field through a mutable reference. Same replacement rule as
    /// [`TypeSchema::field`].
    pub fn push(&mut self, field: FieldDescriptor) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Comparable fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field marked as identity key, if any.
    pub fn identity_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.identity)
    }

    /// Names of all fields marked as identity.
    pub(crate) fn identity_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.identity)
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Implemented by Rust types that can be diffed.
///
/// The schema takes the place of per-field annotations: it lists which
/// serialized keys participate, their labels, formats, and the identity key.
///
/// ```rust
/// use recdiff_schema::{DiffSchema, FieldDescriptor, ScalarKind, SchemaRegistry, TypeSchema};
///
/// struct Tag;
///
/// impl DiffSchema for Tag {
///     fn schema() -> TypeSchema {
///         TypeSchema::new("Tag")
///             .field(FieldDescriptor::scalar("id", "ID", ScalarKind::Integer).identity())
///             .field(FieldDescriptor::scalar("name", "Name", ScalarKind::Text))
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// registry.register_type::<Tag>().unwrap();
/// assert_eq!(registry.identity_field("Tag").unwrap().name, "id");
/// ```
pub trait DiffSchema {
    /// The schema of this type.
    fn schema() -> TypeSchema;

    /// Register the schemas of nested types this type refers to.
    fn register_dependencies(registry: &mut SchemaRegistry) -> SchemaResult<()> {
        let _ = registry;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScalarKind;

    #[test]
    fn fields_keep_declaration_order() {
        let schema = TypeSchema::new("User")
            .field(FieldDescriptor::scalar("name", "Name", ScalarKind::Text))
            .field(FieldDescriptor::scalar("age", "Age", ScalarKind::Integer))
            .field(FieldDescriptor::scalar("email", "Email", ScalarKind::Text));

        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "age", "email"]);
    }

    #[test]
    fn redeclared_field_replaces_in_place() {
        let schema = TypeSchema::new("User")
            .field(FieldDescriptor::scalar("name", "Name", ScalarKind::Text))
            .field(FieldDescriptor::scalar("age", "Age", ScalarKind::Integer))
            .field(FieldDescriptor::scalar("name", "Full name", ScalarKind::Text));

        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].label, "Full name");
    }

    #[test]
    fn identity_field_lookup() {
        let schema = TypeSchema::new("Item")
            .field(FieldDescriptor::scalar("sku", "SKU", ScalarKind::Text).identity())
            .field(FieldDescriptor::scalar("qty", "Quantity", ScalarKind::Integer));
        assert_eq!(schema.identity_field().unwrap().name, "sku");

        let plain = TypeSchema::new("Plain")
            .field(FieldDescriptor::scalar("x", "X", ScalarKind::Integer));
        assert!(plain.identity_field().is_none());
    }
}
