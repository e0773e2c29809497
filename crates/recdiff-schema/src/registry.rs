//! The schema registry: resolves comparable and identity fields by type name.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDescriptor;
use crate::schema::{DiffSchema, TypeSchema};

/// A set of diff schemas keyed by type name.
///
/// The registry is built once and then only read. Lookups of unknown types
/// are not errors: such types simply have no comparable fields.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema.
    ///
    /// Fails if the name is empty or taken, or if more than one field is
    /// marked as identity.
    pub fn register(&mut self, schema: TypeSchema) -> SchemaResult<()> {
        if schema.name.is_empty() {
            return Err(SchemaError::EmptyTypeName);
        }
        if self.schemas.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateType(schema.name));
        }
        let identities = schema.identity_field_names();
        if identities.len() > 1 {
            return Err(SchemaError::MultipleIdentityFields {
                type_name: schema.name,
                fields: identities,
            });
        }
        debug!(type_name = %schema.name, fields = schema.fields().len(), "registered diff schema");
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Register a Rust type and its dependencies.
    ///
    /// Registering a type that is already present is a no-op, which lets
    /// self-referencing types register their dependencies without looping.
    pub fn register_type<T: DiffSchema>(&mut self) -> SchemaResult<()> {
        let schema = T::schema();
        if self.schemas.contains_key(&schema.name) {
            return Ok(());
        }
        self.register(schema)?;
        T::register_dependencies(self)
    }

    /// Build a registry containing `T` and its dependencies.
    pub fn for_type<T: DiffSchema>() -> SchemaResult<Self> {
        let mut registry = Self::new();
        registry.register_type::<T>()?;
        Ok(registry)
    }

    /// Look up a schema by type name.
    pub fn get(&self, type_name: &str) -> Option<&TypeSchema> {
        self.schemas.get(type_name)
    }

    /// Returns `true` if a schema with this name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Comparable fields of a type in declaration order. Empty for unknown
    /// types.
    pub fn comparable_fields(&self, type_name: &str) -> &[FieldDescriptor] {
        self.schemas
            .get(type_name)
            .map(TypeSchema::fields)
            .unwrap_or(&[])
    }

    /// The identity field of a type, if the type is known and declares one.
    pub fn identity_field(&self, type_name: &str) -> Option<&FieldDescriptor> {
        self.schemas.get(type_name)?.identity_field()
    }

    /// Registered type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All field references to types that are not registered.
    pub fn unresolved_references(&self) -> Vec<SchemaError> {
        let mut problems = Vec::new();
        for schema in self.schemas.values() {
            for field in schema.fields() {
                if let Some(referenced) = field.ty.referenced_type() {
                    if !self.schemas.contains_key(referenced) {
                        problems.push(SchemaError::UnknownType {
                            type_name: schema.name.clone(),
                            field: field.name.clone(),
                            referenced: referenced.to_string(),
                        });
                    }
                }
            }
        }
        problems
    }

    /// Fail with the first unresolved type reference, if any.
    pub fn validate(&self) -> SchemaResult<()> {
        match self.unresolved_references().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScalarKind;

    fn order_schema() -> TypeSchema {
        TypeSchema::new("Order")
            .field(FieldDescriptor::scalar("id", "Order ID", ScalarKind::Integer).identity())
            .field(FieldDescriptor::scalar("total", "Total", ScalarKind::Decimal))
    }

    struct Node;

    impl DiffSchema for Node {
        fn schema() -> TypeSchema {
            TypeSchema::new("Node")
                .field(FieldDescriptor::scalar("id", "ID", ScalarKind::Integer).identity())
                .field(FieldDescriptor::list_of("children", "Children", "Node"))
        }

        fn register_dependencies(registry: &mut SchemaRegistry) -> SchemaResult<()> {
            registry.register_type::<Node>()
        }
    }

    #[test]
    fn unknown_type_has_no_fields() {
        let registry = SchemaRegistry::new();
        assert!(registry.comparable_fields("Integer").is_empty());
        assert!(registry.identity_field("Integer").is_none());
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = SchemaRegistry::new();
        registry.register(order_schema()).unwrap();

        assert_eq!(registry.comparable_fields("Order").len(), 2);
        assert_eq!(registry.identity_field("Order").unwrap().label, "Order ID");
        assert_eq!(registry.type_names().collect::<Vec<_>>(), ["Order"]);
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(order_schema()).unwrap();
        let err = registry.register(order_schema()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(name) if name == "Order"));
    }

    #[test]
    fn two_identity_fields_rejected() {
        let schema = TypeSchema::new("Bad")
            .field(FieldDescriptor::scalar("a", "A", ScalarKind::Integer).identity())
            .field(FieldDescriptor::scalar("b", "B", ScalarKind::Integer).identity());
        let err = SchemaRegistry::new().register(schema).unwrap_err();
        match err {
            SchemaError::MultipleIdentityFields { type_name, fields } => {
                assert_eq!(type_name, "Bad");
                assert_eq!(fields, ["a", "b"]);
            }
            other => panic!("expected MultipleIdentityFields, got {other:?}"),
        }
    }

    #[test]
    fn empty_type_name_rejected() {
        let err = SchemaRegistry::new().register(TypeSchema::new("")).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyTypeName));
    }

    #[test]
    fn self_referencing_type_registers_once() {
        let registry = SchemaRegistry::for_type::<Node>().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn validate_reports_missing_reference() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                TypeSchema::new("User")
                    .field(FieldDescriptor::object("address", "Address", "Address"))
                    .field(FieldDescriptor::list_of("orders", "Orders", "Order")),
            )
            .unwrap();
        registry.register(order_schema()).unwrap();

        let problems = registry.unresolved_references();
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            registry.validate(),
            Err(SchemaError::UnknownType { ref referenced, .. }) if referenced == "Address"
        ));
    }
}
