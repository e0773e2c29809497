//! Value classification: how the engine treats a field's declared type.

use recdiff_schema::{FieldType, ScalarKind, SchemaRegistry};
use serde_json::Value;

/// How a field is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Compared by value.
    Scalar(ScalarKind),
    /// Compared as one ordered value.
    ListOfScalar(ScalarKind),
    /// Elements matched by the identity field of the named type.
    ListOfComplex(&'a str),
    /// Compared field by field against the named type.
    ComplexObject(&'a str),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("list element type is not declared")]
    UnresolvedElement,
}

/// Classify a declared field type.
///
/// Only the declaration is consulted, so empty lists classify the same as
/// populated ones. Lists of lists are compared as whole values.
pub fn classify(ty: &FieldType) -> Result<Classification<'_>, ClassifyError> {
    match ty {
        FieldType::Scalar(kind) => Ok(Classification::Scalar(*kind)),
        FieldType::Object(name) => Ok(Classification::ComplexObject(name)),
        FieldType::List(None) => Err(ClassifyError::UnresolvedElement),
        FieldType::List(Some(element)) => match element.as_ref() {
            FieldType::Scalar(kind) => Ok(Classification::ListOfScalar(*kind)),
            FieldType::Object(name) => Ok(Classification::ListOfComplex(name)),
            FieldType::List(_) => Ok(Classification::ListOfScalar(ScalarKind::Any)),
        },
    }
}

/// Infer the element type of an undeclared list from a sample element.
///
/// The sample is the first non-null element of `old`, then `new`. It resolves
/// only if it is an object whose `type_tag` key names a registered type with an
/// identity field.
pub fn infer_element_type<'v>(
    old: &'v [Value],
    new: &'v [Value],
    registry: &SchemaRegistry,
    type_tag: &str,
) -> Option<&'v str> {
    let sample = old.iter().chain(new).find(|v| !v.is_null())?;
    let type_name = sample.as_object()?.get(type_tag)?.as_str()?;
    registry.identity_field(type_name).map(|_| type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdiff_schema::{FieldDescriptor, TypeSchema};
    use serde_json::json;

    #[test]
    fn classifies_declared_types() {
        assert_eq!(
            classify(&FieldType::Scalar(ScalarKind::Date)),
            Ok(Classification::Scalar(ScalarKind::Date))
        );
        assert_eq!(
            classify(&FieldType::Object("Address".into())),
            Ok(Classification::ComplexObject("Address"))
        );
        assert_eq!(
            classify(&FieldType::list_of_scalar(ScalarKind::Text)),
            Ok(Classification::ListOfScalar(ScalarKind::Text))
        );
        assert_eq!(
            classify(&FieldType::list_of("Order")),
            Ok(Classification::ListOfComplex("Order"))
        );
        assert_eq!(
            classify(&FieldType::List(Some(Box::new(FieldType::List(None))))),
            Ok(Classification::ListOfScalar(ScalarKind::Any))
        );
        assert_eq!(
            classify(&FieldType::List(None)),
            Err(ClassifyError::UnresolvedElement)
        );
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                TypeSchema::new("Prize")
                    .field(FieldDescriptor::scalar("id", "ID", ScalarKind::Integer).identity()),
            )
            .unwrap();
        registry
            .register(
                TypeSchema::new("Note")
                    .field(FieldDescriptor::scalar("text", "Text", ScalarKind::Text)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn infers_from_tagged_sample() {
        let registry = registry();
        let old = [Value::Null, json!({"@type": "Prize", "id": 1})];
        assert_eq!(infer_element_type(&old, &[], &registry, "@type"), Some("Prize"));

        let new = [json!({"@type": "Prize", "id": 2})];
        assert_eq!(infer_element_type(&[], &new, &registry, "@type"), Some("Prize"));
    }

    #[test]
    fn inference_needs_identity_and_tag() {
        let registry = registry();
        let untagged = [json!({"id": 1})];
        assert_eq!(infer_element_type(&untagged, &[], &registry, "@type"), None);

        let no_identity = [json!({"@type": "Note", "text": "x"})];
        assert_eq!(infer_element_type(&no_identity, &[], &registry, "@type"), None);

        let scalars = [json!(1), json!(2)];
        assert_eq!(infer_element_type(&scalars, &[], &registry, "@type"), None);

        assert_eq!(infer_element_type(&[], &[], &registry, "@type"), None);
    }
}
