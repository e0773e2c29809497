//! Field descriptors: the per-field metadata a diff schema is made of.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a leaf value.
///
/// Every scalar kind is compared by equality; the temporal kinds are compared
/// after formatting with the field's pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    /// Any JSON value, compared and rendered as a whole.
    Any,
}

impl ScalarKind {
    /// Returns `true` for kinds holding a calendar date or timestamp.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Returns `true` for kinds compared numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    /// The keyword used for this kind in schema files.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ScalarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "string" => Ok(Self::Text),
            "integer" | "int" => Ok(Self::Integer),
            "decimal" | "number" => Ok(Self::Decimal),
            "boolean" | "bool" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "datetime" | "timestamp" => Ok(Self::DateTime),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown scalar kind: {other}")),
        }
    }
}

/// The declared type of a field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A leaf value.
    Scalar(ScalarKind),
    /// A nested record described by the named schema.
    Object(String),
    /// A list. `None` means the element type was not declared.
    List(Option<Box<FieldType>>),
}

impl FieldType {
    /// A list of scalars of the given kind.
    pub fn list_of_scalar(kind: ScalarKind) -> Self {
        Self::List(Some(Box::new(Self::Scalar(kind))))
    }

    /// A list of records described by the named schema.
    pub fn list_of(type_name: impl Into<String>) -> Self {
        Self::List(Some(Box::new(Self::Object(type_name.into()))))
    }

    /// The schema name this type refers to, if it is an object or a list of
    /// objects.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name),
            Self::List(Some(element)) => element.referenced_type(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Object(name) => write!(f, "object<{name}>"),
            Self::List(Some(element)) => write!(f, "list<{element}>"),
            Self::List(None) => f.write_str("list<?>"),
        }
    }
}

/// Metadata for one comparable field.
///
/// A field that has a descriptor participates in diffing; fields without one
/// are invisible to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Key of the field in the serialized record.
    pub name: String,
    /// Human-readable label used in change messages.
    pub label: String,
    /// Optional display pattern (a `strftime` pattern for temporal kinds).
    pub format: Option<String>,
    /// Whether this field identifies list elements of its type.
    pub identity: bool,
    /// Declared type.
    pub ty: FieldType,
}

impl FieldDescriptor {
    /// Create a descriptor with an explicit type.
    pub fn new(name: impl Into<String>, label: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            format: None,
            identity: false,
            ty,
        }
    }

    pub fn scalar(name: impl Into<String>, label: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, label, FieldType::Scalar(kind))
    }

    pub fn object(
        name: impl Into<String>,
        label: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::new(name, label, FieldType::Object(type_name.into()))
    }

    pub fn list_of_scalar(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: ScalarKind,
    ) -> Self {
        Self::new(name, label, FieldType::list_of_scalar(kind))
    }

    pub fn list_of(
        name: impl Into<String>,
        label: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::new(name, label, FieldType::list_of(type_name))
    }

    /// A list whose element type is not declared.
    pub fn list_unresolved(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldType::List(None))
    }

    /// Mark this field as the identity key of its type.
    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Set the display pattern.
    pub fn with_format(mut self, pattern: impl Into<String>) -> Self {
        self.format = Some(pattern.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kind_keywords_parse() {
        for kind in [
            ScalarKind::Text,
            ScalarKind::Integer,
            ScalarKind::Decimal,
            ScalarKind::Boolean,
            ScalarKind::Date,
            ScalarKind::DateTime,
            ScalarKind::Any,
        ] {
            assert_eq!(kind.keyword().parse::<ScalarKind>().unwrap(), kind);
        }
        assert_eq!("string".parse::<ScalarKind>().unwrap(), ScalarKind::Text);
        assert!("uuid".parse::<ScalarKind>().is_err());
    }

    #[test]
    fn field_type_display() {
        assert_eq!(FieldType::Scalar(ScalarKind::Date).to_string(), "date");
        assert_eq!(FieldType::Object("Address".into()).to_string(), "object<Address>");
        assert_eq!(FieldType::list_of("Order").to_string(), "list<object<Order>>");
        assert_eq!(FieldType::List(None).to_string(), "list<?>");
    }

    #[test]
    fn referenced_type_sees_through_lists() {
        assert_eq!(FieldType::list_of("Order").referenced_type(), Some("Order"));
        assert_eq!(
            FieldType::List(Some(Box::new(FieldType::list_of("Order")))).referenced_type(),
            Some("Order")
        );
        assert_eq!(FieldType::list_of_scalar(ScalarKind::Text).referenced_type(), None);
    }

    #[test]
    fn builder_sets_identity_and_format() {
        let field = FieldDescriptor::scalar("created", "Created", ScalarKind::DateTime)
            .with_format("%Y-%m-%d")
            .identity();
        assert!(field.identity);
        assert_eq!(field.format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(field.label, "Created");
    }
}
