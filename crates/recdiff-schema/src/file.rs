//! Loading schemas from TOML files.
//!
//! ```toml
//! [[types]]
//! name = "User"
//!
//! [[types.fields]]
//! name = "id"
//! label = "ID"
//! type = "integer"
//! identity = true
//!
//! [[types.fields]]
//! name = "orders"
//! label = "Orders"
//! type = "list"
//! element = "Order"
//! ```
//!
//! `type` is a scalar keyword, `list`, or the name of another type (a nested
//! object). `element` gives a list's element type the same way; leaving it out
//! (or writing `?`) declares an unresolved element type.

use std::path::Path;

use serde::Deserialize;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDescriptor, FieldType, ScalarKind};
use crate::registry::SchemaRegistry;
use crate::schema::TypeSchema;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    name: String,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    label: Option<String>,
    #[serde(rename = "type")]
    ty: String,
    element: Option<String>,
    format: Option<String>,
    #[serde(default)]
    identity: bool,
}

impl RawField {
    fn into_descriptor(self, type_name: &str) -> SchemaResult<FieldDescriptor> {
        let invalid = |reason: String| SchemaError::InvalidFieldType {
            type_name: type_name.to_string(),
            field: self.name.clone(),
            reason,
        };

        let ty = match self.ty.trim() {
            "list" => FieldType::List(parse_element(self.element.as_deref()).map_err(invalid)?),
            other => {
                if self.element.is_some() {
                    return Err(invalid(format!("`element` is only valid for lists, not {other}")));
                }
                parse_named(other).map_err(invalid)?
            }
        };

        Ok(FieldDescriptor {
            label: self.label.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            format: self.format,
            identity: self.identity,
            ty,
        })
    }
}

fn parse_named(keyword: &str) -> Result<FieldType, String> {
    if keyword.is_empty() {
        return Err("type must not be empty".into());
    }
    if let Ok(kind) = keyword.parse::<ScalarKind>() {
        return Ok(FieldType::Scalar(kind));
    }
    if keyword.chars().any(char::is_whitespace) {
        return Err(format!("invalid type name: {keyword:?}"));
    }
    Ok(FieldType::Object(keyword.to_string()))
}

fn parse_element(element: Option<&str>) -> Result<Option<Box<FieldType>>, String> {
    match element.map(str::trim) {
        None | Some("?") => Ok(None),
        Some("list") => Ok(Some(Box::new(FieldType::List(None)))),
        Some(named) => parse_named(named).map(|ty| Some(Box::new(ty))),
    }
}

impl SchemaRegistry {
    /// Parse a registry from TOML text.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        let file: SchemaFile = toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;

        let mut registry = Self::new();
        for raw in file.types {
            let mut schema = TypeSchema::new(raw.name);
            for field in raw.fields {
                let descriptor = field.into_descriptor(&schema.name)?;
                schema.push(descriptor);
            }
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Read and parse a registry from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
