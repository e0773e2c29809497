//! Rendering values and records as display text.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use recdiff_schema::{FieldDescriptor, ScalarKind, SchemaRegistry};
use serde_json::Value;

use crate::classify::{classify, infer_element_type, Classification};
use crate::config::DiffConfig;

/// Stand-in for keys missing from a record.
pub(crate) static NULL: Value = Value::Null;

const NAIVE_PATTERNS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a temporal value.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS` with optional fraction and
/// `T` separator, plain `YYYY-MM-DD`, and integer epoch milliseconds. Values
/// carrying an offset are normalized to UTC; values without one are taken as
/// UTC already.
pub fn parse_temporal(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            for pattern in NAIVE_PATTERNS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

/// Format a timestamp with a `strftime` pattern.
///
/// Returns `None` if the pattern is malformed or needs data a naive
/// timestamp lacks (such as `%z`).
pub fn format_temporal(dt: &NaiveDateTime, pattern: &str) -> Option<String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", dt.format(pattern)).ok()?;
    Some(out)
}

/// Canonical text of a JSON value: strings unquoted, `null` empty, arrays as
/// `[a, b]`, objects as compact JSON.
pub fn canonical(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(canonical).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Format a scalar of the given kind.
///
/// Temporal values use `pattern`, falling back to `default_pattern` when the
/// field has none or it is unusable; values that do not parse as dates keep
/// their canonical text.
pub fn format_scalar(
    value: &Value,
    kind: ScalarKind,
    pattern: Option<&str>,
    default_pattern: &str,
) -> String {
    if value.is_null() {
        return String::new();
    }
    if kind.is_temporal() {
        if let Some(dt) = parse_temporal(value) {
            let formatted = pattern
                .and_then(|p| format_temporal(&dt, p))
                .or_else(|| format_temporal(&dt, default_pattern));
            if let Some(text) = formatted {
                return text;
            }
        }
    }
    canonical(value)
}

/// Scalar equality under a field's kind and pattern.
///
/// Temporal values are equal when they format identically, so differences
/// below the pattern's precision are ignored. Numbers compare numerically.
pub fn scalars_equal(
    old: &Value,
    new: &Value,
    kind: ScalarKind,
    pattern: Option<&str>,
    default_pattern: &str,
) -> bool {
    if old.is_null() || new.is_null() {
        return old.is_null() && new.is_null();
    }
    if kind.is_temporal() {
        return format_scalar(old, kind, pattern, default_pattern)
            == format_scalar(new, kind, pattern, default_pattern);
    }
    if kind.is_numeric() {
        if let (Value::Number(a), Value::Number(b)) = (old, new) {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                return x == y;
            }
            return a.as_f64() == b.as_f64();
        }
    }
    old == new
}

/// Renders values and records using a registry and configuration.
#[derive(Clone, Copy)]
pub struct Formatter<'a> {
    registry: &'a SchemaRegistry,
    config: &'a DiffConfig,
}

impl<'a> Formatter<'a> {
    pub fn new(registry: &'a SchemaRegistry, config: &'a DiffConfig) -> Self {
        Self { registry, config }
    }

    pub fn scalar(&self, value: &Value, kind: ScalarKind, pattern: Option<&str>) -> String {
        format_scalar(value, kind, pattern, &self.config.default_date_format)
    }

    /// Format a list of scalars as `[a, b]`.
    pub fn list(&self, items: &[Value], kind: ScalarKind, pattern: Option<&str>) -> String {
        let inner: Vec<String> = items
            .iter()
            .map(|item| self.scalar(item, kind, pattern))
            .collect();
        format!("[{}]", inner.join(", "))
    }

    /// Format a whole record: described if it is an object, canonical text
    /// otherwise, empty if null.
    pub fn record(&self, value: &Value, type_name: &str) -> String {
        match value {
            Value::Object(_) => self.describe(value, type_name),
            other => canonical(other),
        }
    }

    /// Describe a record as `{label=value, ...}` over its comparable fields.
    ///
    /// Lists of records and nested records are described recursively.
    pub fn describe(&self, value: &Value, type_name: &str) -> String {
        let Some(object) = value.as_object() else {
            return canonical(value);
        };
        let parts: Vec<String> = self
            .registry
            .comparable_fields(type_name)
            .iter()
            .map(|field| {
                let field_value = object.get(&field.name).unwrap_or(&NULL);
                format!("{}={}", field.label, self.field_value(field_value, field))
            })
            .collect();
        format!("{{{}}}", parts.join(", "))
    }

    fn field_value(&self, value: &Value, field: &FieldDescriptor) -> String {
        let pattern = field.format.as_deref();
        match (classify(&field.ty), value) {
            (Ok(Classification::Scalar(kind)), _) => self.scalar(value, kind, pattern),
            (Ok(Classification::ListOfScalar(kind)), Value::Array(items)) => {
                self.list(items, kind, pattern)
            }
            (Ok(Classification::ListOfComplex(type_name)), Value::Array(items)) => {
                self.describe_all(items, type_name)
            }
            (Ok(Classification::ComplexObject(type_name)), _) => self.describe(value, type_name),
            (Err(_), Value::Array(items)) => {
                match infer_element_type(items, &[], self.registry, &self.config.type_tag) {
                    Some(type_name) => self.describe_all(items, type_name),
                    None => canonical(value),
                }
            }
            _ => canonical(value),
        }
    }

    fn describe_all(&self, items: &[Value], type_name: &str) -> String {
        let inner: Vec<String> = items
            .iter()
            .map(|item| self.describe(item, type_name))
            .collect();
        format!("[{}]", inner.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DATE_FORMAT;
    use recdiff_schema::TypeSchema;
    use serde_json::json;

    #[test]
    fn parses_supported_temporal_inputs() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(parse_temporal(&json!("2024-03-01T20:30:00+08:00")), Some(expected));
        assert_eq!(parse_temporal(&json!("2024-03-01T12:30:00Z")), Some(expected));
        assert_eq!(parse_temporal(&json!("2024-03-01 12:30:00")), Some(expected));
        assert_eq!(
            parse_temporal(&json!("2024-03-01T12:30:00.250")).map(|d| d.date()),
            Some(expected.date())
        );
        assert_eq!(
            parse_temporal(&json!("2024-03-01")),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_temporal(&json!(0)),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_temporal(&json!("yesterday")), None);
        assert_eq!(parse_temporal(&json!(true)), None);
    }

    #[test]
    fn temporal_formatting_uses_pattern_or_default() {
        let v = json!("2024-03-01T12:30:45Z");
        assert_eq!(
            format_scalar(&v, ScalarKind::DateTime, Some("%Y/%m/%d"), DEFAULT_DATE_FORMAT),
            "2024/03/01"
        );
        assert_eq!(
            format_scalar(&v, ScalarKind::DateTime, None, DEFAULT_DATE_FORMAT),
            "2024-03-01 12:30:45"
        );
        // A malformed pattern falls back to the default instead of panicking.
        assert_eq!(
            format_scalar(&v, ScalarKind::DateTime, Some("%Q"), DEFAULT_DATE_FORMAT),
            "2024-03-01 12:30:45"
        );
        assert_eq!(
            format_scalar(&json!("soon"), ScalarKind::Date, None, DEFAULT_DATE_FORMAT),
            "soon"
        );
    }

    #[test]
    fn one_instant_in_different_offsets_is_equal() {
        let d = DEFAULT_DATE_FORMAT;
        assert!(scalars_equal(
            &json!("2024-03-01T12:00:00+08:00"),
            &json!("2024-03-01T04:00:00Z"),
            ScalarKind::DateTime,
            None,
            d
        ));
        assert!(scalars_equal(
            &json!(0),
            &json!("1970-01-01T08:00:00+08:00"),
            ScalarKind::DateTime,
            None,
            d
        ));
        assert_eq!(
            format_scalar(&json!("2024-03-01T12:00:00+08:00"), ScalarKind::DateTime, None, d),
            "2024-03-01 04:00:00"
        );
    }

    #[test]
    fn naive_timestamp_rejects_offset_pattern() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_temporal(&dt, "%z"), None);
    }

    #[test]
    fn canonical_text() {
        assert_eq!(canonical(&Value::Null), "");
        assert_eq!(canonical(&json!("hi")), "hi");
        assert_eq!(canonical(&json!(1.5)), "1.5");
        assert_eq!(canonical(&json!(false)), "false");
        assert_eq!(canonical(&json!(["a", 1, null])), "[a, 1, ]");
        assert_eq!(canonical(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn scalar_equality_rules() {
        let d = DEFAULT_DATE_FORMAT;
        assert!(scalars_equal(&json!(1), &json!(1.0), ScalarKind::Decimal, None, d));
        assert!(!scalars_equal(&json!(1), &json!(2), ScalarKind::Integer, None, d));
        assert!(!scalars_equal(&json!(1), &json!(1.0), ScalarKind::Any, None, d));
        assert!(!scalars_equal(&Value::Null, &json!(""), ScalarKind::Text, None, d));
        assert!(scalars_equal(&Value::Null, &Value::Null, ScalarKind::Date, None, d));
        assert!(scalars_equal(
            &json!("2024-03-01T12:30:45.100Z"),
            &json!("2024-03-01T12:30:45.900Z"),
            ScalarKind::DateTime,
            None,
            d
        ));
        assert!(!scalars_equal(
            &json!("2024-03-01T12:30:45Z"),
            &json!("2024-03-01T12:30:46Z"),
            ScalarKind::DateTime,
            None,
            d
        ));
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                TypeSchema::new("Prize")
                    .field(FieldDescriptor::scalar("id", "ID", ScalarKind::Integer).identity())
                    .field(FieldDescriptor::scalar("name", "Name", ScalarKind::Text))
                    .field(
                        FieldDescriptor::scalar("ends", "Ends", ScalarKind::DateTime)
                            .with_format("%Y-%m-%d"),
                    )
                    .field(FieldDescriptor::list_of("stock", "Stock", "Stock"))
                    .field(FieldDescriptor::list_of_scalar("tags", "Tags", ScalarKind::Text)),
            )
            .unwrap();
        registry
            .register(
                TypeSchema::new("Stock")
                    .field(FieldDescriptor::scalar("sku", "SKU", ScalarKind::Text).identity())
                    .field(FieldDescriptor::scalar("qty", "Qty", ScalarKind::Integer)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn describe_lists_comparable_fields_only() {
        let registry = registry();
        let config = DiffConfig::default();
        let fmt = Formatter::new(&registry, &config);

        let prize = json!({
            "id": 7,
            "name": "Mug",
            "ends": "2024-12-31T23:59:59Z",
            "stock": [{"sku": "A", "qty": 2, "bin": "x"}, {"sku": "B", "qty": 0}],
            "tags": ["gift", "kitchen"],
            "internal": "hidden"
        });
        assert_eq!(
            fmt.describe(&prize, "Prize"),
            "{ID=7, Name=Mug, Ends=2024-12-31, Stock=[{SKU=A, Qty=2}, {SKU=B, Qty=0}], Tags=[gift, kitchen]}"
        );
    }

    #[test]
    fn describe_missing_and_unknown() {
        let registry = registry();
        let config = DiffConfig::default();
        let fmt = Formatter::new(&registry, &config);

        assert_eq!(
            fmt.describe(&json!({"id": 1}), "Prize"),
            "{ID=1, Name=, Ends=, Stock=, Tags=}"
        );
        assert_eq!(fmt.describe(&json!({"a": 1}), "Unknown"), "{}");
        assert_eq!(fmt.record(&Value::Null, "Prize"), "");
        assert_eq!(fmt.record(&json!(5), "Prize"), "5");
    }
}
