//! The comparison engine.
//!
//! Walks two versions of a record along their diff schema and emits one
//! [`ChangeRecord`] per detected difference:
//!
//! - scalars are compared by value (temporal values under their pattern),
//! - lists of scalars are compared as one ordered value,
//! - lists of records are matched by identity key, yielding additions,
//!   removals, and the nested changes of matched elements,
//! - nested records are compared recursively under an extended path.
//!
//! Records are `serde_json::Value` trees. Owned trees cannot contain cycles,
//! so recursion depth is bounded by the depth of the input.

use std::collections::HashMap;
use std::sync::Arc;

use recdiff_schema::{DiffSchema, FieldDescriptor, ScalarKind, SchemaRegistry};
use serde::Serialize;
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::change::{ChangeRecord, ChangeSet};
use crate::classify::{classify, infer_element_type, Classification};
use crate::config::DiffConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
use crate::error::{DiffError, DiffResult};
use crate::format::{canonical, parse_temporal, scalars_equal, Formatter, NULL};

/// Compares records described by a [`SchemaRegistry`].
///
/// A `Differ` holds no per-comparison state and can be shared between
/// threads.
#[derive(Clone)]
pub struct Differ {
    registry: Arc<SchemaRegistry>,
    config: DiffConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl Differ {
    /// Create a differ with the default configuration, reporting diagnostics
    /// through `tracing`.
    pub fn new(registry: impl Into<Arc<SchemaRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            config: DiffConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_config(mut self, config: DiffConfig) -> Self {
        self.config = config;
        self
    }

    /// Route diagnostics to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two versions of a record of type `type_name`.
    ///
    /// Either side may be `null`. A non-null side that is not an object is a
    /// caller error.
    pub fn compare(&self, type_name: &str, old: &Value, new: &Value) -> DiffResult<ChangeSet> {
        for side in [old, new] {
            if !side.is_null() && !side.is_object() {
                return Err(DiffError::TypeMismatch {
                    path: "<root>".into(),
                    expected: format!("object of type {type_name}"),
                    actual: json_kind(side).into(),
                });
            }
        }

        debug!(type_name, "comparing records");
        let mut changes = Vec::new();
        self.compare_objects(type_name, old, new, "", &mut changes)?;
        debug!(type_name, changes = changes.len(), "comparison complete");

        Ok(ChangeSet::from_records(changes, self.config.locale))
    }

    /// Compare two typed records. `None` stands for an absent record.
    pub fn compare_records<T>(&self, old: Option<&T>, new: Option<&T>) -> DiffResult<ChangeSet>
    where
        T: DiffSchema + Serialize,
    {
        let schema = T::schema();
        let old = to_value(old)?;
        let new = to_value(new)?;
        self.compare(&schema.name, &old, &new)
    }

    fn formatter(&self) -> Formatter<'_> {
        Formatter::new(&self.registry, &self.config)
    }

    fn report(&self, kind: DiagnosticKind, path: &str, message: String) {
        self.sink.report(Diagnostic {
            kind,
            path: path.to_string(),
            message,
        });
    }

    fn compare_objects(
        &self,
        type_name: &str,
        old: &Value,
        new: &Value,
        prefix: &str,
        out: &mut Vec<ChangeRecord>,
    ) -> DiffResult<()> {
        match (old.is_null(), new.is_null()) {
            (true, true) => return Ok(()),
            (true, false) | (false, true) => {
                let fmt = self.formatter();
                out.push(ChangeRecord::Modified {
                    path: prefix.to_string(),
                    old: fmt.record(old, type_name),
                    new: fmt.record(new, type_name),
                });
                return Ok(());
            }
            (false, false) => {}
        }

        let (old_obj, new_obj) = match (old.as_object(), new.as_object()) {
            (Some(o), Some(n)) => (o, n),
            (None, None) => {
                self.report(
                    DiagnosticKind::Introspection,
                    prefix,
                    format!(
                        "expected objects of type {type_name}, found {} and {}",
                        json_kind(old),
                        json_kind(new)
                    ),
                );
                return Ok(());
            }
            _ => {
                return Err(mismatch(prefix, &format!("object of type {type_name}"), old, new));
            }
        };

        for field in self.registry.comparable_fields(type_name) {
            let path = join_path(prefix, &field.label);
            let old_value = old_obj.get(&field.name).unwrap_or(&NULL);
            let new_value = new_obj.get(&field.name).unwrap_or(&NULL);

            match classify(&field.ty) {
                Ok(Classification::Scalar(kind)) => {
                    self.compare_scalar(field, kind, old_value, new_value, &path, out)?;
                }
                Ok(Classification::ListOfScalar(kind)) => {
                    self.compare_scalar_list(field, kind, old_value, new_value, &path, out)?;
                }
                Ok(Classification::ListOfComplex(element)) => {
                    let pair = self.list_pair(old_value, new_value, &path)?;
                    if let Some((old_list, new_list)) = pair {
                        self.compare_keyed_list(element, old_list, new_list, &path, out)?;
                    }
                }
                Ok(Classification::ComplexObject(nested)) => {
                    self.compare_objects(nested, old_value, new_value, &path, out)?;
                }
                Err(err) => {
                    let Some((old_list, new_list)) = self.list_pair(old_value, new_value, &path)?
                    else {
                        continue;
                    };
                    let tag = &self.config.type_tag;
                    match infer_element_type(old_list, new_list, &self.registry, tag) {
                        Some(element) => {
                            self.compare_keyed_list(element, old_list, new_list, &path, out)?;
                        }
                        None if old_list.is_empty() && new_list.is_empty() => {}
                        None => self.report(
                            DiagnosticKind::UnresolvedElementType,
                            &path,
                            format!("{err}; field {} skipped", field.name),
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    fn compare_scalar(
        &self,
        field: &FieldDescriptor,
        kind: ScalarKind,
        old: &Value,
        new: &Value,
        path: &str,
        out: &mut Vec<ChangeRecord>,
    ) -> DiffResult<()> {
        if kind != ScalarKind::Any {
            match (is_compound(old), is_compound(new)) {
                (true, true) => {
                    self.report(
                        DiagnosticKind::Introspection,
                        path,
                        format!(
                            "field {} is declared {kind} but holds {} and {}",
                            field.name,
                            json_kind(old),
                            json_kind(new)
                        ),
                    );
                    return Ok(());
                }
                (true, false) | (false, true) => {
                    return Err(mismatch(path, &format!("{kind} scalar"), old, new));
                }
                (false, false) => {}
            }
        }

        let pattern = field.format.as_deref();
        if scalars_equal(old, new, kind, pattern, &self.config.default_date_format) {
            return Ok(());
        }
        let fmt = self.formatter();
        out.push(ChangeRecord::Modified {
            path: path.to_string(),
            old: fmt.scalar(old, kind, pattern),
            new: fmt.scalar(new, kind, pattern),
        });
        Ok(())
    }

    fn compare_scalar_list(
        &self,
        field: &FieldDescriptor,
        kind: ScalarKind,
        old: &Value,
        new: &Value,
        path: &str,
        out: &mut Vec<ChangeRecord>,
    ) -> DiffResult<()> {
        let Some((old_list, new_list)) = self.list_pair(old, new, path)? else {
            return Ok(());
        };
        if old_list.is_empty() && new_list.is_empty() {
            return Ok(());
        }

        let pattern = field.format.as_deref();
        let default_pattern = &self.config.default_date_format;
        let equal = old_list.len() == new_list.len()
            && old_list
                .iter()
                .zip(new_list)
                .all(|(o, n)| scalars_equal(o, n, kind, pattern, default_pattern));
        if !equal {
            let fmt = self.formatter();
            out.push(ChangeRecord::Modified {
                path: path.to_string(),
                old: fmt.list(old_list, kind, pattern),
                new: fmt.list(new_list, kind, pattern),
            });
        }
        Ok(())
    }

    /// Both sides of a list field as slices, `null` counting as empty.
    ///
    /// `Ok(None)` means neither side is a list; that is reported and the
    /// field skipped.
    fn list_pair<'v>(
        &self,
        old: &'v Value,
        new: &'v Value,
        path: &str,
    ) -> DiffResult<Option<(&'v [Value], &'v [Value])>> {
        match (as_list(old), as_list(new)) {
            (Some(o), Some(n)) => Ok(Some((o, n))),
            (None, None) => {
                self.report(
                    DiagnosticKind::Introspection,
                    path,
                    format!("expected lists, found {} and {}", json_kind(old), json_kind(new)),
                );
                Ok(None)
            }
            _ => Err(mismatch(path, "list", old, new)),
        }
    }

    fn compare_keyed_list(
        &self,
        element_type: &str,
        old: &[Value],
        new: &[Value],
        path: &str,
        out: &mut Vec<ChangeRecord>,
    ) -> DiffResult<()> {
        if old.is_empty() && new.is_empty() {
            return Ok(());
        }
        let Some(identity) = self.registry.identity_field(element_type) else {
            self.report(
                DiagnosticKind::MissingIdentity,
                path,
                format!("type {element_type} has no identity field; list elements not compared"),
            );
            return Ok(());
        };

        let fmt = self.formatter();
        let old_keyed = KeyedList::build(old, identity, &fmt);
        let new_keyed = KeyedList::build(new, identity, &fmt);

        for (key, label) in old_keyed.union_keys(&new_keyed) {
            match (old_keyed.get(key), new_keyed.get(key)) {
                (None, Some(added)) => out.push(ChangeRecord::Added {
                    path: path.to_string(),
                    key: label.to_string(),
                    description: fmt.describe(added, element_type),
                }),
                (Some(removed), None) => out.push(ChangeRecord::Removed {
                    path: path.to_string(),
                    key: label.to_string(),
                    description: fmt.describe(removed, element_type),
                }),
                (Some(o), Some(n)) => {
                    let element_path = format!("{path}[{label}]");
                    self.compare_objects(element_type, o, n, &element_path, out)?;
                }
                (None, None) => {}
            }
        }
        Ok(())
    }
}

/// Normalized identity value of a list element.
///
/// Numbers compare numerically and temporal values as instants, matching
/// scalar equality; values of different JSON kinds never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum IdentityKey {
    Integer(i128),
    Float(u64),
    Instant(NaiveDateTime),
    Bool(bool),
    Text(String),
    Compound(String),
}

impl IdentityKey {
    fn new(id: &Value, kind: Option<ScalarKind>) -> Self {
        if kind.is_some_and(|k| k.is_temporal()) {
            if let Some(instant) = parse_temporal(id) {
                return Self::Instant(instant);
            }
        }
        match id {
            Value::Number(n) => number_key(n),
            Value::Bool(b) => Self::Bool(*b),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Compound(canonical(other)),
        }
    }
}

fn number_key(n: &serde_json::Number) -> IdentityKey {
    if let Some(i) = n.as_i64() {
        return IdentityKey::Integer(i.into());
    }
    if let Some(u) = n.as_u64() {
        return IdentityKey::Integer(u.into());
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    if f.fract() == 0.0 && f.abs() < 1e18 {
        IdentityKey::Integer(f as i128)
    } else {
        IdentityKey::Float(f.to_bits())
    }
}

/// List elements keyed by their normalized identity value.
///
/// Keys keep first-seen order; a repeated key keeps its position and label and
/// takes the later element. Null elements, non-objects, and elements without
/// an identity value are left out.
struct KeyedList<'v> {
    entries: Vec<KeyedEntry<'v>>,
    positions: HashMap<IdentityKey, usize>,
}

struct KeyedEntry<'v> {
    key: IdentityKey,
    label: String,
    item: &'v Value,
}

impl<'v> KeyedList<'v> {
    fn build(items: &'v [Value], identity: &FieldDescriptor, fmt: &Formatter<'_>) -> Self {
        let mut keyed = Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        };
        let kind = match classify(&identity.ty) {
            Ok(Classification::Scalar(kind)) => Some(kind),
            _ => None,
        };
        for item in items {
            let Some(id) = item.as_object().and_then(|o| o.get(&identity.name)) else {
                continue;
            };
            if id.is_null() {
                continue;
            }
            let key = IdentityKey::new(id, kind);
            match keyed.positions.get(&key) {
                Some(&pos) => keyed.entries[pos].item = item,
                None => {
                    let label = match kind {
                        Some(kind) => fmt.scalar(id, kind, identity.format.as_deref()),
                        None => canonical(id),
                    };
                    keyed.positions.insert(key.clone(), keyed.entries.len());
                    keyed.entries.push(KeyedEntry { key, label, item });
                }
            }
        }
        keyed
    }

    fn get(&self, key: &IdentityKey) -> Option<&'v Value> {
        self.positions.get(key).map(|&pos| self.entries[pos].item)
    }

    /// Keys of `self` followed by keys only in `other`, each with its label.
    fn union_keys<'a>(&'a self, other: &'a KeyedList<'_>) -> Vec<(&'a IdentityKey, &'a str)> {
        let mut keys: Vec<_> = self
            .entries
            .iter()
            .map(|e| (&e.key, e.label.as_str()))
            .collect();
        keys.extend(
            other
                .entries
                .iter()
                .filter(|e| !self.positions.contains_key(&e.key))
                .map(|e| (&e.key, e.label.as_str())),
        );
        keys
    }
}

/// Compare two typed records with a registry built from `T`.
///
/// Uses the default configuration and reports diagnostics through `tracing`.
/// Returns the rendered change lines.
pub fn diff_records<T>(old: Option<&T>, new: Option<&T>) -> DiffResult<Vec<String>>
where
    T: DiffSchema + Serialize,
{
    let registry = SchemaRegistry::for_type::<T>()?;
    let changes = Differ::new(registry).compare_records(old, new)?;
    Ok(changes.lines())
}

fn to_value<T: Serialize>(record: Option<&T>) -> DiffResult<Value> {
    match record {
        Some(r) => serde_json::to_value(r).map_err(|e| DiffError::Serialization(e.to_string())),
        None => Ok(Value::Null),
    }
}

fn join_path(prefix: &str, label: &str) -> String {
    if prefix.is_empty() {
        label.to_string()
    } else {
        format!("{prefix}.{label}")
    }
}

fn as_list(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Null => Some(&[][..]),
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn is_compound(value: &Value) -> bool {
    value.is_array() || value.is_object()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A one-sided shape break: `expected` is the declared shape, `actual`
/// names what each side holds.
fn mismatch(path: &str, expected: &str, old: &Value, new: &Value) -> DiffError {
    DiffError::TypeMismatch {
        path: if path.is_empty() { "<root>".into() } else { path.to_string() },
        expected: expected.to_string(),
        actual: format!("old {}, new {}", json_kind(old), json_kind(new)),
    }
}
