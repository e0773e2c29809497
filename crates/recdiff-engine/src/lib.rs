//! Diff engine for recdiff.
//!
//! Compares two versions of a record field by field and produces
//! human-readable change records, recursing through nested records and
//! matching list elements by their identity field.
//!
//! # Key Types
//!
//! - [`Differ`] -- Comparison entry point bound to a schema registry
//! - [`ChangeSet`] / [`ChangeRecord`] -- Ordered change records
//! - [`Formatter`] -- Value formatting and record descriptions
//! - [`DiagnosticSink`] -- Receiver of non-fatal problems
//!
//! # Quick Start
//!
//! ```rust
//! use recdiff_engine::Differ;
//! use recdiff_schema::{FieldDescriptor, ScalarKind, SchemaRegistry, TypeSchema};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         TypeSchema::new("User")
//!             .field(FieldDescriptor::scalar("name", "Name", ScalarKind::Text)),
//!     )
//!     .unwrap();
//!
//! let differ = Differ::new(registry);
//! let changes = differ
//!     .compare("User", &json!({"name": "Ann"}), &json!({"name": "Anna"}))
//!     .unwrap();
//! assert_eq!(changes.lines(), ["Name changed from [Ann] to [Anna]"]);
//! ```

pub mod change;
pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod format;

pub use change::{ChangeRecord, ChangeSet};
pub use classify::{classify, Classification, ClassifyError};
pub use config::{DiffConfig, Locale, DEFAULT_DATE_FORMAT, DEFAULT_TYPE_TAG};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink};
pub use engine::{diff_records, Differ};
pub use error::{DiffError, DiffResult};
pub use format::Formatter;
