//! Diagnostic sinks: where non-fatal comparison problems are reported.

use std::fmt;
use std::sync::Mutex;

/// Category of a non-fatal problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A field value does not have the shape its declaration promises.
    Introspection,
    /// A list's element type is undeclared and could not be inferred.
    UnresolvedElementType,
    /// List elements cannot be matched because their type has no identity field.
    MissingIdentity,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Introspection => "introspection",
            Self::UnresolvedElementType => "unresolved-element-type",
            Self::MissingIdentity => "missing-identity",
        };
        f.write_str(name)
    }
}

/// A non-fatal problem found while comparing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Path of the affected field.
    pub path: String,
    pub message: String,
}

/// Receives diagnostics from a [`Differ`](crate::Differ).
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = %diagnostic.kind,
            path = %diagnostic.path,
            "{}",
            diagnostic.message
        );
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().expect("diagnostic mutex poisoned"))
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("diagnostic mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .expect("diagnostic mutex poisoned")
            .push(diagnostic);
    }
}
