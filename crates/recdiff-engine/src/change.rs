//! Change records produced by a comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Locale;

/// One detected difference.
///
/// `path` is the dotted label chain to the field, with `[key]` segments for
/// list elements matched by identity. All values are already formatted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeRecord {
    /// A value changed. An empty side means the value was absent.
    Modified {
        path: String,
        old: String,
        new: String,
    },
    /// A list element appeared under a new identity key.
    Added {
        path: String,
        key: String,
        description: String,
    },
    /// A list element's identity key disappeared.
    Removed {
        path: String,
        key: String,
        description: String,
    },
}

impl ChangeRecord {
    /// Path of the changed field (or list) relative to the compared record.
    pub fn path(&self) -> &str {
        match self {
            Self::Modified { path, .. } | Self::Added { path, .. } | Self::Removed { path, .. } => {
                path
            }
        }
    }

    /// Render the record as a message line.
    ///
    /// A modification at the root of the comparison has an empty path; the
    /// line then starts with the verb.
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Modified { path, old, new }, Locale::En) if path.is_empty() => {
                format!("changed from [{old}] to [{new}]")
            }
            (Self::Modified { path, old, new }, Locale::En) => {
                format!("{path} changed from [{old}] to [{new}]")
            }
            (Self::Modified { path, old, new }, Locale::ZhCn) if path.is_empty() => {
                format!("由 [{old}] 变更成 [{new}]")
            }
            (Self::Modified { path, old, new }, Locale::ZhCn) => {
                format!("{path} 由 [{old}] 变更成 [{new}]")
            }
            (Self::Added { path, key, description }, Locale::En) => {
                format!("{path}[{key}] added: [{description}]")
            }
            (Self::Added { path, key, description }, Locale::ZhCn) => {
                format!("{path}[{key}] 新增：[{description}]")
            }
            (Self::Removed { path, key, description }, Locale::En) => {
                format!("{path}[{key}] removed: [{description}]")
            }
            (Self::Removed { path, key, description }, Locale::ZhCn) => {
                format!("{path}[{key}] 删除：[{description}]")
            }
        }
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Locale::En))
    }
}

/// The ordered result of comparing two records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Detected changes in emission order.
    pub changes: Vec<ChangeRecord>,
    /// Locale used by [`ChangeSet::lines`].
    #[serde(skip)]
    pub locale: Locale,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(changes: Vec<ChangeRecord>, locale: Locale) -> Self {
        Self { changes, locale }
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.changes.iter()
    }

    /// Number of added list elements.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ChangeRecord::Added { .. }))
            .count()
    }

    /// Number of removed list elements.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ChangeRecord::Removed { .. }))
            .count()
    }

    /// Number of modified values.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ChangeRecord::Modified { .. }))
            .count()
    }

    /// The records rendered as message lines in the set's locale.
    pub fn lines(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.render(self.locale)).collect()
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangeRecord;
    type IntoIter = std::vec::IntoIter<ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
