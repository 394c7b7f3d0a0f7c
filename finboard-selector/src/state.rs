//! Selector state and its persisted forms.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use finboard_core::{ColumnManifest, ManifestFingerprint, PresetView, DEFAULT_VIEW_ID};

/// Sentinel stored when the state no longer matches any named view.
pub const MODIFIED_SENTINEL: &str = "modified";

/// Which named view the current state came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActiveView {
    /// A preset id, or a `custom-` prefixed custom view id.
    Named(String),
    /// Diverged from any named view through manual edits.
    Modified,
}

impl ActiveView {
    pub fn named(id: impl Into<String>) -> Self {
        ActiveView::Named(id.into())
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            ActiveView::Named(id) => Some(id),
            ActiveView::Modified => None,
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, ActiveView::Modified)
    }
}

impl From<String> for ActiveView {
    fn from(s: String) -> Self {
        if s == MODIFIED_SENTINEL {
            ActiveView::Modified
        } else {
            ActiveView::Named(s)
        }
    }
}

impl From<ActiveView> for String {
    fn from(v: ActiveView) -> Self {
        match v {
            ActiveView::Named(id) => id,
            ActiveView::Modified => MODIFIED_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveView::Named(id) => write!(f, "{id}"),
            ActiveView::Modified => write!(f, "{MODIFIED_SENTINEL}"),
        }
    }
}

/// Which columns are shown, pinned and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSelectorState {
    pub selected_columns: Vec<String>,
    /// Ordered subset of `selected_columns`.
    pub pinned_columns: Vec<String>,
    pub column_order: Vec<String>,
    pub active_view: ActiveView,
}

impl ColumnSelectorState {
    /// Nothing selected, attributed to the default view.
    pub fn empty() -> Self {
        Self {
            selected_columns: Vec::new(),
            pinned_columns: Vec::new(),
            column_order: Vec::new(),
            active_view: ActiveView::named(DEFAULT_VIEW_ID),
        }
    }

    /// State produced by applying a preset verbatim.
    pub fn from_preset(preset: &PresetView) -> Self {
        Self {
            selected_columns: preset.columns.clone(),
            pinned_columns: preset.pinned_columns.clone(),
            column_order: preset.columns.clone(),
            active_view: ActiveView::named(preset.id.clone()),
        }
    }

    /// The manifest's default preset, or [`ColumnSelectorState::empty`].
    pub fn initial(manifest: &ColumnManifest) -> Self {
        manifest
            .default_preset()
            .map(Self::from_preset)
            .unwrap_or_else(Self::empty)
    }

    /// Drop ids the manifest no longer defines, collapse duplicates and keep
    /// pins inside the selection. Returns how many entries were removed.
    pub fn retain_known(&mut self, manifest: &ColumnManifest) -> usize {
        let before =
            self.selected_columns.len() + self.pinned_columns.len() + self.column_order.len();

        dedup_known(&mut self.selected_columns, manifest);
        dedup_known(&mut self.column_order, manifest);
        dedup_known(&mut self.pinned_columns, manifest);
        let selected = &self.selected_columns;
        self.pinned_columns.retain(|id| selected.contains(id));

        before - (self.selected_columns.len() + self.pinned_columns.len() + self.column_order.len())
    }
}

fn dedup_known(ids: &mut Vec<String>, manifest: &ColumnManifest) {
    let mut seen = HashSet::new();
    ids.retain(|id| manifest.contains_column(id) && seen.insert(id.clone()));
}

/// The state blob as written to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(flatten)]
    pub state: ColumnSelectorState,
    pub last_updated: DateTime<Utc>,
    /// Manifest the state was written against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_fingerprint: Option<ManifestFingerprint>,
}

/// A user-saved view. Created and deleted, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomView {
    /// Time-derived local id, without the `custom-` namespace prefix.
    pub id: String,
    pub name: String,
    pub columns: Vec<String>,
    pub pinned_columns: Vec<String>,
    pub column_order: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CustomView {
    /// Snapshot the current selection.
    pub fn snapshot(
        id: String,
        name: impl Into<String>,
        state: &ColumnSelectorState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            columns: state.selected_columns.clone(),
            pinned_columns: state.pinned_columns.clone(),
            column_order: state.column_order.clone(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finboard_core::{ColumnDefinition, ColumnGroup, DataType};

    fn manifest() -> ColumnManifest {
        ColumnManifest {
            version: "1".into(),
            last_updated: String::new(),
            groups: vec![ColumnGroup::new("g", "G")],
            columns: ["a", "b", "c"]
                .iter()
                .map(|id| ColumnDefinition::new(*id, id.to_uppercase(), "g", DataType::Number))
                .collect(),
            presets: Vec::new(),
        }
    }

    #[test]
    fn active_view_serializes_as_plain_string() {
        let json = serde_json::to_string(&ActiveView::Modified).unwrap();
        assert_eq!(json, "\"modified\"");
        let named: ActiveView = serde_json::from_str("\"custom-17\"").unwrap();
        assert_eq!(named.id(), Some("custom-17"));
    }

    #[test]
    fn retain_known_drops_stale_and_duplicate_ids() {
        let mut state = ColumnSelectorState {
            selected_columns: vec!["a".into(), "x".into(), "b".into(), "a".into()],
            pinned_columns: vec!["x".into(), "c".into(), "a".into()],
            column_order: vec!["b".into(), "x".into(), "a".into()],
            active_view: ActiveView::Modified,
        };
        let removed = state.retain_known(&manifest());
        assert_eq!(state.selected_columns, vec!["a", "b"]);
        // "c" is known but not selected.
        assert_eq!(state.pinned_columns, vec!["a"]);
        assert_eq!(state.column_order, vec!["b", "a"]);
        assert_eq!(removed, 5);
    }

    #[test]
    fn initial_without_default_preset_is_empty() {
        let state = ColumnSelectorState::initial(&manifest());
        assert_eq!(state, ColumnSelectorState::empty());
        assert_eq!(state.active_view.id(), Some(DEFAULT_VIEW_ID));
    }

    #[test]
    fn persisted_state_flattens_fields() {
        let persisted = PersistedState {
            state: ColumnSelectorState::empty(),
            last_updated: Utc::now(),
            manifest_fingerprint: None,
        };
        let value = serde_json::to_value(&persisted).unwrap();
        assert!(value.get("selectedColumns").is_some());
        assert!(value.get("lastUpdated").is_some());
        assert_eq!(value["activeView"], "default");
        assert!(value.get("manifestFingerprint").is_none());
    }
}
