//! Combined listing of preset and custom views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use finboard_core::PresetView;

use crate::state::CustomView;

/// Prefix that keeps custom view ids apart from preset ids.
pub const CUSTOM_VIEW_PREFIX: &str = "custom-";

/// Namespaced id under which a custom view is listed and loaded.
pub fn custom_view_id(local_id: &str) -> String {
    format!("{CUSTOM_VIEW_PREFIX}{local_id}")
}

/// Local id of a namespaced custom view id, if it is one.
pub fn strip_custom_prefix(view_id: &str) -> Option<&str> {
    view_id.strip_prefix(CUSTOM_VIEW_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Shipped with the manifest.
    Preset,
    /// Saved by the user.
    Custom,
}

/// One entry of the view picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntry {
    pub id: String,
    pub name: String,
    pub kind: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<String>,
    pub pinned_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ViewEntry {
    pub fn is_custom(&self) -> bool {
        self.kind == ViewKind::Custom
    }
}

impl From<&PresetView> for ViewEntry {
    fn from(p: &PresetView) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            kind: ViewKind::Preset,
            description: p.description.clone(),
            columns: p.columns.clone(),
            pinned_columns: p.pinned_columns.clone(),
            created_at: None,
        }
    }
}

impl From<&CustomView> for ViewEntry {
    fn from(v: &CustomView) -> Self {
        Self {
            id: custom_view_id(&v.id),
            name: v.name.clone(),
            kind: ViewKind::Custom,
            description: None,
            columns: v.columns.clone(),
            pinned_columns: v.pinned_columns.clone(),
            created_at: Some(v.created_at),
        }
    }
}
