//! Column manifest: the static catalog of selectable columns, groups and preset views.
//!
//! The manifest is read-only input for the column selector. It is supplied by the
//! embedding application (or [`ColumnManifest::builtin`] for the company browser)
//! and borrowed for the lifetime of a selector session.

mod builtin;
mod validate;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validate::ManifestValidation;

/// Id of the preset every manifest is expected to ship.
pub const DEFAULT_VIEW_ID: &str = "default";

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Value type of a column's underlying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Number,
    Date,
}

/// How a cell is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    #[default]
    Text,
    Number,
    Currency,
    /// Value is already expressed in percent (12.5 renders as `12.50%`).
    Percent,
    /// Scaled with K/M/B/T suffixes.
    LargeNumber,
    Date,
}

/// Horizontal alignment hint for the table renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// One selectable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub group: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub pinnable: bool,
    #[serde(default)]
    pub default_visible: bool,
    #[serde(default)]
    pub default_pinned: bool,
    #[serde(default)]
    pub format: FormatKind,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_display: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source field in a data row. Falls back to `id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ColumnDefinition {
    /// A plain column with left-aligned text defaults.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        group: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        let (format, align) = match data_type {
            DataType::String => (FormatKind::Text, Alignment::Left),
            DataType::Number => (FormatKind::Number, Alignment::Right),
            DataType::Date => (FormatKind::Date, Alignment::Center),
        };
        Self {
            id: id.into(),
            name: name.into(),
            group: group.into(),
            data_type,
            pinnable: false,
            default_visible: false,
            default_pinned: false,
            format,
            align,
            decimals: None,
            max_display: None,
            description: None,
            field: None,
        }
    }

    #[must_use]
    pub fn pinnable(mut self) -> Self {
        self.pinnable = true;
        self
    }

    #[must_use]
    pub fn visible(mut self) -> Self {
        self.default_visible = true;
        self
    }

    /// Pinned by default. Implies pinnable and visible.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinnable = true;
        self.default_visible = true;
        self.default_pinned = true;
        self
    }

    #[must_use]
    pub fn format(mut self, format: FormatKind) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn max_display(mut self, max: f64) -> Self {
        self.max_display = Some(max);
        self
    }

    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Row field this column reads from.
    pub fn source_field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.id)
    }
}

/// A named bucket of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroup {
    pub id: String,
    pub name: String,
    /// Whether the group starts collapsed in the selector.
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            collapsed: false,
            description: None,
        }
    }

    #[must_use]
    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }
}

/// A system-defined named bundle of visible and pinned columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetView {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub pinned_columns: Vec<String>,
}

impl PresetView {
    pub fn new<I, P>(id: impl Into<String>, name: impl Into<String>, columns: I, pinned: P) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            columns: columns.into_iter().map(Into::into).collect(),
            pinned_columns: pinned.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Content hash of a manifest (BLAKE3 over its canonical JSON).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestFingerprint(pub String);

impl fmt::Display for ManifestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate root: every column, group and preset the selector can offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnManifest {
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    pub groups: Vec<ColumnGroup>,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default, alias = "presetViews")]
    pub presets: Vec<PresetView>,
}

impl ColumnManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn contains_column(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    pub fn group(&self, id: &str) -> Option<&ColumnGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn preset(&self, id: &str) -> Option<&PresetView> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn default_preset(&self) -> Option<&PresetView> {
        self.preset(DEFAULT_VIEW_ID)
    }

    /// Member columns of a group, in manifest order.
    pub fn columns_in_group<'a>(
        &'a self,
        group_id: &'a str,
    ) -> impl Iterator<Item = &'a ColumnDefinition> + 'a {
        self.columns.iter().filter(move |c| c.group == group_id)
    }

    /// Every column id in manifest order.
    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub fn default_pinned_ids(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.default_pinned)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn default_visible_ids(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.id.clone())
            .collect()
    }

    /// Check the manifest's referential integrity.
    pub fn validate(&self) -> ManifestValidation {
        validate::validate_manifest(self)
    }

    /// Deterministic content hash.
    ///
    /// Field order is fixed by the struct definitions, so equal manifests
    /// always hash equal.
    pub fn fingerprint(&self) -> ManifestFingerprint {
        // Serializing plain data with string keys cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        ManifestFingerprint(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
