//! Referential-integrity checks for a column manifest.
//!
//! The selector itself never fails on a broken manifest (stale ids are dropped),
//! so validation is a reporting tool for manifest authors and the CLI.

use std::collections::HashSet;

use super::{ColumnManifest, DEFAULT_VIEW_ID};

/// Result of manifest validation.
#[derive(Debug, Clone)]
pub struct ManifestValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub(super) fn validate_manifest(manifest: &ColumnManifest) -> ManifestValidation {
    let mut errors = Vec::new();

    let mut group_ids = HashSet::new();
    for group in &manifest.groups {
        if !group_ids.insert(group.id.as_str()) {
            errors.push(format!("duplicate group id '{}'", group.id));
        }
    }

    let mut column_ids = HashSet::new();
    for column in &manifest.columns {
        if !column_ids.insert(column.id.as_str()) {
            errors.push(format!("duplicate column id '{}'", column.id));
        }
        if !group_ids.contains(column.group.as_str()) {
            errors.push(format!(
                "column '{}': unknown group '{}'",
                column.id, column.group
            ));
        }
        if column.default_pinned && !column.pinnable {
            errors.push(format!(
                "column '{}': pinned by default but not pinnable",
                column.id
            ));
        }
    }

    let mut preset_ids = HashSet::new();
    for preset in &manifest.presets {
        if !preset_ids.insert(preset.id.as_str()) {
            errors.push(format!("duplicate preset id '{}'", preset.id));
        }
        for id in preset.columns.iter().chain(&preset.pinned_columns) {
            if !column_ids.contains(id.as_str()) {
                errors.push(format!(
                    "preset '{}': unknown column '{}'",
                    preset.id, id
                ));
            }
        }
        for id in &preset.pinned_columns {
            if !preset.columns.contains(id) {
                errors.push(format!(
                    "preset '{}': pinned column '{}' is not in its column list",
                    preset.id, id
                ));
            }
        }
    }

    if !preset_ids.contains(DEFAULT_VIEW_ID) {
        errors.push(format!("missing required preset '{DEFAULT_VIEW_ID}'"));
    }

    ManifestValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}
