//! Finboard Core — column manifest domain types, typed accessors, cell formatting.
//!
//! This crate holds everything the column selector and the tables built on it
//! treat as read-only input:
//! - Column definitions, groups and preset views (the manifest)
//! - Manifest validation and content fingerprinting
//! - The built-in company-browser manifest
//! - Column id → typed accessor resolution for JSON rows
//! - Per-column cell formatting (currency, percent, large numbers, dates)

pub mod accessor;
pub mod format;
pub mod manifest;

pub use accessor::{Accessor, ColumnAccessors};
pub use format::{format_cell, CellValue};
pub use manifest::{
    Alignment, ColumnDefinition, ColumnGroup, ColumnManifest, DataType, FormatKind,
    ManifestError, ManifestFingerprint, ManifestValidation, PresetView, DEFAULT_VIEW_ID,
};
