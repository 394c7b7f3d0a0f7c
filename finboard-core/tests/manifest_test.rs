//! Manifest loading, validation and row projection through the public API.

use finboard_core::{
    format_cell, CellValue, ColumnAccessors, ColumnManifest, DataType, ManifestError,
    DEFAULT_VIEW_ID,
};
use serde_json::json;

#[test]
fn builtin_manifest_round_trips_through_json() {
    // GIVEN the built-in manifest serialized to JSON
    let manifest = ColumnManifest::builtin();
    let json = manifest.to_json_pretty().unwrap();

    // WHEN it is parsed back
    let parsed = ColumnManifest::from_json(&json).unwrap();

    // THEN it is identical and hashes the same
    assert_eq!(parsed, manifest);
    assert_eq!(parsed.fingerprint(), manifest.fingerprint());
    assert!(json.contains("\"defaultPinned\""));
    assert!(json.contains("\"type\": \"number\""));
}

#[test]
fn manifest_loads_from_disk() {
    let dir = tempfile_dir("finboard_manifest_load");
    let path = dir.join("manifest.json");
    std::fs::write(&path, ColumnManifest::builtin().to_json_pretty().unwrap()).unwrap();

    let loaded = ColumnManifest::from_path(&path).unwrap();
    assert!(loaded.preset(DEFAULT_VIEW_ID).is_some());

    let missing = ColumnManifest::from_path(&dir.join("nope.json")).unwrap_err();
    assert!(matches!(missing, ManifestError::Io { .. }));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn every_group_in_builtin_has_members() {
    let manifest = ColumnManifest::builtin();
    for group in &manifest.groups {
        assert!(
            manifest.columns_in_group(&group.id).next().is_some(),
            "group '{}' is empty",
            group.id
        );
    }
}

#[test]
fn selected_columns_project_a_company_row() {
    // GIVEN a company row as the REST API returns it
    let manifest = ColumnManifest::builtin();
    let accessors = ColumnAccessors::resolve(&manifest);
    let row = json!({
        "ticker": "MSFT",
        "name": "Microsoft Corp",
        "close": 415.26,
        "change_pct": -1.234,
        "market_cap": 3.086e12,
        "pe_ratio": 36.4,
    });

    // WHEN the default preset's columns are projected and formatted
    let preset = manifest.default_preset().unwrap();
    let cells: Vec<String> = preset
        .columns
        .iter()
        .map(|id| {
            let column = manifest.column(id).unwrap();
            let value = accessors.extract(id, &row).unwrap();
            format_cell(column, &value)
        })
        .collect();

    // THEN each cell uses its column's format
    assert_eq!(
        cells,
        vec!["MSFT", "Microsoft Corp", "-", "$415.26", "-1.23%", "3.09T", "36.4"]
    );
}

#[test]
fn number_column_reads_numeric_strings() {
    let manifest = ColumnManifest::builtin();
    let accessors = ColumnAccessors::resolve(&manifest);
    let accessor = accessors.get("volume").unwrap();
    assert_eq!(accessor.data_type(), DataType::Number);
    assert_eq!(
        accessor.read(&json!({"volume": " 1200 "})),
        CellValue::Number(1200.0)
    );
}

fn tempfile_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
