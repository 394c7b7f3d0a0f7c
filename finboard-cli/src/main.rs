//! Finboard CLI: column selection, pinning, saved views and table projection.
//!
//! Commands:
//! - `columns` / `groups`: show the current display columns or the grouped catalog
//! - `toggle`, `pin`, `reorder`, `select-all`, `deselect-all`, `reset`: edit the selection
//! - `views`, `view load|save|delete`: list and manage preset and custom views
//! - `manifest validate`: check a manifest for broken references
//! - `table`: render JSON rows through the selected columns, optionally to CSV
//!
//! Selection state is kept as JSON files under the state directory and
//! survives between invocations.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use finboard_core::{format_cell, Alignment, CellValue, ColumnAccessors, ColumnDefinition, ColumnManifest};
use finboard_selector::{
    ColumnChange, ColumnSelector, FileStorage, PinChange, SelectorConfig, SelectorObserver,
    ViewEntry, ViewKind,
};

#[derive(Parser)]
#[command(
    name = "finboard",
    about = "Finboard CLI: choose, pin and order table columns"
)]
struct Cli {
    /// Column manifest JSON. Defaults to the built-in company manifest.
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Directory holding selection state. Defaults to the platform config dir.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Selector config TOML (pin limit, storage keys).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns a table would display, pinned first.
    Columns,
    /// Show column groups with selection marks.
    Groups {
        /// Keep only columns whose name contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show or hide a column. Flips it unless --on or --off is given.
    Toggle {
        id: String,

        #[arg(long, conflicts_with = "off")]
        on: bool,

        #[arg(long)]
        off: bool,
    },
    /// Pin or unpin a column.
    Pin { id: String },
    /// Replace the display order.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Select every column in the manifest.
    SelectAll,
    /// Keep only the default pinned columns.
    DeselectAll,
    /// Load the default view.
    Reset,
    /// List preset and custom views.
    Views,
    /// Manage views.
    View {
        #[command(subcommand)]
        action: ViewAction,
    },
    /// Manifest tooling.
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },
    /// Render JSON rows through the current column selection.
    Table {
        /// JSON file holding an array of row objects.
        #[arg(long)]
        rows: PathBuf,

        /// Also write the formatted table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ViewAction {
    /// Apply a preset or custom view by id.
    Load { id: String },
    /// Save the current selection as a custom view.
    Save { name: String },
    /// Delete a custom view by id.
    Delete { id: String },
}

#[derive(Subcommand)]
enum ManifestAction {
    /// Check ids, groups and preset references.
    Validate,
}

/// Logs selector events; the CLI prints its own summaries.
struct LogObserver;

impl SelectorObserver for LogObserver {
    fn on_column_change(&mut self, change: &ColumnChange) {
        debug!(
            selected = change.selected_columns.len(),
            pinned = change.pinned_columns.len(),
            "columns changed"
        );
    }

    fn on_view_change(&mut self, view: &ViewEntry) {
        debug!(view = %view.id, name = %view.name, "view changed");
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let manifest = load_manifest(cli.manifest.as_deref())?;
    let validation = manifest.validate();
    if !validation.is_valid && !matches!(cli.command, Commands::Manifest { .. }) {
        warn!(errors = validation.errors.len(), "manifest has integrity errors; run `finboard manifest validate`");
    }

    let config = match &cli.config {
        Some(path) => SelectorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SelectorConfig::default(),
    };
    let state_dir = cli.state_dir.unwrap_or_else(default_state_dir);
    debug!(dir = %state_dir.display(), "using state directory");

    let mut selector = ColumnSelector::new(&manifest, config, FileStorage::new(&state_dir), LogObserver);

    match cli.command {
        Commands::Columns => print_columns(&selector),
        Commands::Groups { search } => {
            if let Some(term) = search {
                selector.set_search_term(term);
            }
            print_groups(&selector);
        }
        Commands::Toggle { id, on, off } => {
            let explicit = match (on, off) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            if !manifest.contains_column(&id) {
                bail!("unknown column '{id}'");
            }
            if selector.toggle_column(&id, explicit) {
                let shown = if selector.is_selected(&id) { "shown" } else { "hidden" };
                println!("{id}: {shown}");
            } else {
                println!("{id}: unchanged");
            }
        }
        Commands::Pin { id } => match selector.toggle_pin(&id)? {
            PinChange::Pinned => println!("{id}: pinned"),
            PinChange::Unpinned => println!("{id}: unpinned"),
        },
        Commands::Reorder { ids } => {
            selector.reorder_columns(ids);
            print_columns(&selector);
        }
        Commands::SelectAll => {
            selector.select_all();
            print_columns(&selector);
        }
        Commands::DeselectAll => {
            selector.deselect_all();
            print_columns(&selector);
        }
        Commands::Reset => {
            if !selector.reset_to_default() {
                bail!("manifest has no 'default' view");
            }
            print_columns(&selector);
        }
        Commands::Views => print_views(&selector),
        Commands::View { action } => match action {
            ViewAction::Load { id } => {
                if !selector.load_view(&id) {
                    bail!("unknown view '{id}'. Run `finboard views` to list them");
                }
                print_columns(&selector);
            }
            ViewAction::Save { name } => {
                let entry = selector.save_view(&name);
                println!("Saved view '{}' as {}", entry.name, entry.id);
            }
            ViewAction::Delete { id } => {
                if !selector.delete_view(&id) {
                    bail!("no custom view '{id}' (preset views cannot be deleted)");
                }
                println!("Deleted {id}");
            }
        },
        Commands::Manifest {
            action: ManifestAction::Validate,
        } => run_validate(&manifest)?,
        Commands::Table { rows, csv } => run_table(&selector, &rows, csv.as_deref())?,
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finboard")
}

fn load_manifest(path: Option<&Path>) -> Result<ColumnManifest> {
    match path {
        Some(path) => ColumnManifest::from_path(path)
            .with_context(|| format!("loading manifest {}", path.display())),
        None => Ok(ColumnManifest::builtin()),
    }
}

fn run_validate(manifest: &ColumnManifest) -> Result<()> {
    let validation = manifest.validate();
    println!(
        "Manifest v{}: {} groups, {} columns, {} presets",
        manifest.version,
        manifest.groups.len(),
        manifest.columns.len(),
        manifest.presets.len()
    );
    println!("Fingerprint: {}", manifest.fingerprint());
    if validation.is_valid {
        println!("OK");
        return Ok(());
    }
    for error in &validation.errors {
        eprintln!("  {error}");
    }
    bail!("manifest has {} error(s)", validation.errors.len())
}

fn print_columns(selector: &ColumnSelector<'_>) {
    let columns = selector.display_columns();
    println!("View: {}", selector.active_view());
    if columns.is_empty() {
        println!("(no columns selected)");
        return;
    }
    for column in columns {
        let mark = if selector.is_pinned(&column.id) { "*" } else { " " };
        println!("{mark} {:<22} {}", column.id, column.name);
    }
}

fn print_groups(selector: &ColumnSelector<'_>) {
    let groups = selector.filtered_groups();
    if groups.is_empty() {
        println!("No columns match '{}'", selector.search_term());
        return;
    }
    for entry in groups {
        let fold = if entry.collapsed { "+" } else { "-" };
        println!("{fold} {} ({})", entry.group.name, entry.columns.len());
        if entry.collapsed && selector.search_term().is_empty() {
            continue;
        }
        for column in entry.columns {
            let check = if selector.is_selected(&column.id) { "x" } else { " " };
            let pin = if selector.is_pinned(&column.id) { " (pinned)" } else { "" };
            println!("    [{check}] {:<22} {}{pin}", column.id, column.name);
        }
    }
}

fn print_views(selector: &ColumnSelector<'_>) {
    let active = selector.active_view().id();
    println!("{:<2}{:<22} {:<8} {:>7}  Name", "", "Id", "Kind", "Columns");
    println!("{}", "-".repeat(56));
    for view in selector.all_views() {
        let mark = if active == Some(view.id.as_str()) { ">" } else { " " };
        let kind = match view.kind {
            ViewKind::Preset => "preset",
            ViewKind::Custom => "custom",
        };
        println!(
            "{mark} {:<22} {:<8} {:>7}  {}",
            view.id,
            kind,
            view.columns.len(),
            view.name
        );
    }
}

fn run_table(selector: &ColumnSelector<'_>, rows_path: &Path, csv_out: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(rows_path)
        .with_context(|| format!("reading rows {}", rows_path.display()))?;
    let rows: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("parsing rows {} (expected a JSON array of objects)", rows_path.display()))?;

    let columns = selector.display_columns();
    if columns.is_empty() {
        bail!("no columns selected");
    }
    let accessors = ColumnAccessors::resolve(selector.manifest());
    let cells = project_rows(&columns, &accessors, &rows);

    print_table(&columns, &cells);

    if let Some(path) = csv_out {
        write_csv(path, &columns, &cells)?;
        println!("Wrote {} rows to {}", cells.len(), path.display());
    }
    Ok(())
}

fn project_rows(
    columns: &[&ColumnDefinition],
    accessors: &ColumnAccessors,
    rows: &[Value],
) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    let value = accessors
                        .extract(&column.id, row)
                        .unwrap_or(CellValue::Missing);
                    format_cell(column, &value)
                })
                .collect()
        })
        .collect()
}

fn print_table(columns: &[&ColumnDefinition], cells: &[Vec<String>]) {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &w)| pad(&column.name, w, column.align))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in cells {
        let line: Vec<String> = row
            .iter()
            .zip(columns.iter().zip(&widths))
            .map(|(cell, (column, &w))| pad(cell, w, column.align))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    match align {
        Alignment::Left => format!("{text:<width$}"),
        Alignment::Center => format!("{text:^width$}"),
        Alignment::Right => format!("{text:>width$}"),
    }
}

fn write_csv(path: &Path, columns: &[&ColumnDefinition], cells: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(columns.iter().map(|c| c.name.as_str()))?;
    for row in cells {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finboard_selector::MemoryStorage;
    use serde_json::json;

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["finboard", "toggle", "pe_ratio", "--on", "--state-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.state_dir.as_deref(), Some(Path::new("/tmp/x")));
        assert!(matches!(cli.command, Commands::Toggle { on: true, off: false, .. }));
    }

    #[test]
    fn toggle_on_and_off_conflict() {
        assert!(Cli::try_parse_from(["finboard", "toggle", "x", "--on", "--off"]).is_err());
    }

    #[test]
    fn rows_project_through_display_columns() {
        let manifest = ColumnManifest::builtin();
        let selector = ColumnSelector::with_storage(&manifest, SelectorConfig::default(), MemoryStorage::new());
        let columns = selector.display_columns();
        let accessors = ColumnAccessors::resolve(&manifest);
        let rows = vec![json!({ "ticker": "AAPL" }), json!({})];

        let cells = project_rows(&columns, &accessors, &rows);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0][0], "AAPL");
        assert!(cells[1].iter().all(|c| c == "-"));
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let a = ColumnDefinition::new("a", "Alpha", "g", finboard_core::DataType::String);
        let b = ColumnDefinition::new("b", "Beta, Inc", "g", finboard_core::DataType::Number);
        let cells = vec![vec!["x".to_string(), "1.00".to_string()]];
        write_csv(&path, &[&a, &b], &cells).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Alpha,\"Beta, Inc\"\nx,1.00\n");
    }

    #[test]
    fn pad_respects_alignment() {
        assert_eq!(pad("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(pad("ab", 4, Alignment::Right), "  ab");
        assert_eq!(pad("ab", 4, Alignment::Center), " ab ");
    }
}
