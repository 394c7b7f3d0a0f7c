//! Column selector state manager.
//!
//! Owns the selection, pin, order and active-view state for one table, plus the
//! session's custom views. Every state change is written to the injected
//! [`StorageProvider`] immediately and reported to the [`SelectorObserver`].
//! Storage failures are logged and swallowed; the selector keeps working in
//! memory.
//!
//! All operations are synchronous and run to completion on the caller's thread.

use std::collections::BTreeSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use finboard_core::{
    ColumnDefinition, ColumnGroup, ColumnManifest, ManifestFingerprint, DEFAULT_VIEW_ID,
};

use crate::config::SelectorConfig;
use crate::events::{ColumnChange, NoopObserver, SelectorObserver};
use crate::state::{ActiveView, ColumnSelectorState, CustomView, PersistedState};
use crate::storage::StorageProvider;
use crate::views::{strip_custom_prefix, ViewEntry};

/// Rejected pin requests. State is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' cannot be pinned")]
    NotPinnable(String),

    #[error("at most {max} columns can be pinned; unpin one first")]
    LimitReached { max: usize },
}

/// Outcome of a successful pin toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinChange {
    Pinned,
    Unpinned,
}

/// Columns of one group after search filtering.
#[derive(Debug, Clone)]
pub struct GroupColumns<'m> {
    pub group: &'m ColumnGroup,
    pub columns: Vec<&'m ColumnDefinition>,
    pub collapsed: bool,
}

pub struct ColumnSelector<'m> {
    manifest: &'m ColumnManifest,
    fingerprint: ManifestFingerprint,
    config: SelectorConfig,
    storage: Box<dyn StorageProvider>,
    observer: Box<dyn SelectorObserver>,
    state: ColumnSelectorState,
    custom_views: Vec<CustomView>,
    collapsed_groups: BTreeSet<String>,
    search_term: String,
}

impl<'m> ColumnSelector<'m> {
    /// Restore state from `storage`, falling back to the manifest's default preset.
    pub fn new(
        manifest: &'m ColumnManifest,
        config: SelectorConfig,
        storage: impl StorageProvider + 'static,
        observer: impl SelectorObserver + 'static,
    ) -> Self {
        let fingerprint = manifest.fingerprint();
        let state = load_state(manifest, &fingerprint, &storage, &config.state_key);
        let custom_views = load_custom_views(&storage, &config.views_key);
        let collapsed_groups = manifest
            .groups
            .iter()
            .filter(|g| g.collapsed)
            .map(|g| g.id.clone())
            .collect();

        Self {
            manifest,
            fingerprint,
            config,
            storage: Box::new(storage),
            observer: Box::new(observer),
            state,
            custom_views,
            collapsed_groups,
            search_term: String::new(),
        }
    }

    /// A selector nobody listens to.
    pub fn with_storage(
        manifest: &'m ColumnManifest,
        config: SelectorConfig,
        storage: impl StorageProvider + 'static,
    ) -> Self {
        Self::new(manifest, config, storage, NoopObserver)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn manifest(&self) -> &'m ColumnManifest {
        self.manifest
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn state(&self) -> &ColumnSelectorState {
        &self.state
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.state.selected_columns
    }

    pub fn pinned_columns(&self) -> &[String] {
        &self.state.pinned_columns
    }

    pub fn column_order(&self) -> &[String] {
        &self.state.column_order
    }

    pub fn active_view(&self) -> &ActiveView {
        &self.state.active_view
    }

    pub fn custom_views(&self) -> &[CustomView] {
        &self.custom_views
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.selected_columns.iter().any(|c| c == id)
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.state.pinned_columns.iter().any(|c| c == id)
    }

    /// Whether `toggle_pin(id)` would pin the column right now.
    pub fn can_pin(&self, id: &str) -> bool {
        !self.is_pinned(id)
            && self.manifest.column(id).is_some_and(|c| c.pinnable)
            && self.state.pinned_columns.len() < self.config.max_pinned_columns
    }

    pub fn is_group_collapsed(&self, group_id: &str) -> bool {
        self.collapsed_groups.contains(group_id)
    }

    /// Selected columns resolved in display order.
    ///
    /// Uses `column_order` restricted to selected ids, or the selection itself
    /// when no order has been recorded. Ids missing from the manifest are skipped.
    pub fn ordered_columns(&self) -> Vec<&'m ColumnDefinition> {
        let manifest = self.manifest;
        let selected = &self.state.selected_columns;
        if self.state.column_order.is_empty() {
            selected.iter().filter_map(|id| manifest.column(id)).collect()
        } else {
            self.state
                .column_order
                .iter()
                .filter(|id| selected.contains(id))
                .filter_map(|id| manifest.column(id))
                .collect()
        }
    }

    /// [`ordered_columns`](Self::ordered_columns) with pinned columns leading, in pin order.
    pub fn display_columns(&self) -> Vec<&'m ColumnDefinition> {
        let ordered = self.ordered_columns();
        let pinned = &self.state.pinned_columns;

        let mut leading: Vec<&'m ColumnDefinition> = pinned
            .iter()
            .filter_map(|id| ordered.iter().copied().find(|c| &c.id == id))
            .collect();
        leading.extend(ordered.iter().copied().filter(|c| !pinned.contains(&c.id)));
        leading
    }

    /// Groups in manifest order with their columns, narrowed by the search term.
    ///
    /// With a term, only columns whose name contains it (case-insensitive) are
    /// kept and groups left empty are omitted. Without one, every group is
    /// returned, empty or not.
    pub fn filtered_groups(&self) -> Vec<GroupColumns<'m>> {
        let manifest = self.manifest;
        let needle = self.search_term.to_lowercase();

        manifest
            .groups
            .iter()
            .filter_map(|group| {
                let columns: Vec<&'m ColumnDefinition> = manifest
                    .columns
                    .iter()
                    .filter(|c| c.group == group.id)
                    .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
                    .collect();
                if !needle.is_empty() && columns.is_empty() {
                    return None;
                }
                Some(GroupColumns {
                    group,
                    columns,
                    collapsed: self.collapsed_groups.contains(&group.id),
                })
            })
            .collect()
    }

    /// Presets first, then custom views under their namespaced ids.
    pub fn all_views(&self) -> Vec<ViewEntry> {
        self.manifest
            .presets
            .iter()
            .map(ViewEntry::from)
            .chain(self.custom_views.iter().map(ViewEntry::from))
            .collect()
    }

    /// Look up a preset or namespaced custom view.
    pub fn view(&self, view_id: &str) -> Option<ViewEntry> {
        if let Some(preset) = self.manifest.preset(view_id) {
            return Some(ViewEntry::from(preset));
        }
        self.find_custom(view_id)
            .map(|idx| ViewEntry::from(&self.custom_views[idx]))
    }

    /// The projection delivered to `on_column_change`.
    pub fn change(&self) -> ColumnChange {
        ColumnChange {
            selected_columns: self.state.selected_columns.clone(),
            pinned_columns: self.state.pinned_columns.clone(),
            column_order: self.state.column_order.clone(),
            columns: self.ordered_columns().into_iter().cloned().collect(),
        }
    }

    // ── Column mutations ─────────────────────────────────────────────

    /// Show or hide a column. `explicit` forces the target state; `None` flips it.
    ///
    /// Returns whether anything changed. Unknown ids and requests for the
    /// current state are no-ops.
    pub fn toggle_column(&mut self, id: &str, explicit: Option<bool>) -> bool {
        if !self.manifest.contains_column(id) {
            debug!(column = id, "toggle ignored: unknown column");
            return false;
        }
        let selected = self.is_selected(id);
        let target = explicit.unwrap_or(!selected);
        if target == selected {
            return false;
        }

        let state = &mut self.state;
        if target {
            state.selected_columns.push(id.to_string());
            state.column_order.retain(|c| c != id);
            state.column_order.push(id.to_string());
        } else {
            state.selected_columns.retain(|c| c != id);
            state.pinned_columns.retain(|c| c != id);
            state.column_order.retain(|c| c != id);
        }
        state.active_view = ActiveView::Modified;
        self.commit();
        true
    }

    /// Pin or unpin a column.
    ///
    /// Pinning an unselected column selects it as well, so pins always stay a
    /// subset of the selection.
    pub fn toggle_pin(&mut self, id: &str) -> Result<PinChange, PinError> {
        let column = self
            .manifest
            .column(id)
            .ok_or_else(|| PinError::UnknownColumn(id.to_string()))?;
        if !column.pinnable {
            return Err(PinError::NotPinnable(id.to_string()));
        }

        let change = if self.is_pinned(id) {
            self.state.pinned_columns.retain(|c| c != id);
            PinChange::Unpinned
        } else {
            let max = self.config.max_pinned_columns;
            if self.state.pinned_columns.len() >= max {
                info!(column = id, max, "pin rejected: limit reached");
                return Err(PinError::LimitReached { max });
            }
            let state = &mut self.state;
            state.pinned_columns.push(id.to_string());
            if !state.selected_columns.iter().any(|c| c == id) {
                state.selected_columns.push(id.to_string());
                state.column_order.retain(|c| c != id);
                state.column_order.push(id.to_string());
            }
            PinChange::Pinned
        };

        self.state.active_view = ActiveView::Modified;
        self.commit();
        Ok(change)
    }

    /// Replace the display order verbatim. Completeness is not checked here;
    /// [`ordered_columns`](Self::ordered_columns) ignores ids that are not selected.
    pub fn reorder_columns(&mut self, new_order: Vec<String>) {
        self.state.column_order = new_order;
        self.state.active_view = ActiveView::Modified;
        self.commit();
    }

    /// Select every manifest column in manifest order. Pins are kept.
    pub fn select_all(&mut self) {
        let all = self.manifest.column_ids();
        self.state.selected_columns = all.clone();
        self.state.column_order = all;
        self.state.active_view = ActiveView::Modified;
        self.commit();
    }

    /// Collapse to the manifest's default-pinned columns, which stay pinned.
    pub fn deselect_all(&mut self) {
        let keep = self.manifest.default_pinned_ids();
        self.state.selected_columns = keep.clone();
        self.state.pinned_columns = keep.clone();
        self.state.column_order = keep;
        self.state.active_view = ActiveView::Modified;
        self.commit();
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Apply a preset or custom view. Unknown ids are a no-op returning `false`.
    pub fn load_view(&mut self, view_id: &str) -> bool {
        let mut next = if let Some(preset) = self.manifest.preset(view_id) {
            ColumnSelectorState::from_preset(preset)
        } else if let Some(idx) = self.find_custom(view_id) {
            let view = &self.custom_views[idx];
            ColumnSelectorState {
                selected_columns: view.columns.clone(),
                pinned_columns: view.pinned_columns.clone(),
                column_order: view.column_order.clone(),
                active_view: ActiveView::named(view_id),
            }
        } else {
            debug!(view = view_id, "load ignored: unknown view");
            return false;
        };

        let dropped = next.retain_known(self.manifest);
        if dropped > 0 {
            debug!(view = view_id, dropped, "view referenced unknown columns");
        }
        self.state = next;
        self.commit();
        if let Some(entry) = self.view(view_id) {
            self.observer.on_view_change(&entry);
        }
        true
    }

    /// Snapshot the current state as a new custom view and make it active.
    pub fn save_view(&mut self, name: &str) -> ViewEntry {
        let now = Utc::now();
        let local_id = self.next_custom_id(now.timestamp_millis());
        let view = CustomView::snapshot(local_id, name, &self.state, now);
        let entry = ViewEntry::from(&view);

        self.custom_views.push(view);
        self.persist_views();

        self.state.active_view = ActiveView::named(entry.id.clone());
        self.commit();
        self.observer.on_view_change(&entry);
        entry
    }

    /// Delete a custom view. Presets and unknown ids return `false`.
    ///
    /// If the deleted view was active, the state is marked modified.
    pub fn delete_view(&mut self, view_id: &str) -> bool {
        let Some(idx) = self.find_custom(view_id) else {
            return false;
        };
        self.custom_views.remove(idx);
        self.persist_views();

        if self.state.active_view.id() == Some(view_id) {
            self.state.active_view = ActiveView::Modified;
            self.commit();
        }
        true
    }

    /// Same as `load_view("default")`.
    pub fn reset_to_default(&mut self) -> bool {
        self.load_view(DEFAULT_VIEW_ID)
    }

    // ── Transient UI state ───────────────────────────────────────────

    /// Flip a group's collapsed flag. Returns the new value. Not persisted.
    pub fn toggle_group(&mut self, group_id: &str) -> bool {
        if self.collapsed_groups.remove(group_id) {
            false
        } else {
            self.collapsed_groups.insert(group_id.to_string());
            true
        }
    }

    /// Set the column search filter. An empty term clears it. Not persisted.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    // ── Internals ────────────────────────────────────────────────────

    fn find_custom(&self, view_id: &str) -> Option<usize> {
        let local = strip_custom_prefix(view_id)?;
        self.custom_views.iter().position(|v| v.id == local)
    }

    /// Millisecond timestamp, bumped past any id already taken.
    fn next_custom_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self
            .custom_views
            .iter()
            .any(|v| v.id == candidate.to_string())
        {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn commit(&mut self) {
        self.persist_state();
        let change = self.change();
        self.observer.on_column_change(&change);
    }

    fn persist_state(&mut self) {
        let persisted = PersistedState {
            state: self.state.clone(),
            last_updated: Utc::now(),
            manifest_fingerprint: Some(self.fingerprint.clone()),
        };
        let result = serde_json::to_string(&persisted)
            .map_err(Into::into)
            .and_then(|json| self.storage.save(&self.config.state_key, &json));
        if let Err(e) = result {
            warn!(key = %self.config.state_key, error = %e, "failed to persist column state; continuing in memory");
        }
    }

    fn persist_views(&mut self) {
        let result = serde_json::to_string(&self.custom_views)
            .map_err(Into::into)
            .and_then(|json| self.storage.save(&self.config.views_key, &json));
        if let Err(e) = result {
            warn!(key = %self.config.views_key, error = %e, "failed to persist custom views; continuing in memory");
        }
    }
}

fn load_state(
    manifest: &ColumnManifest,
    fingerprint: &ManifestFingerprint,
    storage: &dyn StorageProvider,
    key: &str,
) -> ColumnSelectorState {
    let json = match storage.load(key) {
        Ok(Some(json)) => json,
        Ok(None) => return ColumnSelectorState::initial(manifest),
        Err(e) => {
            warn!(key, error = %e, "failed to read column state; using defaults");
            return ColumnSelectorState::initial(manifest);
        }
    };

    match serde_json::from_str::<PersistedState>(&json) {
        Ok(persisted) => {
            let mut state = persisted.state;
            if persisted.manifest_fingerprint.as_ref() != Some(fingerprint) {
                debug!(key, "column state was saved against a different manifest");
            }
            let dropped = state.retain_known(manifest);
            if dropped > 0 {
                debug!(key, dropped, "dropped stale column ids from saved state");
            }
            state
        }
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable column state; using defaults");
            ColumnSelectorState::initial(manifest)
        }
    }
}

fn load_custom_views(storage: &dyn StorageProvider, key: &str) -> Vec<CustomView> {
    match storage.load(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(key, error = %e, "discarding unreadable custom views");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read custom views");
            Vec::new()
        }
    }
}
