//! Change notifications delivered to the embedder.

use serde::Serialize;

use finboard_core::ColumnDefinition;

use crate::views::ViewEntry;

/// Projection sent after every state mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnChange {
    pub selected_columns: Vec<String>,
    pub pinned_columns: Vec<String>,
    pub column_order: Vec<String>,
    /// Resolved definitions in display order.
    pub columns: Vec<ColumnDefinition>,
}

impl ColumnChange {
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Callback interface for the selector.
///
/// Both methods default to no-ops so implementors only override what they need.
pub trait SelectorObserver {
    /// Fired after every mutating operation.
    fn on_column_change(&mut self, _change: &ColumnChange) {}

    /// Fired when a named view (preset or custom) becomes active.
    fn on_view_change(&mut self, _view: &ViewEntry) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SelectorObserver for NoopObserver {}

type ColumnChangeFn = Box<dyn FnMut(&ColumnChange)>;
type ViewChangeFn = Box<dyn FnMut(&ViewEntry)>;

/// Closure-backed observer.
#[derive(Default)]
pub struct Callbacks {
    on_column_change: Option<ColumnChangeFn>,
    on_view_change: Option<ViewChangeFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_column_change(mut self, f: impl FnMut(&ColumnChange) + 'static) -> Self {
        self.on_column_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_view_change(mut self, f: impl FnMut(&ViewEntry) + 'static) -> Self {
        self.on_view_change = Some(Box::new(f));
        self
    }
}

impl SelectorObserver for Callbacks {
    fn on_column_change(&mut self, change: &ColumnChange) {
        if let Some(f) = self.on_column_change.as_mut() {
            f(change);
        }
    }

    fn on_view_change(&mut self, view: &ViewEntry) {
        if let Some(f) = self.on_view_change.as_mut() {
            f(view);
        }
    }
}

impl<O: SelectorObserver + ?Sized> SelectorObserver for Box<O> {
    fn on_column_change(&mut self, change: &ColumnChange) {
        (**self).on_column_change(change);
    }

    fn on_view_change(&mut self, view: &ViewEntry) {
        (**self).on_view_change(view);
    }
}
