//! Finboard Selector — table column selection with pins, ordering and saved views.
//!
//! This crate builds on `finboard-core` to provide:
//! - `ColumnSelector`, the state manager for one table's visible columns
//! - Persisted state and custom view types (plain JSON blobs)
//! - Pluggable storage providers (in-memory, file-backed)
//! - Observer callbacks for column and view changes
//! - TOML-loadable selector configuration

pub mod config;
pub mod events;
pub mod selector;
pub mod state;
pub mod storage;
pub mod views;

pub use config::{ConfigError, SelectorConfig, DEFAULT_MAX_PINNED_COLUMNS};
pub use events::{Callbacks, ColumnChange, NoopObserver, SelectorObserver};
pub use selector::{ColumnSelector, GroupColumns, PinChange, PinError};
pub use state::{ActiveView, ColumnSelectorState, CustomView, PersistedState};
pub use storage::{FileStorage, MemoryStorage, StorageError, StorageProvider};
pub use views::{custom_view_id, ViewEntry, ViewKind, CUSTOM_VIEW_PREFIX};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn persisted_types_are_send_sync() {
        assert_send::<ColumnSelectorState>();
        assert_sync::<ColumnSelectorState>();
        assert_send::<CustomView>();
        assert_sync::<CustomView>();
        assert_send::<PersistedState>();
        assert_sync::<PersistedState>();
    }

    #[test]
    fn event_payloads_are_send_sync() {
        assert_send::<ColumnChange>();
        assert_sync::<ColumnChange>();
        assert_send::<ViewEntry>();
        assert_sync::<ViewEntry>();
    }

    #[test]
    fn storage_and_config_are_send_sync() {
        assert_send::<MemoryStorage>();
        assert_sync::<MemoryStorage>();
        assert_send::<FileStorage>();
        assert_sync::<FileStorage>();
        assert_send::<SelectorConfig>();
        assert_sync::<SelectorConfig>();
    }
}
