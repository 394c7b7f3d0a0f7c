//! Property tests for selector invariants.
//!
//! Uses proptest to verify:
//! 1. Pin limit: pinned count never exceeds `max_pinned_columns`
//! 2. Pin subset: pinned ids are always selected
//! 3. Idempotence: turning a column on twice equals turning it on once
//! 4. View round-trip: save then load restores the saved snapshot
//! 5. Reload: a fresh selector over the same storage sees the same state

use finboard_core::{ColumnDefinition, ColumnGroup, ColumnManifest, DataType, PresetView};
use finboard_selector::{ColumnSelector, MemoryStorage, SelectorConfig};
use proptest::prelude::*;

const IDS: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

/// Eight columns, `h` not pinnable, `a` pinned by default.
fn manifest() -> ColumnManifest {
    let columns = IDS
        .iter()
        .map(|id| {
            let c = ColumnDefinition::new(*id, format!("Metric {id}"), "m", DataType::Number);
            match *id {
                "a" => c.pinned(),
                "h" => c,
                _ => c.pinnable(),
            }
        })
        .collect();
    ColumnManifest {
        version: "1".into(),
        last_updated: String::new(),
        groups: vec![ColumnGroup::new("m", "Metrics")],
        columns,
        presets: vec![PresetView::new("default", "Default", ["a", "b", "c"], ["a"])],
    }
}

#[derive(Debug, Clone)]
enum Op {
    Toggle(usize, Option<bool>),
    Pin(usize),
    Reorder(Vec<&'static str>),
    SelectAll,
    DeselectAll,
    Reset,
    Save,
}

fn arb_id() -> impl Strategy<Value = usize> {
    0..IDS.len()
}

/// A drag-and-drop result: distinct ids in any order, possibly partial.
fn arb_order() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(IDS.to_vec(), 0..=IDS.len()).prop_shuffle()
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (arb_id(), prop::option::of(prop::bool::ANY)).prop_map(|(i, b)| Op::Toggle(i, b)),
        arb_id().prop_map(Op::Pin),
        arb_order().prop_map(Op::Reorder),
        Just(Op::SelectAll),
        Just(Op::DeselectAll),
        Just(Op::Reset),
        Just(Op::Save),
    ]
}

fn apply(selector: &mut ColumnSelector<'_>, op: &Op) {
    match op {
        Op::Toggle(i, explicit) => {
            selector.toggle_column(IDS[*i], *explicit);
        }
        Op::Pin(i) => {
            let _ = selector.toggle_pin(IDS[*i]);
        }
        Op::Reorder(order) => {
            selector.reorder_columns(order.iter().map(|id| id.to_string()).collect());
        }
        Op::SelectAll => selector.select_all(),
        Op::DeselectAll => selector.deselect_all(),
        Op::Reset => {
            selector.reset_to_default();
        }
        Op::Save => {
            selector.save_view("prop");
        }
    }
}

proptest! {
    /// The pin count never exceeds the configured maximum.
    #[test]
    fn pin_count_respects_limit(
        max in 1usize..4,
        pins in prop::collection::vec(arb_id(), 0..40),
    ) {
        let m = manifest();
        let config = SelectorConfig::default().with_max_pinned(max);
        let mut selector = ColumnSelector::with_storage(&m, config, MemoryStorage::new());

        for i in pins {
            let _ = selector.toggle_pin(IDS[i]);
            prop_assert!(selector.pinned_columns().len() <= max);
        }
    }

    /// Pins stay inside the selection under any operation sequence.
    #[test]
    fn pins_are_always_selected(ops in prop::collection::vec(arb_op(), 0..40)) {
        let m = manifest();
        let mut selector = ColumnSelector::with_storage(&m, SelectorConfig::default(), MemoryStorage::new());

        for op in &ops {
            apply(&mut selector, op);
            for id in selector.pinned_columns() {
                prop_assert!(selector.is_selected(id), "pinned {} not selected after {:?}", id, op);
            }
            prop_assert!(selector.pinned_columns().len() <= 3);
        }
    }

    /// Turning a column on twice is the same as turning it on once.
    #[test]
    fn toggle_on_is_idempotent(
        ops in prop::collection::vec(arb_op(), 0..20),
        target in arb_id(),
    ) {
        let m = manifest();
        let mut selector = ColumnSelector::with_storage(&m, SelectorConfig::default(), MemoryStorage::new());
        for op in &ops {
            apply(&mut selector, op);
        }

        selector.toggle_column(IDS[target], Some(true));
        let once = selector.state().clone();
        selector.toggle_column(IDS[target], Some(true));
        prop_assert_eq!(selector.state(), &once);
    }

    /// Saving and then loading a view restores the exact lists.
    #[test]
    fn save_then_load_round_trips(
        before in prop::collection::vec(arb_op(), 0..20),
        after in prop::collection::vec(arb_op(), 0..20),
    ) {
        let m = manifest();
        let mut selector = ColumnSelector::with_storage(&m, SelectorConfig::default(), MemoryStorage::new());
        for op in &before {
            apply(&mut selector, op);
        }
        let snapshot = selector.state().clone();
        let view = selector.save_view("snapshot");

        for op in &after {
            apply(&mut selector, op);
        }
        prop_assert!(selector.load_view(&view.id));

        prop_assert_eq!(selector.selected_columns(), snapshot.selected_columns.as_slice());
        prop_assert_eq!(selector.pinned_columns(), snapshot.pinned_columns.as_slice());
        prop_assert_eq!(selector.column_order(), snapshot.column_order.as_slice());
    }

    /// A new session over the same storage resumes the persisted lists.
    #[test]
    fn reload_restores_state(ops in prop::collection::vec(arb_op(), 1..30)) {
        let m = manifest();
        let storage = MemoryStorage::new();
        let expected = {
            let mut selector = ColumnSelector::with_storage(&m, SelectorConfig::default(), storage.clone());
            for op in &ops {
                apply(&mut selector, op);
            }
            selector.state().clone()
        };

        let reloaded = ColumnSelector::with_storage(&m, SelectorConfig::default(), storage);
        prop_assert_eq!(reloaded.selected_columns(), expected.selected_columns.as_slice());
        prop_assert_eq!(reloaded.pinned_columns(), expected.pinned_columns.as_slice());
        prop_assert_eq!(reloaded.column_order(), expected.column_order.as_slice());
        prop_assert_eq!(reloaded.active_view(), &expected.active_view);
    }
}
