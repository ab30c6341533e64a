use taskdesk_core::error::ApiError;
use taskdesk_core::filter_state::{
    ColumnFilterFns, FilterChange, FilterDefaults, FilterFn, FilterStore, FilterValue, ViewMode,
};
use taskdesk_core::i18n::Locale;
use taskdesk_core::notify::Variant;
use taskdesk_core::query::{TaskListParams, to_params};
use taskdesk_core::remote::{BulkAction, BulkOutcome};
use taskdesk_core::table::{BulkReport, TableController};
use taskdesk_core::url_state::{MemoryLocation, QueryLocation, UrlFilterStore};
use taskdesk_shared::TaskStatus;

fn task_defaults() -> FilterDefaults {
    let mut fns = ColumnFilterFns::new();
    fns.insert("title".to_string(), FilterFn::Contains);
    fns.insert("status".to_string(), FilterFn::Equals);
    FilterDefaults::with_filter_fns(fns)
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

#[test]
fn url_state_drives_the_list_request() {
    let mut store = UrlFilterStore::new(MemoryLocation::new("?tab=open"), task_defaults());
    let mut table = TableController::new();

    table.apply(
        &mut store,
        FilterChange::ColumnFilter {
            id: "title".to_string(),
            value: Some(FilterValue::text("docs")),
        },
    );
    table.apply(
        &mut store,
        FilterChange::ColumnFilter {
            id: "status".to_string(),
            value: Some(FilterValue::text("DONE")),
        },
    );
    table.apply(&mut store, FilterChange::PageIndex(2));
    table.apply(&mut store, FilterChange::GlobalFilter("report".to_string()));

    let query = store.location().query();
    assert!(query.starts_with("tab=open&"));
    assert!(query.contains("global-filter=report"));

    let params = TaskListParams::from_state(&store.get());
    assert_eq!(params.status, Some(TaskStatus::Done));

    let params = to_params(&params);
    assert_eq!(param(&params, "page"), Some("3"));
    assert_eq!(param(&params, "search"), Some("report"));
    assert_eq!(param(&params, "status"), Some("DONE"));
    assert_eq!(param(&params, "like"), Some(r#"[{"title":"docs"}]"#));
    assert_eq!(param(&params, "where"), Some(r#"[{"status":"DONE"}]"#));
    assert_eq!(param(&params, "sort"), Some(r#"[{"createdAt":"desc"}]"#));
}

#[test]
fn a_shared_link_restores_the_same_view() {
    let mut original = UrlFilterStore::new(MemoryLocation::new(""), task_defaults());
    original.apply(FilterChange::PageSize(20));
    original.apply(FilterChange::ToggleView);
    original.apply(FilterChange::ToggleSort("title".to_string()));

    let link = original.location().query();
    let opened = UrlFilterStore::new(MemoryLocation::new(format!("?{link}")), task_defaults());
    assert_eq!(opened.get(), original.get());
    assert_eq!(opened.get().view, ViewMode::Grid);
    assert_eq!(opened.get().pagination.page_size, 20);
}

#[test]
fn trash_toggle_switches_the_bulk_action_and_drops_the_selection() {
    let mut store = UrlFilterStore::new(MemoryLocation::new(""), task_defaults());
    let mut table = TableController::new();

    table.toggle_row("a");
    table.toggle_row("b");
    table.open_confirm();
    assert!(table.confirm_open());

    table.apply(&mut store, FilterChange::ToggleTrash);
    assert!(table.selection().is_empty());
    assert!(!table.confirm_open());
    assert!(store.get().is_trash);
    assert_eq!(store.location().query(), "is-trash=true");

    let params = to_params(&TaskListParams::from_state(&store.get()));
    assert_eq!(param(&params, "trash"), Some("true"));

    table.toggle_row("a");
    table.open_confirm();
    let (action, ids) = table.confirm(&store.get()).expect("confirmed restore");
    assert_eq!(action, BulkAction::Restore);
    assert_eq!(ids, vec!["a".to_string()]);
}

#[test]
fn reset_returns_to_defaults_and_remounts() {
    let mut store = UrlFilterStore::new(MemoryLocation::new("?keep=1"), task_defaults());
    let mut table = TableController::new();

    table.apply(&mut store, FilterChange::ToggleTrash);
    table.toggle_row("a");
    table.reset(&mut store);

    assert_eq!(store.get(), task_defaults().state());
    assert_eq!(store.location().query(), "keep=1");
    assert!(table.selection().is_empty());
    assert_eq!(table.remount_key(), 1);
}

#[test]
fn mixed_bulk_outcomes_produce_one_toast_per_kind() {
    let mut table = TableController::new();
    table.set_selected(["a".to_string(), "b".to_string(), "c".to_string()], true);

    let failure = ApiError::from_response(500, "", "/tasks/c");
    let outcomes = vec![
        BulkOutcome { id: "a".to_string(), result: Ok(()) },
        BulkOutcome { id: "b".to_string(), result: Ok(()) },
        BulkOutcome { id: "c".to_string(), result: Err(failure) },
    ];
    let report = table.complete_bulk(BulkAction::Delete, &outcomes);
    assert!(table.selection().is_empty());

    let toasts = report.notifications(Locale::En);
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].variant, Variant::Success);
    assert_eq!(toasts[0].message, "Successfully deleted 2 data");
    assert_eq!(toasts[1].variant, Variant::Error);
    assert_eq!(toasts[1].message, "Failed to delete 1 data");

    let all_ok = vec![BulkOutcome { id: "a".to_string(), result: Ok(()) }];
    let toasts = BulkReport::from_outcomes(BulkAction::Restore, &all_ok).notifications(Locale::Id);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Berhasil memulihkan 1 data");
}
