//! Headless half of the generic data table.
//!
//! The UI renders whatever [`TableController`] and [`Loader`] hold and routes
//! every interaction back through them, so the selection, dialog and load
//! rules hold regardless of how the table is drawn.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::ApiError;
use crate::filter_state::{ColumnFilterFns, FilterChange, FilterFn, FilterState, FilterStore, Pagination};
use crate::i18n::Locale;
use crate::notify::Notification;
use crate::remote::{BulkAction, BulkOutcome};

/// Anything the table can list.
pub trait TableRow {
    fn row_id(&self) -> String;
}

impl TableRow for taskdesk_shared::TaskDto {
    fn row_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVariant {
    Text,
    Select(Vec<String>),
    DateRange,
}

/// Column definition shared by the list and grid renderers.
pub struct ColumnDef<R> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&R) -> String,
    /// `None` means the default (`contains`).
    pub filter_fn: Option<FilterFn>,
    pub filter_variant: FilterVariant,
    pub sortable: bool,
}

impl<R> Clone for ColumnDef<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            header: self.header,
            accessor: self.accessor,
            filter_fn: self.filter_fn.clone(),
            filter_variant: self.filter_variant.clone(),
            sortable: self.sortable,
        }
    }
}

impl<R> PartialEq for ColumnDef<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.header == other.header
            && std::ptr::fn_addr_eq(self.accessor, other.accessor)
            && self.filter_fn == other.filter_fn
            && self.filter_variant == other.filter_variant
            && self.sortable == other.sortable
    }
}

impl<R> std::fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("filter_fn", &self.filter_fn)
            .field("filter_variant", &self.filter_variant)
            .finish_non_exhaustive()
    }
}

/// Operator per column as declared, `contains` where undeclared.
pub fn default_column_filter_fns<R>(columns: &[ColumnDef<R>]) -> ColumnFilterFns {
    columns
        .iter()
        .map(|column| {
            (
                column.id.to_string(),
                column.filter_fn.clone().unwrap_or(FilterFn::Contains),
            )
        })
        .collect()
}

/// 1-based first and last row shown, plus the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
    pub total: u64,
}

pub fn row_range(pagination: Pagination, total: u64) -> RowRange {
    let start = pagination.page_index.saturating_mul(pagination.page_size);
    RowRange {
        from: start.saturating_add(1).min(total),
        to: pagination
            .page_index
            .saturating_add(1)
            .saturating_mul(pagination.page_size)
            .min(total),
        total,
    }
}

/// Per-row edit links are hidden in the trash view.
pub fn row_actions_enabled(state: &FilterState) -> bool {
    !state.is_trash
}

/// Aggregate of a settled bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReport {
    pub action: BulkAction,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkReport {
    pub fn from_outcomes(action: BulkAction, outcomes: &[BulkOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|outcome| outcome.is_fulfilled()).count();
        Self {
            action,
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    /// One success and one failure notification, each only when its count is
    /// non-zero.
    pub fn notifications(&self, locale: Locale) -> Vec<Notification> {
        let restore = self.action.is_restore();
        let mut out = Vec::new();
        if self.succeeded > 0 {
            out.push(Notification::success(locale.bulk_succeeded(restore, self.succeeded)));
        }
        if self.failed > 0 {
            out.push(Notification::error(locale.bulk_failed(restore, self.failed)));
        }
        out
    }
}

/// Selection, confirm dialog, export menu and remount key of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableController {
    selection: BTreeSet<String>,
    confirm_open: bool,
    export_menu_open: bool,
    remount_key: u64,
}

impl TableController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle_row(&mut self, id: &str) {
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
    }

    pub fn set_selected<I>(&mut self, ids: I, selected: bool)
    where
        I: IntoIterator<Item = String>,
    {
        for id in ids {
            if selected {
                self.selection.insert(id);
            } else {
                self.selection.remove(&id);
            }
        }
    }

    /// True when every id of the current page is selected.
    pub fn page_selected(&self, page_ids: &[String]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selection.contains(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn bulk_button_visible(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn open_confirm(&mut self) {
        self.confirm_open = self.bulk_button_visible();
    }

    pub fn close_confirm(&mut self) {
        self.confirm_open = false;
    }

    pub fn confirm_open(&self) -> bool {
        self.confirm_open
    }

    /// Closes the dialog and hands back what to run: delete in the normal
    /// view, restore in the trash view.
    pub fn confirm(&mut self, state: &FilterState) -> Option<(BulkAction, Vec<String>)> {
        let was_open = std::mem::take(&mut self.confirm_open);
        if !was_open || self.selection.is_empty() {
            return None;
        }
        Some((BulkAction::for_trash_view(state.is_trash), self.selected_ids()))
    }

    /// Summarizes the outcomes and clears the selection.
    pub fn complete_bulk(&mut self, action: BulkAction, outcomes: &[BulkOutcome]) -> BulkReport {
        let report = BulkReport::from_outcomes(action, outcomes);
        info!(?action, succeeded = report.succeeded, failed = report.failed, "bulk action finished");
        self.selection.clear();
        report
    }

    /// Must see every change before it reaches the store.
    pub fn observe(&mut self, change: &FilterChange) {
        if matches!(change, FilterChange::ToggleTrash) {
            debug!("trash view toggled; clearing selection");
            self.selection.clear();
            self.confirm_open = false;
        }
    }

    pub fn apply(&mut self, store: &mut dyn FilterStore, change: FilterChange) {
        self.observe(&change);
        store.apply(change);
    }

    /// Restores the store defaults and forces a fresh table instance.
    pub fn reset(&mut self, store: &mut dyn FilterStore) {
        let was_trash = store.get().is_trash;
        store.reset();
        self.after_reset(was_trash, store.get().is_trash);
    }

    pub fn after_reset(&mut self, was_trash: bool, is_trash: bool) {
        if was_trash != is_trash {
            self.selection.clear();
        }
        self.remount_key += 1;
    }

    pub fn remount_key(&self) -> u64 {
        self.remount_key
    }

    pub fn toggle_export_menu(&mut self) {
        self.export_menu_open = !self.export_menu_open;
    }

    pub fn close_export_menu(&mut self) {
        self.export_menu_open = false;
    }

    pub fn export_menu_open(&self) -> bool {
        self.export_menu_open
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    /// `previous` keeps the last data on screen while reloading.
    Loading { previous: Option<T> },
    Success(T),
    Error { error: ApiError, previous: Option<T> },
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { previous } | LoadState::Error { previous, .. } => previous.as_ref(),
            LoadState::Success(data) => Some(data),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            LoadState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    fn into_data(self) -> Option<T> {
        match self {
            LoadState::Idle => None,
            LoadState::Loading { previous } | LoadState::Error { previous, .. } => previous,
            LoadState::Success(data) => Some(data),
        }
    }
}

/// Identifies one load; only the newest ticket may settle the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Loader<T> {
    state: LoadState<T>,
    latest: u64,
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            latest: 0,
        }
    }
}

impl<T> Loader<T> {
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        let previous = std::mem::take(&mut self.state).into_data();
        self.state = LoadState::Loading { previous };
        Ticket(self.latest)
    }

    /// Returns false when a newer load has started since `ticket`.
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if ticket.0 != self.latest {
            debug!(ticket = ticket.0, latest = self.latest, "discarding superseded response");
            return false;
        }
        let previous = std::mem::take(&mut self.state).into_data();
        self.state = match result {
            Ok(data) => LoadState::Success(data),
            Err(error) => LoadState::Error { error, previous },
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter_state::{FilterDefaults, MemoryFilterStore};

    #[test]
    fn row_range_clamps_to_total() {
        let pagination = Pagination { page_index: 2, page_size: 10 };
        assert_eq!(row_range(pagination, 25), RowRange { from: 21, to: 25, total: 25 });
        assert_eq!(row_range(Pagination::default(), 0), RowRange { from: 0, to: 0, total: 0 });
        let unbounded = Pagination {
            page_index: 0,
            page_size: crate::filter_state::UNBOUNDED_PAGE_SIZE,
        };
        assert_eq!(row_range(unbounded, 7), RowRange { from: 1, to: 7, total: 7 });
    }

    #[test]
    fn toggling_trash_clears_selection_and_disables_row_actions() {
        let mut store = MemoryFilterStore::new(FilterDefaults::default());
        let mut table = TableController::new();
        table.set_selected(["a".to_string(), "b".to_string()], true);

        table.apply(&mut store, FilterChange::ToggleTrash);

        assert!(table.selection().is_empty());
        assert!(!table.bulk_button_visible());
        assert!(!row_actions_enabled(&store.get()));
    }

    #[test]
    fn selection_survives_paging_sorting_and_filtering() {
        let mut store = MemoryFilterStore::new(FilterDefaults::default());
        let mut table = TableController::new();
        table.set_selected(["a".to_string(), "b".to_string()], true);

        let changes = [
            FilterChange::PageIndex(2),
            FilterChange::PageSize(30),
            FilterChange::ToggleSort("title".to_string()),
            FilterChange::GlobalFilter("report".to_string()),
            FilterChange::ToggleView,
        ];
        for change in changes {
            table.apply(&mut store, change);
            assert_eq!(table.selected_ids(), vec!["a".to_string(), "b".to_string()]);
        }
        assert_eq!(store.get().pagination, Pagination { page_index: 0, page_size: 30 });
        assert!(table.bulk_button_visible());
    }

    #[test]
    fn reset_bumps_remount_key_and_clears_selection_only_when_trash_flips() {
        let mut store = MemoryFilterStore::new(FilterDefaults::default());
        let mut table = TableController::new();
        table.toggle_row("a");
        store.apply(FilterChange::PageIndex(3));

        table.reset(&mut store);
        assert_eq!(table.remount_key(), 1);
        assert!(table.is_selected("a"));

        store.apply(FilterChange::ToggleTrash);
        table.reset(&mut store);
        assert_eq!(table.remount_key(), 2);
        assert!(table.selection().is_empty());
    }

    #[test]
    fn confirm_requires_open_dialog_and_selection() {
        let state = FilterDefaults::default().state();
        let mut table = TableController::new();
        table.open_confirm();
        assert!(!table.confirm_open());
        assert_eq!(table.confirm(&state), None);

        table.toggle_row("b");
        table.toggle_row("a");
        table.open_confirm();
        assert_eq!(
            table.confirm(&state),
            Some((BulkAction::Delete, vec!["a".to_string(), "b".to_string()]))
        );
        assert!(!table.confirm_open());
    }

    #[test]
    fn superseded_loads_are_discarded_and_stale_data_is_kept() {
        let mut loader = Loader::<u32>::default();
        let first = loader.begin();
        assert!(loader.settle(first, Ok(1)));

        let stale = loader.begin();
        assert_eq!(loader.state().data(), Some(&1));
        let fresh = loader.begin();
        assert!(!loader.settle(stale, Ok(2)));
        assert!(loader.state().is_loading());

        assert!(loader.settle(fresh, Err(ApiError::decode("boom"))));
        assert_eq!(loader.state().data(), Some(&1));
        assert!(loader.state().error().is_some());
    }

    #[test]
    fn declared_operators_win_over_contains() {
        fn title(row: &String) -> String {
            row.clone()
        }
        let columns = vec![
            ColumnDef::<String> {
                id: "title",
                header: "Title",
                accessor: title,
                filter_fn: None,
                filter_variant: FilterVariant::Text,
                sortable: true,
            },
            ColumnDef::<String> {
                id: "status",
                header: "Status",
                accessor: title,
                filter_fn: Some(FilterFn::Equals),
                filter_variant: FilterVariant::Select(vec!["DONE".to_string()]),
                sortable: true,
            },
        ];
        let fns = default_column_filter_fns(&columns);
        assert_eq!(fns.get("title"), Some(&FilterFn::Contains));
        assert_eq!(fns.get("status"), Some(&FilterFn::Equals));
    }
}
