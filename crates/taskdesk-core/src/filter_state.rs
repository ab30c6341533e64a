//! Table view state: what the task table is currently showing.
//!
//! The state is owned by a [`FilterStore`]; the table never mutates it
//! directly but describes each interaction as a [`FilterChange`] and hands
//! it to [`FilterStore::apply`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Page size that stands for "All". It is the largest integer a browser can
/// represent exactly, so links produced by older builds keep working.
pub const UNBOUNDED_PAGE_SIZE: u64 = 9_007_199_254_740_991;

pub const PAGE_SIZE_OPTIONS: [u64; 6] = [5, 10, 20, 30, 100, UNBOUNDED_PAGE_SIZE];

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Columns whose filter is always a date range.
pub const DATE_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "deletedAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page_index: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn is_unbounded(&self) -> bool {
        self.page_size == UNBOUNDED_PAGE_SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub id: String,
    pub desc: bool,
}

impl SortEntry {
    pub fn new(id: impl Into<String>, desc: bool) -> Self {
        Self {
            id: id.into(),
            desc,
        }
    }
}

/// Value of a single column filter as the table produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<Value>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        FilterValue::List(vec![Value::String(from.into()), Value::String(to.into())])
    }

    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Bool(value) => Value::Bool(*value),
            FilterValue::Number(value) => Value::Number(value.clone()),
            FilterValue::Text(value) => Value::String(value.clone()),
            FilterValue::List(items) => Value::Array(items.clone()),
        }
    }

    /// A non-empty list whose entries are all truthy.
    pub fn is_truthy_list(&self) -> bool {
        matches!(self, FilterValue::List(items) if !items.is_empty() && items.iter().all(is_truthy))
    }

    /// Exactly two truthy bounds.
    pub fn is_complete_range(&self) -> bool {
        matches!(self, FilterValue::List(items) if items.len() == 2 && items.iter().all(is_truthy))
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Text(value) => value.is_empty(),
            FilterValue::List(items) => items.iter().all(|item| !is_truthy(item)),
            FilterValue::Bool(_) | FilterValue::Number(_) => false,
        }
    }
}

/// Truthiness as the table widgets understand it: `null`, `false`, `0` and
/// `""` are empty, everything else counts as a value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

impl ColumnFilter {
    pub fn new(id: impl Into<String>, value: FilterValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

/// Filter operator selected for a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterFn {
    Contains,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Between,
    ArrIncludes,
    Empty,
    NotEmpty,
    /// Any operator name this client does not know how to translate.
    Other(String),
}

impl FilterFn {
    /// Operators offered in the column filter menu.
    pub const MENU: [FilterFn; 8] = [
        FilterFn::Contains,
        FilterFn::Equals,
        FilterFn::NotEquals,
        FilterFn::Between,
        FilterFn::GreaterThan,
        FilterFn::LessThan,
        FilterFn::Empty,
        FilterFn::NotEmpty,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FilterFn::Contains => "contains",
            FilterFn::Equals => "equals",
            FilterFn::NotEquals => "notEquals",
            FilterFn::GreaterThan => "greaterThan",
            FilterFn::LessThan => "lessThan",
            FilterFn::Between => "between",
            FilterFn::ArrIncludes => "arrIncludes",
            FilterFn::Empty => "empty",
            FilterFn::NotEmpty => "notEmpty",
            FilterFn::Other(name) => name,
        }
    }

    /// `empty` and `notEmpty` ignore the filter value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterFn::Empty | FilterFn::NotEmpty)
    }
}

impl From<String> for FilterFn {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "contains" => FilterFn::Contains,
            "equals" => FilterFn::Equals,
            "notEquals" => FilterFn::NotEquals,
            "greaterThan" => FilterFn::GreaterThan,
            "lessThan" => FilterFn::LessThan,
            "between" => FilterFn::Between,
            "arrIncludes" => FilterFn::ArrIncludes,
            "empty" => FilterFn::Empty,
            "notEmpty" => FilterFn::NotEmpty,
            _ => FilterFn::Other(raw),
        }
    }
}

impl From<FilterFn> for String {
    fn from(value: FilterFn) -> Self {
        value.as_str().to_string()
    }
}

pub type ColumnFilterFns = BTreeMap<String, FilterFn>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
        }
    }

    pub fn parse(raw: &str) -> Option<ViewMode> {
        match raw {
            "list" => Some(ViewMode::List),
            "grid" => Some(ViewMode::Grid),
            _ => None,
        }
    }

    pub fn toggled(self) -> ViewMode {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub pagination: Pagination,
    pub sorting: Vec<SortEntry>,
    pub column_filters: Vec<ColumnFilter>,
    pub column_filter_fns: ColumnFilterFns,
    pub global_filter: String,
    pub is_trash: bool,
    pub view: ViewMode,
}

impl FilterState {
    pub fn filter_fn_for(&self, column_id: &str) -> Option<&FilterFn> {
        self.column_filter_fns.get(column_id)
    }

    pub fn column_filter(&self, column_id: &str) -> Option<&FilterValue> {
        self.column_filters
            .iter()
            .find(|filter| filter.id == column_id)
            .map(|filter| &filter.value)
    }

    pub fn sort_for(&self, column_id: &str) -> Option<bool> {
        self.sorting
            .iter()
            .find(|entry| entry.id == column_id)
            .map(|entry| entry.desc)
    }
}

pub fn default_sorting() -> Vec<SortEntry> {
    vec![SortEntry::new("createdAt", true)]
}

/// Caller-supplied defaults; anything left `None` falls back to the
/// built-in default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterDefaults {
    pub sorting: Option<Vec<SortEntry>>,
    pub column_filters: Option<Vec<ColumnFilter>>,
    pub column_filter_fns: ColumnFilterFns,
    pub page_size: Option<u64>,
}

impl FilterDefaults {
    pub fn with_filter_fns(column_filter_fns: ColumnFilterFns) -> Self {
        Self {
            column_filter_fns,
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn state(&self) -> FilterState {
        FilterState {
            pagination: Pagination {
                page_index: 0,
                page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            },
            sorting: self.sorting.clone().unwrap_or_else(default_sorting),
            column_filters: self.column_filters.clone().unwrap_or_default(),
            column_filter_fns: self.column_filter_fns.clone(),
            global_filter: String::new(),
            is_trash: false,
            view: ViewMode::List,
        }
    }
}

/// Normalizes a column-filter list handed over by the table.
///
/// Lists made only of empty entries collapse to an empty list. A list entry
/// that is itself structured (object or nested list) makes the whole set
/// unusable, in which case no filters are kept.
pub fn sanitize_column_filters(filters: Vec<ColumnFilter>) -> Vec<ColumnFilter> {
    let structured = filters.iter().any(|filter| {
        matches!(&filter.value, FilterValue::List(items)
            if items.iter().any(|item| item.is_object() || item.is_array()))
    });
    if structured {
        warn!(count = filters.len(), "column filters contain structured values; discarding");
        return Vec::new();
    }

    filters
        .into_iter()
        .map(|filter| match filter.value {
            FilterValue::List(items) if items.iter().all(|item| item.is_null() || item.as_str() == Some("")) => {
                ColumnFilter::new(filter.id, FilterValue::List(Vec::new()))
            }
            _ => filter,
        })
        .collect()
}

/// One table interaction, applied to the state through the store setter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Pagination(Pagination),
    PageIndex(u64),
    /// Changing the page size always returns to the first page.
    PageSize(u64),
    Sorting(Vec<SortEntry>),
    /// Cycles a column through ascending, descending and unsorted.
    ToggleSort(String),
    ColumnFilters(Vec<ColumnFilter>),
    /// Sets or clears (`None`) the filter of one column.
    ColumnFilter {
        id: String,
        value: Option<FilterValue>,
    },
    ColumnFilterFn {
        id: String,
        filter_fn: FilterFn,
    },
    ColumnFilterFns(ColumnFilterFns),
    GlobalFilter(String),
    ToggleTrash,
    ToggleView,
}

impl FilterChange {
    pub fn apply(self, mut state: FilterState) -> FilterState {
        match self {
            FilterChange::Pagination(pagination) => state.pagination = pagination,
            FilterChange::PageIndex(page_index) => state.pagination.page_index = page_index,
            FilterChange::PageSize(page_size) => {
                state.pagination = Pagination {
                    page_index: 0,
                    page_size,
                }
            }
            FilterChange::Sorting(sorting) => state.sorting = sorting,
            FilterChange::ToggleSort(id) => {
                state.sorting = match state.sort_for(&id) {
                    None => vec![SortEntry::new(id, false)],
                    Some(false) => vec![SortEntry::new(id, true)],
                    Some(true) => Vec::new(),
                };
            }
            FilterChange::ColumnFilters(filters) => {
                state.column_filters = sanitize_column_filters(filters);
            }
            FilterChange::ColumnFilter { id, value } => {
                let takes_value = state.filter_fn_for(&id).is_none_or(FilterFn::takes_value);
                let mut filters: Vec<ColumnFilter> = state
                    .column_filters
                    .into_iter()
                    .filter(|filter| filter.id != id)
                    .collect();
                // A blank value still marks the column for `empty`/`notEmpty`.
                if let Some(value) = value
                    && (!takes_value || !value.is_blank())
                {
                    filters.push(ColumnFilter::new(id, value));
                }
                state.column_filters = sanitize_column_filters(filters);
            }
            FilterChange::ColumnFilterFn { id, filter_fn } => {
                let current = state.column_filter(&id).cloned();
                match current {
                    None if !filter_fn.takes_value() => {
                        state.column_filters.push(ColumnFilter::new(id.clone(), FilterValue::text("")));
                    }
                    Some(value) if filter_fn.takes_value() && value.is_blank() => {
                        state.column_filters.retain(|filter| filter.id != id);
                    }
                    _ => {}
                }
                state.column_filter_fns.insert(id, filter_fn);
            }
            FilterChange::ColumnFilterFns(fns) => state.column_filter_fns = fns,
            FilterChange::GlobalFilter(text) => state.global_filter = text,
            FilterChange::ToggleTrash => state.is_trash = !state.is_trash,
            FilterChange::ToggleView => state.view = state.view.toggled(),
        }
        state
    }
}

/// Owner of a [`FilterState`]. Implementations differ only in where the
/// state is kept; the table works against this trait alone.
pub trait FilterStore {
    fn get(&self) -> FilterState;

    fn replace(&mut self, next: FilterState);

    fn defaults(&self) -> &FilterDefaults;

    fn set(&mut self, updater: &dyn Fn(FilterState) -> FilterState) {
        let next = updater(self.get());
        self.replace(next);
    }

    fn apply(&mut self, change: FilterChange) {
        debug!(?change, "applying filter change");
        self.set(&|state| change.clone().apply(state));
    }

    fn reset(&mut self) {
        let defaults = self.defaults().state();
        self.replace(defaults);
    }
}

/// Component-local store that keeps the state in memory only.
#[derive(Debug, Clone)]
pub struct MemoryFilterStore {
    state: FilterState,
    defaults: FilterDefaults,
}

impl MemoryFilterStore {
    pub fn new(defaults: FilterDefaults) -> Self {
        Self {
            state: defaults.state(),
            defaults,
        }
    }
}

impl FilterStore for MemoryFilterStore {
    fn get(&self) -> FilterState {
        self.state.clone()
    }

    fn replace(&mut self, next: FilterState) {
        self.state = next;
    }

    fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }
}
