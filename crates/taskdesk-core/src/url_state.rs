//! Filter state mirrored into the page's query string so a table view can be
//! bookmarked and shared.

use std::cell::RefCell;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::filter_state::{
    ColumnFilter, ColumnFilterFns, FilterDefaults, FilterState, FilterStore, Pagination,
    SortEntry, ViewMode, sanitize_column_filters,
};

pub const SORTING_KEY: &str = "sorting";
pub const COLUMN_FILTERS_KEY: &str = "column-filters";
pub const COLUMN_FILTER_FNS_KEY: &str = "column-filter-fns";
pub const PAGINATION_KEY: &str = "pagination";
pub const GLOBAL_FILTER_KEY: &str = "global-filter";
pub const IS_TRASH_KEY: &str = "is-trash";
pub const VIEW_KEY: &str = "view";

const OWNED_KEYS: [&str; 7] = [
    SORTING_KEY,
    COLUMN_FILTERS_KEY,
    COLUMN_FILTER_FNS_KEY,
    PAGINATION_KEY,
    GLOBAL_FILTER_KEY,
    IS_TRASH_KEY,
    VIEW_KEY,
];

/// Read and replace the current query string without navigating.
pub trait QueryLocation {
    /// Query string, with or without the leading `?`.
    fn query(&self) -> String;

    fn replace_query(&self, query: &str);
}

/// Location kept in memory, for headless use.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    query: RefCell<String>,
}

impl MemoryLocation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: RefCell::new(query.into()),
        }
    }
}

impl QueryLocation for MemoryLocation {
    fn query(&self) -> String {
        self.query.borrow().clone()
    }

    fn replace_query(&self, query: &str) {
        *self.query.borrow_mut() = query.to_string();
    }
}

pub struct UrlFilterStore<L> {
    location: L,
    defaults: FilterDefaults,
}

impl<L: QueryLocation> UrlFilterStore<L> {
    pub fn new(location: L, defaults: FilterDefaults) -> Self {
        Self { location, defaults }
    }

    pub fn location(&self) -> &L {
        &self.location
    }
}

impl<L: QueryLocation> FilterStore for UrlFilterStore<L> {
    fn get(&self) -> FilterState {
        decode_state(&self.location.query(), &self.defaults)
    }

    #[tracing::instrument(skip_all)]
    fn replace(&mut self, next: FilterState) {
        let query = encode_state(&self.location.query(), &next, &self.defaults.state());
        debug!(%query, "rewriting query string");
        self.location.replace_query(&query);
    }

    fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }
}

/// Reads every owned key from `query`; missing or undecodable keys take the
/// default value.
pub fn decode_state(query: &str, defaults: &FilterDefaults) -> FilterState {
    let mut state = defaults.state();
    let query = query.strip_prefix('?').unwrap_or(query);

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            SORTING_KEY => {
                if let Some(sorting) = decode_json::<Vec<SortEntry>>(&key, &value) {
                    state.sorting = sorting;
                }
            }
            COLUMN_FILTERS_KEY => {
                state.column_filters = decode_json::<Vec<ColumnFilter>>(&key, &value)
                    .map(sanitize_column_filters)
                    .unwrap_or_default();
            }
            COLUMN_FILTER_FNS_KEY => {
                if let Some(fns) = decode_json::<ColumnFilterFns>(&key, &value) {
                    state.column_filter_fns = fns;
                }
            }
            PAGINATION_KEY => {
                if let Some(pagination) = decode_json::<Pagination>(&key, &value) {
                    state.pagination = pagination;
                }
            }
            GLOBAL_FILTER_KEY => state.global_filter = value.into_owned(),
            IS_TRASH_KEY => state.is_trash = value == "true",
            VIEW_KEY => match ViewMode::parse(&value) {
                Some(view) => state.view = view,
                None => warn!(value = %value, "unknown view mode in query string"),
            },
            _ => {}
        }
    }

    state
}

fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring malformed query parameter");
            None
        }
    }
}

/// Builds the next query string: unrelated keys are kept in their original
/// order, owned keys follow and are omitted when equal to the default.
pub fn encode_state(current: &str, state: &FilterState, defaults: &FilterState) -> String {
    let current = current.strip_prefix('?').unwrap_or(current);
    let mut out = form_urlencoded::Serializer::new(String::new());

    for (key, value) in form_urlencoded::parse(current.as_bytes()) {
        if !OWNED_KEYS.contains(&key.as_ref()) {
            out.append_pair(&key, &value);
        }
    }

    if state.sorting != defaults.sorting {
        append_json(&mut out, SORTING_KEY, &state.sorting);
    }
    if state.column_filters != defaults.column_filters {
        append_json(&mut out, COLUMN_FILTERS_KEY, &state.column_filters);
    }
    if state.column_filter_fns != defaults.column_filter_fns {
        append_json(&mut out, COLUMN_FILTER_FNS_KEY, &state.column_filter_fns);
    }
    if state.pagination != defaults.pagination {
        append_json(&mut out, PAGINATION_KEY, &state.pagination);
    }
    if state.global_filter != defaults.global_filter {
        out.append_pair(GLOBAL_FILTER_KEY, &state.global_filter);
    }
    if state.is_trash != defaults.is_trash {
        out.append_pair(IS_TRASH_KEY, if state.is_trash { "true" } else { "false" });
    }
    if state.view != defaults.view {
        out.append_pair(VIEW_KEY, state.view.as_str());
    }

    out.finish()
}

fn append_json<T: serde::Serialize>(
    out: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: &T,
) {
    match serde_json::to_string(value) {
        Ok(json) => {
            out.append_pair(key, &json);
        }
        Err(err) => warn!(key, error = %err, "failed to encode query parameter"),
    }
}

/// True when `?is-edit=true` is present.
pub fn is_edit_requested(query: &str) -> bool {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes()).any(|(key, value)| key == "is-edit" && value == "true")
}
