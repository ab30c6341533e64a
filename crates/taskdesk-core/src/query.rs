use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Serialize
};
use serde_json::Value;
use taskdesk_shared::TaskStatus;
use tracing::{
  debug,
  warn
};

use crate::filter_state::{
  DATE_FIELDS,
  FilterFn,
  FilterState,
  FilterValue
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  Desc
}

/// `{columnId: value}` with exactly one
/// key.
pub type BucketEntry =
  BTreeMap<String, Value>;

fn entry(
  id: &str,
  value: Value
) -> BucketEntry {
  let mut map = BTreeMap::new();
  map.insert(id.to_string(), value);
  map
}

/// List query understood by the API.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ApiQuery {
  pub table:        bool,
  pub trash:        bool,
  pub page:         u64,
  /// `0` means no limit.
  pub limit:        u64,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub search:       Option<String>,
  #[serde(default)]
  pub sort:
    Vec<BTreeMap<String, SortDirection>>,
  #[serde(default)]
  pub like:         Vec<BucketEntry>,
  #[serde(default)]
  pub r#where:      Vec<BucketEntry>,
  #[serde(default)]
  pub not_equal:    Vec<BucketEntry>,
  #[serde(default)]
  pub r#in:         Vec<BucketEntry>,
  #[serde(default)]
  pub notin:        Vec<BucketEntry>,
  #[serde(default)]
  pub between:      Vec<BucketEntry>,
  #[serde(default)]
  pub greater_than: Vec<BucketEntry>,
  #[serde(default)]
  pub less_than:    Vec<BucketEntry>,
  #[serde(default)]
  pub is_null:      Vec<String>,
  #[serde(default)]
  pub is_not_null:  Vec<String>
}

/// Translates the table state into the
/// list query. Total: filters that cannot
/// be expressed are dropped, never
/// reported as errors.
#[tracing::instrument(skip_all)]
pub fn to_query(
  state: &FilterState
) -> ApiQuery {
  let mut query = ApiQuery {
    table: true,
    trash: state.is_trash,
    page: state
      .pagination
      .page_index
      .saturating_add(1),
    limit: if state
      .pagination
      .is_unbounded()
    {
      0
    } else {
      state.pagination.page_size
    },
    search: (!state
      .global_filter
      .is_empty())
    .then(|| state.global_filter.clone()),
    sort: state
      .sorting
      .iter()
      .map(|sort| {
        let direction = if sort.desc {
          SortDirection::Desc
        } else {
          SortDirection::Asc
        };
        let mut map = BTreeMap::new();
        map.insert(
          sort.id.clone(),
          direction
        );
        map
      })
      .collect(),
    ..ApiQuery::default()
  };

  for filter in &state.column_filters {
    let id = filter.id.as_str();
    let filter_fn =
      if DATE_FIELDS.contains(&id) {
        FilterFn::Between
      } else {
        state
          .filter_fn_for(id)
          .cloned()
          .unwrap_or(FilterFn::Equals)
      };
    push_filter(
      &mut query,
      id,
      &filter_fn,
      &filter.value
    );
  }

  debug!(
    page = query.page,
    limit = query.limit,
    filters = state.column_filters.len(),
    "translated table state"
  );
  query
}

fn push_filter(
  query: &mut ApiQuery,
  id: &str,
  filter_fn: &FilterFn,
  value: &FilterValue
) {
  let json = value.to_json();
  match filter_fn {
    | FilterFn::Contains => {
      query.like.push(entry(id, json))
    }
    | FilterFn::Equals => {
      if value.is_truthy_list() {
        query.r#in.push(entry(id, json))
      } else {
        query
          .r#where
          .push(entry(id, json))
      }
    }
    | FilterFn::NotEquals => {
      if value.is_truthy_list() {
        query.notin.push(entry(id, json))
      } else {
        query
          .not_equal
          .push(entry(id, json))
      }
    }
    | FilterFn::GreaterThan => {
      query
        .greater_than
        .push(entry(id, json))
    }
    | FilterFn::LessThan => {
      query
        .less_than
        .push(entry(id, json))
    }
    | FilterFn::Between => {
      if value.is_complete_range() {
        query
          .between
          .push(entry(id, json))
      } else {
        debug!(column = id, "dropping incomplete range filter");
      }
    }
    | FilterFn::ArrIncludes => {
      if value.is_truthy_list() {
        query.r#in.push(entry(id, json))
      } else {
        debug!(column = id, "dropping empty arrIncludes filter");
      }
    }
    | FilterFn::Empty => {
      query.is_null.push(id.to_string())
    }
    | FilterFn::NotEmpty => {
      query
        .is_not_null
        .push(id.to_string())
    }
    | FilterFn::Other(name) => {
      warn!(column = id, operator = %name, "unknown filter operator; dropping filter");
    }
  }
}

/// Flattens a query object into request
/// parameters: nulls and empty arrays are
/// skipped, arrays and objects are JSON
/// encoded, scalars are written verbatim.
pub fn to_params<T: Serialize>(
  query: &T
) -> Vec<(String, String)> {
  let value = match serde_json::to_value(
    query
  ) {
    | Ok(value) => value,
    | Err(err) => {
      warn!(error = %err, "query parameters are not serializable");
      return Vec::new();
    }
  };
  let Value::Object(map) = value else {
    warn!("query parameters must serialize to an object");
    return Vec::new();
  };

  map
    .into_iter()
    .filter_map(|(key, value)| {
      let text = match value {
        | Value::Null => return None,
        | Value::Array(items)
          if items.is_empty() =>
        {
          return None;
        }
        | Value::String(text) => text,
        | Value::Bool(flag) => {
          flag.to_string()
        }
        | Value::Number(number) => {
          number.to_string()
        }
        | structured => {
          structured.to_string()
        }
      };
      Some((key, text))
    })
    .collect()
}

/// What the Tasks list sends: the list
/// query plus a `status` shortcut taken
/// from a `status` column filter.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Default,
  Serialize,
)]
pub struct TaskListParams {
  #[serde(flatten)]
  pub query:  ApiQuery,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub status: Option<TaskStatus>
}

impl TaskListParams {
  pub fn from_state(
    state: &FilterState
  ) -> Self {
    let status = match state
      .column_filter("status")
    {
      | Some(FilterValue::Text(raw)) => {
        TaskStatus::parse(raw)
      }
      | _ => None
    };
    Self {
      query: to_query(state),
      status
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::filter_state::{
    ColumnFilter,
    FilterDefaults,
    Pagination,
    SortEntry,
    UNBOUNDED_PAGE_SIZE
  };

  fn state_with(
    filters: Vec<(
      &str,
      FilterFn,
      FilterValue
    )>
  ) -> FilterState {
    let mut state =
      FilterDefaults::default().state();
    for (id, filter_fn, value) in filters
    {
      state.column_filter_fns.insert(
        id.to_string(),
        filter_fn
      );
      state.column_filters.push(
        ColumnFilter::new(id, value)
      );
    }
    state
  }

  #[test]
  fn contains_title_with_defaults() {
    let state = state_with(vec![(
      "title",
      FilterFn::Contains,
      FilterValue::text("abc")
    )]);
    let query = to_query(&state);
    assert_eq!(
      serde_json::to_value(&query)
        .expect("encode query"),
      json!({
        "table": true,
        "trash": false,
        "page": 1,
        "limit": 10,
        "sort": [{"createdAt": "desc"}],
        "like": [{"title": "abc"}],
        "where": [], "notEqual": [], "in": [], "notin": [],
        "between": [], "greaterThan": [], "lessThan": [],
        "isNull": [], "isNotNull": []
      })
    );
  }

  #[test]
  fn equals_over_truthy_list_becomes_in()
   {
    let state = state_with(vec![(
      "status",
      FilterFn::Equals,
      FilterValue::List(vec![
        json!("TO_DO"),
        json!("DONE"),
      ])
    )]);
    let query = to_query(&state);
    assert_eq!(
      query.r#in,
      vec![entry(
        "status",
        json!(["TO_DO", "DONE"])
      )]
    );
    assert!(query.r#where.is_empty());
  }

  #[test]
  fn equals_over_list_with_empty_entry_stays_where()
   {
    let state = state_with(vec![(
      "status",
      FilterFn::Equals,
      FilterValue::List(vec![
        json!("TO_DO"),
        json!(""),
      ])
    )]);
    let query = to_query(&state);
    assert!(query.r#in.is_empty());
    assert_eq!(query.r#where.len(), 1);
  }

  #[test]
  fn date_fields_force_between_and_need_two_bounds()
   {
    let complete = state_with(vec![(
      "createdAt",
      FilterFn::Contains,
      FilterValue::range(
        "2025-01-01",
        "2025-02-01"
      )
    )]);
    assert_eq!(
      to_query(&complete).between,
      vec![entry(
        "createdAt",
        json!(["2025-01-01", "2025-02-01"])
      )]
    );

    let partial = state_with(vec![(
      "createdAt",
      FilterFn::Between,
      FilterValue::List(vec![
        json!("2025-01-01"),
        Value::Null,
      ])
    )]);
    let query = to_query(&partial);
    assert!(query.between.is_empty());
    assert!(query.like.is_empty());
    assert!(query.r#where.is_empty());
  }

  #[test]
  fn malformed_ranges_are_dropped() {
    let cases: [(&str, Vec<Value>); 6] = [
      ("createdAt", vec![]),
      ("createdAt", vec![json!(
        "2025-01-01"
      )]),
      ("createdAt", vec![
        json!("2025-01-01"),
        json!("2025-01-15"),
        json!("2025-02-01"),
      ]),
      ("score", vec![json!(0), json!(10)]),
      ("score", vec![
        json!(false),
        json!(10),
      ]),
      ("score", vec![
        json!(1),
        Value::Null,
      ]),
    ];
    for (id, items) in cases {
      let state = state_with(vec![(
        id,
        FilterFn::Between,
        FilterValue::List(items.clone())
      )]);
      let query = to_query(&state);
      assert!(
        query.between.is_empty(),
        "{id} {items:?} should be dropped"
      );
      assert!(query.r#where.is_empty());
      assert!(query.r#in.is_empty());
    }

    let state = state_with(vec![(
      "score",
      FilterFn::Between,
      FilterValue::List(vec![
        json!(1),
        json!(10),
      ])
    )]);
    assert_eq!(
      to_query(&state).between,
      vec![entry("score", json!([1, 10]))]
    );
  }

  #[test]
  fn empty_lists_fall_back_to_scalar_buckets()
   {
    let equals = state_with(vec![(
      "status",
      FilterFn::Equals,
      FilterValue::List(Vec::new())
    )]);
    let query = to_query(&equals);
    assert!(query.r#in.is_empty());
    assert_eq!(
      query.r#where,
      vec![entry("status", json!([]))]
    );

    let not_equals = state_with(vec![(
      "status",
      FilterFn::NotEquals,
      FilterValue::List(Vec::new())
    )]);
    let query = to_query(&not_equals);
    assert!(query.notin.is_empty());
    assert_eq!(
      query.not_equal,
      vec![entry("status", json!([]))]
    );

    let excluded = state_with(vec![(
      "status",
      FilterFn::NotEquals,
      FilterValue::List(vec![json!(
        "DONE"
      )])
    )]);
    assert_eq!(
      to_query(&excluded).notin,
      vec![entry("status", json!(["DONE"]))]
    );
  }

  #[test]
  fn null_checks_and_unknown_operators() {
    let state = state_with(vec![
      (
        "description",
        FilterFn::Empty,
        FilterValue::text("ignored")
      ),
      (
        "title",
        FilterFn::NotEmpty,
        FilterValue::text("")
      ),
      (
        "status",
        FilterFn::Other(
          "fuzzy".to_string()
        ),
        FilterValue::text("x")
      ),
    ]);
    let query = to_query(&state);
    assert_eq!(query.is_null, vec![
      "description".to_string()
    ]);
    assert_eq!(query.is_not_null, vec![
      "title".to_string()
    ]);
    assert!(query.r#where.is_empty());
    assert!(query.like.is_empty());
  }

  #[test]
  fn missing_operator_defaults_to_equals()
   {
    let mut state =
      FilterDefaults::default().state();
    state.column_filters.push(
      ColumnFilter::new(
        "status",
        FilterValue::text("DONE")
      )
    );
    assert_eq!(
      to_query(&state).r#where,
      vec![entry("status", json!("DONE"))]
    );
  }

  #[test]
  fn unbounded_page_size_means_no_limit() {
    let mut state =
      FilterDefaults::default().state();
    state.pagination = Pagination {
      page_index: 3,
      page_size:  UNBOUNDED_PAGE_SIZE
    };
    state.sorting =
      vec![SortEntry::new("title", false)];
    state.global_filter = "x".to_string();
    state.is_trash = true;
    let query = to_query(&state);
    assert_eq!(query.page, 4);
    assert_eq!(query.limit, 0);
    assert_eq!(
      query.search.as_deref(),
      Some("x")
    );
    assert!(query.trash);
    assert_eq!(
      serde_json::to_value(&query.sort)
        .expect("encode sort"),
      json!([{"title": "asc"}])
    );
  }

  #[test]
  fn params_skip_empty_and_encode_arrays()
   {
    let state = state_with(vec![(
      "title",
      FilterFn::Contains,
      FilterValue::text("abc")
    )]);
    let params = to_params(&to_query(&state));
    let lookup = |key: &str| {
      params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
    };
    assert_eq!(lookup("page"), Some("1"));
    assert_eq!(lookup("table"), Some("true"));
    assert_eq!(
      lookup("like"),
      Some(r#"[{"title":"abc"}]"#)
    );
    assert_eq!(lookup("where"), None);
    assert_eq!(lookup("search"), None);
  }

  #[test]
  fn task_params_pick_up_valid_status_only()
   {
    let valid = state_with(vec![(
      "status",
      FilterFn::Equals,
      FilterValue::text("IN_PROGRESS")
    )]);
    assert_eq!(
      TaskListParams::from_state(&valid)
        .status,
      Some(TaskStatus::InProgress)
    );

    let invalid = state_with(vec![(
      "status",
      FilterFn::Equals,
      FilterValue::text("LATER")
    )]);
    let params =
      TaskListParams::from_state(&invalid);
    assert_eq!(params.status, None);
    assert!(
      !to_params(&params)
        .iter()
        .any(|(k, _)| k == "status")
    );
  }
}
