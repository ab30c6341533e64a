use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  ToDo,
  InProgress,
  Done
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 3] = [
    TaskStatus::ToDo,
    TaskStatus::InProgress,
    TaskStatus::Done
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskStatus::ToDo => "TO_DO",
      | TaskStatus::InProgress => {
        "IN_PROGRESS"
      }
      | TaskStatus::Done => "DONE"
    }
  }

  pub fn parse(
    raw: &str
  ) -> Option<TaskStatus> {
    Self::ALL
      .into_iter()
      .find(|status| {
        status.as_str() == raw
      })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:          Uuid,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub status:      Option<TaskStatus>,
  #[serde(default)]
  pub created_at:  Option<String>,
  #[serde(default)]
  pub updated_at:  Option<String>
}

/// Body of `POST /tasks`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreate {
  pub title:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:      Option<TaskStatus>
}

/// Body of `PATCH /tasks/{id}`; absent fields are left untouched.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:      Option<TaskStatus>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
  #[serde(default = "Vec::new")]
  pub data:        Vec<T>,
  #[serde(default)]
  pub total:       u64,
  #[serde(default)]
  pub page:        u64,
  #[serde(default)]
  pub limit:       u64,
  #[serde(default)]
  pub total_pages: u64
}

impl<T> Default for ListPage<T> {
  fn default() -> Self {
    Self {
      data:        Vec::new(),
      total:       0,
      page:        1,
      limit:       0,
      total_pages: 0
    }
  }
}

pub type TaskPage = ListPage<TaskDto>;

/// Constraint messages come either as a
/// plain list or keyed by rule name.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(untagged)]
pub enum Constraints {
  List(Vec<String>),
  Keyed(BTreeMap<String, String>)
}

impl Default for Constraints {
  fn default() -> Self {
    Constraints::List(Vec::new())
  }
}

impl Constraints {
  pub fn messages(&self) -> Vec<&str> {
    match self {
      | Constraints::List(items) => {
        items
          .iter()
          .map(String::as_str)
          .collect()
      }
      | Constraints::Keyed(map) => {
        map
          .values()
          .map(String::as_str)
          .collect()
      }
    }
  }

  pub fn is_empty(&self) -> bool {
    match self {
      | Constraints::List(items) => {
        items.is_empty()
      }
      | Constraints::Keyed(map) => {
        map.is_empty()
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct ValidationError {
  pub property:    String,
  #[serde(default)]
  pub constraints: Constraints,
  #[serde(default)]
  pub children: Vec<ValidationError>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(untagged)]
pub enum ErrorMessage {
  Text(String),
  Validation(Vec<ValidationError>)
}

/// Error body returned by the API on any
/// non-2xx response.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
  #[serde(default)]
  pub error:       Option<String>,
  #[serde(default)]
  pub message:     Option<ErrorMessage>,
  #[serde(default)]
  pub status_code: Option<u16>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_uses_screaming_snake_case_on_the_wire()
   {
    let json = serde_json::to_string(
      &TaskStatus::InProgress
    )
    .expect("serialize status");
    assert_eq!(json, "\"IN_PROGRESS\"");
    assert_eq!(
      TaskStatus::parse("TO_DO"),
      Some(TaskStatus::ToDo)
    );
    assert_eq!(
      TaskStatus::parse("todo"),
      None
    );
  }

  #[test]
  fn task_page_tolerates_missing_fields()
  {
    let page: TaskPage =
      serde_json::from_str(
        r#"{"data":[],"total":0}"#
      )
      .expect("decode page");
    assert!(page.data.is_empty());
    assert_eq!(page.total_pages, 0);
  }

  #[test]
  fn error_body_decodes_nested_validation_tree()
   {
    let raw = r#"{
      "error": "Bad Request",
      "statusCode": 400,
      "message": [
        {"property": "title", "constraints": ["title should not be empty"], "children": []},
        {"property": "meta", "constraints": {}, "children": [
          {"property": "owner", "constraints": {"isString": "owner must be a string"}}
        ]}
      ]
    }"#;
    let body: ApiErrorBody =
      serde_json::from_str(raw)
        .expect("decode error body");
    let Some(ErrorMessage::Validation(
      errors
    )) = body.message
    else {
      panic!(
        "expected validation errors"
      );
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(
      errors[1].children[0]
        .constraints
        .messages(),
      vec!["owner must be a string"]
    );
  }

  #[test]
  fn create_body_omits_unset_fields() {
    let body = TaskCreate {
      title: "Ship it".to_string(),
      ..TaskCreate::default()
    };
    let json =
      serde_json::to_value(&body)
        .expect("serialize create");
    assert_eq!(
      json,
      serde_json::json!({"title": "Ship it"})
    );
  }
}
