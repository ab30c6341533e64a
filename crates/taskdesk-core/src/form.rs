//! Task form model: mode, client-side validation, server error mapping and
//! the submit flow.

use std::collections::BTreeMap;

use taskdesk_shared::{TaskCreate, TaskDto, TaskPatch, TaskStatus, ValidationError};
use tracing::{debug, info};
use validator::Validate;

use crate::error::ApiError;
use crate::remote::TaskApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    View,
    Edit,
}

impl FormMode {
    /// Records open in view mode unless `?is-edit=true` is set.
    pub fn resolve(has_record: bool, is_edit: bool) -> Self {
        match (has_record, is_edit) {
            (false, _) => FormMode::Create,
            (true, false) => FormMode::View,
            (true, true) => FormMode::Edit,
        }
    }

    pub fn read_only(self) -> bool {
        self == FormMode::View
    }

    pub fn shows_status(self) -> bool {
        self != FormMode::Create
    }
}

#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct TaskFormValues {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
}

impl TaskFormValues {
    pub fn from_task(task: &TaskDto) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
        }
    }

    pub fn to_create(&self) -> TaskCreate {
        TaskCreate {
            title: self.title.clone(),
            description: self.description_field(),
            status: None,
        }
    }

    /// The id never travels in the body. The description is always sent so
    /// that clearing it reaches the server.
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: self.status,
        }
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|errors| {
            let mut out = FieldErrors::default();
            let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
            fields.sort_by(|a, b| field_order(&a.0).cmp(&field_order(&b.0)));
            for (field, failures) in fields {
                let messages: Vec<String> = failures
                    .iter()
                    .map(|failure| {
                        failure
                            .message
                            .as_ref()
                            .map(|message| message.to_string())
                            .unwrap_or_else(|| failure.code.to_string())
                    })
                    .collect();
                out.insert(&field, &messages);
            }
            out
        })
    }

    fn description_field(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| self.description.clone())
    }
}

fn field_order(field: &str) -> usize {
    ["title", "description", "status"]
        .iter()
        .position(|known| *known == field)
        .unwrap_or(usize::MAX)
}

/// Error message per dotted field path, plus the field to focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
    focus: Option<String>,
}

impl FieldErrors {
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(path, message)| (path.as_str(), message.as_str()))
    }

    fn insert<S: AsRef<str>>(&mut self, path: &str, messages: &[S]) {
        if self.focus.is_none() {
            self.focus = Some(path.to_string());
        }
        self.errors.insert(path.to_string(), bullet_lines(messages));
    }
}

/// `- a\n- b`
pub fn bullet_lines<S: AsRef<str>>(messages: &[S]) -> String {
    messages
        .iter()
        .map(|message| format!("- {}", message.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walks the server's validation tree depth-first. Nodes with constraints
/// set an error at their dotted path; the first such node gets focus.
pub fn map_validation_errors(errors: &[ValidationError]) -> FieldErrors {
    let mut out = FieldErrors::default();
    walk(errors, "", &mut out);
    out
}

fn walk(errors: &[ValidationError], prefix: &str, out: &mut FieldErrors) {
    for error in errors {
        let path = if prefix.is_empty() {
            error.property.clone()
        } else {
            format!("{prefix}.{}", error.property)
        };
        if !error.constraints.is_empty() {
            out.insert(&path, &error.constraints.messages());
        }
        walk(&error.children, &path, out);
    }
}

/// What a submit is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    Create,
    Update(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(TaskDto),
    Updated(TaskDto),
    /// Client-side or server-side validation failed.
    Invalid(FieldErrors),
    /// Any other failure; it has already been toasted.
    Failed(ApiError),
}

/// Validates locally, then runs the create or update mutation. Nothing is
/// sent when local validation fails.
#[tracing::instrument(skip(api, values))]
pub async fn submit_task(api: &TaskApi, target: &FormTarget, values: &TaskFormValues) -> SubmitOutcome {
    if let Err(errors) = values.check() {
        debug!(fields = errors.len(), "form rejected before submit");
        return SubmitOutcome::Invalid(errors);
    }

    let result = match target {
        FormTarget::Create => api.create(&values.to_create()).await.map(SubmitOutcome::Created),
        FormTarget::Update(id) => api.update(id, &values.to_patch()).await.map(SubmitOutcome::Updated),
    };

    match result {
        Ok(outcome) => {
            info!("form submitted");
            outcome
        }
        Err(err) => match err.validation_errors() {
            Some(tree) => SubmitOutcome::Invalid(map_validation_errors(tree)),
            None => SubmitOutcome::Failed(err),
        },
    }
}

/// `/tasks/create` -> `/tasks`
pub fn parent_path(pathname: &str) -> String {
    let trimmed = pathname.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Where to go after a successful submit: the list after create, the same
/// record in view mode after update.
pub fn success_redirect(pathname: &str, outcome: &SubmitOutcome) -> Option<String> {
    match outcome {
        SubmitOutcome::Created(_) => Some(parent_path(pathname)),
        SubmitOutcome::Updated(_) => Some(pathname.to_string()),
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use taskdesk_shared::Constraints;

    use super::*;

    #[test]
    fn title_length_is_checked_in_characters() {
        let empty = TaskFormValues::default();
        let errors = empty.check().expect_err("empty title");
        assert_eq!(errors.focus(), Some("title"));
        assert!(errors.get("title").is_some_and(|message| message.starts_with("- ")));

        let long = TaskFormValues {
            title: "é".repeat(255),
            ..TaskFormValues::default()
        };
        assert!(long.check().is_ok());

        let too_long = TaskFormValues {
            title: "x".repeat(256),
            ..TaskFormValues::default()
        };
        assert!(too_long.check().is_err());
    }

    #[test]
    fn nested_server_errors_map_to_dotted_paths() {
        let tree = vec![
            ValidationError {
                property: "meta".to_string(),
                constraints: Constraints::default(),
                children: vec![ValidationError {
                    property: "owner".to_string(),
                    constraints: Constraints::List(vec!["owner is required".to_string(), "owner must be a string".to_string()]),
                    children: Vec::new(),
                }],
            },
            ValidationError {
                property: "title".to_string(),
                constraints: Constraints::List(vec!["title too long".to_string()]),
                children: Vec::new(),
            },
        ];
        let errors = map_validation_errors(&tree);
        assert_eq!(errors.focus(), Some("meta.owner"));
        assert_eq!(errors.get("meta.owner"), Some("- owner is required\n- owner must be a string"));
        assert_eq!(errors.get("title"), Some("- title too long"));
        assert_eq!(errors.get("meta"), None);
    }

    #[test]
    fn update_payload_carries_no_id_and_create_sends_no_status() {
        let values = TaskFormValues {
            title: "Ship".to_string(),
            description: String::new(),
            status: Some(TaskStatus::Done),
        };
        let patch = serde_json::to_value(values.to_patch()).expect("encode patch");
        assert_eq!(patch, serde_json::json!({"title": "Ship", "description": "", "status": "DONE"}));
        assert_eq!(values.to_create().status, None);
    }

    #[test]
    fn clearing_the_description_on_edit_is_sent() {
        let task: TaskDto = serde_json::from_value(serde_json::json!({
            "id": "7d0c3f9e-2a41-4c55-9b1e-5b8f0f2f6a10",
            "title": "Ship",
            "description": "old notes",
            "status": "TO_DO"
        }))
        .expect("decode task");
        let mut values = TaskFormValues::from_task(&task);
        values.description.clear();

        let patch = serde_json::to_value(values.to_patch()).expect("encode patch");
        assert_eq!(patch["description"], serde_json::json!(""));

        let create = serde_json::to_value(values.to_create()).expect("encode create");
        assert!(create.get("description").is_none());
    }

    #[test]
    fn mode_and_redirects() {
        assert_eq!(FormMode::resolve(false, true), FormMode::Create);
        assert_eq!(FormMode::resolve(true, false), FormMode::View);
        assert_eq!(FormMode::resolve(true, true), FormMode::Edit);
        assert_eq!(parent_path("/tasks/create"), "/tasks");
        assert_eq!(parent_path("/tasks/"), "/");
    }
}
