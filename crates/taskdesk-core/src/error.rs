use taskdesk_shared::{ApiErrorBody, ErrorMessage, ValidationError};
use thiserror::Error;

use crate::transport::TransportError;

pub const DEFAULT_ERROR_TITLE: &str = "Internal Server Error";

/// Broad category of an [`ApiError`], used to pick how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request never produced a response.
    Network,
    NotFound,
    Forbidden,
    /// The server rejected the payload with a validation error tree.
    Validation,
    /// The response could not be decoded into the expected shape.
    Decode,
    Server,
}

/// Normalized failure of a remote call.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.notification_text())]
pub struct ApiError {
    pub error: Option<String>,
    pub message: Option<ErrorMessage>,
    /// HTTP status, or `0` when no response was received.
    pub status_code: u16,
    /// Request path, only attached to 403 responses.
    pub url: Option<String>,
}

impl ApiError {
    pub fn from_response(status: u16, body: &str, path: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.message.or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{'))
                .then(|| ErrorMessage::Text(trimmed.to_string()))
        });
        let status_code = parsed.status_code.unwrap_or(status);
        Self {
            error: parsed.error,
            message,
            status_code,
            url: (status_code == 403).then(|| path.to_string()),
        }
    }

    pub fn network(err: &TransportError) -> Self {
        Self {
            error: Some("Network Error".to_string()),
            message: Some(ErrorMessage::Text(err.to_string())),
            status_code: 0,
            url: None,
        }
    }

    pub fn decode(detail: impl std::fmt::Display) -> Self {
        Self {
            error: Some("Unexpected Response".to_string()),
            message: Some(ErrorMessage::Text(detail.to_string())),
            status_code: 0,
            url: None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        if self.validation_errors().is_some() {
            return ErrorClass::Validation;
        }
        match self.status_code {
            0 if self.error.as_deref() == Some("Unexpected Response") => ErrorClass::Decode,
            0 => ErrorClass::Network,
            403 => ErrorClass::Forbidden,
            404 => ErrorClass::NotFound,
            _ => ErrorClass::Server,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn title(&self) -> &str {
        self.error
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_ERROR_TITLE)
    }

    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match &self.message {
            Some(ErrorMessage::Validation(errors)) if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }

    /// Title, text message and (for 403) the attempted URL, joined by `". "`.
    pub fn notification_text(&self) -> String {
        let text_message = match &self.message {
            Some(ErrorMessage::Text(text)) => Some(text.as_str()),
            _ => None,
        };
        [Some(self.title()), text_message, self.url.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_attaches_the_request_path() {
        let err = ApiError::from_response(
            403,
            r#"{"error":"Forbidden","message":"Missing permission","statusCode":403}"#,
            "/tasks/42",
        );
        assert_eq!(err.class(), ErrorClass::Forbidden);
        assert_eq!(err.notification_text(), "Forbidden. Missing permission. /tasks/42");
    }

    #[test]
    fn missing_error_field_falls_back_to_generic_title() {
        let err = ApiError::from_response(500, "", "/tasks");
        assert_eq!(err.notification_text(), "Internal Server Error");
        assert_eq!(err.url, None);
    }

    #[test]
    fn validation_tree_is_not_rendered_into_the_toast() {
        let err = ApiError::from_response(
            400,
            r#"{"error":"Bad Request","statusCode":400,"message":[{"property":"title","constraints":["title must not be empty"]}]}"#,
            "/tasks",
        );
        assert_eq!(err.class(), ErrorClass::Validation);
        assert_eq!(err.notification_text(), "Bad Request");
    }

    #[test]
    fn plain_text_bodies_become_the_message() {
        let err = ApiError::from_response(502, "Bad gateway", "/tasks");
        assert_eq!(err.notification_text(), "Internal Server Error. Bad gateway");
        assert_eq!(err.class(), ErrorClass::Server);
    }
}
