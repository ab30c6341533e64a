use std::cell::RefCell;

use crate::error::{ApiError, ErrorClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Success,
    Error,
    Info,
}

/// Transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub variant: Variant,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Info,
            message: message.into(),
        }
    }
}

pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Sink that only records what it was given.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: RefCell<Vec<Notification>>,
}

impl NotificationLog {
    pub fn take(&self) -> Vec<Notification> {
        self.entries.take()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}

/// Whether a failed call should raise an error toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorToast {
    Show,
    Hide,
    /// Everything except this status code.
    HideStatus(u16),
    /// Everything except server-side validation failures, which the form
    /// renders next to the fields instead.
    HideValidation,
}

impl ErrorToast {
    pub fn should_notify(self, err: &ApiError) -> bool {
        match self {
            ErrorToast::Show => true,
            ErrorToast::Hide => false,
            ErrorToast::HideStatus(status) => err.status_code != status,
            ErrorToast::HideValidation => err.class() != ErrorClass::Validation,
        }
    }
}
