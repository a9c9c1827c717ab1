//! User-facing submission notifications
//!
//! Every outcome maps to a notification; backend diagnostics (messages,
//! hints) stay in logs and never reach the end user.

use crate::submission::{ErrorKind, SubmissionError};
use haloride_common::{Lead, ValidationErrors};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// Toast-style message shown after a submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    /// Inline messages keyed by field name
    #[serde(skip_serializing_if = "ValidationErrors::is_empty")]
    pub field_errors: ValidationErrors,
}

impl Notification {
    fn new(title: &str, description: &str, variant: Variant) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant,
            field_errors: ValidationErrors::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(
            "Form submitted successfully!",
            "Thank you for your interest in HaloRide. We'll get back to you soon.",
            Variant::Default,
        )
    }

    pub fn from_error(err: &SubmissionError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self {
                field_errors: err.field_errors().cloned().unwrap_or_default(),
                ..Self::new(
                    "Please check the form",
                    "Some fields need your attention.",
                    Variant::Destructive,
                )
            },
            ErrorKind::Backend => Self::new(
                "Error submitting form",
                "Please try again later.",
                Variant::Destructive,
            ),
            ErrorKind::Unexpected => Self::new(
                "Something went wrong",
                "Please try again later.",
                Variant::Destructive,
            ),
        }
    }

    pub fn from_result(result: &Result<Lead, SubmissionError>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}
