use haloride_common::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend error: {message}{}", hint_suffix(.hint))]
    Backend {
        /// HTTP status, when the backend speaks HTTP
        status: Option<u16>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
        code: Option<String>,
    },

    #[error("Rejected by lead server: {0}")]
    Rejected(ValidationErrors),

    #[error("Failed to create lead: No data returned")]
    EmptyResponse,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(h) if !h.is_empty() => format!(". {}", h),
        _ => String::new(),
    }
}

impl StoreError {
    /// Backend error without PostgREST diagnostics
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        StoreError::Backend {
            status,
            message: message.into(),
            details: None,
            hint: None,
            code: None,
        }
    }

    /// Backend-supplied diagnostic hint, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            StoreError::Backend { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}
