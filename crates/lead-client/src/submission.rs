//! Validating lead submission

use haloride_common::{normalize_optional, Lead, LeadInput, LeadSchema, ValidationErrors};
use lead_store::{LeadStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse failure class used for user-facing messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad field values; shown inline per field
    Validation,
    /// Network or backend failure; the user may resubmit
    Backend,
    /// Anything else
    Unexpected,
}

impl SubmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmissionError::Validation(_) | SubmissionError::Store(StoreError::Rejected(_)) => {
                ErrorKind::Validation
            }
            SubmissionError::Store(StoreError::Other(_)) => ErrorKind::Unexpected,
            SubmissionError::Store(_) => ErrorKind::Backend,
        }
    }

    /// Per-field messages, for either local or server-side rejection
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            SubmissionError::Validation(errors)
            | SubmissionError::Store(StoreError::Rejected(errors)) => Some(errors),
            SubmissionError::Store(_) => None,
        }
    }
}

/// Submits leads to a store after client-side validation
pub struct SubmissionClient {
    store: Arc<dyn LeadStore>,
    schema: LeadSchema,
}

impl SubmissionClient {
    /// Create a client enforcing the client validation profile
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self {
            store,
            schema: LeadSchema::client(),
        }
    }

    pub fn with_schema(mut self, schema: LeadSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Validate, normalize and store one lead
    ///
    /// Invalid input never reaches the store. On success exactly one record
    /// was stored; on failure none was, and the caller decides whether the
    /// user should try again.
    pub async fn submit(&self, input: &LeadInput) -> Result<Lead, SubmissionError> {
        let new_lead = self.schema.validate(input).map_err(|errors| {
            debug!("Lead rejected before submission: {}", errors);
            errors
        })?;

        let mut lead = self.store.create(new_lead).await.map_err(|err| {
            error!(
                hint = ?err.hint(),
                "Error submitting lead to {} store: {}",
                self.store.name(),
                err
            );
            err
        })?;

        lead.school_name = normalize_optional(lead.school_name);
        lead.email = normalize_optional(lead.email);

        info!("Submitted lead {} to {} store", lead.id, self.store.name());
        Ok(lead)
    }
}
