//! API request handlers for lead submission

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use haloride_common::{Lead, LeadInput, PublicConfig, ValidationErrors};
use lead_store::StoreError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::AppState;

/// API Error type
///
/// The body carries only `message`, plus the field map for validation
/// failures. Backend diagnostics are logged, never returned.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<ValidationErrors>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl ApiError {
    fn internal(message: &str) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            errors: self.errors.as_ref(),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "Validation error".to_string(),
            errors: Some(errors),
        }
    }
}

/// Response from lead creation
#[derive(Debug, Serialize)]
pub struct CreateLeadResponse {
    pub message: String,
    pub data: Lead,
}

/// All stored leads
#[derive(Debug, Serialize)]
pub struct ListLeadsResponse {
    pub data: Vec<Lead>,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lead-api",
        "store": state.store.name()
    }))
}

/// Public credentials for the browser client
pub async fn config_handler(State(state): State<Arc<AppState>>) -> Json<PublicConfig> {
    Json(state.public_config.clone())
}

/// Validate and store a submitted lead
pub async fn create_lead_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLeadResponse>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected lead body: {}", rejection.body_text());
        ValidationErrors::single("body", rejection.body_text())
    })?;

    let input = LeadInput::from_json(&body)?;
    let new_lead = state.schema.validate(&input).map_err(|errors| {
        info!("Lead validation failed: {}", errors);
        errors
    })?;

    match state.store.create(new_lead).await {
        Ok(lead) => {
            info!("Created lead {} via {} store", lead.id, state.store.name());
            Ok((
                StatusCode::CREATED,
                Json(CreateLeadResponse {
                    message: "Lead created successfully".to_string(),
                    data: lead,
                }),
            ))
        }
        Err(StoreError::Rejected(errors)) => Err(errors.into()),
        Err(err) => {
            error!(
                hint = ?err.hint(),
                "Failed to create lead via {} store: {}",
                state.store.name(),
                err
            );
            Err(ApiError::internal(
                "An error occurred while creating the lead",
            ))
        }
    }
}

/// List all stored leads
pub async fn list_leads_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListLeadsResponse>, ApiError> {
    info!("Listing all leads");

    let leads = state.store.list().await.map_err(|err| {
        error!("Failed to list leads via {} store: {}", state.store.name(), err);
        ApiError::internal("An error occurred while fetching leads")
    })?;

    Ok(Json(ListLeadsResponse { data: leads }))
}
