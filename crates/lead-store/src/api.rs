//! Client for the lead server's `/api/leads` route

use crate::{LeadStore, StoreError, StoreResult};
use anyhow::Context;
use async_trait::async_trait;
use haloride_common::{Lead, NewLead, ValidationErrors};
use serde::Deserialize;
use tracing::debug;

/// Store that forwards to a running lead server
pub struct ApiStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
    #[serde(default)]
    errors: Option<ValidationErrors>,
}

impl ApiStore {
    /// Create a new lead server client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn leads_url(&self) -> String {
        format!("{}/api/leads", self.base_url)
    }

    async fn error_from_response(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body: Option<ErrorResponse> = response.json().await.ok();

        match body {
            Some(ErrorResponse {
                errors: Some(errors),
                ..
            }) if status == reqwest::StatusCode::BAD_REQUEST => StoreError::Rejected(errors),
            Some(ErrorResponse { message, .. }) => {
                StoreError::backend(Some(status.as_u16()), message)
            }
            None => StoreError::backend(
                Some(status.as_u16()),
                format!("Request failed with status {}", status),
            ),
        }
    }
}

#[async_trait]
impl LeadStore for ApiStore {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn create(&self, lead: NewLead) -> StoreResult<Lead> {
        let url = self.leads_url();
        debug!("Posting lead to {}", url);

        let response = self.client.post(&url).json(&lead).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let created: DataResponse<Lead> = response
            .json()
            .await
            .context("Failed to parse lead server response")?;

        Ok(created.data)
    }

    async fn list(&self) -> StoreResult<Vec<Lead>> {
        let response = self.client.get(self.leads_url()).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let listed: DataResponse<Vec<Lead>> = response
            .json()
            .await
            .context("Failed to parse lead server response")?;

        Ok(listed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn new_lead() -> NewLead {
        NewLead {
            name: "Asha Rao".to_string(),
            grade: "Class 4".to_string(),
            school_name: None,
            city: "Pune".to_string(),
            mobile_number: "9876543210".to_string(),
            email: None,
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = ApiStore::new("http://localhost:5000/");
        assert_eq!(store.leads_url(), "http://localhost:5000/api/leads");
    }

    #[tokio::test]
    async fn test_create_posts_camel_case() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .and(body_json(json!({
                "name": "Asha Rao",
                "grade": "Class 4",
                "city": "Pune",
                "mobileNumber": "9876543210"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Lead created successfully",
                "data": {
                    "id": 1,
                    "name": "Asha Rao",
                    "grade": "Class 4",
                    "city": "Pune",
                    "mobileNumber": "9876543210",
                    "createdAt": "2024-05-01T10:00:00Z"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = ApiStore::new(server.uri());
        let lead = store.create(new_lead()).await.unwrap();

        assert_eq!(lead.id, 1);
        assert_eq!(lead.submission(), new_lead());
    }

    #[tokio::test]
    async fn test_create_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "message": "Validation error",
                "errors": { "city": "City is required" }
            })))
            .mount(&server)
            .await;

        let store = ApiStore::new(server.uri());
        match store.create(new_lead()).await.unwrap_err() {
            StoreError::Rejected(errors) => {
                assert_eq!(errors.get("city"), Some("City is required"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_backend_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/leads"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "An error occurred while fetching leads"
            })))
            .mount(&server)
            .await;

        let store = ApiStore::new(server.uri());
        let err = store.list().await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::Backend {
                status: Some(500),
                ..
            }
        ));
        assert_eq!(err.hint(), None);
    }
}
