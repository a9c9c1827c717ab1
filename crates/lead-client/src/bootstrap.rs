//! Client bootstrap from the lead server's public configuration

use crate::submission::SubmissionClient;
use anyhow::{Context, Result};
use haloride_common::PublicConfig;
use lead_store::{ApiStore, LeadStore, SupabaseStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Fetch `GET /api/config` from a lead server
pub async fn fetch_public_config(server_url: &str) -> Result<PublicConfig> {
    let url = format!("{}/api/config", server_url.trim_end_matches('/'));
    debug!("Fetching public config from {}", url);

    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to fetch public config: {}", response.status());
    }

    response
        .json()
        .await
        .context("Failed to parse public config response")
}

impl SubmissionClient {
    /// Build a client for the deployment served at `server_url`
    ///
    /// Leads go straight to Supabase when the server publishes credentials,
    /// otherwise through the server's own `/api/leads` route.
    pub async fn from_server(server_url: &str) -> Result<Self> {
        let config = fetch_public_config(server_url).await?;

        let store: Arc<dyn LeadStore> = match config.supabase_credentials() {
            Some((url, key)) => {
                info!("Submitting leads directly to Supabase at {}", url);
                Arc::new(SupabaseStore::new(url, key))
            }
            None => {
                info!("No Supabase credentials published, using {}/api/leads", server_url);
                Arc::new(ApiStore::new(server_url))
            }
        };

        Ok(Self::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haloride_common::{LeadField, LeadInput};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_public_config() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "supabaseUrl": "https://xyz.supabase.co",
                "supabaseAnonKey": "anon-key"
            })))
            .mount(&server)
            .await;

        let config = fetch_public_config(&server.uri()).await.unwrap();
        assert_eq!(
            config.supabase_credentials(),
            Some(("https://xyz.supabase.co", "anon-key"))
        );
    }

    #[tokio::test]
    async fn test_fetch_public_config_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(fetch_public_config(&server.uri()).await.is_err());
    }

    #[tokio::test]
    async fn test_from_server_picks_supabase() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "supabaseUrl": server.uri(),
                "supabaseAnonKey": "anon-key"
            })))
            .mount(&server)
            .await;

        let client = SubmissionClient::from_server(&server.uri()).await.unwrap();
        assert_eq!(client.store_name(), "supabase");
    }

    #[tokio::test]
    async fn test_from_server_falls_back_to_api_route() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Lead created successfully",
                "data": {
                    "id": 5,
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

        let client = SubmissionClient::from_server(&server.uri()).await.unwrap();
        assert_eq!(client.store_name(), "api");

        let input = LeadInput::new()
            .with(LeadField::Name, "Asha Rao")
            .with(LeadField::Grade, "Class 4")
            .with(LeadField::City, "Pune")
            .with(LeadField::MobileNumber, "9876543210");
        let lead = client.submit(&input).await.unwrap();
        assert_eq!(lead.id, 5);
    }
}
