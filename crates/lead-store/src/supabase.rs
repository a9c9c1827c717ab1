//! Supabase (PostgREST) lead store
//!
//! Talks to the hosted lead table directly. Rows on the wire use
//! snake_case names and `null` for absent optionals; they are translated
//! to the camelCase [`Lead`] shape here. `created_at` is never sent: the
//! table's column default stamps it on the server. A `timestamp` column
//! without a zone is read as UTC.

use crate::{LeadStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use haloride_common::{normalize_optional, Lead, LeadId, NewLead};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info};

/// Table used by the lead form
pub const DEFAULT_TABLE: &str = "halorides-form";

/// Store backed by a Supabase table
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    table: String,
    client: reqwest::Client,
}

/// Insert payload, snake_case as the table expects
#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    grade: &'a str,
    school_name: Option<&'a str>,
    city: &'a str,
    mobile_number: &'a str,
    email: Option<&'a str>,
}

impl<'a> From<&'a NewLead> for InsertRow<'a> {
    fn from(lead: &'a NewLead) -> Self {
        Self {
            name: &lead.name,
            grade: &lead.grade,
            school_name: lead.school_name.as_deref(),
            city: &lead.city,
            mobile_number: &lead.mobile_number,
            email: lead.email.as_deref(),
        }
    }
}

/// Row as returned by PostgREST
#[derive(Debug, Deserialize)]
pub struct LeadRow {
    pub id: LeadId,
    pub name: String,
    pub grade: String,
    #[serde(default)]
    pub school_name: Option<String>,
    pub city: String,
    pub mobile_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Parse a Postgres timestamp, with or without a zone offset
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Lead {
            id: row.id,
            name: row.name,
            grade: row.grade,
            school_name: normalize_optional(row.school_name),
            city: row.city,
            mobile_number: row.mobile_number,
            email: normalize_optional(row.email),
            created_at: row.created_at,
        }
    }
}

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    code: Option<String>,
}

impl SupabaseStore {
    /// Create a store for the default lead table
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.table
        )
    }

    fn auth_headers(&self) -> StoreResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| anyhow::anyhow!("Invalid Supabase API key: {}", e))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| anyhow::anyhow!("Invalid Supabase API key: {}", e))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Turn a non-success response into a backend error
    async fn error_from_response(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: PostgrestError = serde_json::from_str(&body).unwrap_or_default();

        let message = parsed
            .message
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        error!(
            status = status.as_u16(),
            code = ?parsed.code,
            details = ?parsed.details,
            hint = ?parsed.hint,
            "Supabase error: {}",
            message
        );

        StoreError::Backend {
            status: Some(status.as_u16()),
            message,
            details: parsed.details,
            hint: parsed.hint,
            code: parsed.code,
        }
    }

    /// Decode a successful response body into rows
    async fn read_rows(response: reqwest::Response) -> StoreResult<Vec<LeadRow>> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl LeadStore for SupabaseStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn create(&self, lead: NewLead) -> StoreResult<Lead> {
        let url = format!("{}?select=*", self.table_url());
        debug!("Inserting lead into Supabase table {}", self.table);

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(&[InsertRow::from(&lead)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let rows = Self::read_rows(response).await.map_err(|err| {
            error!("Supabase accepted the insert but the response was unreadable: {}", err);
            err
        })?;
        let row = match <[LeadRow; 1]>::try_from(rows) {
            Ok([row]) => row,
            Err(rows) if rows.is_empty() => return Err(StoreError::EmptyResponse),
            Err(rows) => {
                return Err(StoreError::backend(
                    None,
                    format!("Expected a single inserted row, got {}", rows.len()),
                ))
            }
        };

        info!("Created lead {} in Supabase", row.id);
        Ok(row.into())
    }

    async fn list(&self) -> StoreResult<Vec<Lead>> {
        let url = format!("{}?select=*&order=id.asc", self.table_url());

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let rows = Self::read_rows(response).await?;
        Ok(rows.into_iter().map(Lead::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn new_lead() -> NewLead {
        NewLead {
            name: "Asha Rao".to_string(),
            grade: "Class 4".to_string(),
            school_name: None,
            city: "Pune".to_string(),
            mobile_number: "9876543210".to_string(),
            email: Some("asha@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_translates_row() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/halorides-form"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([{
                "name": "Asha Rao",
                "grade": "Class 4",
                "school_name": null,
                "city": "Pune",
                "mobile_number": "9876543210",
                "email": "asha@example.com"
            }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 17,
                "name": "Asha Rao",
                "grade": "Class 4",
                "school_name": null,
                "city": "Pune",
                "mobile_number": "9876543210",
                "email": "asha@example.com",
                "created_at": "2024-05-01T10:00:00.123456+00:00"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let lead = store.create(new_lead()).await.unwrap();

        assert_eq!(lead.id, 17);
        assert_eq!(lead.school_name, None);
        assert_eq!(lead.submission(), new_lead());

        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["mobileNumber"], "9876543210");
        assert!(json.get("schoolName").is_none());
    }

    #[tokio::test]
    async fn test_create_empty_strings_become_absent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 1,
                "name": "Asha Rao",
                "grade": "Class 4",
                "school_name": "",
                "city": "Pune",
                "mobile_number": "9876543210",
                "email": "",
                "created_at": "2024-05-01T10:00:00Z"
            }])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let lead = store.create(new_lead()).await.unwrap();

        assert_eq!(lead.school_name, None);
        assert_eq!(lead.email, None);
    }

    #[tokio::test]
    async fn test_create_reads_timestamp_without_zone_as_utc() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/halorides-form"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 3,
                "name": "Asha Rao",
                "grade": "Class 4",
                "school_name": null,
                "city": "Pune",
                "mobile_number": "9876543210",
                "email": "asha@example.com",
                "created_at": "2024-05-01T10:00:00.123456"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let lead = store.create(new_lead()).await.unwrap();

        assert_eq!(lead.id, 3);
        assert_eq!(
            lead.created_at,
            "2024-05-01T10:00:00.123456Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_unreadable_row_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 3,
                "name": "Asha Rao",
                "grade": "Class 4",
                "city": "Pune",
                "mobile_number": "9876543210",
                "created_at": "yesterday"
            }])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let err = store.create(new_lead()).await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)), "{err:?}");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert_eq!(parse_timestamp("2024-05-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T15:30:00+05:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01T10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-05-01 10:00:00").unwrap(), expected);
        assert!(parse_timestamp("2024-05-01").is_err());
    }

    #[tokio::test]
    async fn test_create_surfaces_postgrest_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "new row violates row-level security policy",
                "details": null,
                "hint": "Enable an insert policy for the anon role",
                "code": "42501"
            })))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let err = store.create(new_lead()).await.unwrap_err();

        match &err {
            StoreError::Backend { status, code, .. } => {
                assert_eq!(*status, Some(401));
                assert_eq!(code.as_deref(), Some("42501"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.hint(), Some("Enable an insert policy for the anon role"));
        assert!(err.to_string().contains("row-level security"));
    }

    #[tokio::test]
    async fn test_create_with_no_rows_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(server.uri(), "anon-key");
        let err = store.create(new_lead()).await.unwrap_err();
        assert!(matches!(err, StoreError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_list_uses_custom_table() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/leads"))
            .and(query_param("order", "id.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "name": "Asha Rao",
                    "grade": "Class 4",
                    "school_name": "Green Valley",
                    "city": "Pune",
                    "mobile_number": "9876543210",
                    "email": null,
                    "created_at": "2024-05-01T10:00:00Z"
                },
                {
                    "id": 2,
                    "name": "Ravi Kumar",
                    "grade": "Class 9",
                    "school_name": null,
                    "city": "Delhi",
                    "mobile_number": "9123456780",
                    "email": null,
                    "created_at": "2024-05-01T11:00:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(format!("{}/", server.uri()), "anon-key").with_table("leads");
        let leads = store.list().await.unwrap();

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].school_name.as_deref(), Some("Green Valley"));
        assert_eq!(leads[1].city, "Delhi");
    }
}
