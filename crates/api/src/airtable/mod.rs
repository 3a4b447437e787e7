//! Airtable records API client.
//!
//! Thin typed wrapper over the Airtable REST API. Record fields are carried
//! as raw JSON maps so the same client serves the item tables, Users,
//! Scan History, and Settings; callers deserialize into their own field
//! structs via [`Record::fields_as`].

mod formula;

pub use formula::{and, escape_formula_value, field_equals};

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::AirtableConfig;

/// Airtable caps list pages at 100 records.
const MAX_PAGE_SIZE: u32 = 100;

/// Errors that can occur when interacting with the Airtable API.
#[derive(Debug, Error)]
pub enum AirtableError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Record not found.
    #[error("Record not found")]
    NotFound,

    /// Rate limited; retry after the given number of seconds.
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A single Airtable record with untyped fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Deserialize the field map into a typed field struct.
    ///
    /// # Errors
    ///
    /// Returns `AirtableError::Parse` if the fields don't match the target type.
    pub fn fields_as<T: DeserializeOwned>(&self) -> Result<T, AirtableError> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone()))
            .map_err(|e| AirtableError::Parse(e.to_string()))
    }
}

/// One page of list results.
#[derive(Debug, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// Options for listing records from a table.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter_by_formula: Option<String>,
    pub view: Option<String>,
    pub page_size: Option<u32>,
    pub max_records: Option<u32>,
    pub offset: Option<String>,
}

impl ListOptions {
    /// List options filtered by a formula.
    #[must_use]
    pub fn filtered(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            ..Self::default()
        }
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(formula) = &self.filter_by_formula {
            query.push(("filterByFormula", formula.clone()));
        }
        if let Some(view) = &self.view {
            query.push(("view", view.clone()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.min(MAX_PAGE_SIZE).to_string()));
        }
        if let Some(max) = self.max_records {
            query.push(("maxRecords", max.to_string()));
        }
        if let Some(offset) = &self.offset {
            query.push(("offset", offset.clone()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
    Plain(String),
    #[default]
    Unknown,
}

impl ApiErrorDetail {
    fn message(&self) -> String {
        match self {
            Self::Structured { kind, message } => message
                .clone()
                .unwrap_or_else(|| kind.clone()),
            Self::Plain(s) => s.clone(),
            Self::Unknown => "unknown error".to_string(),
        }
    }
}

/// Airtable records API client bound to a single base.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    client: reqwest::Client,
    api_url: String,
    base_id: String,
}

impl AirtableClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &AirtableConfig, timeout: std::time::Duration) -> Result<Self, AirtableError> {
        Self::from_parts(&config.api_url, &config.api_key, &config.base_id, timeout)
    }

    /// Create a client from its raw connection parts.
    ///
    /// Used by services that carry their own Airtable configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_parts(
        api_url: &str,
        api_key: &secrecy::SecretString,
        base_id: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, AirtableError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| AirtableError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            base_id: base_id.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/{}/{}",
            self.api_url,
            self.base_id,
            urlencoding::encode(table)
        )
    }

    fn record_url(&self, table: &str, record_id: &str) -> String {
        format!("{}/{record_id}", self.table_url(table))
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AirtableError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AirtableError::NotFound);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30);
            return Err(AirtableError::RateLimited(retry_after));
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(AirtableError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// List one page of records from a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Airtable rejects it.
    #[instrument(skip(self, options))]
    pub async fn list_records(
        &self,
        table: &str,
        options: &ListOptions,
    ) -> Result<ListRecordsResponse, AirtableError> {
        let response = self
            .client
            .get(self.table_url(table))
            .query(&options.to_query())
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// List every record in a table, following pagination offsets.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list_all(
        &self,
        table: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, AirtableError> {
        let mut records = Vec::new();
        let mut page_options = options.clone();
        loop {
            let page = self.list_records(table, &page_options).await?;
            records.extend(page.records);
            match page.offset {
                Some(offset) => page_options.offset = Some(offset),
                None => break,
            }
        }
        Ok(records)
    }

    /// Fetch the first record matching a filter formula, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, formula))]
    pub async fn find_first(
        &self,
        table: &str,
        formula: &str,
    ) -> Result<Option<Record>, AirtableError> {
        let options = ListOptions {
            filter_by_formula: Some(formula.to_string()),
            max_records: Some(1),
            ..ListOptions::default()
        };
        let page = self.list_records(table, &options).await?;
        Ok(page.records.into_iter().next())
    }

    /// Get a single record by ID.
    ///
    /// # Errors
    ///
    /// Returns `AirtableError::NotFound` if the record does not exist.
    #[instrument(skip(self))]
    pub async fn get_record(&self, table: &str, record_id: &str) -> Result<Record, AirtableError> {
        let response = self
            .client
            .get(self.record_url(table, record_id))
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Create a record with the given fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the fields are rejected.
    #[instrument(skip(self, fields))]
    pub async fn create_record<T: Serialize>(
        &self,
        table: &str,
        fields: &T,
    ) -> Result<Record, AirtableError> {
        let body = serde_json::json!({ "fields": fields, "typecast": true });
        let response = self
            .client
            .post(self.table_url(table))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Partially update a record. Only the provided fields change.
    ///
    /// # Errors
    ///
    /// Returns `AirtableError::NotFound` if the record does not exist.
    #[instrument(skip(self, fields))]
    pub async fn update_record<T: Serialize>(
        &self,
        table: &str,
        record_id: &str,
        fields: &T,
    ) -> Result<Record, AirtableError> {
        let body = serde_json::json!({ "fields": fields, "typecast": true });
        let response = self
            .client
            .patch(self.record_url(table, record_id))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Delete a record by ID.
    ///
    /// # Errors
    ///
    /// Returns `AirtableError::NotFound` if the record does not exist.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, table: &str, record_id: &str) -> Result<(), AirtableError> {
        let response = self
            .client
            .delete(self.record_url(table, record_id))
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Verify connectivity and credentials with a minimal list request.
    ///
    /// Used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the base is unreachable or the token is invalid.
    pub async fn ping(&self, table: &str) -> Result<(), AirtableError> {
        let options = ListOptions {
            max_records: Some(1),
            page_size: Some(1),
            ..ListOptions::default()
        };
        self.list_records(table, &options).await?;
        Ok(())
    }
}
