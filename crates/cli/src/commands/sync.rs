//! Trigger commands against a running sync service.

use serde_json::json;
use thiserror::Error;

/// Errors from sync trigger commands.
#[derive(Debug, Error)]
pub enum SyncCmdError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sync service error: {status} - {message}")]
    Service { status: u16, message: String },
    #[error("Invalid argument: {0}")]
    InvalidArg(String),
}

const DIRECTIONS: [&str; 3] = ["airtable_to_woo", "woo_to_airtable", "bidirectional"];
const SOURCES: [&str; 2] = ["airtable", "woocommerce"];

async fn post(url: String, body: serde_json::Value) -> Result<(), SyncCmdError> {
    let response = reqwest::Client::new().post(&url).json(&body).send().await?;
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if status.is_success() {
        tracing::info!("{text}");
        Ok(())
    } else {
        Err(SyncCmdError::Service {
            status: status.as_u16(),
            message: text,
        })
    }
}

/// Queue a full sync.
///
/// # Errors
///
/// Returns an error for an unknown direction or a failed request.
pub async fn full(base_url: &str, direction: &str) -> Result<(), SyncCmdError> {
    if !DIRECTIONS.contains(&direction) {
        return Err(SyncCmdError::InvalidArg(format!(
            "direction must be one of {DIRECTIONS:?}, got '{direction}'"
        )));
    }
    tracing::info!(direction, "Requesting full sync");
    post(
        format!("{}/sync/full", base_url.trim_end_matches('/')),
        json!({ "direction": direction }),
    )
    .await
}

/// Queue specific records or products for sync.
///
/// # Errors
///
/// Returns an error for an unknown source, an empty ID list, or a failed
/// request.
pub async fn manual(base_url: &str, source: &str, ids: &str) -> Result<(), SyncCmdError> {
    if !SOURCES.contains(&source) {
        return Err(SyncCmdError::InvalidArg(format!(
            "source must be one of {SOURCES:?}, got '{source}'"
        )));
    }
    let record_ids: Vec<&str> = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    if record_ids.is_empty() {
        return Err(SyncCmdError::InvalidArg("no IDs given".to_string()));
    }

    tracing::info!(source, count = record_ids.len(), "Requesting manual sync");
    post(
        format!("{}/sync/manual", base_url.trim_end_matches('/')),
        json!({ "source": source, "record_ids": record_ids }),
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_direction_rejected() {
        let err = full("http://localhost:5000", "sideways").await.unwrap_err();
        assert!(matches!(err, SyncCmdError::InvalidArg(_)));
    }

    #[tokio::test]
    async fn test_empty_ids_rejected() {
        let err = manual("http://localhost:5000", "airtable", " , ,")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncCmdError::InvalidArg(_)));
    }

    #[tokio::test]
    async fn test_unknown_source_rejected() {
        let err = manual("http://localhost:5000", "ebay", "1,2")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncCmdError::InvalidArg(_)));
    }
}
