//! Google Sheets record store adapter.
//!
//! Thin REST wrapper over the two operations the intake flow needs:
//! read the whole worksheet, append one row. Quota and rate-limit
//! responses classify as transient so the cache layer can clear itself
//! before surfacing the error.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::store::RecordStore;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsStore {
    client: Client,
    token: String,
    spreadsheet_id: String,
    sheet_name: String,
}

/// Subset of the values API response we read.
#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            token: config.api_token.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{BASE_URL}/{}/values/{}{suffix}",
            self.spreadsheet_id, self.sheet_name
        )
    }
}

/// Map a non-success API response to an [`AppError::Remote`], marking
/// quota/rate-limit classes as transient. Shared with the Drive adapter.
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let transient = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && body.contains("RATE_LIMIT"))
        || (status == StatusCode::FORBIDDEN && body.contains("quota"));
    let message = format!("sheets API returned {status}: {body}");
    if transient {
        Err(AppError::remote_transient(message))
    } else {
        Err(AppError::remote(message))
    }
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn fetch_all(&self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url("");
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let range: ValueRange = check(response).await?.json().await?;
        Ok(range.values)
    }

    async fn append_one(&self, row: Vec<String>) -> Result<()> {
        let url = self.values_url(":append");
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
