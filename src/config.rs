//! Environment-supplied configuration.
//!
//! Credentials and target identifiers come from the environment and are
//! resolved once at startup. A missing required value is fatal before the
//! server binds; it is never a per-request error.

use std::env;

use crate::error::{AppError, Result};

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth bearer token for the Sheets and Drive APIs.
    pub api_token: String,
    /// Spreadsheet holding the complaint table.
    pub spreadsheet_id: String,
    /// Worksheet (tab) name inside the spreadsheet.
    pub sheet_name: String,
    /// Drive folder receiving attachment uploads. Uploads are disabled
    /// when unset.
    pub drive_folder: Option<String>,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// When set, use a local CSV file as the record store instead of the
    /// Sheets API (offline development mode; no token required).
    pub csv_path: Option<String>,
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::config(format!(
            "required environment variable {name} is not set"
        ))),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let csv_path = optional("MINWON_CSV_PATH");

        // The remote credentials are only required when we actually talk
        // to the remote store.
        let (api_token, spreadsheet_id) = if csv_path.is_some() {
            (
                optional("MINWON_API_TOKEN").unwrap_or_default(),
                optional("MINWON_SPREADSHEET_ID").unwrap_or_default(),
            )
        } else {
            (required("MINWON_API_TOKEN")?, required("MINWON_SPREADSHEET_ID")?)
        };

        Ok(Self {
            api_token,
            spreadsheet_id,
            sheet_name: optional("MINWON_SHEET_NAME").unwrap_or_else(|| "Sheet1".to_string()),
            drive_folder: optional("MINWON_DRIVE_FOLDER"),
            bind_addr: optional("MINWON_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            csv_path,
        })
    }
}
