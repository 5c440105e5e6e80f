//! Google Drive attachment uploader.
//!
//! Uploads a submitted file into the configured folder, opens it to
//! anyone-with-the-link, and hands back the thumbnail-style URL that goes
//! into the sheet's attachment column.

use log::info;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::sheets::check;

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

pub struct DriveUploader {
    client: Client,
    token: String,
    folder: String,
}

#[derive(Deserialize)]
struct FileResource {
    id: String,
}

impl DriveUploader {
    /// Build an uploader from config; `None` when no folder is configured
    /// (attachments disabled, the form still works without them).
    pub fn from_config(config: &Config) -> Option<Self> {
        config.drive_folder.as_ref().map(|folder| Self {
            client: Client::new(),
            token: config.api_token.clone(),
            folder: folder.clone(),
        })
    }

    /// Upload one attachment and return its public thumbnail URL.
    pub async fn upload(&self, filename: &str, mime: &str, bytes: Vec<u8>) -> Result<String> {
        let metadata = json!({
            "name": filename,
            "parents": [self.folder],
        });
        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| AppError::remote(format!("bad metadata part: {e}")))?,
            )
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(filename.to_string())
                    .mime_str(mime)
                    .map_err(|e| AppError::remote(format!("bad mime type '{mime}': {e}")))?,
            );

        let response = self
            .client
            .post(UPLOAD_URL)
            .query(&[("uploadType", "multipart")])
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        let file: FileResource = check(response).await?.json().await?;
        info!("uploaded attachment '{filename}' as {}", file.id);

        // Anyone with the link can read; the sheet stores a public URL.
        let response = self
            .client
            .post(format!("{FILES_URL}/{}/permissions", file.id))
            .bearer_auth(&self.token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;
        check(response).await?;

        Ok(format!("https://drive.google.com/thumbnail?id={}", file.id))
    }
}
