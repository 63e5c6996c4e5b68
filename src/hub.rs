//! Routine hub client
//!
//! Uploads recorded routines for signed-in users. The engine is synchronous,
//! so [`HubClient`] owns a current-thread runtime and blocks on each request.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

use crate::config::HubConfig;
use crate::error::{Error, Result};

/// Routine upload payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineUpload {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub script: String,
    pub public: bool,
    /// Replace an existing routine with the same name
    #[serde(rename = "override")]
    pub override_existing: bool,
}

/// Result of an upload the hub accepted or rejected by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Created { url: Option<String> },
    /// A routine with this name already exists
    Conflict,
}

/// Destination for recorded routines
pub trait RoutineHub {
    fn upload(&self, routine: &RoutineUpload) -> Result<UploadStatus>;
}

/// HTTP routine hub client
#[derive(Debug)]
pub struct HubClient {
    client: Client,
    runtime: Runtime,
    base_url: String,
    token: String,
}

impl HubClient {
    pub fn new(config: &HubConfig, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;

        Ok(Self {
            client,
            runtime,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/terminal/script", self.base_url)
    }

    async fn post(&self, routine: &RoutineUpload) -> Result<UploadStatus> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(routine)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Ok(UploadStatus::Conflict);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Hub(format!("HTTP {status}: {text}")));
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let url = body
            .get("url")
            .or_else(|| body.get("script_url"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(UploadStatus::Created { url })
    }
}

impl RoutineHub for HubClient {
    fn upload(&self, routine: &RoutineUpload) -> Result<UploadStatus> {
        debug!(
            "Uploading routine '{}' to {} (override: {})",
            routine.name,
            self.endpoint(),
            routine.override_existing
        );
        self.runtime.block_on(self.post(routine))
    }
}
