//! Classification Service Client
//!
//! HTTP client for the external image classifier. Uploads one image as a
//! multipart `file` part and parses the prediction list. Failures are mapped
//! to `ServiceError` by cause and never touch catalog state.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceError;
use crate::prediction::{parse_predictions, PredictionEntry};

pub const DEFAULT_CLASSIFIER_URL: &str = "http://localhost:5000/predict";

/// Image to classify
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reject uploads the service would refuse anyway.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.file_name.trim().is_empty() {
            return Err(ServiceError::InvalidUpload("No selected file".to_string()));
        }
        if !self.content_type.starts_with("image/") {
            return Err(ServiceError::InvalidUpload(
                "Uploaded file is not an image".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(ServiceError::InvalidUpload("No file provided".to_string()));
        }
        Ok(())
    }
}

/// Body of the service's `/health` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

pub struct ClassifierClient {
    client: Client,
    endpoint: String,
}

impl ClassifierClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Connectivity(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sibling `/health` URL of the predict endpoint.
    pub fn health_url(&self) -> String {
        match self.endpoint.rsplit_once('/') {
            Some((base, _)) if base.contains("://") && !base.ends_with('/') => format!("{}/health", base),
            _ => format!("{}/health", self.endpoint.trim_end_matches('/')),
        }
    }

    /// Classify one image.
    pub async fn classify(&self, upload: ImageUpload) -> Result<Vec<PredictionEntry>, ServiceError> {
        upload.validate()?;

        tracing::debug!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "Sending image to classification service"
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| ServiceError::InvalidUpload(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Classification service error: {}", text);
            return Err(ServiceError::Server {
                status: status.as_u16(),
                body: error_body(&text),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Format(e.to_string()))?;
        let predictions = parse_predictions(body)?;

        tracing::debug!("Received {} predictions", predictions.len());
        Ok(predictions)
    }

    pub async fn health(&self) -> Result<ServiceHealth, ServiceError> {
        let response = self.client.get(self.health_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Server {
                status: status.as_u16(),
                body: error_body(&text),
            });
        }
        response
            .json::<ServiceHealth>()
            .await
            .map_err(|e| ServiceError::Format(e.to_string()))
    }
}

/// The service answers failures with `{"error": msg}`; fall back to the raw text.
fn error_body(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}
