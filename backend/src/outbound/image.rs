//! HTTP adapter for the image-host port.
//!
//! Talks to a Cloudinary-style upload endpoint: a form POST carrying the
//! base64 payload and the desired public id, answered with JSON containing
//! the hosted asset's secure URL.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::ports::{ImageHost, ImageHostError};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// [`ImageHost`] backed by an HTTP upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl HttpImageHost {
    /// Create an adapter pointing at the given upload endpoint.
    pub fn new(upload_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: upload_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, image_base64: &str, public_id: &str) -> Result<String, ImageHostError> {
        let response = self
            .client
            .post(&self.upload_url)
            .form(&[
                ("file", image_base64),
                ("public_id", public_id),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ImageHostError::upload(err.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|err| ImageHostError::upload(err.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| ImageHostError::upload(format!("malformed upload response: {err}")))?;

        if body.secure_url.is_empty() {
            return Err(ImageHostError::upload("upload response had no secure URL"));
        }
        Ok(body.secure_url)
    }
}
