//! reqwest-backed implementation of the remote collaborator seams.

use super::types::{
    RemoteError, UpscaleClient, UpscaleRequest, UpscaleResponse, UsageStats, UsageTracker,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart;
use serde_json::json;
use tracing::debug;

/// HTTP client for the upscale and usage endpoints of the Pixelift API.
///
/// Holds one pooled `reqwest::Client`; cloning is cheap and shares the
/// pool. The server enforces its own processing deadline, so the only
/// timeout configured here is a generous transport-level one.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Transport-level request timeout. The upscale computation itself can
/// legitimately take minutes on large inputs.
const REQUEST_TIMEOUT_SECS: u64 = 300;

impl HttpApiClient {
    /// Creates a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Attaches a bearer token sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl UpscaleClient for HttpApiClient {
    async fn upscale(&self, request: &UpscaleRequest) -> Result<UpscaleResponse, RemoteError> {
        let url = self.endpoint("/api/upscale");
        debug!(
            user_id = %request.user_id,
            file = %request.file_name,
            scale = request.scale,
            "sending upscale request"
        );

        let image_part = multipart::Part::bytes(request.image.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(request.output_format.mime())
            .map_err(|e| RemoteError::Http(format!("invalid mime type: {}", e)))?;
        let form = multipart::Form::new()
            .text("userId", request.user_id.clone())
            .text("scale", request.scale.to_string())
            .text("quality", request.quality.to_string())
            .text("outputFormat", request.output_format.extension().to_string())
            .part("image", image_part);

        let response = self
            .request(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http(format!(
                "HTTP {} from POST {}",
                response.status(),
                url
            )));
        }

        let parsed = response.json::<UpscaleResponse>().await?;
        Ok(parsed)
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, RemoteError> {
        let response = self.request(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl UsageTracker for HttpApiClient {
    async fn increment_upscale_count(&self, user_id: &str) -> Result<(), RemoteError> {
        let url = self.endpoint("/api/usage/increment");
        let response = self
            .request(self.client.post(&url))
            .json(&json!({ "userId": user_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http(format!(
                "HTTP {} from POST {}",
                response.status(),
                url
            )));
        }
        Ok(())
    }

    async fn usage_stats(&self, user_id: &str) -> Result<UsageStats, RemoteError> {
        let url = self.endpoint("/api/usage");
        let response = self
            .request(self.client.get(&url))
            .query(&[("userId", user_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        Ok(response.json::<UsageStats>().await?)
    }
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpApiClient::new("https://api.example.com/").unwrap();
        assert_eq!(client.endpoint("/api/upscale"), "https://api.example.com/api/upscale");
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let client = HttpApiClient::new("https://api.example.com")
            .unwrap()
            .with_api_key("secret-token");
        let debugged = format!("{:?}", client);
        assert!(!debugged.contains("secret-token"));
        assert!(debugged.contains("has_api_key: true"));
    }
}
