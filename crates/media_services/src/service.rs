use reqwest::Client;
use reqwest::multipart::{Form, Part};

use crate::types::{MediaConfig, MediaError, UploadedImage};

/// Client for the hosted image store.
///
/// Uploads return a stable URL plus an opaque `public_id`; the asset is
/// released later by passing that handle to [`MediaService::destroy`].
#[derive(Debug, Clone)]
pub struct MediaService {
    client: Client,
    config: MediaConfig,
}

impl MediaService {
    /// Creates a new media client from the provided configuration.
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// Uploads raw image bytes, returning the hosted URL and deletion handle.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<UploadedImage, MediaError> {
        let url = format!(
            "{}/v1_1/{}/image/upload",
            self.config.api_base, self.config.cloud_name
        );

        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected(format!("{status}: {body}")));
        }

        let uploaded: UploadedImage = response.json().await?;
        log::info!("uploaded image {} -> {}", filename, uploaded.public_id);
        Ok(uploaded)
    }

    /// Destroys a hosted asset by its deletion handle.
    pub async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let url = format!(
            "{}/v1_1/{}/image/destroy",
            self.config.api_base, self.config.cloud_name
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .form(&[("public_id", public_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected(format!("{status}: {body}")));
        }

        log::info!("destroyed image {}", public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_response() {
        let body = r#"{
            "public_id": "yc/abc123",
            "version": 171234,
            "secure_url": "https://media.example.com/yc/abc123.jpg",
            "bytes": 52100
        }"#;

        let uploaded: UploadedImage = serde_json::from_str(body).unwrap();
        assert_eq!(uploaded.url, "https://media.example.com/yc/abc123.jpg");
        assert_eq!(uploaded.public_id, "yc/abc123");
    }

    #[test]
    fn test_client_construction() {
        let service = MediaService::new(MediaConfig {
            api_base: "https://media.example.com".to_string(),
            cloud_name: "yondercamp".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });
        assert!(service.is_ok());
    }
}
