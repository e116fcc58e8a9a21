// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP object storage adapter.
//!
//! Uploads go to `POST /storage/v1/object/{bucket}/{path}` with the bearer
//! credential; a success resolves to the bucket's public URL. Upserts are
//! disabled: stored objects are immutable and retries write fresh paths.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use perch_config::model::ApiConfig;
use perch_core::{IdentityProvider, ObjectStore, PerchError};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Object store client for the marketplace storage service.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpObjectStore {
    pub fn new(
        config: &ApiConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, PerchError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| PerchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            identity,
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, PerchError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);
        let token = self.identity.credentials().await?.bearer_token;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| PerchError::transport(format!("upload to {bucket} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PerchError::Storage {
                message: format!("upload to {bucket}/{path} returned {status}: {body}"),
                source: None,
            });
        }

        debug!(bucket, path, "object stored");
        Ok(format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.base_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use perch_test_utils::StaticIdentity;

    fn store(server: &MockServer) -> HttpObjectStore {
        let config = ApiConfig {
            base_url: server.uri(),
            ws_url: "ws://unused".into(),
        };
        HttpObjectStore::new(&config, Arc::new(StaticIdentity::new("alice"))).unwrap()
    }

    #[tokio::test]
    async fn successful_upload_resolves_to_the_public_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(url_path("/storage/v1/object/attachments/messages/alice/1_x.png"))
            .and(header("content-type", "image/png"))
            .and(header("x-upsert", "false"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"Key": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = store(&server)
            .put(
                "attachments",
                "messages/alice/1_x.png",
                &[1, 2, 3],
                "image/png",
            )
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/attachments/messages/alice/1_x.png",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_as_storage_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(507).set_body_string("bucket full"))
            .mount(&server)
            .await;

        let err = store(&server)
            .put("attachments", "messages/a/1.bin", &[0], "application/octet-stream")
            .await
            .unwrap_err();

        match err {
            PerchError::Storage { message, .. } => {
                assert!(message.contains("attachments"));
                assert!(message.contains("bucket full"));
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
