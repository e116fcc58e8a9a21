// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the marketplace REST surface.
//!
//! Implements [`MessageRepository`] and [`ProfileStore`] against the
//! message endpoints, with the bearer credential resolved per call from
//! the identity provider. Authorization failures are surfaced, never
//! retried; transient statuses (429, 500, 503) get one retry on idempotent
//! GETs only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use perch_config::model::ApiConfig;
use perch_core::{
    IdentityProvider, ListingId, Message, MessageDraft, MessageId, MessageRepository,
    PerchError, ProfileStore, ProfileSummary, Role, UserId,
};

use crate::dto::{MarkReadPayload, MessagesResponse, ProfileRow, SendPayload, SendResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_GET_RETRIES: u32 = 1;

/// HTTP-backed message repository and profile store.
pub struct HttpMessageApi {
    client: reqwest::Client,
    base_url: String,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpMessageApi {
    pub fn new(
        config: &ApiConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, PerchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PerchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            identity,
        })
    }

    async fn bearer(&self) -> Result<String, PerchError> {
        Ok(self.identity.credentials().await?.bearer_token)
    }

    /// GET `path` with bearer auth, retrying once on a transient status.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PerchError> {
        let url = format!("{}{path}", self.base_url);
        let token = self.bearer().await?;

        let mut last_status = None;
        for attempt in 0..=MAX_GET_RETRIES {
            if attempt > 0 {
                warn!(path, attempt, "retrying GET after transient status");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await
                .map_err(|e| PerchError::transport(format!("GET {path} failed"), e))?;

            let status = response.status();
            debug!(path, status = %status, attempt, "GET response");

            if status.is_success() {
                return response
                    .json::<T>()
                    .await
                    .map_err(|e| PerchError::transport(format!("GET {path} body decode"), e));
            }
            if is_auth_status(status) {
                return Err(auth_error(path, response).await);
            }
            if is_transient_status(status) && attempt < MAX_GET_RETRIES {
                last_status = Some(status);
                continue;
            }
            return Err(status_error(path, response).await);
        }

        Err(PerchError::Transport {
            message: format!(
                "GET {path} failed after retries (last status {})",
                last_status.map_or_else(|| "unknown".into(), |s| s.to_string())
            ),
            source: None,
        })
    }

    /// Send a mutating request with bearer auth. Never retried.
    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, PerchError> {
        let url = format!("{}{path}", self.base_url);
        let token = self.bearer().await?;

        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(|e| PerchError::transport(format!("{path} request failed"), e))?;

        let status = response.status();
        debug!(path, status = %status, "mutating response");

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PerchError::transport(format!("{path} body decode"), e));
        }
        if is_auth_status(status) {
            return Err(auth_error(path, response).await);
        }
        Err(status_error(path, response).await)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

fn is_auth_status(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

async fn auth_error(path: &str, response: reqwest::Response) -> PerchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    PerchError::Auth(format!("{path} returned {status}: {body}"))
}

async fn status_error(path: &str, response: reqwest::Response) -> PerchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    PerchError::Storage {
        message: format!("{path} returned {status}: {body}"),
        source: None,
    }
}

#[async_trait]
impl MessageRepository for HttpMessageApi {
    async fn fetch_conversation(
        &self,
        // The authenticated viewer; the server derives it from the bearer
        // token and only needs the counterpart in the path.
        _a: &UserId,
        b: &UserId,
        listing: Option<&ListingId>,
        limit: usize,
    ) -> Result<Vec<Message>, PerchError> {
        let path = match listing {
            Some(listing) => format!("/messages/thread/{}/{}", listing.0, b.0),
            None => format!("/messages/direct/{}", b.0),
        };
        let response: MessagesResponse = self
            .get_json(&path, &[("limit", limit.to_string())])
            .await?;
        Ok(response.messages.into_iter().map(Message::from).collect())
    }

    // The server scopes `/messages/mine` to the bearer identity.
    async fn list_for_user(&self, _user: &UserId) -> Result<Vec<Message>, PerchError> {
        let response: MessagesResponse = self.get_json("/messages/mine", &[]).await?;
        Ok(response.messages.into_iter().map(Message::from).collect())
    }

    async fn insert(&self, draft: &MessageDraft) -> Result<Message, PerchError> {
        let response: SendResponse = self
            .send_json(
                reqwest::Method::POST,
                "/messages/send",
                &SendPayload::from(draft),
            )
            .await?;
        Ok(Message::from(response.message))
    }

    async fn mark_read(&self, ids: &[MessageId]) -> Result<(), PerchError> {
        let payload = MarkReadPayload {
            message_ids: ids.iter().map(|id| id.0.clone()).collect(),
        };
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PATCH, "/messages/read", &payload)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for HttpMessageApi {
    async fn profile(&self, id: &UserId) -> Result<Option<ProfileSummary>, PerchError> {
        let path = format!("/profiles/{}", id.0);
        let row: ProfileRow = match self.get_json(&path, &[]).await {
            Ok(row) => row,
            Err(PerchError::Storage { message, .. }) if message.contains("404") => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let display_name = row
            .preferred_name
            .or(row.name)
            .unwrap_or_else(|| "User".to_string());
        Ok(Some(ProfileSummary {
            id: UserId(row.id),
            display_name,
            avatar_url: row.custom_pfp,
            role: row.role.and_then(|r| r.parse::<Role>().ok()),
        }))
    }
}
