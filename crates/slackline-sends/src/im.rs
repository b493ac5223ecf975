//! `im.open` fallback: opens a direct-message channel over the Web API when
//! the cache has none for the mentioned user.

use async_trait::async_trait;
use serde_json::Value;
use slackline_core::config::ApiConfig;
use slackline_core::types::{ChannelId, UserId};
use slackline_protocol::api::{ImOpenResponse, IM_OPEN};
use tracing::{debug, info, warn};

use crate::error::ImOpenError;

/// Opens (or fetches the existing) DM channel with a user. Single attempt, no retries.
#[async_trait]
pub trait DirectMessageOpener: Send + Sync {
    async fn open_direct_message_channel(
        &self,
        token: &str,
        user: &UserId,
    ) -> Result<ChannelId, ImOpenError>;
}

/// [`DirectMessageOpener`] that POSTs to `{base_url}/api/im.open`.
///
/// Timeouts are whatever the wrapped `reqwest::Client` is built with.
pub struct ImClient {
    client: reqwest::Client,
    api: ApiConfig,
}

impl ImClient {
    pub fn new(api: ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), api)
    }

    pub fn with_client(client: reqwest::Client, api: ApiConfig) -> Self {
        Self { client, api }
    }
}

#[async_trait]
impl DirectMessageOpener for ImClient {
    async fn open_direct_message_channel(
        &self,
        token: &str,
        user: &UserId,
    ) -> Result<ChannelId, ImOpenError> {
        let url = self.api.method_url(IM_OPEN);
        debug!(%url, user = %user, "opening direct message channel");

        let resp = self
            .client
            .post(&url)
            .form(&[("token", token), ("user", user.as_str())])
            .send()
            .await
            .map_err(|e| ImOpenError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %text, "im.open HTTP error");
            return Err(ImOpenError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ImOpenError::Transport(e.to_string()))?;

        let channel = parse_im_open(&body).inspect_err(|e| {
            warn!(user = %user, error = %e, "im.open rejected");
        })?;
        info!(user = %user, channel = %channel, "direct message channel opened");
        Ok(channel)
    }
}

/// Interpret an `im.open` reply body.
///
/// `{ok: true, channel: {id}}` yields the ID; any other well-formed object is
/// an application error carrying the object itself. A body that is not JSON
/// is treated as a transport failure.
pub fn parse_im_open(body: &str) -> Result<ChannelId, ImOpenError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ImOpenError::Transport(format!("invalid im.open body: {e}")))?;
    let resp: ImOpenResponse = serde_json::from_value(value.clone())
        .map_err(|e| ImOpenError::Transport(format!("unexpected im.open body: {e}")))?;

    match resp.channel_id() {
        Some(id) => Ok(id.clone()),
        None => Err(ImOpenError::Api {
            error: resp.error.unwrap_or_else(|| "unknown_error".to_string()),
            body: value,
        }),
    }
}
