use std::sync::Arc;

use serde_json::{Map, Value};
use slackline_core::config::{ApiConfig, SlacklineConfig};
use slackline_core::types::{ChannelId, UserId};
use slackline_protocol::frames::Envelope;
use tracing::debug;

use crate::connection::RtmConnection;
use crate::error::SendError;
use crate::im::{DirectMessageOpener, ImClient};
use crate::payload::ChannelPayload;
use crate::resolver::resolve_target;
use crate::target::Target;
use crate::transport::{transmit, transmit_raw};

/// Sends outbound RTM messages over a caller-owned [`RtmConnection`].
///
/// Stateless between calls: safe to share and to call concurrently, provided
/// the connection's transport and lookups are. No ordering is imposed between
/// concurrent dispatches beyond what the transport preserves.
pub struct MessageDispatcher {
    opener: Arc<dyn DirectMessageOpener>,
}

impl MessageDispatcher {
    /// Dispatcher whose DM-open fallback talks to `api.base_url`.
    pub fn new(api: ApiConfig) -> Self {
        Self::with_opener(Arc::new(ImClient::new(api)))
    }

    pub fn from_config(config: &SlacklineConfig) -> Self {
        Self::new(config.api.clone())
    }

    pub fn with_opener(opener: Arc<dyn DirectMessageOpener>) -> Self {
        Self { opener }
    }

    /// Resolve `target` (`#channel`, `@user`, `U…`, or a channel ID) without sending.
    pub async fn resolve(
        &self,
        target: &str,
        conn: &RtmConnection,
    ) -> Result<ChannelId, SendError> {
        resolve_target(conn, self.opener.as_ref(), Target::parse(target)).await
    }

    /// Resolve `target`, build the envelope for `payload` and cast it.
    ///
    /// Nothing is cast unless resolution succeeds. An `im.open` issued along
    /// the way is not undone if a later step fails.
    pub async fn resolve_and_send(
        &self,
        target: &str,
        payload: ChannelPayload,
        conn: &RtmConnection,
    ) -> Result<(), SendError> {
        let channel = self.resolve(target, conn).await?;
        debug!(to = %target, channel = %channel, kind = payload.kind(), "dispatching");
        transmit(&payload.into_envelope(channel), conn.transport())
    }

    /// Post `text` to `target`. `id` is echoed back by the server in its reply.
    pub async fn send_message(
        &self,
        text: &str,
        target: &str,
        id: Option<Value>,
        conn: &RtmConnection,
    ) -> Result<(), SendError> {
        self.resolve_and_send(target, ChannelPayload::message(text, id), conn)
            .await
    }

    /// Post `text` as a reply in the thread rooted at `thread_ts`.
    pub async fn reply_in_thread(
        &self,
        text: &str,
        target: &str,
        thread_ts: &str,
        id: Option<Value>,
        conn: &RtmConnection,
    ) -> Result<(), SendError> {
        let payload = ChannelPayload::Message {
            text: text.to_string(),
            id,
            thread_ts: Some(thread_ts.to_string()),
        };
        self.resolve_and_send(target, payload, conn).await
    }

    /// Show the typing indicator in `channel`. The channel is used verbatim.
    pub fn indicate_typing(&self, channel: &str, conn: &RtmConnection) -> Result<(), SendError> {
        transmit(&Envelope::typing(ChannelId::from(channel)), conn.transport())
    }

    /// Keep-alive ping. `data` is merged over `"type": "ping"`, caller keys winning.
    pub fn send_ping(
        &self,
        data: Map<String, Value>,
        conn: &RtmConnection,
    ) -> Result<(), SendError> {
        transmit(&Envelope::ping(data), conn.transport())
    }

    /// Subscribe to presence changes for `ids`.
    pub fn subscribe_presence(
        &self,
        ids: Vec<UserId>,
        conn: &RtmConnection,
    ) -> Result<(), SendError> {
        transmit(&Envelope::presence_sub(ids), conn.transport())
    }

    /// Cast an already-built JSON payload unchanged.
    pub fn send_raw(&self, payload: &Value, conn: &RtmConnection) -> Result<(), SendError> {
        transmit_raw(payload, conn.transport())
    }
}
