use serde::Deserialize;
use slackline_core::types::ChannelId;

/// Web API method that opens (or returns the existing) direct-message channel.
pub const IM_OPEN: &str = "im.open";

/// Body of an `im.open` reply.
///
/// Success: `{ "ok": true, "channel": { "id": "D024BE91L" } }`
/// Failure: `{ "ok": false, "error": "user_not_found" }`
#[derive(Debug, Clone, Deserialize)]
pub struct ImOpenResponse {
    #[serde(default)]
    pub ok: bool,
    pub channel: Option<ImChannel>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImChannel {
    pub id: ChannelId,
}

impl ImOpenResponse {
    /// The opened channel, if the reply reports success.
    pub fn channel_id(&self) -> Option<&ChannelId> {
        if !self.ok {
            return None;
        }
        self.channel.as_ref().map(|c| &c.id)
    }
}
