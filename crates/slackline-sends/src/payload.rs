use serde_json::Value;
use slackline_core::types::ChannelId;
use slackline_protocol::frames::Envelope;

/// Envelope kinds that are addressed to a channel and so need a resolved target.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelPayload {
    Message {
        text: String,
        /// Correlation ID threaded into the envelope verbatim.
        id: Option<Value>,
        thread_ts: Option<String>,
    },
    Typing,
}

impl ChannelPayload {
    pub fn message(text: impl Into<String>, id: Option<Value>) -> Self {
        ChannelPayload::Message {
            text: text.into(),
            id,
            thread_ts: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChannelPayload::Message { .. } => "message",
            ChannelPayload::Typing => "typing",
        }
    }

    /// Build the envelope for an already-resolved channel.
    pub fn into_envelope(self, channel: ChannelId) -> Envelope {
        match self {
            ChannelPayload::Message {
                text,
                id,
                thread_ts,
            } => Envelope::message(text, channel)
                .with_id(id)
                .in_thread(thread_ts),
            ChannelPayload::Typing => Envelope::typing(channel),
        }
    }
}
