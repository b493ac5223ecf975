use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use slackline_core::types::{ChannelId, UserId};

/// Outbound RTM message, one JSON object per dispatch.
///
/// Wire shapes:
///   message:      `{ "type": "message", "text": "hi", "channel": "C1", "id": 42 }`
///   typing:       `{ "type": "typing", "channel": "C1" }`
///   ping:         `{ "type": "ping", ...caller fields }`
///   presence_sub: `{ "type": "presence_sub", "ids": ["U1", "U2"] }`
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Message {
        text: String,
        channel: ChannelId,
        /// Caller-supplied correlation ID, echoed back in the server's reply.
        id: Option<Value>,
        thread_ts: Option<String>,
    },
    Typing {
        channel: ChannelId,
    },
    /// Caller fields are merged over `"type": "ping"`, caller keys winning.
    /// A caller-supplied `type` is passed through unvalidated.
    Ping {
        data: Map<String, Value>,
    },
    PresenceSub {
        ids: Vec<UserId>,
    },
}

impl Envelope {
    pub fn message(text: impl Into<String>, channel: ChannelId) -> Self {
        Envelope::Message {
            text: text.into(),
            channel,
            id: None,
            thread_ts: None,
        }
    }

    pub fn typing(channel: ChannelId) -> Self {
        Envelope::Typing { channel }
    }

    pub fn ping(data: Map<String, Value>) -> Self {
        Envelope::Ping { data }
    }

    pub fn presence_sub(ids: Vec<UserId>) -> Self {
        Envelope::PresenceSub { ids }
    }

    /// Attach a correlation ID. No-op for kinds other than `message`.
    pub fn with_id(mut self, correlation_id: Option<Value>) -> Self {
        if let Envelope::Message { ref mut id, .. } = self {
            *id = correlation_id;
        }
        self
    }

    /// Post as a reply in the thread rooted at `ts`. No-op for kinds other than `message`.
    pub fn in_thread(mut self, ts: Option<String>) -> Self {
        if let Envelope::Message {
            ref mut thread_ts, ..
        } = self
        {
            *thread_ts = ts;
        }
        self
    }

    /// The `type` discriminator this envelope is built for.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Message { .. } => "message",
            Envelope::Typing { .. } => "typing",
            Envelope::Ping { .. } => "ping",
            Envelope::PresenceSub { .. } => "presence_sub",
        }
    }

    /// Target channel, for kinds that have one.
    pub fn channel(&self) -> Option<&ChannelId> {
        match self {
            Envelope::Message { channel, .. } | Envelope::Typing { channel } => Some(channel),
            _ => None,
        }
    }

    /// Encode to the JSON text sent over the socket.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Envelope::Message {
                text,
                channel,
                id,
                thread_ts,
            } => {
                let len = 3 + usize::from(id.is_some()) + usize::from(thread_ts.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("type", "message")?;
                map.serialize_entry("text", text)?;
                map.serialize_entry("channel", channel)?;
                if let Some(id) = id {
                    map.serialize_entry("id", id)?;
                }
                if let Some(ts) = thread_ts {
                    map.serialize_entry("thread_ts", ts)?;
                }
                map.end()
            }
            Envelope::Typing { channel } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "typing")?;
                map.serialize_entry("channel", channel)?;
                map.end()
            }
            Envelope::Ping { data } => {
                // Shallow merge: emit the default tag only when the caller did not set one.
                let overrides_type = data.contains_key("type");
                let len = data.len() + usize::from(!overrides_type);
                let mut map = serializer.serialize_map(Some(len))?;
                if !overrides_type {
                    map.serialize_entry("type", "ping")?;
                }
                for (k, v) in data {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Envelope::PresenceSub { ids } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "presence_sub")?;
                map.serialize_entry("ids", ids)?;
                map.end()
            }
        }
    }
}

/// Kind tag handed to the transport alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
}

/// A serialized payload ready to be cast onto the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: String,
}

impl Frame {
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: payload.into(),
        }
    }

    pub fn from_envelope(envelope: &Envelope) -> Result<Self, serde_json::Error> {
        envelope.encode().map(Frame::text)
    }
}
