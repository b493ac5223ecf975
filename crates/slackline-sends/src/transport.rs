//! Hands serialized envelopes to the socket writer.
//!
//! One call in, one frame out: no batching, no buffering beyond whatever the
//! underlying primitive does.

use serde_json::Value;
use slackline_protocol::frames::{Envelope, Frame};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{SendError, TransportError};

/// Fire-and-forget send primitive over an open RTM socket.
///
/// Implementations must be `Send + Sync`: one connection may be shared by
/// many concurrent dispatches.
pub trait Transport: Send + Sync {
    fn cast(&self, frame: Frame) -> Result<(), TransportError>;
}

/// [`Transport`] backed by an unbounded channel whose receiver is drained by
/// the task that owns the socket's write half.
#[derive(Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Frame>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn cast(&self, frame: Frame) -> Result<(), TransportError> {
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }
}

/// Serialize `envelope` and cast it exactly once.
pub fn transmit(envelope: &Envelope, transport: &dyn Transport) -> Result<(), SendError> {
    cast_frame(envelope.kind(), Frame::from_envelope(envelope)?, transport)
}

/// Serialize an already-built JSON payload unchanged and cast it exactly once.
pub fn transmit_raw(payload: &Value, transport: &dyn Transport) -> Result<(), SendError> {
    let kind = payload.get("type").and_then(Value::as_str).unwrap_or("raw");
    cast_frame(kind, Frame::text(serde_json::to_string(payload)?), transport)
}

fn cast_frame(kind: &str, frame: Frame, transport: &dyn Transport) -> Result<(), SendError> {
    debug!(kind, bytes = frame.payload.len(), "casting frame");
    transport.cast(frame)?;
    Ok(())
}
