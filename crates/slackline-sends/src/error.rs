use thiserror::Error;

/// Errors that can occur while resolving a target or dispatching an envelope.
#[derive(Debug, Error)]
pub enum SendError {
    /// A `#channel` name has no known ID.
    #[error("Target not found: {target}")]
    TargetNotFound { target: String },

    /// A mention or raw user ID has no matching user record.
    #[error("User not found: {user}")]
    UserNotFound { user: String },

    /// The `im.open` fallback did not yield a channel.
    #[error("Could not open direct message channel: {0}")]
    DmOpen(#[from] ImOpenError),

    /// The envelope could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The send primitive refused the frame.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The rewrite budget ran out before reaching a channel ID.
    #[error("Target {target} still unresolved after {steps} rewrites")]
    Unresolvable { target: String, steps: usize },
}

impl SendError {
    /// True for failures that indicate a bug or bad input on the caller's side.
    ///
    /// The remaining variants are runtime conditions (deactivated user, flaky
    /// network, closed socket) a caller may want to handle and carry on.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SendError::TargetNotFound { .. }
                | SendError::Unresolvable { .. }
                | SendError::Serialization(_)
        )
    }
}

/// Failure of the `im.open` REST call.
#[derive(Debug, Error)]
pub enum ImOpenError {
    /// The API answered but reported an application-level error.
    /// `body` is the decoded error object as returned by the peer.
    #[error("im.open failed: {error}")]
    Api {
        error: String,
        body: serde_json::Value,
    },

    /// The request never produced a usable reply (network, timeout, non-2xx, bad body).
    #[error("im.open request failed: {0}")]
    Transport(String),
}

/// Errors raised by a [`Transport`](crate::transport::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket writer has gone away.
    #[error("connection closed")]
    Closed,
}
