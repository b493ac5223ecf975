use std::fmt;
use std::sync::Arc;

use crate::lookup::Lookups;
use crate::transport::Transport;

/// Handle to an established RTM session, as seen by the dispatcher.
///
/// Owned by the caller. Dispatching only borrows it; nothing here is mutated
/// or closed by a send.
#[derive(Clone)]
pub struct RtmConnection {
    token: String,
    transport: Arc<dyn Transport>,
    lookups: Arc<dyn Lookups>,
}

impl RtmConnection {
    pub fn new(
        token: impl Into<String>,
        transport: Arc<dyn Transport>,
        lookups: Arc<dyn Lookups>,
    ) -> Self {
        Self {
            token: token.into(),
            transport,
            lookups,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn lookups(&self) -> &dyn Lookups {
        self.lookups.as_ref()
    }
}

impl fmt::Debug for RtmConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtmConnection")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
