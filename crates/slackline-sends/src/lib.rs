pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod im;
pub mod lookup;
pub mod payload;
pub mod resolver;
pub mod target;
pub mod transport;

pub use connection::RtmConnection;
pub use dispatcher::MessageDispatcher;
pub use error::{ImOpenError, SendError, TransportError};
pub use im::{DirectMessageOpener, ImClient};
pub use lookup::{InMemoryLookups, Lookups, RtmSnapshot};
pub use payload::ChannelPayload;
pub use target::Target;
pub use transport::{ChannelTransport, Transport};
