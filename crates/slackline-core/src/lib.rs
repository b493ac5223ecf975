pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiConfig, SlacklineConfig};
pub use error::{Result, SlacklineError};
pub use types::{ChannelId, UserId};
