use std::fmt;

use slackline_core::types::{ChannelId, UserId};

/// A destination as written by the caller, classified by its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `#general` → `ChannelName("general")`
    ChannelName(String),
    /// `@alice` → `UserMention("alice")`
    UserMention(String),
    /// `U024BE7LH`
    UserId(UserId),
    /// Anything else: used as the transport channel as-is.
    Resolved(ChannelId),
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix('#') {
            return Target::ChannelName(name.to_string());
        }
        if let Some(name) = raw.strip_prefix('@') {
            return Target::UserMention(name.to_string());
        }
        if let Some(user) = UserId::parse(raw) {
            return Target::UserId(user);
        }
        Target::Resolved(ChannelId::from(raw))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Target::Resolved(_))
    }
}

impl From<&str> for Target {
    fn from(raw: &str) -> Self {
        Target::parse(raw)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::ChannelName(name) => write!(f, "#{name}"),
            Target::UserMention(name) => write!(f, "@{name}"),
            Target::UserId(id) => write!(f, "{id}"),
            Target::Resolved(id) => write!(f, "{id}"),
        }
    }
}
