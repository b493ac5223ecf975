use dashmap::DashMap;
use serde::Deserialize;
use slackline_core::types::{ChannelId, UserId};
use tracing::debug;

/// Read-only name ↔ ID lookups over a warm workspace cache.
///
/// All names are bare (no `#` / `@` prefix). Implementations must be cheap and
/// non-blocking: the resolver calls them inline on every dispatch.
pub trait Lookups: Send + Sync {
    /// Public channel or private group ID for `name`.
    fn channel_id(&self, name: &str) -> Option<ChannelId>;

    /// User ID for the user called `name`.
    fn user_id(&self, name: &str) -> Option<UserId>;

    /// Existing direct-message channel with the user called `name`.
    fn direct_message_id(&self, name: &str) -> Option<ChannelId>;

    /// Display name for a raw user ID.
    fn user_name(&self, user: &UserId) -> Option<String>;
}

/// Workspace state as delivered by `rtm.start` (only the fields lookups need).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RtmSnapshot {
    #[serde(default)]
    pub channels: Vec<NamedEntry>,
    #[serde(default)]
    pub groups: Vec<NamedEntry>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    #[serde(default)]
    pub ims: Vec<ImEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImEntry {
    pub id: ChannelId,
    pub user: UserId,
}

/// Concurrent in-process lookup cache.
///
/// Seeded from an [`RtmSnapshot`] and kept current by whoever reads the
/// event stream (`channel_created`, `im_created`, `user_change`, …).
#[derive(Default)]
pub struct InMemoryLookups {
    channels: DashMap<String, ChannelId>,
    groups: DashMap<String, ChannelId>,
    users: DashMap<String, UserId>,
    user_names: DashMap<UserId, String>,
    ims: DashMap<UserId, ChannelId>,
}

impl InMemoryLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &RtmSnapshot) -> Self {
        let lookups = Self::new();
        for c in &snapshot.channels {
            lookups.insert_channel(&c.name, c.id.clone());
        }
        for g in &snapshot.groups {
            lookups.insert_group(&g.name, g.id.clone());
        }
        for u in &snapshot.users {
            lookups.insert_user(&u.name, u.id.clone());
        }
        for im in &snapshot.ims {
            lookups.insert_im(im.user.clone(), im.id.clone());
        }
        debug!(
            channels = lookups.channels.len(),
            groups = lookups.groups.len(),
            users = lookups.users.len(),
            ims = lookups.ims.len(),
            "lookup cache seeded"
        );
        lookups
    }

    /// Parse an `rtm.start`-style JSON document and seed a cache from it.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let snapshot: RtmSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    pub fn insert_channel(&self, name: &str, id: ChannelId) {
        self.channels.insert(name.to_string(), id);
    }

    pub fn insert_group(&self, name: &str, id: ChannelId) {
        self.groups.insert(name.to_string(), id);
    }

    /// Register or rename a user.
    ///
    /// A rename drops the old name mapping; a name taken over by another ID
    /// drops that ID's display name so it no longer resolves through `@name`.
    pub fn insert_user(&self, name: &str, id: UserId) {
        if let Some(old) = self.user_names.insert(id.clone(), name.to_string()) {
            if old != name {
                self.users.remove_if(&old, |_, owner| *owner == id);
            }
        }
        if let Some(prev) = self.users.insert(name.to_string(), id.clone()) {
            if prev != id {
                self.user_names.remove_if(&prev, |_, n| n == name);
            }
        }
    }

    pub fn insert_im(&self, user: UserId, channel: ChannelId) {
        self.ims.insert(user, channel);
    }
}

impl Lookups for InMemoryLookups {
    fn channel_id(&self, name: &str) -> Option<ChannelId> {
        self.channels
            .get(name)
            .or_else(|| self.groups.get(name))
            .map(|e| e.value().clone())
    }

    fn user_id(&self, name: &str) -> Option<UserId> {
        self.users.get(name).map(|e| e.value().clone())
    }

    fn direct_message_id(&self, name: &str) -> Option<ChannelId> {
        let user = self.user_id(name)?;
        self.ims.get(&user).map(|e| e.value().clone())
    }

    fn user_name(&self, user: &UserId) -> Option<String> {
        self.user_names.get(user).map(|e| e.value().clone())
    }
}
