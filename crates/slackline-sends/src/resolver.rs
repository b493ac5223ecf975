//! Rewrites a caller-written target into a transport channel ID.
//!
//! Rules, applied until a channel ID comes out:
//!   `#name`  → channel lookup (miss is fatal)
//!   `U…`     → display name → `@name`
//!   `@name`  → existing DM channel, else `im.open`
//!   other    → already a channel ID
//!
//! The longest chain is `U…` → `@name` → DM channel, so the rewrite budget
//! is never exhausted by well-behaved lookups.

use slackline_core::types::ChannelId;
use tracing::debug;

use crate::connection::RtmConnection;
use crate::error::SendError;
use crate::im::DirectMessageOpener;
use crate::target::Target;

/// Upper bound on rewrite steps before a target is reported unresolvable.
pub const MAX_REWRITES: usize = 3;

/// Resolve `target` to a channel ID.
///
/// Only the DM-open fallback does network I/O; every other step is a cache
/// lookup through the connection's [`Lookups`](crate::lookup::Lookups).
pub async fn resolve_target(
    conn: &RtmConnection,
    opener: &dyn DirectMessageOpener,
    target: Target,
) -> Result<ChannelId, SendError> {
    resolve_within(conn, opener, target, MAX_REWRITES).await
}

/// Resolve `target` allowing at most `budget` rewrites.
pub(crate) async fn resolve_within(
    conn: &RtmConnection,
    opener: &dyn DirectMessageOpener,
    target: Target,
    budget: usize,
) -> Result<ChannelId, SendError> {
    let original = target.to_string();
    let mut current = target;

    // One pass per rewrite, plus one to observe the terminal case.
    for step in 0..=budget {
        let next = match current {
            Target::Resolved(id) => {
                debug!(input = %original, channel = %id, steps = step, "target resolved");
                return Ok(id);
            }
            Target::ChannelName(name) => match conn.lookups().channel_id(&name) {
                Some(id) => Target::Resolved(id),
                None => {
                    return Err(SendError::TargetNotFound {
                        target: format!("#{name}"),
                    })
                }
            },
            Target::UserId(user) => match conn.lookups().user_name(&user) {
                Some(name) => Target::UserMention(name),
                None => {
                    return Err(SendError::UserNotFound {
                        user: user.to_string(),
                    })
                }
            },
            Target::UserMention(name) => match conn.lookups().direct_message_id(&name) {
                Some(id) => Target::Resolved(id),
                None => {
                    let user = conn.lookups().user_id(&name).ok_or_else(|| {
                        SendError::UserNotFound {
                            user: format!("@{name}"),
                        }
                    })?;
                    debug!(mention = %name, user = %user, "no DM channel cached, opening one");
                    let id = opener
                        .open_direct_message_channel(conn.token(), &user)
                        .await?;
                    Target::Resolved(id)
                }
            },
        };
        debug!(input = %original, step, rewritten = %next, "target rewritten");
        current = next;
    }

    Err(SendError::Unresolvable {
        target: original,
        steps: budget,
    })
}
