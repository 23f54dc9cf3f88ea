use crate::state::{Frame, SessionHandle, SessionId, UserId};
use serde::Serialize;
use tokio::sync::oneshot;

/// Unique identifier for a group.
pub type GroupId = String;

/// Events that can be sent to a Group Actor.
#[derive(Debug)]
pub enum GroupEvent {
    /// Add a user to the authorization list. Idempotent.
    AddMember {
        user_id: UserId,
        reply_tx: oneshot::Sender<GroupSnapshot>,
    },
    /// Membership query used by the session supervisor while validating.
    IsMember {
        user_id: UserId,
        reply_tx: oneshot::Sender<bool>,
    },
    /// Register a live session, replacing any prior one for the same user.
    Attach {
        session: SessionHandle,
        reply_tx: oneshot::Sender<AttachOutcome>,
    },
    /// Deregister a session, only if the map still holds this session id.
    Detach {
        user_id: UserId,
        session_id: SessionId,
        reply_tx: Option<oneshot::Sender<bool>>,
    },
    /// Fan a frame out to every live session (sender included).
    Broadcast {
        frame: Frame,
        origin: Option<UserId>,
        reply_tx: Option<oneshot::Sender<BroadcastReport>>,
    },
    /// Request a snapshot of the group.
    GetInfo {
        reply_tx: oneshot::Sender<GroupSnapshot>,
    },
    /// Close every live session and stop the actor.
    Shutdown { reply_tx: Option<oneshot::Sender<()>> },
}

/// Snapshot of group state for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub name: String,
    pub created: i64,
    /// Sorted member user ids.
    pub members: Vec<UserId>,
    /// Sorted user ids with a live session.
    pub sessions: Vec<UserId>,
}

/// Result of attaching a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOutcome {
    /// Session that was evicted to make room, if any.
    pub replaced: Option<SessionId>,
    pub live_sessions: usize,
}

/// Result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Users whose session was evicted because delivery failed.
    pub evicted: Vec<UserId>,
}
