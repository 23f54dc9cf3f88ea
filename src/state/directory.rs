//! The Directory - registry of groups and users.
//!
//! Users and group handles live in sharded concurrent maps. Group state itself
//! lives in each group's actor; the Directory only knows how to reach it.
//! Every lookup clones out of the map before awaiting on an actor, so no shard
//! guard is ever held across I/O.

use super::actor::{AttachOutcome, BroadcastReport, GroupActor, GroupEvent, GroupId, GroupSnapshot};
use super::dashmap_ext::DashMapExt;
use super::{Frame, SessionHandle, SessionId, User, UserId};
use crate::error::{EntityKind, RelayError, RelayResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Address of a running group actor.
#[derive(Debug, Clone)]
pub struct GroupHandle {
    pub id: GroupId,
    tx: mpsc::Sender<GroupEvent>,
}

impl GroupHandle {
    /// Send an event carrying a reply channel and wait for the answer.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> GroupEvent,
    ) -> RelayResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RelayError::GroupUnavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RelayError::GroupUnavailable(self.id.clone()))
    }

    pub async fn add_member(&self, user_id: UserId) -> RelayResult<GroupSnapshot> {
        self.request(|reply_tx| GroupEvent::AddMember { user_id, reply_tx })
            .await
    }

    pub async fn is_member(&self, user_id: UserId) -> RelayResult<bool> {
        self.request(|reply_tx| GroupEvent::IsMember { user_id, reply_tx })
            .await
    }

    pub async fn attach(&self, session: SessionHandle) -> RelayResult<AttachOutcome> {
        self.request(|reply_tx| GroupEvent::Attach { session, reply_tx })
            .await
    }

    pub async fn detach(&self, user_id: UserId, session_id: SessionId) -> RelayResult<bool> {
        self.request(|reply_tx| GroupEvent::Detach {
            user_id,
            session_id,
            reply_tx: Some(reply_tx),
        })
        .await
    }

    /// Fan `frame` out to the group and wait until every session has been tried.
    pub async fn broadcast(&self, frame: Frame, origin: Option<UserId>) -> RelayResult<BroadcastReport> {
        self.request(|reply_tx| GroupEvent::Broadcast {
            frame,
            origin,
            reply_tx: Some(reply_tx),
        })
        .await
    }

    pub async fn snapshot(&self) -> RelayResult<GroupSnapshot> {
        self.request(|reply_tx| GroupEvent::GetInfo { reply_tx }).await
    }

    /// Close all sessions and stop the actor. A stopped actor is not an error.
    pub async fn shutdown(&self) {
        let _ = self
            .request(|reply_tx| GroupEvent::Shutdown {
                reply_tx: Some(reply_tx),
            })
            .await;
    }
}

/// The Directory - central registry of groups and users.
pub struct Directory {
    users: DashMap<UserId, Arc<User>>,
    groups: DashMap<GroupId, GroupHandle>,
    /// Event queue capacity for newly spawned group actors.
    group_queue: usize,
}

impl Directory {
    pub fn new(group_queue: usize) -> Self {
        Self {
            users: DashMap::new(),
            groups: DashMap::new(),
            group_queue,
        }
    }

    /// Create a group with empty members and sessions.
    ///
    /// Never overwrites: an existing id yields `DuplicateKey`.
    pub fn create_group(&self, id: GroupId, name: String) -> RelayResult<GroupSnapshot> {
        match self.groups.entry(id.clone()) {
            Entry::Occupied(_) => Err(RelayError::DuplicateKey {
                kind: EntityKind::Group,
                id,
            }),
            Entry::Vacant(slot) => {
                let created = chrono::Utc::now().timestamp();
                let tx = GroupActor::spawn(id.clone(), name.clone(), created, self.group_queue);
                slot.insert(GroupHandle { id: id.clone(), tx });
                crate::metrics::group_created();
                info!(group = %id, name = %name, "Group created");
                Ok(GroupSnapshot {
                    id,
                    name,
                    created,
                    members: Vec::new(),
                    sessions: Vec::new(),
                })
            }
        }
    }

    /// Register a user. Never overwrites: an existing id yields `DuplicateKey`.
    pub fn register_user(&self, id: UserId, name: String) -> RelayResult<Arc<User>> {
        match self.users.entry(id.clone()) {
            Entry::Occupied(_) => Err(RelayError::DuplicateKey {
                kind: EntityKind::User,
                id,
            }),
            Entry::Vacant(slot) => {
                let user = Arc::new(User::new(id.clone(), name));
                slot.insert(Arc::clone(&user));
                info!(user = %id, "User registered");
                Ok(user)
            }
        }
    }

    /// Add `user_id` to the member set of `group_id`. Idempotent.
    pub async fn add_member(&self, group_id: &str, user_id: &str) -> RelayResult<GroupSnapshot> {
        let group = self
            .lookup_group(group_id)
            .ok_or_else(|| RelayError::group_not_found(group_id))?;
        if !self.users.contains_key(user_id) {
            return Err(RelayError::user_not_found(user_id));
        }
        group.add_member(user_id.to_string()).await
    }

    pub fn lookup_group(&self, id: &str) -> Option<GroupHandle> {
        self.groups.get_cloned(id)
    }

    pub fn lookup_user(&self, id: &str) -> Option<Arc<User>> {
        self.users.get_cloned(id)
    }

    pub async fn group_snapshot(&self, id: &str) -> RelayResult<GroupSnapshot> {
        let group = self
            .lookup_group(id)
            .ok_or_else(|| RelayError::group_not_found(id))?;
        group.snapshot().await
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Total live sessions across all groups.
    pub async fn session_count(&self) -> usize {
        let mut total = 0;
        for group in self.groups.values_cloned() {
            if let Ok(snapshot) = group.snapshot().await {
                total += snapshot.sessions.len();
            }
        }
        total
    }

    /// Close every live session, stop every group actor and forget all users.
    pub async fn reset(&self) {
        let mut stopped = 0usize;
        for id in self.groups.keys_cloned() {
            if let Some((_, group)) = self.groups.remove(&id) {
                group.shutdown().await;
                stopped += 1;
            }
        }
        self.users.clear();
        crate::metrics::groups_removed(stopped);
        debug!(groups = stopped, "Directory reset");
    }
}
