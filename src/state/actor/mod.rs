//! Actor model for group state.
//!
//! Each group is owned by a `GroupActor` running in its own Tokio task. All
//! mutation of a group's member set and live-session map happens inside that
//! task, so unrelated groups never contend and no lock is held while frames
//! are handed to connections.
//!
//! # Architecture
//!
//! - **State ownership**: the actor owns `members` and `sessions`.
//! - **Message passing**: callers talk to it through [`GroupEvent`]s, usually
//!   via [`GroupHandle`](crate::state::GroupHandle).
//! - **No socket I/O**: delivery is a non-blocking enqueue onto each session's
//!   bounded outbound queue; the connection task does the actual write.

use crate::state::{SessionHandle, UserId};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::debug;

mod handlers;
mod types;

pub use types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorState {
    Active,
    Stopped,
}

/// The Group Actor.
///
/// Owns the state of a single group and processes events sequentially.
pub struct GroupActor {
    pub id: GroupId,
    pub name: String,
    pub created: i64,
    pub members: HashSet<UserId>,
    pub sessions: HashMap<UserId, SessionHandle>,
    state: ActorState,
}

impl GroupActor {
    pub fn new(id: GroupId, name: String, created: i64) -> Self {
        Self {
            id,
            name,
            created,
            members: HashSet::new(),
            sessions: HashMap::new(),
            state: ActorState::Active,
        }
    }

    /// Create a new Group Actor and spawn it with an event queue of `capacity`.
    pub fn spawn(id: GroupId, name: String, created: i64, capacity: usize) -> mpsc::Sender<GroupEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let actor = Self::new(id, name, created);

        tokio::spawn(async move {
            actor.run(rx).await;
        });

        tx
    }

    /// The main actor loop. Ends on `Shutdown` or once every handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<GroupEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
            if self.state == ActorState::Stopped {
                break;
            }
        }
        self.close_all_sessions();
        debug!(group = %self.id, "Group actor stopped");
    }

    fn handle_event(&mut self, event: GroupEvent) {
        match event {
            GroupEvent::AddMember { user_id, reply_tx } => {
                self.handle_add_member(user_id);
                let _ = reply_tx.send(self.snapshot());
            }
            GroupEvent::IsMember { user_id, reply_tx } => {
                let _ = reply_tx.send(self.members.contains(&user_id));
            }
            GroupEvent::Attach { session, reply_tx } => {
                let outcome = self.handle_attach(session);
                let _ = reply_tx.send(outcome);
            }
            GroupEvent::Detach {
                user_id,
                session_id,
                reply_tx,
            } => {
                let removed = self.handle_detach(&user_id, session_id);
                if let Some(tx) = reply_tx {
                    let _ = tx.send(removed);
                }
            }
            GroupEvent::Broadcast {
                frame,
                origin,
                reply_tx,
            } => {
                let report = self.handle_broadcast(frame, origin.as_deref());
                if let Some(tx) = reply_tx {
                    let _ = tx.send(report);
                }
            }
            GroupEvent::GetInfo { reply_tx } => {
                let _ = reply_tx.send(self.snapshot());
            }
            GroupEvent::Shutdown { reply_tx } => {
                self.close_all_sessions();
                self.state = ActorState::Stopped;
                if let Some(tx) = reply_tx {
                    let _ = tx.send(());
                }
            }
        }
    }

    pub fn snapshot(&self) -> GroupSnapshot {
        let mut members: Vec<UserId> = self.members.iter().cloned().collect();
        members.sort();
        let mut sessions: Vec<UserId> = self.sessions.keys().cloned().collect();
        sessions.sort();
        GroupSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            created: self.created,
            members,
            sessions,
        }
    }

    fn close_all_sessions(&mut self) {
        for (_, session) in self.sessions.drain() {
            session.close();
            crate::metrics::session_detached();
        }
    }
}
