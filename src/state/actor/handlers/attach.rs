//! Session registration and deregistration.
//!
//! Enforces the one-live-session-per-user invariant: attaching a session for
//! a user that already has one closes the old session before the map entry is
//! overwritten.

use super::{AttachOutcome, GroupActor};
use crate::state::{SessionHandle, SessionId};
use tracing::{debug, info};

impl GroupActor {
    pub(crate) fn handle_attach(&mut self, session: SessionHandle) -> AttachOutcome {
        let user_id = session.user_id.clone();
        let session_id = session.id;

        let replaced = match self.sessions.insert(user_id.clone(), session) {
            Some(previous) => {
                previous.close();
                crate::metrics::record_eviction("replaced");
                info!(
                    group = %self.id,
                    user = %user_id,
                    previous = %previous.id,
                    session = %session_id,
                    "Replaced existing session"
                );
                Some(previous.id)
            }
            None => {
                crate::metrics::session_attached();
                None
            }
        };

        debug!(group = %self.id, user = %user_id, live = self.sessions.len(), "Session attached");
        AttachOutcome {
            replaced,
            live_sessions: self.sessions.len(),
        }
    }

    /// Returns `true` if the entry was removed.
    pub(crate) fn handle_detach(&mut self, user_id: &str, session_id: SessionId) -> bool {
        let is_current = self
            .sessions
            .get(user_id)
            .is_some_and(|current| current.id == session_id);
        if !is_current {
            return false;
        }

        if let Some(session) = self.sessions.remove(user_id) {
            session.close();
            crate::metrics::session_detached();
        }
        debug!(group = %self.id, user = %user_id, live = self.sessions.len(), "Session detached");
        true
    }
}
