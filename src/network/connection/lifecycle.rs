//! Terminated-state cleanup.

use crate::state::{GroupHandle, SessionHandle};
use tracing::debug;

/// Deregisters a session from its group when dropped.
///
/// Runs on every exit path of the live state, including a panic inside the
/// event loop. The group actor only removes the entry if it still holds this
/// session id, so a session that was already replaced leaves its successor
/// alone.
pub(super) struct DetachGuard {
    group: GroupHandle,
    session: SessionHandle,
}

impl DetachGuard {
    pub(super) fn new(group: GroupHandle, session: SessionHandle) -> Self {
        Self { group, session }
    }
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        self.session.close();

        let group = self.group.clone();
        let user_id = self.session.user_id.clone();
        let session_id = self.session.id;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            match group.detach(user_id.clone(), session_id).await {
                Ok(removed) => debug!(group = %group.id, user = %user_id, removed, "Session deregistered"),
                Err(e) => debug!(group = %group.id, user = %user_id, error = %e, "Group gone before deregistration"),
            }
        });
    }
}
