//! Authorization list maintenance.

use super::{GroupActor, UserId};
use tracing::debug;

impl GroupActor {
    pub(crate) fn handle_add_member(&mut self, user_id: UserId) {
        if self.members.insert(user_id.clone()) {
            debug!(group = %self.id, user = %user_id, members = self.members.len(), "Member added");
        }
    }
}
