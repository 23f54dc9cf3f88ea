//! Frame fan-out to group sessions.
//!
//! Delivery is best-effort and never retried. A session whose queue is closed
//! or full is evicted and told to close its socket; the sender is not told.

use super::{BroadcastReport, GroupActor, UserId};
use crate::error::DeliveryError;
use crate::state::Frame;
use tracing::{trace, warn};

impl GroupActor {
    pub(crate) fn handle_broadcast(&mut self, frame: Frame, origin: Option<&str>) -> BroadcastReport {
        if self.sessions.is_empty() {
            return BroadcastReport::default();
        }

        let mut delivered = 0;
        let mut failed: Vec<(UserId, DeliveryError)> = Vec::new();
        for (user_id, session) in &self.sessions {
            if session.is_closed() {
                failed.push((user_id.clone(), DeliveryError::Closed));
                continue;
            }
            match session.deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => failed.push((user_id.clone(), err)),
            }
        }

        let mut evicted = Vec::with_capacity(failed.len());
        for (user_id, err) in failed {
            if let Some(session) = self.sessions.remove(&user_id) {
                session.close();
                crate::metrics::session_detached();
                crate::metrics::record_eviction(err.reason());
                warn!(
                    group = %self.id,
                    user = %user_id,
                    session = %session.id,
                    error = %err,
                    "Delivery failed, session evicted"
                );
            }
            evicted.push(user_id);
        }

        crate::metrics::record_fanout(delivered);
        trace!(
            group = %self.id,
            origin = origin.unwrap_or("-"),
            bytes = frame.size(),
            delivered,
            "Frame broadcast"
        );

        BroadcastReport { delivered, evicted }
    }
}
